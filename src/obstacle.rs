use crate::config::{parse_value, Configuration};
use crate::error::{FlowError, Result};
use crate::global_variables::*;
use crate::grid::{Domain, D};
use crate::CellType;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Rigid circular body. Never moves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub center: [Float; D],
    pub radius: Float,
}

impl Obstacle {
    pub fn new(center: [Float; D], radius: Float) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: [Float; D]) -> bool {
        let dx = point[0] - self.center[0];
        let dy = point[1] - self.center[1];
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

/// `n` evenly spaced values over `[start, end]`, both ends included.
pub fn linspace(start: Float, end: Float, n: usize) -> Vec<Float> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as Float;
            (0..n)
                .map(|k| if k == n - 1 { end } else { start + step * k as Float })
                .collect()
        }
    }
}

/// Regular `swarm_num_x x swarm_num_y` arrangement; x varies in the outer loop.
pub fn generate_swarm(configuration: &Configuration) -> Vec<Obstacle> {
    let (x_start, x_end) = SWARM_X_RANGE;
    let ny = configuration.swarm_num_y;
    let ly = configuration.length_y;
    let margin = if ny > 0 { ly / (ny as Float * 2.0) } else { 0.0 };
    let xs = linspace(x_start, x_end, configuration.swarm_num_x);
    let ys = linspace(margin, ly - margin, ny);
    xs.iter()
        .flat_map(|&x| {
            ys.iter()
                .map(move |&y| Obstacle::new([x, y], configuration.swarm_member_rad))
        })
        .collect()
}

/// One `center_x center_y radius` row per obstacle, below a header row.
pub fn write_obstacles<P>(obstacles: &[Obstacle], path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(file, "{:>24} {:>24} {:>24}", "center_x", "center_y", "radius")?;
    for obstacle in obstacles {
        writeln!(
            file,
            "{:>24e} {:>24e} {:>24e}",
            obstacle.center[0], obstacle.center[1], obstacle.radius
        )?;
    }
    file.flush()?;
    Ok(())
}

pub fn read_obstacles<P>(path: P) -> Result<Vec<Obstacle>>
where
    P: AsRef<Path>,
{
    let contents = fs::read_to_string(path)?;
    contents
        .lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let values = line
                .split_whitespace()
                .map(|word| parse_value("obstacle", word))
                .collect::<Result<Vec<Float>>>()?;
            match values.as_slice() {
                [x, y, radius] => Ok(Obstacle::new([*x, *y], *radius)),
                _ => Err(FlowError::MalformedSnapshot(format!(
                    "obstacle row `{line}` needs three values"
                ))),
            }
        })
        .collect()
}

/// Cell classification derived from the obstacle swarm.
#[derive(Clone, Debug, PartialEq)]
pub struct CellMask {
    pub nx: usize,
    pub ny: usize,
    pub cells: Vec<CellType>,
}

impl CellMask {
    pub fn fluid(domain: &Domain) -> Self {
        Self {
            nx: domain.nx,
            ny: domain.ny,
            cells: vec![CellType::Fluid; domain.cell_count()],
        }
    }

    /// A cell is solid when its center lies inside any obstacle.
    pub fn from_obstacles(domain: &Domain, obstacles: &[Obstacle]) -> Self {
        let nx = domain.nx;
        let cells = (0..domain.cell_count())
            .into_par_iter()
            .map(|index| {
                let center = domain.cell_center(index % nx, index / nx);
                if obstacles.iter().any(|obstacle| obstacle.contains(center)) {
                    CellType::Solid
                } else {
                    CellType::Fluid
                }
            })
            .collect();
        Self {
            nx,
            ny: domain.ny,
            cells,
        }
    }

    pub fn get(&self, i: usize, j: usize) -> CellType {
        self.cells[i + self.nx * j]
    }

    pub fn is_fluid(&self, i: usize, j: usize) -> bool {
        self.get(i, j) == CellType::Fluid
    }

    pub fn number_of_solid_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|&&cell| cell == CellType::Solid)
            .count()
    }

    pub fn number_of_fluid_cells(&self) -> usize {
        self.cells.len() - self.number_of_solid_cells()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn linspace_matches_endpoints() {
        assert_eq!(linspace(35.0, 38.0, 4), vec![35.0, 36.0, 37.0, 38.0]);
        assert_eq!(linspace(1.0, 2.0, 1), vec![1.0]);
        assert!(linspace(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn swarm_has_expected_shape() {
        for (num_x, num_y) in [(5, 5), (1, 3), (4, 1), (2, 7)] {
            let configuration = Configuration {
                swarm_num_x: num_x,
                swarm_num_y: num_y,
                ..Configuration::default()
            };
            let swarm = generate_swarm(&configuration);
            assert_eq!(swarm.len(), num_x * num_y);
            for obstacle in &swarm {
                assert_eq!(obstacle.radius, configuration.swarm_member_rad);
                assert!((35.0..=38.0).contains(&obstacle.center[0]));
                assert!(obstacle.center[1] > 0.0);
                assert!(obstacle.center[1] < configuration.length_y);
            }
        }
    }

    #[test]
    fn swarm_order_is_x_outer_y_inner() {
        let swarm = generate_swarm(&Configuration::default());
        assert_eq!(swarm[0].center[0], 35.0);
        assert_relative_eq!(swarm[0].center[1], 0.32, epsilon = 1e-12);
        assert_relative_eq!(swarm[1].center[1], 0.96, epsilon = 1e-12);
        assert_eq!(swarm[1].center[0], 35.0);
        assert_relative_eq!(swarm[4].center[1], 2.88, epsilon = 1e-12);
        assert_eq!(swarm[5].center[0], 35.75);
        assert_eq!(swarm[24].center[0], 38.0);
    }

    #[test]
    fn mask_marks_cells_inside_circles() {
        let domain = Domain::new(4.0, 2.0, 40, 20);
        let obstacles = [Obstacle::new([2.0, 1.0], 0.3)];
        let mask = CellMask::from_obstacles(&domain, &obstacles);
        assert_eq!(mask.get(20, 10), CellType::Solid);
        assert_eq!(mask.get(19, 9), CellType::Solid);
        assert_eq!(mask.get(0, 0), CellType::Fluid);
        assert_eq!(mask.get(25, 10), CellType::Fluid);
        let solid = mask.number_of_solid_cells();
        assert!(solid > 20 && solid < 36, "got {solid} solid cells");
        assert_eq!(mask.number_of_fluid_cells() + solid, domain.cell_count());
    }

    #[test]
    fn obstacle_file_reads_back_exactly() {
        let obstacles = vec![
            Obstacle::new([12.0, 1.6], 0.4),
            Obstacle::new([35.75, 0.1 + 0.2], 1.0 / 3.0),
        ];
        let path =
            std::env::temp_dir().join(format!("swarm_flow_obstacles_{}.dat", std::process::id()));
        write_obstacles(&obstacles, &path).unwrap();
        assert_eq!(read_obstacles(&path).unwrap(), obstacles);

        write_obstacles(&[], &path).unwrap();
        assert!(read_obstacles(&path).unwrap().is_empty());
    }

    #[test]
    fn short_obstacle_rows_are_rejected() {
        let path = std::env::temp_dir().join(format!(
            "swarm_flow_bad_obstacles_{}.dat",
            std::process::id()
        ));
        fs::write(&path, "center_x center_y radius\n1.0 2.0\n").unwrap();
        assert!(matches!(
            read_obstacles(&path),
            Err(FlowError::MalformedSnapshot(_))
        ));
    }
}
