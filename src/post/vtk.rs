use crate::config::Configuration;
use crate::error::{FlowError, Result};
use crate::grid::{CenteredGrid, Domain, StaggeredGrid};
use crate::io::{
    read_parameters, CELL_TYPE_VTK_FILE, CONFIGURATION_FILE, OBSTACLES_FILE, PRESSURE_PATH,
    VELOCITY_PATH, VTK_PATH,
};
use crate::obstacle::{read_obstacles, CellMask};
use crate::snapshot::{read_centered, read_staggered};
use colored::*;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

fn write_header<W: Write>(file: &mut W, title: &str, domain: &Domain) -> Result<()> {
    writeln!(file, "# vtk DataFile Version 3.0")?;
    writeln!(file, "{title}")?;
    writeln!(file, "ASCII")?;
    writeln!(file, "DATASET STRUCTURED_POINTS")?;
    writeln!(file, "DIMENSIONS {} {} 1", domain.nx, domain.ny)?;
    writeln!(
        file,
        "ORIGIN {:>.6e} {:>.6e} 0.0",
        0.5 * domain.dx,
        0.5 * domain.dy
    )?;
    writeln!(file, "SPACING {:>.6e} {:>.6e} 1.0", domain.dx, domain.dy)?;
    writeln!(file, "POINT_DATA {}", domain.cell_count())?;
    Ok(())
}

/// Cell-centered velocity and pressure of one snapshot pair.
pub fn write_results_vtk<P>(
    velocity: &StaggeredGrid,
    pressure: &CenteredGrid,
    path: P,
) -> Result<()>
where
    P: AsRef<Path>,
{
    let domain = velocity.domain;
    let centered = velocity.at_centers();
    let mut file = BufWriter::new(File::create(path)?);
    write_header(&mut file, "Swarm flow results", &domain)?;
    writeln!(file, "VECTORS velocity float")?;
    for (velocity_x, velocity_y) in centered.x.values.iter().zip(centered.y.values.iter()) {
        writeln!(file, "{velocity_x:>.6e} {velocity_y:>.6e} 0.0")?;
    }
    writeln!(file, "SCALARS pressure float 1")?;
    writeln!(file, "LOOKUP_TABLE default")?;
    for pressure in &pressure.values.values {
        writeln!(file, "{pressure:>.6e}")?;
    }
    file.flush()?;
    Ok(())
}

pub fn write_cell_type_vtk<P>(domain: &Domain, mask: &CellMask, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let mut file = BufWriter::new(File::create(path)?);
    write_header(&mut file, "Swarm flow cell types", domain)?;
    writeln!(file, "SCALARS cell_type int 1")?;
    writeln!(file, "LOOKUP_TABLE default")?;
    for cell in &mask.cells {
        writeln!(file, "{}", *cell as i32)?;
    }
    file.flush()?;
    Ok(())
}

/// Snapshot labels found in `velocity/`, ordered by simulation time.
fn read_snapshot_times(run_path: &Path) -> Result<Vec<String>> {
    let mut times = Vec::new();
    for entry in fs::read_dir(run_path.join(VELOCITY_PATH))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if let Ok(time) = name.parse::<f64>() {
            times.push((time, name));
        }
    }
    times.sort_by(|a, b| a.0.total_cmp(&b.0));
    Ok(times.into_iter().map(|(_, name)| name).collect())
}

/// Converts every snapshot pair of a finished run into legacy VTK files under
/// `vtk_files/`, plus the obstacle cell types. Returns the written paths.
pub fn run_vtk_post_processing(run_path: &Path) -> Result<Vec<PathBuf>> {
    let parameters = read_parameters(run_path.join(CONFIGURATION_FILE))?;
    let configuration = Configuration::from_run_file(&parameters)?;
    let domain = configuration.domain();
    let vtk_path = run_path.join(VTK_PATH);
    fs::create_dir_all(&vtk_path)?;

    let obstacles = read_obstacles(run_path.join(OBSTACLES_FILE))?;
    let mask = CellMask::from_obstacles(&domain, &obstacles);
    let cell_type_path = vtk_path.join(CELL_TYPE_VTK_FILE);
    write_cell_type_vtk(&domain, &mask, &cell_type_path)?;

    let times = read_snapshot_times(run_path)?;
    println!("Found {} snapshots.\n", times.len().to_string().yellow().bold());
    let mut written = times
        .par_iter()
        .map(|time| -> Result<PathBuf> {
            let velocity = read_staggered(run_path.join(VELOCITY_PATH).join(time))?;
            let pressure = read_centered(run_path.join(PRESSURE_PATH).join(time))?;
            if velocity.domain != domain || pressure.domain != domain {
                return Err(FlowError::MalformedSnapshot(format!(
                    "snapshot {time} does not match the run resolution"
                )));
            }
            let path_str = format!("results_{time}.vtk");
            let path = vtk_path.join(&path_str);
            println!(
                "Writing {} for time {}.\n",
                path_str.yellow().bold(),
                time.yellow().bold()
            );
            write_results_vtk(&velocity, &pressure, &path)?;
            Ok(path)
        })
        .collect::<Result<Vec<PathBuf>>>()?;
    written.insert(0, cell_type_path);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Boundaries;
    use crate::obstacle::Obstacle;

    #[test]
    fn results_file_lists_every_cell() {
        let domain = Domain::new(2.0, 1.0, 4, 2);
        let mut velocity = StaggeredGrid::zeros(domain, Boundaries::channel());
        velocity.u.values.iter_mut().for_each(|value| *value = 1.0);
        let pressure = CenteredGrid::zeros(domain);
        let path = std::env::temp_dir().join(format!("swarm_flow_vtk_{}.vtk", std::process::id()));
        write_results_vtk(&velocity, &pressure, &path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("DATASET STRUCTURED_POINTS"));
        assert!(contents.contains("DIMENSIONS 4 2 1"));
        assert!(contents.contains("POINT_DATA 8"));
        let vectors = contents
            .lines()
            .skip_while(|line| !line.starts_with("VECTORS"))
            .skip(1)
            .take_while(|line| !line.starts_with("SCALARS"))
            .count();
        assert_eq!(vectors, 8);
        assert!(contents.contains("1.000000e0 0.000000e0 0.0"));
    }

    #[test]
    fn cell_type_file_marks_solids() {
        let domain = Domain::new(4.0, 2.0, 4, 2);
        let mask = CellMask::from_obstacles(&domain, &[Obstacle::new([0.5, 0.5], 0.2)]);
        let path =
            std::env::temp_dir().join(format!("swarm_flow_cell_type_{}.vtk", std::process::id()));
        write_cell_type_vtk(&domain, &mask, &path).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let values: Vec<&str> = contents
            .lines()
            .skip_while(|line| !line.starts_with("LOOKUP_TABLE"))
            .skip(1)
            .collect();
        assert_eq!(values, vec!["1", "0", "0", "0", "0", "0", "0", "0"]);
    }
}
