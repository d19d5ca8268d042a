//! Plain-text field snapshots, one file per field and time step.
//!
//! ```text
//! kind staggered
//! nx 40
//! ny 8
//! length_x 4
//! length_y 0.8
//! boundaries boundary boundary zero zero
//! component u 328
//! 0e0
//! -4.5e-7
//! ...
//! ```
//!
//! Values are written x-fastest, one per line, in the shortest form that
//! parses back to the same `f64`.

use crate::config::parse_value;
use crate::error::{FlowError, Result};
use crate::grid::{Boundaries, CenteredGrid, Domain, Extrapolation, Field, StaggeredGrid};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

const STAGGERED: &'static str = "staggered";

const CENTERED: &'static str = "centered";

pub fn write_staggered<P>(velocity: &StaggeredGrid, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let mut file = BufWriter::new(File::create(path)?);
    write_header(&mut file, STAGGERED, &velocity.domain)?;
    let b = &velocity.boundaries;
    writeln!(
        file,
        "boundaries {} {} {} {}",
        extrapolation_name(b.west),
        extrapolation_name(b.east),
        extrapolation_name(b.south),
        extrapolation_name(b.north)
    )?;
    write_component(&mut file, "u", &velocity.u)?;
    write_component(&mut file, "v", &velocity.v)?;
    file.flush()?;
    Ok(())
}

pub fn write_centered<P>(grid: &CenteredGrid, path: P) -> Result<()>
where
    P: AsRef<Path>,
{
    let mut file = BufWriter::new(File::create(path)?);
    write_header(&mut file, CENTERED, &grid.domain)?;
    write_component(&mut file, "values", &grid.values)?;
    file.flush()?;
    Ok(())
}

fn write_header<W: Write>(file: &mut W, kind: &str, domain: &Domain) -> Result<()> {
    writeln!(file, "kind {kind}")?;
    writeln!(file, "nx {}", domain.nx)?;
    writeln!(file, "ny {}", domain.ny)?;
    writeln!(file, "length_x {}", domain.lx)?;
    writeln!(file, "length_y {}", domain.ly)?;
    Ok(())
}

fn write_component<W: Write>(file: &mut W, name: &str, field: &Field) -> Result<()> {
    writeln!(file, "component {name} {}", field.values.len())?;
    for value in &field.values {
        writeln!(file, "{value:e}")?;
    }
    Ok(())
}

fn extrapolation_name(extrapolation: Extrapolation) -> &'static str {
    match extrapolation {
        Extrapolation::Boundary => "boundary",
        Extrapolation::Zero => "zero",
    }
}

fn parse_extrapolation(value: &str) -> Result<Extrapolation> {
    match value {
        "boundary" => Ok(Extrapolation::Boundary),
        "zero" => Ok(Extrapolation::Zero),
        _ => Err(malformed(format!("unknown extrapolation `{value}`"))),
    }
}

fn malformed(message: impl Into<String>) -> FlowError {
    FlowError::MalformedSnapshot(message.into())
}

struct SnapshotReader {
    lines: Lines<BufReader<File>>,
}

impl SnapshotReader {
    fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
        })
    }

    fn next_line(&mut self) -> Result<String> {
        match self.lines.next() {
            Some(line) => Ok(line?),
            None => Err(malformed("unexpected end of file")),
        }
    }

    /// Reads `key value...` and returns the words after the key.
    fn entry(&mut self, key: &str) -> Result<Vec<String>> {
        let line = self.next_line()?;
        let mut words = line.split_whitespace();
        match words.next() {
            Some(found) if found == key => Ok(words.map(str::to_string).collect()),
            _ => Err(malformed(format!("expected `{key}`, found `{line}`"))),
        }
    }

    fn single<T: std::str::FromStr>(&mut self, key: &str) -> Result<T> {
        let words = self.entry(key)?;
        match words.as_slice() {
            [value] => parse_value(key, value),
            _ => Err(malformed(format!("`{key}` takes one value"))),
        }
    }

    fn domain(&mut self, kind: &str) -> Result<Domain> {
        let found: String = self.single("kind")?;
        if found != kind {
            return Err(malformed(format!("expected a {kind} snapshot, found {found}")));
        }
        let nx = self.single("nx")?;
        let ny = self.single("ny")?;
        let lx = self.single("length_x")?;
        let ly = self.single("length_y")?;
        Ok(Domain::new(lx, ly, nx, ny))
    }

    fn component(&mut self, name: &str, mut field: Field) -> Result<Field> {
        let words = self.entry("component")?;
        let count: usize = match words.as_slice() {
            [found, count] if found == name => parse_value("component", count)?,
            _ => return Err(malformed(format!("expected component `{name}`"))),
        };
        if count != field.values.len() {
            return Err(malformed(format!(
                "component `{name}` has {count} values, expected {}",
                field.values.len()
            )));
        }
        for value in field.values.iter_mut() {
            *value = parse_value(name, &self.next_line()?)?;
        }
        Ok(field)
    }
}

pub fn read_staggered<P>(path: P) -> Result<StaggeredGrid>
where
    P: AsRef<Path>,
{
    let mut reader = SnapshotReader::open(path)?;
    let domain = reader.domain(STAGGERED)?;
    let words = reader.entry("boundaries")?;
    let rules = words
        .iter()
        .map(|word| parse_extrapolation(word))
        .collect::<Result<Vec<Extrapolation>>>()?;
    let boundaries = match rules.as_slice() {
        [west, east, south, north] => Boundaries {
            west: *west,
            east: *east,
            south: *south,
            north: *north,
        },
        _ => return Err(malformed("`boundaries` takes four values")),
    };
    let mut velocity = StaggeredGrid::zeros(domain, boundaries);
    velocity.u = reader.component("u", velocity.u)?;
    velocity.v = reader.component("v", velocity.v)?;
    Ok(velocity)
}

pub fn read_centered<P>(path: P) -> Result<CenteredGrid>
where
    P: AsRef<Path>,
{
    let mut reader = SnapshotReader::open(path)?;
    let domain = reader.domain(CENTERED)?;
    let mut grid = CenteredGrid::zeros(domain);
    grid.values = reader.component("values", grid.values)?;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::global_variables::*;
    use std::fs;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("swarm_flow_snapshot_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn staggered_snapshot_keeps_shape_and_values() {
        let domain = Domain::new(4.0, 0.8, 10, 4);
        let mut velocity = StaggeredGrid::zeros(domain, Boundaries::channel());
        for (k, value) in velocity.u.values.iter_mut().enumerate() {
            *value = (k as Float * 0.3).sin() * 12.0;
        }
        velocity.u.set(0, 0, 0.1000000012345679);
        velocity.u.set(1, 0, 29.999999999123);
        velocity.v.set(3, 2, -4.5e-7);
        velocity.v.set(0, 1, Float::MIN_POSITIVE);
        let path = scratch("velocity");
        write_staggered(&velocity, &path).unwrap();
        let read = read_staggered(&path).unwrap();
        assert_eq!(read.domain, velocity.domain);
        assert_eq!(read.boundaries, velocity.boundaries);
        assert_eq!((read.u.nx, read.u.ny), (11, 4));
        assert_eq!((read.v.nx, read.v.ny), (10, 5));
        assert_eq!(read.u.values, velocity.u.values);
        assert_eq!(read.v.values, velocity.v.values);
    }

    #[test]
    fn centered_snapshot_keeps_values() {
        let domain = Domain::new(2.0, 1.0, 4, 2);
        let grid = CenteredGrid::from_values(domain, vec![1.0, -2.0, 1.0 / 3.0, 0.0, 1e-3, 7.0, -8.0, 2.0_f64.sqrt()]);
        let path = scratch("pressure");
        write_centered(&grid, &path).unwrap();
        let read = read_centered(&path).unwrap();
        assert_eq!(read, grid);
    }

    #[test]
    fn wrong_kind_is_rejected() {
        let domain = Domain::new(2.0, 1.0, 4, 2);
        let path = scratch("kind");
        write_centered(&CenteredGrid::zeros(domain), &path).unwrap();
        assert!(matches!(
            read_staggered(&path),
            Err(FlowError::MalformedSnapshot(_))
        ));
    }
}
