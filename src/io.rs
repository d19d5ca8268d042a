use crate::config::Configuration;
use crate::error::Result;
use crate::global_variables::*;
use chrono::{DateTime, TimeZone};
use colored::*;
use std::collections::HashMap;
use std::fmt::Display;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIGURATION_FILE: &'static str = "configuration.txt";

pub const FIGURES_PATH: &'static str = "figures";

pub const VELOCITY_PATH: &'static str = "velocity";

pub const PRESSURE_PATH: &'static str = "pressure";

pub const POST_PROCESSING_PATH: &'static str = "post_processing";

pub const VTK_PATH: &'static str = "vtk_files";

pub const RESIDUALS_FILE: &'static str = "residuals.dat";

pub const RESIDUALS_GRAPH_FILE: &'static str = "gr_residuals.gp";

pub const TIMINGS_FILE: &'static str = "timings.dat";

pub const CELL_TYPE_VTK_FILE: &'static str = "cell_type.vtk";

pub const OBSTACLES_FILE: &'static str = "obstacles.dat";

/// Creates `root/folder_name` and its per-step output directories.
pub fn create_run_directories(root: &Path, folder_name: &str) -> Result<PathBuf> {
    let run_path = root.join(folder_name);
    let list_of_paths = [
        run_path.clone(),
        run_path.join(FIGURES_PATH),
        run_path.join(VELOCITY_PATH),
        run_path.join(PRESSURE_PATH),
        run_path.join(POST_PROCESSING_PATH),
    ];
    for path in list_of_paths {
        if !path.exists() {
            println!(
                "Creating the {} path.\n",
                path.display().to_string().yellow().bold()
            );
            fs::create_dir_all(&path)?;
        } else {
            println!(
                "The {} path already exists.\n",
                path.display().to_string().yellow().bold()
            );
        }
    }
    Ok(run_path)
}

pub fn read_parameters<P>(path: P) -> Result<HashMap<String, String>>
where
    P: AsRef<Path>,
{
    let mut file = File::open(path)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(extract_parameters(&contents))
}

/// `key = value` pairs; blank lines and `#` comments are skipped.
pub fn extract_parameters(contents: &str) -> HashMap<String, String> {
    contents
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.starts_with('#'))
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(2, '=');
            let key = parts.next()?.trim().to_string();
            let value = parts.next().unwrap_or("").trim().to_string();
            Some((key, value))
        })
        .collect::<HashMap<String, String>>()
}

/// Reads the case setup at `path`, writing the default case there first when
/// the file does not exist yet.
pub fn build_case_setup<P>(path: P) -> Result<Configuration>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let path_str = path.display().to_string();
    if !path.exists() {
        println!(
            "Creating the default case setup file: {}.\n",
            path_str.yellow().bold()
        );
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        file.write_all(Configuration::default_case_setup().as_bytes())?;
    }
    println!("Reading the case setup file: {}.\n", path_str.yellow().bold());
    let parameters = read_parameters(path)?;
    Configuration::from_setup(&parameters)
}

/// `run_YYYY-M-D_H-M-S` in the wall-clock time of `time`, without zero padding.
pub fn run_folder_name<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("run_{}", time.format("%Y-%-m-%-d_%-H-%-M-%-S"))
}

/// Simulation time as used in output file names.
pub fn format_time(time: Float) -> String {
    format!("{:.3}", time)
}

pub fn write_inside_loop_elapsed_time<P>(
    path: P,
    elapsed_times: &[(&str, Duration)],
    time_step: usize,
) -> Result<()>
where
    P: AsRef<Path>,
{
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    if time_step == 0 {
        write!(file, "{:>8}", "step")?;
        for (key, _) in elapsed_times {
            write!(file, " {:>16}", key)?;
        }
        writeln!(file)?;
    }
    write!(file, "{:>8}", time_step)?;
    for (_, value) in elapsed_times {
        write!(file, " {:>16.8e}", value.as_secs_f64())?;
    }
    writeln!(file)?;
    Ok(())
}
