use crate::config::Configuration;
use crate::error::Result;
use crate::global_variables::*;
use crate::grid::{CenteredGrid, Domain, InflowRegion, StaggeredGrid};
use crate::io::{
    CONFIGURATION_FILE, FIGURES_PATH, OBSTACLES_FILE, POST_PROCESSING_PATH, PRESSURE_PATH,
    RESIDUALS_FILE, RESIDUALS_GRAPH_FILE, TIMINGS_FILE, VELOCITY_PATH,
};
use crate::obstacle::{write_obstacles, Obstacle};
use crate::plot::{render_figure, save_figure};
use crate::post::PostResult;
use crate::snapshot::{write_centered, write_staggered};
use crate::solver::{SolveInfo, SolveSettings};
use colored::*;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Writes everything a run produces below its `run_<ts>` directory.
pub struct RunWriter {
    pub run_path: PathBuf,
}

impl RunWriter {
    pub fn create(root: &Path, folder_name: &str) -> Result<Self> {
        let run_path = crate::io::create_run_directories(root, folder_name)?;
        Ok(Self { run_path })
    }

    pub fn write_configuration(&self, configuration: &Configuration) -> Result<()> {
        let path = self.run_path.join(CONFIGURATION_FILE);
        println!(
            "Writing the run configuration: {}.\n",
            path.display().to_string().yellow().bold()
        );
        let mut file = File::create(path)?;
        file.write_all(configuration.to_file_contents().as_bytes())?;
        Ok(())
    }

    /// The obstacles the run was built with; `post` rebuilds the cell types from them.
    pub fn write_obstacles(&self, obstacles: &[Obstacle]) -> Result<()> {
        write_obstacles(obstacles, self.run_path.join(OBSTACLES_FILE))
    }

    pub fn create_script_for_residuals_graph(&self, solve_settings: &SolveSettings) -> Result<()> {
        let path = self.run_path.join(RESIDUALS_GRAPH_FILE);
        let mut file = File::create(&path)?;
        println!(
            "Creating the residuals graph script file: {}.\n",
            path.display().to_string().yellow().bold()
        );
        writeln!(
            file,
            r#"set title "{case_name}"
    set ylabel "Pressure residual"
    set xlabel "Time step"
    set grid
    set logscale y
    set yrange [{min_tolerance}:]
    set ytics format "%L"
    set mxtics 5
    set terminal push
    set terminal pngcairo font "courier"
    set output "fig_{case_name_prefix}_residuals.png"
    plot "{residuals_file}" u 1:4 t "residual" w l,\
    "" u 1:5 t "tolerance" w l
    set terminal pdfcairo font "courier"
    set output "fig_{case_name_prefix}_residuals.pdf"
    replot
    set terminal pop
    set output"#,
            case_name = CASE_NAME,
            min_tolerance = solve_settings.abs_tol * 1e-3,
            case_name_prefix = CASE_NAME.replace(' ', "_").to_lowercase(),
            residuals_file = RESIDUALS_FILE,
        )?;
        Ok(())
    }

    pub fn print_step(
        &self,
        time_step: usize,
        time: &str,
        solve_info: &SolveInfo,
        duration: Duration,
        simulation_time: &Instant,
    ) {
        if time_step % 100 == 0 {
            let elapsed = simulation_time.elapsed().as_secs_f64();
            println!("\n{} {:.2} s.", "Elapsed time:".cyan().bold(), elapsed);
            println!(
                "\n{:>8} {:>10} {:>10} {:>16} {:>16}\n",
                "step".cyan().bold(),
                "time".cyan().bold(),
                "iterations".cyan().bold(),
                "residual".cyan().bold(),
                "step time (s)".cyan().bold()
            );
        }
        println!(
            "{:>8} {:>10} {:>10} {:>16.8e} {:>16.8e}",
            time_step,
            time,
            solve_info.iterations,
            solve_info.residual,
            duration.as_secs_f64()
        );
    }

    pub fn write_residuals(
        &self,
        time_step: usize,
        time: Float,
        solve_info: &SolveInfo,
    ) -> Result<()> {
        let path = self.run_path.join(RESIDUALS_FILE);
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if time_step == 0 {
            writeln!(
                file,
                "{:>8} {:>16} {:>16} {:>16} {:>16}",
                "step", "time", "iterations", "residual", "tolerance"
            )?;
        }
        writeln!(
            file,
            "{:>8} {:>16.8e} {:>16} {:>16.8e} {:>16.8e}",
            time_step, time, solve_info.iterations, solve_info.residual, solve_info.tolerance,
        )?;
        Ok(())
    }

    pub fn write_step_timing(
        &self,
        time_step: usize,
        elapsed_times: &[(&str, Duration)],
    ) -> Result<()> {
        crate::io::write_inside_loop_elapsed_time(
            self.run_path.join(TIMINGS_FILE),
            elapsed_times,
            time_step,
        )
    }

    pub fn figure_path(&self, time: &str) -> PathBuf {
        self.run_path
            .join(FIGURES_PATH)
            .join(format!("timestep_{time}.jpg"))
    }

    pub fn write_figure(
        &self,
        time: &str,
        velocity: &StaggeredGrid,
        pressure: &CenteredGrid,
        region: &InflowRegion,
        width: u32,
    ) -> Result<()> {
        let domain: &Domain = &velocity.domain;
        let image = render_figure(
            [&velocity.u, &velocity.v, &pressure.values],
            domain,
            region.lower(domain),
            region.upper(domain),
            width,
        );
        save_figure(&image, self.figure_path(time))
    }

    pub fn write_snapshots(
        &self,
        time: &str,
        velocity: &StaggeredGrid,
        pressure: &CenteredGrid,
    ) -> Result<()> {
        write_staggered(velocity, self.run_path.join(VELOCITY_PATH).join(time))?;
        write_centered(pressure, self.run_path.join(PRESSURE_PATH).join(time))?;
        Ok(())
    }

    /// Appends one row of `function(data)` to `post_processing/<file_name>`;
    /// the header row is written with step 0.
    pub fn write_post_processing<T, F>(
        &self,
        time_step: usize,
        data: &T,
        function: F,
        file_name: &str,
    ) -> Result<()>
    where
        T: ?Sized,
        F: Fn(&T) -> Vec<PostResult>,
    {
        let post_results = function(data);
        let path = self.run_path.join(POST_PROCESSING_PATH).join(file_name);
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if time_step == 0 {
            write!(file, "{:>8}", "step")?;
            for post_result in &post_results {
                write!(file, " {:>16}", post_result.name)?;
            }
            writeln!(file)?;
        }
        write!(file, "{:>8}", time_step)?;
        for post_result in &post_results {
            write!(file, " {:>16.8e}", post_result.value)?;
        }
        writeln!(file)?;
        Ok(())
    }
}
