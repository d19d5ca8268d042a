pub mod io;
pub mod post;

use crate::config::Configuration;
use crate::error::Result;
use crate::global_variables::*;
use crate::grid::{
    Boundaries, CenteredGrid, CenteredVectorGrid, Domain, InflowRegion, StaggeredGrid,
};
use crate::io::{format_time, run_folder_name};
use crate::obstacle::{generate_swarm, CellMask, Obstacle};
use crate::solver::{FieldSolver, Projection, SolveInfo, SolveSettings, StaggeredSolver};
use chrono::Local;
use colored::*;
use self::io::RunWriter;
use self::post::StepFields;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything a run needs besides the evolving fields. Built once; the time
/// step reads it and never mutates it.
pub struct Simulation<S: FieldSolver = StaggeredSolver> {
    pub configuration: Configuration,
    pub domain: Domain,
    pub boundaries: Boundaries,
    pub obstacles: Vec<Obstacle>,
    pub mask: CellMask,
    pub inflow_region: InflowRegion,
    pub solve_settings: SolveSettings,
    pub max_diffusion_substeps: usize,
    pub figure_width: u32,
    pub solver: S,
}

pub struct StepOutput {
    pub velocity: StaggeredGrid,
    pub pressure: CenteredGrid,
    pub inflow: CenteredVectorGrid,
    pub solve_info: SolveInfo,
}

pub struct RunSummary {
    pub run_path: PathBuf,
    pub steps: usize,
    pub velocity: StaggeredGrid,
    pub pressure: CenteredGrid,
}

impl Simulation {
    /// Channel flow around the swarm described by `configuration`.
    pub fn new(configuration: Configuration) -> Result<Self> {
        let obstacles = generate_swarm(&configuration);
        Self::with_obstacles(configuration, obstacles, StaggeredSolver)
    }
}

impl<S: FieldSolver> Simulation<S> {
    pub fn with_obstacles(
        configuration: Configuration,
        obstacles: Vec<Obstacle>,
        solver: S,
    ) -> Result<Self> {
        configuration.validate()?;
        let domain = configuration.domain();
        let mask = CellMask::from_obstacles(&domain, &obstacles);
        Ok(Self {
            inflow_region: InflowRegion::new(&domain),
            configuration,
            domain,
            boundaries: Boundaries::channel(),
            obstacles,
            mask,
            solve_settings: SolveSettings::default(),
            max_diffusion_substeps: MAX_DIFFUSION_SUBSTEPS,
            figure_width: FIGURE_WIDTH,
            solver,
        })
    }

    pub fn inflow_field(&self) -> CenteredVectorGrid {
        CenteredVectorGrid::inflow(self.domain, self.boundaries, &self.inflow_region)
    }

    /// Projection of the resting fluid; gives the pressure of the initial state.
    pub fn initial_state(&self) -> Result<Projection> {
        let velocity = StaggeredGrid::zeros(self.domain, self.boundaries);
        self.solver
            .project(&velocity, &self.mask, &self.solve_settings)
    }

    /// Advects, injects the inflow, diffuses and projects, in that order.
    pub fn step(
        &self,
        velocity_prev: &StaggeredGrid,
        inflow: CenteredVectorGrid,
    ) -> Result<StepOutput> {
        let dt = self.configuration.dt;
        let advected = self.solver.advect(velocity_prev, velocity_prev, dt);
        let source = StaggeredGrid::from_centered(&inflow);
        let forced = advected.scaled_add(&source, self.configuration.inflow_amplitude);
        let diffused = self.solver.diffuse(
            &forced,
            self.configuration.viscosity,
            dt,
            self.max_diffusion_substeps,
        )?;
        let projection = self
            .solver
            .project(&diffused, &self.mask, &self.solve_settings)?;
        Ok(StepOutput {
            velocity: projection.velocity,
            pressure: projection.pressure,
            inflow,
            solve_info: projection.solve_info,
        })
    }

    /// Runs `total_time` steps and writes the run directory below `root`.
    pub fn run(&self, root: &Path) -> Result<RunSummary> {
        let writer = RunWriter::create(root, &run_folder_name(&Local::now()))?;
        writer.write_configuration(&self.configuration)?;
        writer.write_obstacles(&self.obstacles)?;
        writer.create_script_for_residuals_graph(&self.solve_settings)?;

        let initial = self.initial_state()?;
        writer.write_post_processing(0, &self.mask, post::compute_porosity, "porosity.dat")?;

        let mut velocity = initial.velocity;
        let mut pressure = initial.pressure;
        let mut inflow = self.inflow_field();
        let total_time = self.configuration.total_time;
        println!(
            "Running {} steps of {} on a {}x{} grid with {} obstacles.\n",
            total_time.to_string().yellow().bold(),
            CASE_NAME.yellow().bold(),
            self.domain.nx,
            self.domain.ny,
            self.obstacles.len()
        );

        let simulation_time = Instant::now();
        for time_step in 0..total_time {
            let time = time_step as Float * self.configuration.dt;
            let time_label = format_time(time);

            let now = Instant::now();
            let output = self.step(&velocity, inflow)?;
            let step_duration = now.elapsed();
            writer.print_step(
                time_step,
                &time_label,
                &output.solve_info,
                step_duration,
                &simulation_time,
            );
            writer.write_residuals(time_step, time, &output.solve_info)?;

            let now = Instant::now();
            writer.write_figure(
                &time_label,
                &output.velocity,
                &output.pressure,
                &self.inflow_region,
                self.figure_width,
            )?;
            let figure_duration = now.elapsed();

            let now = Instant::now();
            writer.write_snapshots(&time_label, &output.velocity, &output.pressure)?;
            let snapshot_duration = now.elapsed();

            writer.write_step_timing(
                time_step,
                &[
                    ("step", step_duration),
                    ("figure", figure_duration),
                    ("snapshots", snapshot_duration),
                ],
            )?;

            let fields = StepFields {
                velocity: &output.velocity,
                pressure: &output.pressure,
                mask: &self.mask,
            };
            writer.write_post_processing(
                time_step,
                &fields,
                post::compute_mean_velocities,
                "mean_velocities.dat",
            )?;
            writer.write_post_processing(
                time_step,
                &fields,
                post::compute_max_velocity,
                "max_velocity.dat",
            )?;
            writer.write_post_processing(
                time_step,
                &fields,
                post::compute_max_divergence,
                "max_divergence.dat",
            )?;
            writer.write_post_processing(
                time_step,
                &fields,
                post::compute_mean_pressures_x,
                "mean_pressures_x.dat",
            )?;

            velocity = output.velocity;
            pressure = output.pressure;
            inflow = output.inflow;
        }
        println!(
            "\n{} {:.2} s.",
            "Total elapsed time:".cyan().bold(),
            simulation_time.elapsed().as_secs_f64()
        );
        Ok(RunSummary {
            run_path: writer.run_path,
            steps: total_time,
            velocity,
            pressure,
        })
    }
}
