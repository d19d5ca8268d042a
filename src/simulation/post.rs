use crate::global_variables::*;
use crate::grid::{CenteredGrid, StaggeredGrid};
use crate::obstacle::CellMask;
use crate::post::PostResult;
use crate::solver::project::divergence;
use rayon::prelude::*;

/// Fields of one finished time step handed to the post-processing functions.
pub struct StepFields<'a> {
    pub velocity: &'a StaggeredGrid,
    pub pressure: &'a CenteredGrid,
    pub mask: &'a CellMask,
}

fn fluid_velocities(fields: &StepFields) -> Vec<(Float, Float)> {
    let centered = fields.velocity.at_centers();
    let nx = centered.domain.nx;
    (0..centered.domain.cell_count())
        .into_par_iter()
        .filter(|&index| fields.mask.is_fluid(index % nx, index / nx))
        .map(|index| (centered.x.values[index], centered.y.values[index]))
        .collect()
}

pub fn compute_mean_velocities(fields: &StepFields) -> Vec<PostResult> {
    let velocities = fluid_velocities(fields);
    let number_of_fluid_cells = velocities.len().max(1) as Float;
    let ux_sum = velocities.par_iter().map(|velocity| velocity.0).sum::<Float>();
    let uy_sum = velocities.par_iter().map(|velocity| velocity.1).sum::<Float>();
    let u_sum = velocities
        .par_iter()
        .map(|velocity| velocity.0.hypot(velocity.1))
        .sum::<Float>();
    vec![
        PostResult::new("mean_velocity", u_sum / number_of_fluid_cells),
        PostResult::new("mean_velocity_x", ux_sum / number_of_fluid_cells),
        PostResult::new("mean_velocity_y", uy_sum / number_of_fluid_cells),
    ]
}

pub fn compute_max_velocity(fields: &StepFields) -> Vec<PostResult> {
    let max_velocity = fluid_velocities(fields)
        .par_iter()
        .map(|velocity| velocity.0.hypot(velocity.1))
        .reduce_with(|a, b| a.max(b))
        .unwrap_or(0.0);
    vec![PostResult::new("max_velocity", max_velocity)]
}

pub fn compute_max_divergence(fields: &StepFields) -> Vec<PostResult> {
    let max_divergence = divergence(fields.velocity, fields.mask).max_abs();
    vec![PostResult::new("max_divergence", max_divergence)]
}

pub fn compute_mean_pressures_x(fields: &StepFields) -> Vec<PostResult> {
    let nx = fields.pressure.domain.nx;
    let column_mean = |i: usize| {
        let (sum, count) = (0..fields.pressure.domain.ny)
            .filter(|&j| fields.mask.is_fluid(i, j))
            .fold((0.0, 0usize), |(sum, count), j| {
                (sum + fields.pressure.get(i, j), count + 1)
            });
        if count == 0 {
            0.0
        } else {
            sum / count as Float
        }
    };
    let pressure_inlet_mean = column_mean(0);
    let pressure_outlet_mean = column_mean(nx - 1);
    vec![
        PostResult::new("pressure_inlet", pressure_inlet_mean),
        PostResult::new("pressure_outlet", pressure_outlet_mean),
        PostResult::new("pressure_drop", pressure_inlet_mean - pressure_outlet_mean),
    ]
}

pub fn compute_porosity(mask: &CellMask) -> Vec<PostResult> {
    let number_of_solid_cells = mask.number_of_solid_cells() as Float;
    let number_of_fluid_cells = mask.number_of_fluid_cells() as Float;
    let porosity = number_of_fluid_cells / (number_of_fluid_cells + number_of_solid_cells);
    vec![
        PostResult::new("n_solid_cells", number_of_solid_cells),
        PostResult::new("n_fluid_cells", number_of_fluid_cells),
        PostResult::new("porosity", porosity),
    ]
}
