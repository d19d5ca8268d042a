pub mod advect;
pub mod diffuse;
pub mod project;

use crate::error::Result;
use crate::global_variables::*;
use crate::grid::{CenteredGrid, StaggeredGrid};
use crate::obstacle::CellMask;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveSettings {
    pub rel_tol: Float,
    pub abs_tol: Float,
    pub max_iterations: usize,
}

impl Default for SolveSettings {
    fn default() -> Self {
        Self {
            rel_tol: SOLVE_REL_TOL,
            abs_tol: SOLVE_ABS_TOL,
            max_iterations: SOLVE_MAX_ITER,
        }
    }
}

impl SolveSettings {
    /// Max-norm residual below which the solve counts as converged.
    pub fn tolerance(&self, rhs_norm: Float) -> Float {
        self.abs_tol.max(self.rel_tol * rhs_norm)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveInfo {
    pub iterations: usize,
    pub residual: Float,
    pub tolerance: Float,
    pub converged: bool,
}

pub struct Projection {
    pub velocity: StaggeredGrid,
    pub pressure: CenteredGrid,
    pub solve_info: SolveInfo,
}

/// Numerical operators the time step is composed of.
pub trait FieldSolver {
    fn advect(&self, field: &StaggeredGrid, velocity: &StaggeredGrid, dt: Float) -> StaggeredGrid;

    fn diffuse(
        &self,
        field: &StaggeredGrid,
        viscosity: Float,
        dt: Float,
        max_substeps: usize,
    ) -> Result<StaggeredGrid>;

    fn project(
        &self,
        velocity: &StaggeredGrid,
        mask: &CellMask,
        settings: &SolveSettings,
    ) -> Result<Projection>;
}

/// MAC-grid operators: semi-Lagrangian advection, explicit diffusion and a
/// conjugate-gradient pressure projection.
#[derive(Clone, Copy, Debug, Default)]
pub struct StaggeredSolver;

impl FieldSolver for StaggeredSolver {
    fn advect(&self, field: &StaggeredGrid, velocity: &StaggeredGrid, dt: Float) -> StaggeredGrid {
        advect::semi_lagrangian(field, velocity, dt)
    }

    fn diffuse(
        &self,
        field: &StaggeredGrid,
        viscosity: Float,
        dt: Float,
        max_substeps: usize,
    ) -> Result<StaggeredGrid> {
        diffuse::explicit(field, viscosity, dt, max_substeps)
    }

    fn project(
        &self,
        velocity: &StaggeredGrid,
        mask: &CellMask,
        settings: &SolveSettings,
    ) -> Result<Projection> {
        project::make_incompressible(velocity, mask, settings)
    }
}
