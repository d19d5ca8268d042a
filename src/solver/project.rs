use super::{Projection, SolveInfo, SolveSettings};
use crate::error::{FlowError, Result};
use crate::global_variables::*;
use crate::grid::{Boundaries, BoundaryFace, CenteredGrid, Domain, StaggeredGrid};
use crate::obstacle::CellMask;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaceKind {
    /// Both neighbouring cells are fluid.
    Interior,
    /// Fluid on one side, an open domain edge (zero pressure) on the other.
    Open,
    /// Touches a solid cell or a closed edge; the normal velocity is zero.
    Closed,
}

/// Kind of x-face `i` in row `j`, between cells `(i - 1, j)` and `(i, j)`.
pub fn x_face_kind(i: usize, j: usize, mask: &CellMask, boundaries: &Boundaries) -> FaceKind {
    let low = (i > 0).then(|| mask.is_fluid(i - 1, j));
    let high = (i < mask.nx).then(|| mask.is_fluid(i, j));
    face_kind(low, high, boundaries, BoundaryFace::West, BoundaryFace::East)
}

/// Kind of y-face `j` in column `i`, between cells `(i, j - 1)` and `(i, j)`.
pub fn y_face_kind(i: usize, j: usize, mask: &CellMask, boundaries: &Boundaries) -> FaceKind {
    let low = (j > 0).then(|| mask.is_fluid(i, j - 1));
    let high = (j < mask.ny).then(|| mask.is_fluid(i, j));
    face_kind(low, high, boundaries, BoundaryFace::South, BoundaryFace::North)
}

fn face_kind(
    low: Option<bool>,
    high: Option<bool>,
    boundaries: &Boundaries,
    low_face: BoundaryFace,
    high_face: BoundaryFace,
) -> FaceKind {
    match (low, high) {
        (Some(true), Some(true)) => FaceKind::Interior,
        (None, Some(true)) if boundaries.is_open(low_face) => FaceKind::Open,
        (Some(true), None) if boundaries.is_open(high_face) => FaceKind::Open,
        _ => FaceKind::Closed,
    }
}

/// Discrete divergence in fluid cells; zero inside obstacles.
pub fn divergence(velocity: &StaggeredGrid, mask: &CellMask) -> CenteredGrid {
    let domain = velocity.domain;
    let nx = domain.nx;
    let values = (0..domain.cell_count())
        .into_par_iter()
        .map(|index| {
            let (i, j) = (index % nx, index / nx);
            if !mask.is_fluid(i, j) {
                return 0.0;
            }
            (velocity.u.get(i + 1, j) - velocity.u.get(i, j)) / domain.dx
                + (velocity.v.get(i, j + 1) - velocity.v.get(i, j)) / domain.dy
        })
        .collect();
    CenteredGrid::from_values(domain, values)
}

/// Negative Laplacian over the fluid cells, stored as a diagonal plus the
/// couplings to the `+x` and `+y` neighbours. Solid cells get an identity row.
pub struct PressureMatrix {
    pub nx: usize,
    pub ny: usize,
    pub diag: Vec<Float>,
    pub plus_x: Vec<Float>,
    pub plus_y: Vec<Float>,
}

impl PressureMatrix {
    pub fn build(domain: &Domain, mask: &CellMask, boundaries: &Boundaries) -> Self {
        let (nx, ny) = (domain.nx, domain.ny);
        let scale_x = 1.0 / (domain.dx * domain.dx);
        let scale_y = 1.0 / (domain.dy * domain.dy);
        let mut diag = vec![0.0; nx * ny];
        let mut plus_x = vec![0.0; nx * ny];
        let mut plus_y = vec![0.0; nx * ny];
        for j in 0..ny {
            for i in 0..nx {
                let index = i + nx * j;
                if !mask.is_fluid(i, j) {
                    diag[index] = 1.0;
                    continue;
                }
                let faces = [
                    (x_face_kind(i, j, mask, boundaries), scale_x),
                    (x_face_kind(i + 1, j, mask, boundaries), scale_x),
                    (y_face_kind(i, j, mask, boundaries), scale_y),
                    (y_face_kind(i, j + 1, mask, boundaries), scale_y),
                ];
                for (kind, scale) in faces {
                    if kind != FaceKind::Closed {
                        diag[index] += scale;
                    }
                }
                if faces[1].0 == FaceKind::Interior {
                    plus_x[index] = scale_x;
                }
                if faces[3].0 == FaceKind::Interior {
                    plus_y[index] = scale_y;
                }
                if diag[index] == 0.0 {
                    diag[index] = 1.0;
                }
            }
        }
        Self {
            nx,
            ny,
            diag,
            plus_x,
            plus_y,
        }
    }

    pub fn apply(&self, p: &[Float], out: &mut [Float]) {
        let (nx, ny) = (self.nx, self.ny);
        out.par_iter_mut().enumerate().for_each(|(index, value)| {
            let (i, j) = (index % nx, index / nx);
            let mut sum = self.diag[index] * p[index];
            if i + 1 < nx {
                sum -= self.plus_x[index] * p[index + 1];
            }
            if i > 0 {
                sum -= self.plus_x[index - 1] * p[index - 1];
            }
            if j + 1 < ny {
                sum -= self.plus_y[index] * p[index + nx];
            }
            if j > 0 {
                sum -= self.plus_y[index - nx] * p[index - nx];
            }
            *value = sum;
        });
    }
}

/// Jacobi-preconditioned conjugate gradient for `matrix * x = rhs`.
pub fn conjugate_gradient(
    matrix: &PressureMatrix,
    rhs: &[Float],
    settings: &SolveSettings,
) -> (Vec<Float>, SolveInfo) {
    let n = rhs.len();
    let mut x = vec![0.0; n];
    let mut residual = rhs.to_vec();
    let tolerance = settings.tolerance(max_abs(rhs));
    let mut residual_norm = max_abs(&residual);
    if residual_norm <= tolerance {
        return (x, solve_info(0, residual_norm, tolerance, true));
    }
    let mut auxiliary = precondition(matrix, &residual);
    let mut search = auxiliary.clone();
    let mut product = vec![0.0; n];
    let mut sigma = dot(&residual, &auxiliary);
    for iteration in 1..=settings.max_iterations {
        matrix.apply(&search, &mut product);
        let curvature = dot(&search, &product);
        if curvature <= 0.0 {
            return (x, solve_info(iteration, residual_norm, tolerance, false));
        }
        let alpha = sigma / curvature;
        x.par_iter_mut()
            .zip(search.par_iter())
            .for_each(|(x, s)| *x += alpha * s);
        residual
            .par_iter_mut()
            .zip(product.par_iter())
            .for_each(|(r, q)| *r -= alpha * q);
        residual_norm = max_abs(&residual);
        if residual_norm <= tolerance {
            return (x, solve_info(iteration, residual_norm, tolerance, true));
        }
        auxiliary = precondition(matrix, &residual);
        let sigma_new = dot(&residual, &auxiliary);
        let beta = sigma_new / sigma;
        sigma = sigma_new;
        search
            .par_iter_mut()
            .zip(auxiliary.par_iter())
            .for_each(|(s, z)| *s = z + beta * *s);
    }
    (
        x,
        solve_info(settings.max_iterations, residual_norm, tolerance, false),
    )
}

fn solve_info(iterations: usize, residual: Float, tolerance: Float, converged: bool) -> SolveInfo {
    SolveInfo {
        iterations,
        residual,
        tolerance,
        converged,
    }
}

fn precondition(matrix: &PressureMatrix, residual: &[Float]) -> Vec<Float> {
    residual
        .par_iter()
        .zip(matrix.diag.par_iter())
        .map(|(r, d)| r / d)
        .collect()
}

fn dot(a: &[Float], b: &[Float]) -> Float {
    a.par_iter().zip(b.par_iter()).map(|(a, b)| a * b).sum()
}

fn max_abs(values: &[Float]) -> Float {
    values
        .par_iter()
        .map(|value| value.abs())
        .reduce(|| 0.0, Float::max)
}

/// Removes the divergence of `velocity` by subtracting a pressure gradient,
/// with obstacles and closed edges as no-penetration boundaries.
pub fn make_incompressible(
    velocity: &StaggeredGrid,
    mask: &CellMask,
    settings: &SolveSettings,
) -> Result<Projection> {
    let domain = velocity.domain;
    let boundaries = velocity.boundaries;
    let mut velocity = velocity.clone();
    velocity.boundary_condition();
    close_faces(&mut velocity, mask);

    let rhs: Vec<Float> = divergence(&velocity, mask)
        .values
        .values
        .par_iter()
        .map(|value| -value)
        .collect();
    let matrix = PressureMatrix::build(&domain, mask, &boundaries);
    let (pressure, solve_info) = conjugate_gradient(&matrix, &rhs, settings);
    if !solve_info.converged {
        return Err(FlowError::NotConverged {
            iterations: solve_info.iterations,
            residual: solve_info.residual,
            tolerance: solve_info.tolerance,
        });
    }
    let pressure = CenteredGrid::from_values(domain, pressure);
    apply_pressure_gradient(&mut velocity, &pressure, mask);
    Ok(Projection {
        velocity,
        pressure,
        solve_info,
    })
}

fn close_faces(velocity: &mut StaggeredGrid, mask: &CellMask) {
    let boundaries = velocity.boundaries;
    let (u_nx, v_nx) = (velocity.u.nx, velocity.v.nx);
    velocity
        .u
        .values
        .par_chunks_mut(u_nx)
        .enumerate()
        .for_each(|(j, row)| {
            for (i, value) in row.iter_mut().enumerate() {
                if x_face_kind(i, j, mask, &boundaries) == FaceKind::Closed {
                    *value = 0.0;
                }
            }
        });
    velocity
        .v
        .values
        .par_chunks_mut(v_nx)
        .enumerate()
        .for_each(|(j, row)| {
            for (i, value) in row.iter_mut().enumerate() {
                if y_face_kind(i, j, mask, &boundaries) == FaceKind::Closed {
                    *value = 0.0;
                }
            }
        });
}

fn apply_pressure_gradient(velocity: &mut StaggeredGrid, pressure: &CenteredGrid, mask: &CellMask) {
    let domain = velocity.domain;
    let boundaries = velocity.boundaries;
    let (nx, ny) = (domain.nx, domain.ny);
    let pressure_or_zero = |i: usize, j: usize, inside: bool| {
        if inside {
            pressure.get(i, j)
        } else {
            0.0
        }
    };
    velocity
        .u
        .values
        .par_chunks_mut(nx + 1)
        .enumerate()
        .for_each(|(j, row)| {
            for (i, value) in row.iter_mut().enumerate() {
                if x_face_kind(i, j, mask, &boundaries) == FaceKind::Closed {
                    continue;
                }
                let low = if i > 0 { pressure_or_zero(i - 1, j, true) } else { 0.0 };
                let high = pressure_or_zero(i.min(nx - 1), j, i < nx);
                *value -= (high - low) / domain.dx;
            }
        });
    velocity
        .v
        .values
        .par_chunks_mut(nx)
        .enumerate()
        .for_each(|(j, row)| {
            for (i, value) in row.iter_mut().enumerate() {
                if y_face_kind(i, j, mask, &boundaries) == FaceKind::Closed {
                    continue;
                }
                let low = if j > 0 { pressure_or_zero(i, j - 1, true) } else { 0.0 };
                let high = pressure_or_zero(i, j.min(ny - 1), j < ny);
                *value -= (high - low) / domain.dy;
            }
        });
}
