pub mod bc;

pub use bc::{Boundaries, BoundaryFace, Extrapolation};

use crate::global_variables::*;
use rayon::prelude::*;

pub const D: usize = 2;

const CELL_CENTER: [Float; D] = [0.5, 0.5];

const X_FACE: [Float; D] = [0.0, 0.5];

const Y_FACE: [Float; D] = [0.5, 0.0];

/// Axis-aligned rectangle `[0, lx] x [0, ly]` split into `nx x ny` cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Domain {
    pub lx: Float,
    pub ly: Float,
    pub nx: usize,
    pub ny: usize,
    pub dx: Float,
    pub dy: Float,
}

impl Domain {
    pub fn new(lx: Float, ly: Float, nx: usize, ny: usize) -> Self {
        Self {
            lx,
            ly,
            nx,
            ny,
            dx: lx / nx as Float,
            dy: ly / ny as Float,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.nx * self.ny
    }

    pub fn cell_center(&self, i: usize, j: usize) -> [Float; D] {
        [
            (i as Float + 0.5) * self.dx,
            (j as Float + 0.5) * self.dy,
        ]
    }
}

/// One scalar quantity sampled on a regular lattice. `offset` is the position
/// of sample `(0, 0)` measured in cells.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub nx: usize,
    pub ny: usize,
    pub offset: [Float; D],
    pub values: Vec<Float>,
}

impl Field {
    pub fn zeros(nx: usize, ny: usize, offset: [Float; D]) -> Self {
        Self {
            nx,
            ny,
            offset,
            values: vec![0.0; nx * ny],
        }
    }

    pub fn from_fn<F>(nx: usize, ny: usize, offset: [Float; D], function: F) -> Self
    where
        F: Fn(usize, usize) -> Float + Sync + Send,
    {
        let values = (0..nx * ny)
            .into_par_iter()
            .map(|index| function(index % nx, index / nx))
            .collect();
        Self {
            nx,
            ny,
            offset,
            values,
        }
    }

    pub fn index(&self, i: usize, j: usize) -> usize {
        i + self.nx * j
    }

    pub fn get(&self, i: usize, j: usize) -> Float {
        self.values[self.index(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, value: Float) {
        let index = self.index(i, j);
        self.values[index] = value;
    }

    /// Value at a possibly out-of-range index, resolved by the edge rules.
    pub fn get_extrapolated(&self, i: isize, j: isize, boundaries: &Boundaries) -> Float {
        let i = match resolve_index(i, self.nx, boundaries.west, boundaries.east) {
            Some(i) => i,
            None => return 0.0,
        };
        let j = match resolve_index(j, self.ny, boundaries.south, boundaries.north) {
            Some(j) => j,
            None => return 0.0,
        };
        self.get(i, j)
    }

    pub fn position(&self, i: usize, j: usize, domain: &Domain) -> [Float; D] {
        [
            (i as Float + self.offset[0]) * domain.dx,
            (j as Float + self.offset[1]) * domain.dy,
        ]
    }

    /// Bilinear interpolation at a physical position.
    pub fn sample(&self, position: [Float; D], domain: &Domain, boundaries: &Boundaries) -> Float {
        let fi = position[0] / domain.dx - self.offset[0];
        let fj = position[1] / domain.dy - self.offset[1];
        let i0 = fi.floor();
        let j0 = fj.floor();
        let tx = fi - i0;
        let ty = fj - j0;
        let (i0, j0) = (i0 as isize, j0 as isize);
        let f00 = self.get_extrapolated(i0, j0, boundaries);
        let f10 = self.get_extrapolated(i0 + 1, j0, boundaries);
        let f01 = self.get_extrapolated(i0, j0 + 1, boundaries);
        let f11 = self.get_extrapolated(i0 + 1, j0 + 1, boundaries);
        (1.0 - ty) * ((1.0 - tx) * f00 + tx * f10) + ty * ((1.0 - tx) * f01 + tx * f11)
    }

    pub fn max_abs(&self) -> Float {
        self.values
            .par_iter()
            .map(|value| value.abs())
            .reduce(|| 0.0, Float::max)
    }

    pub fn scaled_add(&self, other: &Field, scale: Float) -> Field {
        let values = self
            .values
            .par_iter()
            .zip(other.values.par_iter())
            .map(|(a, b)| a + scale * b)
            .collect();
        Field {
            values,
            ..self.clone()
        }
    }
}

fn resolve_index(
    index: isize,
    n: usize,
    low: Extrapolation,
    high: Extrapolation,
) -> Option<usize> {
    if index < 0 {
        match low {
            Extrapolation::Boundary => Some(0),
            Extrapolation::Zero => None,
        }
    } else if index as usize >= n {
        match high {
            Extrapolation::Boundary => Some(n - 1),
            Extrapolation::Zero => None,
        }
    } else {
        Some(index as usize)
    }
}

/// Velocity on a MAC layout: `u` on x-faces, `v` on y-faces.
#[derive(Clone, Debug, PartialEq)]
pub struct StaggeredGrid {
    pub domain: Domain,
    pub boundaries: Boundaries,
    pub u: Field,
    pub v: Field,
}

impl StaggeredGrid {
    pub fn zeros(domain: Domain, boundaries: Boundaries) -> Self {
        Self {
            domain,
            boundaries,
            u: Field::zeros(domain.nx + 1, domain.ny, X_FACE),
            v: Field::zeros(domain.nx, domain.ny + 1, Y_FACE),
        }
    }

    /// Resamples a centered vector field onto the faces.
    pub fn from_centered(centered: &CenteredVectorGrid) -> Self {
        let domain = centered.domain;
        let boundaries = centered.boundaries;
        let u = Field::from_fn(domain.nx + 1, domain.ny, X_FACE, |i, j| {
            let (i, j) = (i as isize, j as isize);
            0.5 * (centered.x.get_extrapolated(i - 1, j, &boundaries)
                + centered.x.get_extrapolated(i, j, &boundaries))
        });
        let v = Field::from_fn(domain.nx, domain.ny + 1, Y_FACE, |i, j| {
            let (i, j) = (i as isize, j as isize);
            0.5 * (centered.y.get_extrapolated(i, j - 1, &boundaries)
                + centered.y.get_extrapolated(i, j, &boundaries))
        });
        Self {
            domain,
            boundaries,
            u,
            v,
        }
    }

    pub fn sample(&self, position: [Float; D]) -> [Float; D] {
        [
            self.u.sample(position, &self.domain, &self.boundaries),
            self.v.sample(position, &self.domain, &self.boundaries),
        ]
    }

    pub fn scaled_add(&self, other: &StaggeredGrid, scale: Float) -> StaggeredGrid {
        StaggeredGrid {
            domain: self.domain,
            boundaries: self.boundaries,
            u: self.u.scaled_add(&other.u, scale),
            v: self.v.scaled_add(&other.v, scale),
        }
    }

    pub fn max_abs(&self) -> Float {
        self.u.max_abs().max(self.v.max_abs())
    }

    /// Face values averaged to cell centers.
    pub fn at_centers(&self) -> CenteredVectorGrid {
        let domain = self.domain;
        let x = Field::from_fn(domain.nx, domain.ny, CELL_CENTER, |i, j| {
            0.5 * (self.u.get(i, j) + self.u.get(i + 1, j))
        });
        let y = Field::from_fn(domain.nx, domain.ny, CELL_CENTER, |i, j| {
            0.5 * (self.v.get(i, j) + self.v.get(i, j + 1))
        });
        CenteredVectorGrid {
            domain,
            boundaries: self.boundaries,
            x,
            y,
        }
    }

    /// Discrete divergence per cell, ignoring obstacles.
    pub fn divergence(&self) -> CenteredGrid {
        let domain = self.domain;
        let values = Field::from_fn(domain.nx, domain.ny, CELL_CENTER, |i, j| {
            (self.u.get(i + 1, j) - self.u.get(i, j)) / domain.dx
                + (self.v.get(i, j + 1) - self.v.get(i, j)) / domain.dy
        });
        CenteredGrid { domain, values }
    }
}

/// Scalar sampled at cell centers.
#[derive(Clone, Debug, PartialEq)]
pub struct CenteredGrid {
    pub domain: Domain,
    pub values: Field,
}

impl CenteredGrid {
    pub fn zeros(domain: Domain) -> Self {
        Self {
            domain,
            values: Field::zeros(domain.nx, domain.ny, CELL_CENTER),
        }
    }

    pub fn from_values(domain: Domain, values: Vec<Float>) -> Self {
        Self {
            domain,
            values: Field {
                nx: domain.nx,
                ny: domain.ny,
                offset: CELL_CENTER,
                values,
            },
        }
    }

    pub fn get(&self, i: usize, j: usize) -> Float {
        self.values.get(i, j)
    }

    pub fn max_abs(&self) -> Float {
        self.values.max_abs()
    }
}

/// Vector sampled at cell centers.
#[derive(Clone, Debug, PartialEq)]
pub struct CenteredVectorGrid {
    pub domain: Domain,
    pub boundaries: Boundaries,
    pub x: Field,
    pub y: Field,
}

impl CenteredVectorGrid {
    pub fn zeros(domain: Domain, boundaries: Boundaries) -> Self {
        Self {
            domain,
            boundaries,
            x: Field::zeros(domain.nx, domain.ny, CELL_CENTER),
            y: Field::zeros(domain.nx, domain.ny, CELL_CENTER),
        }
    }

    /// Unit horizontal vectors inside `region`, exact zeros elsewhere.
    pub fn inflow(domain: Domain, boundaries: Boundaries, region: &InflowRegion) -> Self {
        let x = Field::from_fn(domain.nx, domain.ny, CELL_CENTER, |i, j| {
            if region.contains(i, j) {
                1.0
            } else {
                0.0
            }
        });
        Self {
            domain,
            boundaries,
            x,
            y: Field::zeros(domain.nx, domain.ny, CELL_CENTER),
        }
    }

    pub fn magnitude(&self, i: usize, j: usize) -> Float {
        self.x.get(i, j).hypot(self.y.get(i, j))
    }
}

/// Cell ranges `[i_start, i_end) x [j_start, j_end)` of the inflow source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InflowRegion {
    pub i_start: usize,
    pub i_end: usize,
    pub j_start: usize,
    pub j_end: usize,
}

impl InflowRegion {
    pub fn new(domain: &Domain) -> Self {
        let i_start = INFLOW_OFFSET_CELLS.min(domain.nx);
        let i_end = (INFLOW_OFFSET_CELLS + INFLOW_WIDTH_CELLS).min(domain.nx);
        let j_start = INFLOW_BOTTOM_MARGIN_CELLS.min(domain.ny);
        let j_end = domain.ny.saturating_sub(INFLOW_TOP_MARGIN_CELLS).max(j_start);
        Self {
            i_start,
            i_end,
            j_start,
            j_end,
        }
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        (self.i_start..self.i_end).contains(&i) && (self.j_start..self.j_end).contains(&j)
    }

    pub fn is_empty(&self) -> bool {
        self.i_start >= self.i_end || self.j_start >= self.j_end
    }

    pub fn lower(&self, domain: &Domain) -> [Float; D] {
        [
            self.i_start as Float * domain.dx,
            self.j_start as Float * domain.dy,
        ]
    }

    pub fn upper(&self, domain: &Domain) -> [Float; D] {
        [self.i_end as Float * domain.dx, self.j_end as Float * domain.dy]
    }
}
