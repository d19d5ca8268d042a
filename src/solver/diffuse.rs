use crate::error::{FlowError, Result};
use crate::global_variables::*;
use crate::grid::{Boundaries, Domain, Field, StaggeredGrid};

/// Smallest substep count keeping forward Euler stable:
/// `nu * dt_sub * (1/dx^2 + 1/dy^2) <= 1/2`.
pub fn required_substeps(domain: &Domain, viscosity: Float, dt: Float) -> usize {
    if viscosity == 0.0 || dt == 0.0 {
        return 0;
    }
    let inverse_spacing = 1.0 / (domain.dx * domain.dx) + 1.0 / (domain.dy * domain.dy);
    let bound = 2.0 * viscosity * dt * inverse_spacing;
    (bound.ceil() as usize).max(1)
}

pub fn explicit(
    field: &StaggeredGrid,
    viscosity: Float,
    dt: Float,
    max_substeps: usize,
) -> Result<StaggeredGrid> {
    let domain = field.domain;
    let substeps = required_substeps(&domain, viscosity, dt);
    if substeps > max_substeps {
        return Err(FlowError::DiffusionUnstable {
            required: substeps,
            max: max_substeps,
        });
    }
    let mut diffused = field.clone();
    if substeps == 0 {
        return Ok(diffused);
    }
    let sub_dt = dt / substeps as Float;
    let coefficients = [
        viscosity * sub_dt / (domain.dx * domain.dx),
        viscosity * sub_dt / (domain.dy * domain.dy),
    ];
    for _ in 0..substeps {
        diffused.u = laplacian_update(&diffused.u, &field.boundaries, coefficients);
        diffused.v = laplacian_update(&diffused.v, &field.boundaries, coefficients);
    }
    Ok(diffused)
}

fn laplacian_update(component: &Field, boundaries: &Boundaries, coefficients: [Float; 2]) -> Field {
    let [cx, cy] = coefficients;
    Field::from_fn(component.nx, component.ny, component.offset, |i, j| {
        let center = component.get(i, j);
        let (i, j) = (i as isize, j as isize);
        let west = component.get_extrapolated(i - 1, j, boundaries);
        let east = component.get_extrapolated(i + 1, j, boundaries);
        let south = component.get_extrapolated(i, j - 1, boundaries);
        let north = component.get_extrapolated(i, j + 1, boundaries);
        center + cx * (west - 2.0 * center + east) + cy * (south - 2.0 * center + north)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Extrapolation;
    use approx::assert_relative_eq;

    #[test]
    fn substeps_follow_stability_bound() {
        let domain = Domain::new(1.0, 1.0, 10, 10);
        assert_eq!(required_substeps(&domain, 0.0, 0.05), 0);
        assert_eq!(required_substeps(&domain, 1e-3, 0.05), 1);
        assert_eq!(required_substeps(&domain, 0.1, 0.57), 23);
    }

    #[test]
    fn unstable_configuration_is_rejected() {
        let domain = Domain::new(1.0, 1.0, 100, 100);
        let field = StaggeredGrid::zeros(domain, Boundaries::channel());
        let result = explicit(&field, 1.0, 1.0, MAX_DIFFUSION_SUBSTEPS);
        assert!(matches!(
            result,
            Err(FlowError::DiffusionUnstable { max: 10_000, .. })
        ));
    }

    #[test]
    fn constant_field_is_unchanged() {
        let domain = Domain::new(2.0, 2.0, 8, 8);
        let mut field = StaggeredGrid::zeros(domain, Boundaries::uniform(Extrapolation::Boundary));
        field.u.values.iter_mut().for_each(|value| *value = 2.0);
        let diffused = explicit(&field, 0.05, 0.1, MAX_DIFFUSION_SUBSTEPS).unwrap();
        for value in &diffused.u.values {
            assert_relative_eq!(*value, 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn spike_spreads_and_keeps_its_mass() {
        let domain = Domain::new(2.0, 2.0, 20, 20);
        let mut field = StaggeredGrid::zeros(domain, Boundaries::uniform(Extrapolation::Boundary));
        field.v.set(10, 10, 1.0);
        let diffused = explicit(&field, 0.01, 0.1, MAX_DIFFUSION_SUBSTEPS).unwrap();
        let peak = diffused.v.get(10, 10);
        assert!(peak < 1.0 && peak > 0.0);
        assert!(diffused.v.get(11, 10) > 0.0);
        assert!(diffused.v.get(10, 11) > 0.0);
        let mass: Float = diffused.v.values.iter().sum();
        assert_relative_eq!(mass, 1.0, epsilon = 1e-12);
    }
}
