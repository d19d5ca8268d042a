use crate::global_variables::*;
use crate::grid::{Field, StaggeredGrid};

/// First-order semi-Lagrangian transport of `field` by `velocity`: every face
/// sample is traced back over `dt` and the field is interpolated there.
pub fn semi_lagrangian(
    field: &StaggeredGrid,
    velocity: &StaggeredGrid,
    dt: Float,
) -> StaggeredGrid {
    StaggeredGrid {
        domain: field.domain,
        boundaries: field.boundaries,
        u: trace_back(&field.u, field, velocity, dt),
        v: trace_back(&field.v, field, velocity, dt),
    }
}

fn trace_back(
    component: &Field,
    field: &StaggeredGrid,
    velocity: &StaggeredGrid,
    dt: Float,
) -> Field {
    let domain = &field.domain;
    Field::from_fn(component.nx, component.ny, component.offset, |i, j| {
        let position = component.position(i, j, domain);
        let [vx, vy] = velocity.sample(position);
        let departure = [position[0] - dt * vx, position[1] - dt * vy];
        component.sample(departure, domain, &field.boundaries)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Boundaries, Domain, Extrapolation};
    use approx::assert_relative_eq;

    #[test]
    fn zero_velocity_leaves_field_unchanged() {
        let domain = Domain::new(2.0, 1.0, 8, 4);
        let mut field = StaggeredGrid::zeros(domain, Boundaries::channel());
        for (k, value) in field.u.values.iter_mut().enumerate() {
            *value = (k as Float * 0.37).sin();
        }
        let velocity = StaggeredGrid::zeros(domain, Boundaries::channel());
        let advected = semi_lagrangian(&field, &velocity, 0.1);
        for (a, b) in advected.u.values.iter().zip(field.u.values.iter()) {
            assert_relative_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn uniform_flow_is_preserved() {
        let domain = Domain::new(4.0, 2.0, 16, 8);
        let mut velocity =
            StaggeredGrid::zeros(domain, Boundaries::uniform(Extrapolation::Boundary));
        velocity.u.values.iter_mut().for_each(|value| *value = 1.5);
        let advected = semi_lagrangian(&velocity, &velocity, 0.05);
        for value in &advected.u.values {
            assert_relative_eq!(*value, 1.5, epsilon = 1e-12);
        }
        assert_relative_eq!(advected.v.max_abs(), 0.0);
    }

    #[test]
    fn scalar_profile_moves_downstream() {
        let domain = Domain::new(8.0, 2.0, 8, 2);
        let boundaries = Boundaries::uniform(Extrapolation::Boundary);
        let mut velocity = StaggeredGrid::zeros(domain, boundaries);
        velocity.u.values.iter_mut().for_each(|value| *value = 1.0);
        let mut field = StaggeredGrid::zeros(domain, boundaries);
        for j in 0..field.v.ny {
            for i in 0..field.v.nx {
                field.v.set(i, j, i as Float);
            }
        }
        let advected = semi_lagrangian(&field, &velocity, 0.5);
        for i in 1..field.v.nx {
            assert_relative_eq!(advected.v.get(i, 1), i as Float - 0.5, epsilon = 1e-12);
        }
    }
}
