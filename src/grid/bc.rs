use super::*;
use rayon::prelude::*;

pub const FACES: [BoundaryFace; 4] = [
    BoundaryFace::West,
    BoundaryFace::East,
    BoundaryFace::South,
    BoundaryFace::North,
];

/// Rule for values requested outside a domain edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extrapolation {
    /// Open edge: the nearest stored sample is repeated (zero gradient).
    Boundary,
    /// Closed edge: everything beyond it reads zero.
    Zero,
}

#[derive(Hash, Eq, PartialEq, Clone, Copy, Debug)]
pub enum BoundaryFace {
    East,
    West,
    North,
    South,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundaries {
    pub west: Extrapolation,
    pub east: Extrapolation,
    pub south: Extrapolation,
    pub north: Extrapolation,
}

impl Boundaries {
    pub fn uniform(extrapolation: Extrapolation) -> Self {
        Self {
            west: extrapolation,
            east: extrapolation,
            south: extrapolation,
            north: extrapolation,
        }
    }

    /// Open inlet and outlet along x, closed walls along y.
    pub fn channel() -> Self {
        Self {
            west: Extrapolation::Boundary,
            east: Extrapolation::Boundary,
            south: Extrapolation::Zero,
            north: Extrapolation::Zero,
        }
    }

    pub fn get(&self, boundary_face: BoundaryFace) -> Extrapolation {
        match boundary_face {
            BoundaryFace::West => self.west,
            BoundaryFace::East => self.east,
            BoundaryFace::South => self.south,
            BoundaryFace::North => self.north,
        }
    }

    pub fn is_open(&self, boundary_face: BoundaryFace) -> bool {
        self.get(boundary_face) == Extrapolation::Boundary
    }
}

impl StaggeredGrid {
    pub fn boundary_condition(&mut self) {
        for boundary_face in FACES {
            let extrapolation = self.boundaries.get(boundary_face);
            self.apply_boundary_condition(boundary_face, extrapolation);
        }
    }

    pub fn apply_boundary_condition(
        &mut self,
        boundary_face: BoundaryFace,
        extrapolation: Extrapolation,
    ) {
        match extrapolation {
            Extrapolation::Zero => self.no_slip(boundary_face),
            Extrapolation::Boundary => self.open(boundary_face),
        }
    }

    fn no_slip(&mut self, boundary_face: BoundaryFace) {
        match boundary_face {
            BoundaryFace::West | BoundaryFace::East => {
                let i = boundary_column(boundary_face, self.u.nx);
                let nx = self.u.nx;
                self.u
                    .values
                    .par_chunks_mut(nx)
                    .for_each(|row| row[i] = 0.0);
            }
            BoundaryFace::South | BoundaryFace::North => {
                let j = boundary_column(boundary_face, self.v.ny);
                let nx = self.v.nx;
                self.v.values[j * nx..(j + 1) * nx]
                    .iter_mut()
                    .for_each(|value| *value = 0.0);
            }
        }
    }

    fn open(&mut self, boundary_face: BoundaryFace) {
        match boundary_face {
            BoundaryFace::West | BoundaryFace::East => {
                let nx = self.u.nx;
                if nx < 2 {
                    return;
                }
                let (i, inner) = match boundary_face {
                    BoundaryFace::West => (0, 1),
                    _ => (nx - 1, nx - 2),
                };
                self.u
                    .values
                    .par_chunks_mut(nx)
                    .for_each(|row| row[i] = row[inner]);
            }
            BoundaryFace::South | BoundaryFace::North => {
                let (nx, ny) = (self.v.nx, self.v.ny);
                if ny < 2 {
                    return;
                }
                let (j, inner) = match boundary_face {
                    BoundaryFace::South => (0, 1),
                    _ => (ny - 1, ny - 2),
                };
                for i in 0..nx {
                    self.v.values[i + nx * j] = self.v.values[i + nx * inner];
                }
            }
        }
    }
}

fn boundary_column(boundary_face: BoundaryFace, n: usize) -> usize {
    match boundary_face {
        BoundaryFace::West | BoundaryFace::South => 0,
        BoundaryFace::East | BoundaryFace::North => n - 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_walls_zero_normal_velocity() {
        let domain = Domain::new(4.0, 2.0, 4, 2);
        let mut velocity = StaggeredGrid::zeros(domain, Boundaries::channel());
        velocity.u.values.iter_mut().for_each(|value| *value = 1.0);
        velocity.v.values.iter_mut().for_each(|value| *value = 1.0);
        velocity.u.set(1, 0, 3.0);
        velocity.boundary_condition();

        for i in 0..velocity.v.nx {
            assert_eq!(velocity.v.get(i, 0), 0.0);
            assert_eq!(velocity.v.get(i, velocity.v.ny - 1), 0.0);
            assert_eq!(velocity.v.get(i, 1), 1.0);
        }
        assert_eq!(velocity.u.get(0, 0), 3.0);
        assert_eq!(velocity.u.get(4, 1), 1.0);
    }

    #[test]
    fn closed_box_zeroes_all_boundary_faces() {
        let domain = Domain::new(3.0, 3.0, 3, 3);
        let mut velocity = StaggeredGrid::zeros(domain, Boundaries::uniform(Extrapolation::Zero));
        velocity.u.values.iter_mut().for_each(|value| *value = 2.0);
        velocity.boundary_condition();
        for j in 0..3 {
            assert_eq!(velocity.u.get(0, j), 0.0);
            assert_eq!(velocity.u.get(3, j), 0.0);
            assert_eq!(velocity.u.get(1, j), 2.0);
        }
    }
}
