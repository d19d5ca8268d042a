pub mod config;
pub mod error;
pub mod global_variables;
pub mod grid;
pub mod io;
pub mod obstacle;
pub mod plot;
pub mod post;
pub mod simulation;
pub mod snapshot;
pub mod solver;

pub use config::Configuration;
pub use error::{FlowError, Result};
pub use global_variables::*;
pub use simulation::Simulation;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CellType {
    Fluid = 0,
    Solid = 1,
}
