pub mod vtk;

use crate::global_variables::*;

/// One column of a post-processing table: header name and this step's value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostResult {
    pub name: &'static str,
    pub value: Float,
}

impl PostResult {
    pub fn new(name: &'static str, value: Float) -> Self {
        Self { name, value }
    }
}
