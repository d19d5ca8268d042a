use crate::global_variables::Float;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("missing required parameter: {0}")]
    MissingParameter(String),

    #[error("invalid value for parameter {name}: {value}")]
    InvalidParameter { name: String, value: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error(
        "pressure solve did not converge after {iterations} iterations \
         (residual {residual:.3e}, tolerance {tolerance:.3e})"
    )]
    NotConverged {
        iterations: usize,
        residual: Float,
        tolerance: Float,
    },

    #[error("explicit diffusion needs {required} substeps but at most {max} are allowed")]
    DiffusionUnstable { required: usize, max: usize },

    #[error("malformed snapshot: {0}")]
    MalformedSnapshot(String),
}

pub type Result<T> = std::result::Result<T, FlowError>;
