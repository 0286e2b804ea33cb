//! Error taxonomy for the order/chaos pipeline.
//!
//! Numerical instability is deliberately absent: it is recorded on the
//! trajectory and coerced by the classifier, never raised.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DynamicsError {
    #[error(
        "No accessible region at E = {energy}: accepted {accepted}/{requested} positions after {attempts} draws"
    )]
    SamplingExhausted {
        energy: f64,
        requested: usize,
        accepted: usize,
        attempts: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed data in {path}: {message}")]
    MalformedData { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DynamicsResult<T> = Result<T, DynamicsError>;
