use std::io;

use thiserror::Error;

use crate::state::Compartment;

/// Provides `SimError` and maps other errors into it.
#[derive(Error, Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum SimError {
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("json error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    CsvError(#[from] csv::Error),
    /// Invalid parameters detected before a run starts. Never retried.
    #[error("configuration error: {0}")]
    ConfigurationError(String),
    /// A post-update count would have been negative on `day`. Only a sampler that draws more
    /// individuals than exist in a compartment can cause this.
    #[error("numeric guard violated on day {day}: {compartment} would be {value}")]
    NumericGuardViolation {
        day: u64,
        compartment: Compartment,
        value: i128,
    },
    #[error("simulation already reached its final day ({days})")]
    RunComplete { days: u64 },
    #[error("report error: {0}")]
    ReportError(String),
}

impl From<derive_builder::UninitializedFieldError> for SimError {
    fn from(error: derive_builder::UninitializedFieldError) -> Self {
        SimError::ConfigurationError(error.to_string())
    }
}
