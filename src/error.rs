use thiserror::Error;

use crate::validation::ValidationErrors;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failure conditions of the time-series power-flow pipeline.
///
/// Every variant is fatal for the run; nothing is retried or partially returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Active and reactive profiles differ in load IDs or timestamps (value or order).
    #[error("TwoProfilesDoesNotHaveMatchingTimestampsOrLoadIds")]
    ProfileMismatch,
    /// The static input dataset or the batch update failed structural validation.
    #[error("input validation failed: {0}")]
    SchemaInvalid(ValidationErrors),
    /// The solver failed for at least one timestep; the whole batch is discarded.
    #[error("power flow failed at timestep {timestep}: {reason}")]
    SolveFailure { timestep: usize, reason: String },
    /// Solver output does not line up with the time axis or changes its line set between timesteps.
    #[error("inconsistent power flow output: {0}")]
    OutputShape(String),
    /// A load-profile table is malformed (bad header, ragged row, unparsable value).
    #[error("malformed load profile: {0}")]
    Profile(String),
    #[error("invalid timestamp '{value}': {source}")]
    Timestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl From<ValidationErrors> for PipelineError {
    fn from(errors: ValidationErrors) -> Self {
        PipelineError::SchemaInvalid(errors)
    }
}
