use connectors::tsv::TsvError;
use engine_core::error::ConcurrencyConflict;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error(transparent)]
    Conflict(#[from] ConcurrencyConflict),

    #[error("No run found with id {0}")]
    RunNotFound(Uuid),

    #[error("Run {0} is not active")]
    RunNotActive(Uuid),

    #[error("Source file check failed: {0}")]
    Source(#[from] TsvError),

    #[error("Report output failed: {0}")]
    Report(#[from] csv::Error),
}
