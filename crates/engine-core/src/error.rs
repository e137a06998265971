use crate::retry::RetryDisposition;
use connectors::{store::StoreError, tsv::TsvError};
use model::validation::ValidationError;
use thiserror::Error;
use uuid::Uuid;

/// Failure classification the step's fault-tolerance logic switches on.
///
/// This replaces exception-hierarchy dispatch with an explicit value: every
/// error the chunk loop can see maps to exactly one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Record-level rule violation. Always a skip, never retried.
    Validation,
    /// Transient infrastructure trouble. Retried up to the retry limit,
    /// then reclassified as a skip.
    Transient,
    /// Permanent record-level write failure. Immediate skip, no retry.
    Permanent,
    /// Anything else. Step-fatal, so unknown failure modes are not masked.
    Fatal,
}

#[derive(Error, Debug)]
pub enum StepError {
    #[error("{0}")]
    Validation(ValidationError),

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Source stream failed: {0}")]
    Source(#[from] TsvError),

    #[error("Skip limit exceeded: {skips} skips over limit {limit}")]
    SkipLimitExceeded { skips: u64, limit: u64 },

    #[error("Unexpected error: {0}")]
    Unclassified(String),
}

impl StepError {
    pub fn classify(&self) -> ErrorClass {
        match self {
            StepError::Validation(_) => ErrorClass::Validation,
            StepError::Store(e) if e.is_transient() => ErrorClass::Transient,
            StepError::Store(e) if e.is_permanent() => ErrorClass::Permanent,
            StepError::Store(_) => ErrorClass::Fatal,
            StepError::Source(_) => ErrorClass::Fatal,
            StepError::SkipLimitExceeded { .. } => ErrorClass::Fatal,
            StepError::Unclassified(_) => ErrorClass::Fatal,
        }
    }
}

/// Classifier for the chunk-write retry loop.
pub fn classify_store_error(err: &StoreError) -> RetryDisposition {
    if err.is_transient() {
        RetryDisposition::Retry
    } else {
        RetryDisposition::Stop
    }
}

/// A run could not start because another run of the same job is active.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Job '{job_name}' already has an active run {existing_run_id} ({status})")]
pub struct ConcurrencyConflict {
    pub job_name: String,
    pub existing_run_id: Uuid,
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_classify_by_transience() {
        let busy = StepError::Store(StoreError::Busy("locked".into()));
        assert_eq!(busy.classify(), ErrorClass::Transient);

        let unique = StepError::Store(StoreError::UniqueViolation { key: "C1".into() });
        assert_eq!(unique.classify(), ErrorClass::Permanent);

        let internal = StepError::Store(StoreError::Internal("corrupt".into()));
        assert_eq!(internal.classify(), ErrorClass::Fatal);
    }

    #[test]
    fn validation_is_never_retryable() {
        let err = StepError::Validation(ValidationError::new("C1", vec!["bad email".into()]));
        assert_eq!(err.classify(), ErrorClass::Validation);
    }

    #[test]
    fn unknown_errors_are_fatal() {
        let err = StepError::Unclassified("surprise".into());
        assert_eq!(err.classify(), ErrorClass::Fatal);
    }
}
