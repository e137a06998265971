use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Lock contention or a busy store; worth retrying.
    #[error("Store busy: {0}")]
    Busy(String),

    /// Transient connectivity/disk trouble; worth retrying.
    #[error("Store I/O error: {0}")]
    Io(String),

    /// Natural-key constraint violated; retrying cannot help.
    #[error("Unique constraint violated for key '{key}'")]
    UniqueViolation { key: String },

    /// An upsert referenced a surrogate id that no longer exists.
    #[error("Row with id {id} not found for update")]
    MissingRow { id: u64 },

    #[error("Row serialization failed: {0}")]
    Serialization(String),

    #[error("Store failure: {0}")]
    Internal(String),
}

impl StoreError {
    /// True for failures the chunk writer may retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Busy(_) | StoreError::Io(_))
    }

    /// True for record-level failures that skip without retry.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            StoreError::UniqueViolation { .. } | StoreError::MissingRow { .. }
        )
    }
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(e) => StoreError::Io(e.to_string()),
            other => StoreError::Internal(other.to_string()),
        }
    }
}
