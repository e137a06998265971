mod company;
mod customer;
pub mod mask;

pub use company::CompanyTransformer;
pub use customer::CustomerTransformer;

use async_trait::async_trait;
use connectors::store::StoreError;
use model::records::{SourceRecord, TargetRow};

/// Turns one validated source record into its target row.
///
/// In upsert mode the transformer resolves the record's natural key against
/// the target table and carries the matched row's surrogate id, so the
/// writer can update in place instead of inserting a duplicate.
#[async_trait]
pub trait RecordTransformer<S: SourceRecord, T: TargetRow>: Send + Sync {
    async fn transform(&self, record: &S) -> Result<T, StoreError>;
}

/// Trimmed field value, `None` when blank.
pub(crate) fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn status_is_active(status: &str) -> bool {
    status.trim().eq_ignore_ascii_case("ACTIVE")
}
