mod error;
mod memory;
mod sled_table;

pub use error::StoreError;
pub use memory::MemoryTable;
pub use sled_table::SledTable;

use async_trait::async_trait;
use model::{params::WriteMode, records::TargetRow};

/// Natural-keyed table in the target store.
///
/// The chunk is the transaction boundary: `write_chunk` applies every row or
/// none. Under `WriteMode::Upsert`, rows carrying a surrogate id update the
/// existing row in place; rows without one are inserted. Under
/// `WriteMode::Append` every row is inserted as new — natural-key duplicates
/// are possible by design there.
#[async_trait]
pub trait TargetTable<R: TargetRow>: Send + Sync {
    /// Looks up a row by its natural business key.
    ///
    /// When duplicates exist (append-mode history), the most recently
    /// written row wins.
    async fn find_by_key(&self, key: &str) -> Result<Option<R>, StoreError>;

    /// Writes one chunk atomically.
    async fn write_chunk(&self, rows: &[R], mode: WriteMode) -> Result<(), StoreError>;

    async fn count(&self) -> Result<u64, StoreError>;
}
