use crate::store::{StoreError, TargetTable};
use async_trait::async_trait;
use model::{params::WriteMode, records::TargetRow};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner<R> {
    next_id: u64,
    rows: Vec<R>,
}

/// In-memory natural-keyed table. Backs tests and dry work; the semantics
/// (surrogate ids, atomic chunks, last-write-wins key lookup) match the
/// persistent table.
#[derive(Clone)]
pub struct MemoryTable<R> {
    inner: Arc<Mutex<Inner<R>>>,
}

impl<R: TargetRow> MemoryTable<R> {
    pub fn new() -> Self {
        MemoryTable {
            inner: Arc::new(Mutex::new(Inner {
                next_id: 1,
                rows: Vec::new(),
            })),
        }
    }

    /// Snapshot of all rows, in insertion order. Test support.
    pub async fn rows(&self) -> Vec<R> {
        self.inner.lock().await.rows.clone()
    }
}

impl<R: TargetRow> Default for MemoryTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: TargetRow> TargetTable<R> for MemoryTable<R> {
    async fn find_by_key(&self, key: &str) -> Result<Option<R>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .rows
            .iter()
            .rev()
            .find(|r| r.natural_key() == key)
            .cloned())
    }

    async fn write_chunk(&self, rows: &[R], mode: WriteMode) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;

        // Stage against a copy so a mid-chunk failure leaves nothing behind.
        let mut staged = inner.rows.clone();
        let mut next_id = inner.next_id;

        for row in rows {
            match (mode, row.surrogate_id()) {
                (WriteMode::Upsert, Some(id)) => {
                    let slot = staged
                        .iter_mut()
                        .find(|r| r.surrogate_id() == Some(id))
                        .ok_or(StoreError::MissingRow { id })?;
                    *slot = row.clone();
                }
                (WriteMode::Upsert, None) => {
                    if staged.iter().any(|r| r.natural_key() == row.natural_key()) {
                        return Err(StoreError::UniqueViolation {
                            key: row.natural_key().to_string(),
                        });
                    }
                    let mut row = row.clone();
                    row.set_surrogate_id(next_id);
                    next_id += 1;
                    staged.push(row);
                }
                (WriteMode::Append, _) => {
                    let mut row = row.clone();
                    row.set_surrogate_id(next_id);
                    next_id += 1;
                    staged.push(row);
                }
            }
        }

        inner.rows = staged;
        inner.next_id = next_id;
        Ok(())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.lock().await.rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use model::records::CustomerRow;

    fn row(key: &str) -> CustomerRow {
        CustomerRow {
            id: None,
            customer_id: key.to_string(),
            full_name: "name".into(),
            email_address: None,
            phone_number: None,
            full_address: None,
            zip_code: None,
            registration_date: None,
            is_active: true,
            migrated_at: Utc::now(),
            gender: None,
            source_id: None,
        }
    }

    #[tokio::test]
    async fn append_allows_duplicate_keys() {
        let table = MemoryTable::new();
        table
            .write_chunk(&[row("C1")], WriteMode::Append)
            .await
            .unwrap();
        table
            .write_chunk(&[row("C1")], WriteMode::Append)
            .await
            .unwrap();
        assert_eq!(table.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn upsert_updates_row_found_by_key() {
        let table = MemoryTable::new();
        table
            .write_chunk(&[row("C1")], WriteMode::Upsert)
            .await
            .unwrap();

        let mut existing = table.find_by_key("C1").await.unwrap().unwrap();
        assert!(existing.id.is_some());
        existing.full_name = "renamed".into();

        table
            .write_chunk(&[existing], WriteMode::Upsert)
            .await
            .unwrap();

        assert_eq!(table.count().await.unwrap(), 1);
        let reloaded = table.find_by_key("C1").await.unwrap().unwrap();
        assert_eq!(reloaded.full_name, "renamed");
    }

    #[tokio::test]
    async fn failed_chunk_leaves_no_partial_rows() {
        let table = MemoryTable::new();
        table
            .write_chunk(&[row("C1")], WriteMode::Upsert)
            .await
            .unwrap();

        // Second row collides on the natural key, so the whole chunk fails.
        let err = table
            .write_chunk(&[row("C2"), row("C1")], WriteMode::Upsert)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
        assert_eq!(table.count().await.unwrap(), 1);
    }
}
