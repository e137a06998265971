use crate::store::{StoreError, TargetTable};
use async_trait::async_trait;
use model::{params::WriteMode, records::TargetRow};
use serde::{Serialize, de::DeserializeOwned};
use sled::{
    Transactional,
    transaction::{ConflictableTransactionError, TransactionError},
};
use std::marker::PhantomData;

/// Sled-backed natural-keyed table.
///
/// Two trees per table: `<name>:rows` maps surrogate id (big-endian u64) to
/// the bincode row, `<name>:idx` maps natural key to the id of the most
/// recently written row with that key. A chunk is applied in one sled
/// transaction spanning both trees.
pub struct SledTable<R> {
    rows: sled::Tree,
    idx: sled::Tree,
    db: sled::Db,
    _marker: PhantomData<R>,
}

struct StagedWrite {
    id: u64,
    key: String,
    bytes: Vec<u8>,
    /// Caller supplied the surrogate id, so the row must already exist.
    is_update: bool,
}

impl<R> SledTable<R>
where
    R: TargetRow + Serialize + DeserializeOwned,
{
    pub fn open(db: &sled::Db, name: &str) -> Result<Self, StoreError> {
        let rows = db.open_tree(format!("{name}:rows"))?;
        let idx = db.open_tree(format!("{name}:idx"))?;
        Ok(SledTable {
            rows,
            idx,
            db: db.clone(),
            _marker: PhantomData,
        })
    }

    fn decode(bytes: &[u8]) -> Result<R, StoreError> {
        bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn encode(row: &R) -> Result<Vec<u8>, StoreError> {
        bincode::serialize(row).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl<R> TargetTable<R> for SledTable<R>
where
    R: TargetRow + Serialize + DeserializeOwned + 'static,
{
    async fn find_by_key(&self, key: &str) -> Result<Option<R>, StoreError> {
        let Some(id_bytes) = self.idx.get(key.as_bytes())? else {
            return Ok(None);
        };
        match self.rows.get(&id_bytes)? {
            Some(bytes) => Ok(Some(Self::decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn write_chunk(&self, rows: &[R], mode: WriteMode) -> Result<(), StoreError> {
        // Assign surrogate ids up front; generate_id cannot run inside the
        // transaction closure.
        let mut staged = Vec::with_capacity(rows.len());
        for row in rows {
            let is_update = mode == WriteMode::Upsert && row.surrogate_id().is_some();
            let (id, row) = if is_update {
                (row.surrogate_id().unwrap_or_default(), row.clone())
            } else {
                let id = self.db.generate_id()?;
                let mut row = row.clone();
                row.set_surrogate_id(id);
                (id, row)
            };
            staged.push(StagedWrite {
                id,
                key: row.natural_key().to_string(),
                bytes: Self::encode(&row)?,
                is_update,
            });
        }

        let result = (&self.rows, &self.idx).transaction(|(tx_rows, tx_idx)| {
            for write in &staged {
                let id_bytes = write.id.to_be_bytes();

                if write.is_update {
                    if tx_rows.get(id_bytes)?.is_none() {
                        return Err(ConflictableTransactionError::Abort(
                            StoreError::MissingRow { id: write.id },
                        ));
                    }
                } else if mode == WriteMode::Upsert
                    && tx_idx.get(write.key.as_bytes())?.is_some()
                {
                    // Fresh insert under upsert: the key must be free.
                    return Err(ConflictableTransactionError::Abort(
                        StoreError::UniqueViolation {
                            key: write.key.clone(),
                        },
                    ));
                }

                tx_rows.insert(&id_bytes, write.bytes.as_slice())?;
                tx_idx.insert(write.key.as_bytes(), &id_bytes)?;
            }
            Ok(())
        });

        match result {
            Ok(()) => Ok(()),
            Err(TransactionError::Abort(e)) => Err(e),
            Err(TransactionError::Storage(e)) => Err(e.into()),
        }
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.rows.len() as u64)
    }
}
