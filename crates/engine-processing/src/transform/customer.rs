use crate::transform::{RecordTransformer, non_empty, status_is_active};
use async_trait::async_trait;
use chrono::Utc;
use connectors::store::{StoreError, TargetTable};
use model::lookup::gender_label;
use model::params::WriteMode;
use model::records::{CustomerRecord, CustomerRow, TargetRow};
use std::sync::Arc;

pub struct CustomerTransformer {
    table: Arc<dyn TargetTable<CustomerRow>>,
    mode: WriteMode,
}

impl CustomerTransformer {
    pub fn new(table: Arc<dyn TargetTable<CustomerRow>>, mode: WriteMode) -> Self {
        CustomerTransformer { table, mode }
    }
}

#[async_trait]
impl RecordTransformer<CustomerRecord, CustomerRow> for CustomerTransformer {
    async fn transform(&self, record: &CustomerRecord) -> Result<CustomerRow, StoreError> {
        let existing = match self.mode {
            WriteMode::Upsert => self.table.find_by_key(record.customer_code.trim()).await?,
            WriteMode::Append => None,
        };

        let mut row = CustomerRow {
            id: None,
            customer_id: record.customer_code.trim().to_string(),
            full_name: record.customer_name.trim().to_string(),
            email_address: non_empty(&record.email),
            phone_number: non_empty(&record.phone),
            full_address: non_empty(&record.address),
            zip_code: non_empty(&record.postal_code),
            registration_date: record.created_at,
            is_active: status_is_active(&record.status),
            migrated_at: Utc::now(),
            gender: gender_label(record.gender_code),
            source_id: None,
        };

        if let Some(existing) = existing {
            if let Some(id) = existing.surrogate_id() {
                row.set_surrogate_id(id);
            }
            // The legacy back-reference survives re-migration.
            row.source_id = existing.source_id;
        }

        Ok(row)
    }
}
