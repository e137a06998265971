use crate::transform::{RecordTransformer, non_empty, status_is_active};
use async_trait::async_trait;
use chrono::Utc;
use connectors::store::{StoreError, TargetTable};
use model::lookup::industry_category;
use model::params::WriteMode;
use model::records::{CompanyRecord, CompanyRow, TargetRow};
use std::sync::Arc;

pub struct CompanyTransformer {
    table: Arc<dyn TargetTable<CompanyRow>>,
    mode: WriteMode,
}

impl CompanyTransformer {
    pub fn new(table: Arc<dyn TargetTable<CompanyRow>>, mode: WriteMode) -> Self {
        CompanyTransformer { table, mode }
    }
}

#[async_trait]
impl RecordTransformer<CompanyRecord, CompanyRow> for CompanyTransformer {
    async fn transform(&self, record: &CompanyRecord) -> Result<CompanyRow, StoreError> {
        let existing = match self.mode {
            WriteMode::Upsert => self.table.find_by_key(record.company_code.trim()).await?,
            WriteMode::Append => None,
        };

        let mut row = CompanyRow {
            id: None,
            company_id: record.company_code.trim().to_string(),
            company_name: record.company_name.trim().to_string(),
            representative: non_empty(&record.representative_name),
            industry_category: industry_category(record.industry_code),
            employees: record.employee_count,
            capital_amount: record.capital,
            foundation_date: record.established_date,
            office_address: non_empty(&record.address),
            zip_code: non_empty(&record.postal_code),
            contact_phone: non_empty(&record.phone),
            contact_email: non_empty(&record.email),
            is_active: status_is_active(&record.status),
            migrated_at: Utc::now(),
        };

        if let Some(existing) = existing {
            if let Some(id) = existing.surrogate_id() {
                row.set_surrogate_id(id);
            }
        }

        Ok(row)
    }
}
