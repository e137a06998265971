use crate::records::{SourceRecord, TargetRow};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Raw company record as parsed from the legacy TSV export.
///
/// Field order in the file: code, name, representative, industry code,
/// employee count, capital, established date, address, postal code, phone,
/// email, status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub company_code: String,
    pub company_name: String,
    pub representative_name: String,
    pub industry_code: Option<u8>,
    pub employee_count: Option<i32>,
    pub capital: Option<i64>,
    pub established_date: Option<NaiveDate>,
    pub address: String,
    pub postal_code: String,
    pub phone: String,
    pub email: String,
    pub status: String,
}

impl SourceRecord for CompanyRecord {
    fn natural_key(&self) -> &str {
        &self.company_code
    }
}

/// Normalized company row in the target store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRow {
    pub id: Option<u64>,
    pub company_id: String,
    pub company_name: String,
    pub representative: Option<String>,
    pub industry_category: Option<String>,
    pub employees: Option<i32>,
    pub capital_amount: Option<i64>,
    pub foundation_date: Option<NaiveDate>,
    pub office_address: Option<String>,
    pub zip_code: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub is_active: bool,
    pub migrated_at: DateTime<Utc>,
}

impl TargetRow for CompanyRow {
    fn natural_key(&self) -> &str {
        &self.company_id
    }

    fn surrogate_id(&self) -> Option<u64> {
        self.id
    }

    fn set_surrogate_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    fn migrated_at(&self) -> DateTime<Utc> {
        self.migrated_at
    }
}
