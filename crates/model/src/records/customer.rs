use crate::records::{SourceRecord, TargetRow};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw customer record as parsed from the legacy TSV export.
///
/// Field order in the file: code, name, email, phone, address, postal code,
/// created-at, status, gender code. Everything except `created_at` and
/// `gender_code` stays a string; those two are parsed eagerly at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_code: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub postal_code: String,
    pub created_at: Option<DateTime<Utc>>,
    pub status: String,
    pub gender_code: Option<u8>,
}

impl SourceRecord for CustomerRecord {
    fn natural_key(&self) -> &str {
        &self.customer_code
    }
}

/// Normalized customer row in the target store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRow {
    /// Surrogate id assigned by the store; `Some` when upsert reused a row.
    pub id: Option<u64>,
    pub customer_id: String,
    pub full_name: String,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub full_address: Option<String>,
    pub zip_code: Option<String>,
    pub registration_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub migrated_at: DateTime<Utc>,
    pub gender: Option<String>,
    /// Back-reference to the legacy source identity, when known.
    pub source_id: Option<u64>,
}

impl TargetRow for CustomerRow {
    fn natural_key(&self) -> &str {
        &self.customer_id
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
