use connectors::store::{SledTable, StoreError, TargetTable};
use model::records::{CompanyRow, CustomerRow};
use std::path::PathBuf;
use std::sync::Arc;

pub const JOB_NAME: &str = "legacy-migration";
pub const CUSTOMER_DOMAIN: &str = "customer";
pub const COMPANY_DOMAIN: &str = "company";

/// Where the legacy exports live.
#[derive(Debug, Clone)]
pub struct FlowConfig {
    pub customer_file: PathBuf,
    pub company_file: PathBuf,
}

/// Target tables for both domains, behind the table trait so the runtime is
/// indifferent to the backing store.
#[derive(Clone)]
pub struct JobStores {
    pub customers: Arc<dyn TargetTable<CustomerRow>>,
    pub companies: Arc<dyn TargetTable<CompanyRow>>,
}

impl JobStores {
    pub fn new(
        customers: Arc<dyn TargetTable<CustomerRow>>,
        companies: Arc<dyn TargetTable<CompanyRow>>,
    ) -> Self {
        JobStores {
            customers,
            companies,
        }
    }

    /// Opens both tables in one sled database.
    pub fn open_sled(db: &sled::Db) -> Result<Self, StoreError> {
        Ok(JobStores {
            customers: Arc::new(SledTable::open(db, "customers")?),
            companies: Arc::new(SledTable::open(db, "companies")?),
        })
    }
}
