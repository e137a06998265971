pub mod company;
pub mod customer;

pub use company::{CompanyRecord, CompanyRow};
pub use customer::{CustomerRecord, CustomerRow};

/// A record parsed from the legacy flat-file source.
pub trait SourceRecord: Send + Sync + Clone + std::fmt::Debug {
    /// Business-meaningful unique identifier (customer/company code).
    fn natural_key(&self) -> &str;
}

/// A normalized row destined for the target store.
pub trait TargetRow: Send + Sync + Clone + std::fmt::Debug {
    fn natural_key(&self) -> &str;

    /// Surrogate identity assigned by the store. `Some` only when an upsert
    /// lookup reused an existing row.
    fn surrogate_id(&self) -> Option<u64>;

    fn set_surrogate_id(&mut self, id: u64);

    fn migrated_at(&self) -> chrono::DateTime<chrono::Utc>;
}
