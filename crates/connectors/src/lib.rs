pub mod store;
pub mod tsv;
