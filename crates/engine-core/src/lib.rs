pub mod bus;
pub mod counters;
pub mod error;
pub mod progress;
pub mod registry;
pub mod retry;
