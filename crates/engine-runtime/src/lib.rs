pub mod control;
pub mod error;
pub mod flow;
pub mod pipeline;
pub mod report;
pub mod rollback;
