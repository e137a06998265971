pub mod execution;
pub mod lookup;
pub mod params;
pub mod progress;
pub mod records;
pub mod validation;
