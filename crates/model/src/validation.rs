use serde::{Deserialize, Serialize};
use std::fmt;

/// All rule violations collected for a single rejected record.
///
/// Validation fails fast at the record level, not per rule: every violated
/// rule is gathered before the record is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub record_key: String,
    pub violations: Vec<String>,
}

impl ValidationError {
    pub fn new(record_key: &str, violations: Vec<String>) -> Self {
        ValidationError {
            record_key: record_key.to_string(),
            violations,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation failed for record '{}': {}",
            self.record_key,
            self.violations.join(", ")
        )
    }
}

impl std::error::Error for ValidationError {}
