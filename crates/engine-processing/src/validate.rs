use lazy_static::lazy_static;
use model::records::{CompanyRecord, CustomerRecord};
use model::validation::ValidationError;
use regex::Regex;

lazy_static! {
    static ref EMAIL_PATTERN: Regex =
        Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    /// Hyphenated domestic numbers, or 10-11 digits without hyphens.
    static ref PHONE_PATTERN: Regex =
        Regex::new(r"^(0\d{1,4}-\d{1,4}-\d{4}|0\d{9,10})$").unwrap();
    static ref POSTAL_PATTERN: Regex = Regex::new(r"^\d{3}-\d{4}$").unwrap();
}

/// Record-level rule check, run before transformation.
///
/// A validator collects every violated rule for the record; the step rejects
/// the record as a whole when any rule fails.
pub trait RecordValidator<R>: Send + Sync {
    fn validate(&self, record: &R) -> Result<(), ValidationError>;
}

fn check_format(violations: &mut Vec<String>, value: &str, pattern: &Regex, label: &str) {
    // Absent optional fields pass; only present malformed values fail.
    if !value.trim().is_empty() && !pattern.is_match(value.trim()) {
        violations.push(format!("{label} has invalid format: '{}'", value.trim()));
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerValidator;

impl RecordValidator<CustomerRecord> for CustomerValidator {
    fn validate(&self, record: &CustomerRecord) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        if record.customer_code.trim().is_empty() {
            violations.push("customer code is required".to_string());
        }
        if record.customer_name.trim().is_empty() {
            violations.push("customer name is required".to_string());
        }
        check_format(&mut violations, &record.email, &EMAIL_PATTERN, "email");
        check_format(&mut violations, &record.phone, &PHONE_PATTERN, "phone");
        check_format(
            &mut violations,
            &record.postal_code,
            &POSTAL_PATTERN,
            "postal code",
        );
        if let Some(code) = record.gender_code {
            if !(1..=2).contains(&code) {
                violations.push(format!("gender code must be 1 or 2: {code}"));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(&record.customer_code, violations))
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CompanyValidator;

impl RecordValidator<CompanyRecord> for CompanyValidator {
    fn validate(&self, record: &CompanyRecord) -> Result<(), ValidationError> {
        let mut violations = Vec::new();

        if record.company_code.trim().is_empty() {
            violations.push("company code is required".to_string());
        }
        if record.company_name.trim().is_empty() {
            violations.push("company name is required".to_string());
        }
        check_format(&mut violations, &record.email, &EMAIL_PATTERN, "email");
        check_format(&mut violations, &record.phone, &PHONE_PATTERN, "phone");
        check_format(
            &mut violations,
            &record.postal_code,
            &POSTAL_PATTERN,
            "postal code",
        );
        if let Some(code) = record.industry_code {
            if !(1..=11).contains(&code) {
                violations.push(format!("industry code must be between 1 and 11: {code}"));
            }
        }
        if let Some(count) = record.employee_count {
            if count < 0 {
                violations.push(format!("employee count must not be negative: {count}"));
            }
        }
        if let Some(capital) = record.capital {
            if capital < 0 {
                violations.push(format!("capital must not be negative: {capital}"));
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(&record.company_code, violations))
        }
    }
}
