use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::StringRecord;
use model::records::{CompanyRecord, CustomerRecord};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Maps one delimited line onto a typed source record.
///
/// Implementations parse numeric and date fields eagerly so downstream
/// stages never see raw text for them; a malformed field fails the whole
/// line with a message naming the field.
pub trait FromTsvRow: Sized + Send {
    /// Expected column count of the legacy export.
    const COLUMNS: usize;

    fn from_row(record: &StringRecord) -> Result<Self, String>;
}

fn field(record: &StringRecord, idx: usize) -> String {
    record.get(idx).unwrap_or("").trim().to_string()
}

fn parse_datetime(raw: &str, name: &str) -> Result<Option<DateTime<Utc>>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map(|dt| Some(dt.and_utc()))
        .map_err(|e| format!("invalid {name} '{raw}': {e}"))
}

fn parse_date(raw: &str, name: &str) -> Result<Option<NaiveDate>, String> {
    if raw.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map(Some)
        .map_err(|e| format!("invalid {name} '{raw}': {e}"))
}

fn parse_number<T: std::str::FromStr>(raw: &str, name: &str) -> Result<Option<T>, String>
where
    T::Err: std::fmt::Display,
{
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<T>()
        .map(Some)
        .map_err(|e| format!("invalid {name} '{raw}': {e}"))
}

impl FromTsvRow for CustomerRecord {
    const COLUMNS: usize = 9;

    fn from_row(record: &StringRecord) -> Result<Self, String> {
        if record.len() < Self::COLUMNS {
            return Err(format!(
                "expected {} columns, found {}",
                Self::COLUMNS,
                record.len()
            ));
        }

        Ok(CustomerRecord {
            customer_code: field(record, 0),
            customer_name: field(record, 1),
            email: field(record, 2),
            phone: field(record, 3),
            address: field(record, 4),
            postal_code: field(record, 5),
            created_at: parse_datetime(&field(record, 6), "created_at")?,
            status: field(record, 7),
            gender_code: parse_number(&field(record, 8), "gender_code")?,
        })
    }
}

impl FromTsvRow for CompanyRecord {
    const COLUMNS: usize = 12;

    fn from_row(record: &StringRecord) -> Result<Self, String> {
        if record.len() < Self::COLUMNS {
            return Err(format!(
                "expected {} columns, found {}",
                Self::COLUMNS,
                record.len()
            ));
        }

        Ok(CompanyRecord {
            company_code: field(record, 0),
            company_name: field(record, 1),
            representative_name: field(record, 2),
            industry_code: parse_number(&field(record, 3), "industry_code")?,
            employee_count: parse_number(&field(record, 4), "employee_count")?,
            capital: parse_number(&field(record, 5), "capital")?,
            established_date: parse_date(&field(record, 6), "established_date")?,
            address: field(record, 7),
            postal_code: field(record, 8),
            phone: field(record, 9),
            email: field(record, 10),
            status: field(record, 11),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn parses_full_customer_line() {
        let rec = record(&[
            "CUST001",
            "Taro",
            "t@example.com",
            "090-1111-2222",
            "Tokyo 1-2-3",
            "150-0001",
            "2025-01-01 10:00:00",
            "ACTIVE",
            "1",
        ]);
        let parsed = CustomerRecord::from_row(&rec).unwrap();
        assert_eq!(parsed.customer_code, "CUST001");
        assert_eq!(parsed.gender_code, Some(1));
        assert!(parsed.created_at.is_some());
    }

    #[test]
    fn empty_optional_fields_parse_to_none() {
        let rec = record(&[
            "CUST002", "Hanako", "", "", "", "", "", "INACTIVE", "",
        ]);
        let parsed = CustomerRecord::from_row(&rec).unwrap();
        assert_eq!(parsed.created_at, None);
        assert_eq!(parsed.gender_code, None);
    }

    #[test]
    fn malformed_date_fails_the_line() {
        let rec = record(&[
            "CUST003", "Jiro", "", "", "", "", "not-a-date", "ACTIVE", "1",
        ]);
        let err = CustomerRecord::from_row(&rec).unwrap_err();
        assert!(err.contains("created_at"));
    }

    #[test]
    fn short_company_line_is_rejected() {
        let rec = record(&["COMP001", "Acme"]);
        assert!(CompanyRecord::from_row(&rec).is_err());
    }

    #[test]
    fn parses_company_numerics() {
        let rec = record(&[
            "COMP001",
            "Acme",
            "Yamada",
            "4",
            "120",
            "5000000",
            "1999-04-01",
            "Osaka",
            "530-0001",
            "06-1111-2222",
            "info@acme.example",
            "ACTIVE",
        ]);
        let parsed = CompanyRecord::from_row(&rec).unwrap();
        assert_eq!(parsed.industry_code, Some(4));
        assert_eq!(parsed.employee_count, Some(120));
        assert_eq!(parsed.capital, Some(5_000_000));
        assert!(parsed.established_date.is_some());
    }
}
