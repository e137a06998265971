use model::params::MaskingConfig;
use model::records::{CompanyRow, CustomerRow};

/// Row type the masker knows how to redact in place.
pub trait MaskTarget {
    fn apply_mask(&mut self, masker: &DataMasker);
}

/// Redacts contact fields on transformed rows before they are written.
///
/// Intended for runs against non-production targets; a run with masking
/// disabled leaves every row untouched.
#[derive(Debug, Clone)]
pub struct DataMasker {
    config: MaskingConfig,
}

impl DataMasker {
    pub fn new(config: MaskingConfig) -> Self {
        DataMasker { config }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn apply<T: MaskTarget>(&self, row: &mut T) {
        if self.config.enabled {
            row.apply_mask(self);
        }
    }

    fn mask_field(&self, field: &mut Option<String>, enabled: bool, mask: fn(&str) -> String) {
        if enabled {
            if let Some(value) = field.as_deref() {
                *field = Some(mask(value));
            }
        }
    }
}

impl MaskTarget for CustomerRow {
    fn apply_mask(&mut self, masker: &DataMasker) {
        masker.mask_field(&mut self.email_address, masker.config.mask_email, mask_email);
        masker.mask_field(&mut self.phone_number, masker.config.mask_phone, mask_phone);
        masker.mask_field(&mut self.full_address, masker.config.mask_address, mask_address);
        masker.mask_field(&mut self.zip_code, masker.config.mask_postal_code, mask_postal_code);
    }
}

impl MaskTarget for CompanyRow {
    fn apply_mask(&mut self, masker: &DataMasker) {
        masker.mask_field(&mut self.contact_email, masker.config.mask_email, mask_email);
        masker.mask_field(&mut self.contact_phone, masker.config.mask_phone, mask_phone);
        masker.mask_field(&mut self.office_address, masker.config.mask_address, mask_address);
        masker.mask_field(&mut self.zip_code, masker.config.mask_postal_code, mask_postal_code);
    }
}

/// `test@example.com` becomes `te***@example.com`; short local parts are
/// fully hidden.
pub fn mask_email(email: &str) -> String {
    let Some((local, domain)) = email.split_once('@') else {
        return email.to_string();
    };

    if local.chars().count() <= 2 {
        format!("***@{domain}")
    } else {
        let prefix: String = local.chars().take(2).collect();
        format!("{prefix}***@{domain}")
    }
}

/// `03-1234-5678` becomes `03-***-5678`; `0312345678` becomes `03***5678`.
pub fn mask_phone(phone: &str) -> String {
    if phone.contains('-') {
        let parts: Vec<&str> = phone.split('-').collect();
        if parts.len() == 3 {
            return format!("{}-***-{}", parts[0], parts[2]);
        }
    }

    let chars: Vec<char> = phone.chars().collect();
    if chars.len() >= 6 {
        let prefix: String = chars[..2].iter().collect();
        let suffix: String = chars[chars.len() - 4..].iter().collect();
        return format!("{prefix}***{suffix}");
    }

    "***".to_string()
}

/// Keeps the address up to the first digit (prefecture and municipality),
/// redacting the block number onward.
pub fn mask_address(address: &str) -> String {
    if let Some(index) = address.char_indices().find_map(|(i, c)| {
        if c.is_ascii_digit() { Some(i) } else { None }
    }) {
        if index > 0 {
            return format!("{}***", &address[..index]);
        }
    }

    // No digit to anchor on: keep roughly the first half.
    let total = address.chars().count();
    let keep = 10.min(total / 2);
    let prefix: String = address.chars().take(keep).collect();
    format!("{prefix}***")
}

/// `123-4567` becomes `123-****`.
pub fn mask_postal_code(postal: &str) -> String {
    if let Some((prefix, _)) = postal.split_once('-') {
        return format!("{prefix}-****");
    }

    if postal.chars().count() >= 3 {
        let prefix: String = postal.chars().take(3).collect();
        return format!("{prefix}****");
    }

    "***".to_string()
}
