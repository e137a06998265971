use serde::{Deserialize, Serialize};

/// Write mode of the chunk writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteMode {
    /// Every transformed row becomes a new insert.
    Append,
    /// Find-by-natural-key during transform; matched rows update in place.
    Upsert,
}

/// Per-field masking toggles. Only consulted when masking is enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaskingConfig {
    pub enabled: bool,
    pub mask_email: bool,
    pub mask_phone: bool,
    pub mask_address: bool,
    pub mask_postal_code: bool,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        MaskingConfig {
            enabled: false,
            mask_email: true,
            mask_phone: true,
            mask_address: true,
            mask_postal_code: true,
        }
    }
}

impl MaskingConfig {
    pub fn enabled() -> Self {
        MaskingConfig {
            enabled: true,
            ..Default::default()
        }
    }
}

/// Run-scoped parameter set, fixed when a run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunParams {
    /// Optional domain selector. Absent or empty means "run everything";
    /// otherwise a domain runs only when the selector contains its name.
    pub targets: Option<String>,
    pub write_mode: WriteMode,
    pub masking: MaskingConfig,
    /// Records per transactional chunk.
    pub chunk_size: usize,
    /// Maximum tolerated skips before a step is considered failed.
    pub skip_limit: u64,
}

impl Default for RunParams {
    fn default() -> Self {
        RunParams {
            targets: None,
            write_mode: WriteMode::Append,
            masking: MaskingConfig::default(),
            chunk_size: 100,
            skip_limit: 10,
        }
    }
}

impl RunParams {
    /// True when the selector names this domain (or is absent/empty).
    ///
    /// Containment is a substring check on the raw selector string, so
    /// `targets = "customer,company"` selects both domains.
    pub fn selects(&self, domain: &str) -> bool {
        match self.targets.as_deref() {
            None => true,
            Some(t) if t.is_empty() => true,
            Some(t) => t.contains(domain),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_selector_selects_everything() {
        let params = RunParams::default();
        assert!(params.selects("customer"));
        assert!(params.selects("company"));
    }

    #[test]
    fn selector_limits_domains() {
        let params = RunParams {
            targets: Some("company".into()),
            ..Default::default()
        };
        assert!(!params.selects("customer"));
        assert!(params.selects("company"));
    }

    #[test]
    fn comma_separated_selector_matches_each_domain() {
        let params = RunParams {
            targets: Some("customer,company".into()),
            ..Default::default()
        };
        assert!(params.selects("customer"));
        assert!(params.selects("company"));
    }
}
