use lazy_static::lazy_static;
use std::collections::HashMap;

/// Label used for industry codes outside the enumerated 1-11 range.
pub const INDUSTRY_FALLBACK: &str = "その他";

lazy_static! {
    /// Industry code -> category label. The legacy system stored industries
    /// as integer codes; the new schema stores the label.
    static ref INDUSTRY_MAP: HashMap<u8, &'static str> = {
        let mut m = HashMap::new();
        m.insert(1, "商社・卸売");
        m.insert(2, "製造業");
        m.insert(3, "建設業");
        m.insert(4, "情報通信業");
        m.insert(5, "小売業");
        m.insert(6, "運輸業");
        m.insert(7, "食品業");
        m.insert(8, "不動産業");
        m.insert(9, "サービス業");
        m.insert(10, "医療・福祉");
        m.insert(11, "教育・出版");
        m
    };
}

/// Translates an industry code to its category label.
///
/// `None` (absent code) leaves the category unset; any code outside the
/// enumerated range maps to the fallback label.
pub fn industry_category(code: Option<u8>) -> Option<String> {
    code.map(|c| {
        INDUSTRY_MAP
            .get(&c)
            .copied()
            .unwrap_or(INDUSTRY_FALLBACK)
            .to_string()
    })
}

/// Translates a gender code to its label.
///
/// Unlike industries, unmapped gender codes have no fallback: anything
/// other than 1 or 2 maps to `None`.
pub fn gender_label(code: Option<u8>) -> Option<String> {
    match code {
        Some(1) => Some("男性".to_string()),
        Some(2) => Some("女性".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn industry_codes_map_to_fixed_labels() {
        assert_eq!(industry_category(Some(1)).as_deref(), Some("商社・卸売"));
        assert_eq!(industry_category(Some(11)).as_deref(), Some("教育・出版"));
    }

    #[test]
    fn out_of_range_industry_falls_back() {
        assert_eq!(industry_category(Some(99)).as_deref(), Some(INDUSTRY_FALLBACK));
        assert_eq!(industry_category(Some(0)).as_deref(), Some(INDUSTRY_FALLBACK));
    }

    #[test]
    fn absent_industry_stays_unset() {
        assert_eq!(industry_category(None), None);
    }

    #[test]
    fn gender_codes_have_no_fallback() {
        assert_eq!(gender_label(Some(1)).as_deref(), Some("男性"));
        assert_eq!(gender_label(Some(2)).as_deref(), Some("女性"));
        assert_eq!(gender_label(Some(3)), None);
        assert_eq!(gender_label(None), None);
    }
}
