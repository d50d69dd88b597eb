//! Required scientific field catalog.
//!
//! Every dataset must carry these columns. Keys are matched against CSV
//! headers case-insensitively.

use crate::constants::REQUIRED_FIELDS;
use serde::Serialize;
use std::sync::LazyLock;

/// One required column and its description
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub key: &'static str,
    pub description: &'static str,
}

/// The process-wide catalog, in catalog order
pub static FIELD_CATALOG: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
    REQUIRED_FIELDS
        .iter()
        .map(|&(key, description)| FieldSpec { key, description })
        .collect()
});

/// Required keys in catalog order
pub fn required_keys() -> impl Iterator<Item = &'static str> {
    FIELD_CATALOG.iter().map(|field| field.key)
}

/// Description for a catalog key
pub fn describe(key: &str) -> Option<&'static str> {
    FIELD_CATALOG
        .iter()
        .find(|field| field.key.eq_ignore_ascii_case(key.trim()))
        .map(|field| field.description)
}

/// Number of required fields
pub fn len() -> usize {
    FIELD_CATALOG.len()
}

/// Render missing keys as `• key - description` lines
pub fn missing_field_details<S: AsRef<str>>(keys: &[S]) -> Vec<String> {
    keys.iter()
        .map(|key| {
            let key = key.as_ref();
            match describe(key) {
                Some(description) => format!("• {} - {}", key, description),
                None => format!("• {}", key),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order_and_size() {
        let keys: Vec<_> = required_keys().collect();
        assert_eq!(
            keys,
            vec![
                "pl_orbper",
                "pl_trandep",
                "pl_trandur",
                "pl_rade",
                "pl_imppar",
                "pl_ratror",
                "pl_ratdor",
                "st_rad",
                "st_teff"
            ]
        );
        assert_eq!(len(), 9);
    }

    #[test]
    fn test_describe_is_case_insensitive() {
        assert_eq!(describe("st_teff"), Some("Stellar effective temperature (K)"));
        assert_eq!(describe("ST_TEFF"), describe("st_teff"));
        assert_eq!(describe("pl_name"), None);
    }

    #[test]
    fn test_missing_field_details() {
        let details = missing_field_details(&["pl_rade", "bogus"]);
        assert_eq!(details[0], "• pl_rade - Planet radius (Earth radii)");
        assert_eq!(details[1], "• bogus");
    }
}
