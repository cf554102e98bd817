//! Role-gated PII masking for property display.

use std::collections::HashSet;

use gotham_core::{Entity, PropertyValue, Role};
use once_cell::sync::Lazy;
use serde::Serialize;

/// Fixed redaction prefix.
pub const MASK: &str = "****";

/// Number of trailing characters left visible on long values.
const VISIBLE_SUFFIX: usize = 4;

static SENSITIVE_FIELDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "dob",
        "home_address",
        "ssn",
        "msisdn",
        "account_id",
        "email",
        "phone",
    ]
    .into_iter()
    .collect()
});

/// Whether a property key names a sensitive field (case-insensitive).
pub fn is_sensitive(property: &str) -> bool {
    SENSITIVE_FIELDS.contains(property.to_lowercase().as_str())
}

/// Mask `value` for display unless `role` may see PII.
///
/// Sensitive values of four characters or fewer collapse to [`MASK`];
/// longer ones keep their last four characters after the mask.
pub fn mask(value: &str, property: &str, role: Role) -> String {
    if role.reveals_pii() || !is_sensitive(property) {
        return value.to_string();
    }

    let len = value.chars().count();
    if len <= VISIBLE_SUFFIX {
        return MASK.to_string();
    }
    let tail: String = value.chars().skip(len - VISIBLE_SUFFIX).collect();
    format!("{}{}", MASK, tail)
}

/// [`mask`] applied to a property value's display form.
pub fn mask_property(value: &PropertyValue, property: &str, role: Role) -> String {
    mask(&value.to_string(), property, role)
}

/// A property prepared for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaskedProperty {
    pub key: String,
    /// Key with underscores replaced by spaces.
    pub label: String,
    pub value: String,
    pub masked: bool,
}

/// The entity's displayable properties (provenance keys excluded), masked
/// for `role`.
pub fn masked_properties(entity: &Entity, role: Role) -> Vec<MaskedProperty> {
    entity
        .visible_properties()
        .map(|(key, value)| {
            let raw = value.to_string();
            let shown = mask(&raw, key, role);
            MaskedProperty {
                key: key.clone(),
                label: key.replace('_', " "),
                masked: shown != raw,
                value: shown,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_investigator_sees_raw_values() {
        for key in ["ssn", "msisdn", "notes", "EMAIL", ""] {
            for value in ["", "12", "123456789", "jane@example.com"] {
                assert_eq!(mask(value, key, Role::Investigator), value);
            }
        }
    }

    #[test]
    fn test_long_value_keeps_last_four() {
        assert_eq!(mask("12345678", "msisdn", Role::Analyst), "****5678");
        assert_eq!(mask("jane@example.com", "Email", Role::Analyst), "****.com");
    }

    #[test]
    fn test_short_value_fully_masked() {
        assert_eq!(mask("12", "ssn", Role::Analyst), MASK);
        assert_eq!(mask("1234", "ssn", Role::Analyst), MASK);
        assert_eq!(mask("", "dob", Role::Analyst), MASK);
    }

    #[test]
    fn test_non_sensitive_key_unchanged() {
        assert_eq!(mask("call me at 555", "notes", Role::Analyst), "call me at 555");
        assert!(!is_sensitive("full_name"));
        assert!(is_sensitive("HOME_ADDRESS"));
    }

    #[test]
    fn test_multibyte_tail() {
        assert_eq!(mask("Zürich-Straße", "home_address", Role::Analyst), "****raße");
    }

    #[test]
    fn test_masked_properties_listing() {
        let entity = Entity::new("P1", "Person")
            .with_property("full_name", "Ayaan Shah")
            .with_property("home_address", "12 Canal Street")
            .with_property("_source", "registry");

        let props = masked_properties(&entity, Role::Analyst);
        assert_eq!(props.len(), 2);
        assert_eq!(props[1].label, "home address");
        assert_eq!(props[1].value, "****reet");
        assert!(props[1].masked);
        assert!(!props[0].masked);

        let revealed = masked_properties(&entity, Role::Investigator);
        assert_eq!(revealed[1].value, "12 Canal Street");
    }

    #[test]
    fn test_mask_numeric_property() {
        let value = PropertyValue::Integer(4000123456);
        assert_eq!(mask_property(&value, "account_id", Role::Analyst), "****3456");
    }
}
