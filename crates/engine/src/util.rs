//! Internal helpers for input normalization and stored-value conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every store reports field errors the same way.

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::DbErr;
use unicode_normalization::UnicodeNormalization;

use crate::FieldErrors;

pub(crate) const MAX_CODE_LEN: usize = 10;
pub(crate) const MAX_TEXT_LEN: usize = 255;

/// Trim, collapse inner whitespace and NFC-compose a display name.
///
/// Returns `None` for blank input.
pub(crate) fn normalize_display(input: &str) -> Option<String> {
    let composed: String = input.trim().nfc().collect();
    let mut out = String::new();
    for token in composed.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(token);
    }
    if out.is_empty() { None } else { Some(out) }
}

/// Trim free text; blank becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Trim and upper-case a currency code; blank becomes `None`.
pub(crate) fn normalize_currency_code(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Validate a required display name, recording failures under `field`.
pub(crate) fn required_name(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value.and_then(normalize_display) {
        Some(name) => check_len(errors, field, name, MAX_TEXT_LEN),
        None => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
    }
}

/// Validate a name that may be left out but, when sent, must not be null or blank.
pub(crate) fn optional_name(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Option<&str>>,
) -> Option<String> {
    value.and_then(|raw| required_name(errors, field, raw))
}

/// Validate a required currency code.
pub(crate) fn required_code(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<&str>,
) -> Option<String> {
    match value.and_then(normalize_currency_code) {
        Some(code) => check_len(errors, field, code, MAX_CODE_LEN),
        None => {
            errors.add(field, format!("The {field} field is required."));
            None
        }
    }
}

/// Record an error when `value` exceeds `max` characters.
pub(crate) fn check_len(
    errors: &mut FieldErrors,
    field: &str,
    value: String,
    max: usize,
) -> Option<String> {
    if value.chars().count() > max {
        errors.add(
            field,
            format!("The {field} field must not be greater than {max} characters."),
        );
        return None;
    }
    Some(value)
}

/// Decimals are persisted as their canonical text so SQLite keeps the scale.
pub(crate) fn store_decimal(value: Option<Decimal>) -> Option<String> {
    value.map(|d| d.to_string())
}

/// Parse a decimal stored as text, labeling the column on failure.
pub(crate) fn parse_stored_decimal(
    value: Option<&str>,
    column: &str,
) -> Result<Option<Decimal>, DbErr> {
    value
        .map(|raw| {
            Decimal::from_str(raw.trim())
                .map_err(|err| DbErr::Type(format!("invalid decimal in column {column}: {err}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_are_collapsed() {
        assert_eq!(
            normalize_display("  Food   and\tDrinks "),
            Some("Food and Drinks".to_string())
        );
        assert_eq!(normalize_display("   "), None);
    }

    #[test]
    fn display_names_are_composed() {
        // "e" + combining acute accent
        let decomposed = "Cafe\u{301}";
        assert_eq!(normalize_display(decomposed), Some("Caf\u{e9}".to_string()));
    }

    #[test]
    fn currency_codes_are_upper_cased() {
        assert_eq!(normalize_currency_code(" usd "), Some("USD".to_string()));
        assert_eq!(normalize_currency_code(""), None);
    }

    #[test]
    fn optional_names_reject_null_but_not_absence() {
        let mut errors = FieldErrors::new();
        assert_eq!(optional_name(&mut errors, "name", None), None);
        assert!(errors.is_empty());

        assert_eq!(optional_name(&mut errors, "name", Some(None)), None);
        assert!(errors.contains("name"));
    }

    #[test]
    fn long_codes_are_rejected() {
        let mut errors = FieldErrors::new();
        assert_eq!(
            required_code(&mut errors, "code", Some("ABCDEFGHIJK")),
            None
        );
        assert!(errors.contains("code"));
    }

    #[test]
    fn stored_decimals_keep_scale() {
        let stored = store_decimal(Some(Decimal::new(90000, 4)));
        assert_eq!(stored.as_deref(), Some("9.0000"));
        let parsed = parse_stored_decimal(stored.as_deref(), "rate_to_base").unwrap();
        assert_eq!(parsed.map(|d| d.to_string()).as_deref(), Some("9.0000"));
    }

    #[test]
    fn corrupted_decimal_is_a_database_error() {
        assert!(matches!(
            parse_stored_decimal(Some("abc"), "base_total"),
            Err(DbErr::Type(_))
        ));
    }
}
