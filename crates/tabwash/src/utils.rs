//! Shared utilities for the cleaning engine.
//!
//! This module holds the single cell-validity predicate used by every
//! component, numeric coercion of raw strings, and number formatting for
//! values written back into tables.

use once_cell::sync::Lazy;
use regex::Regex;

// =============================================================================
// Validity
// =============================================================================

/// Tokens that mark a cell as missing after trimming and lowercasing.
pub const INVALID_TOKENS: [&str; 8] = ["n/a", "na", "null", "undefined", "-", "", "nan", "#n/a"];

/// Check if a raw string is one of the missing-value tokens.
///
/// # Example
///
/// ```rust
/// use tabwash::utils::is_invalid_token;
///
/// assert!(is_invalid_token("  N/A "));
/// assert!(is_invalid_token(""));
/// assert!(!is_invalid_token("0"));
/// ```
pub fn is_invalid_token(s: &str) -> bool {
    let lower = s.trim().to_lowercase();
    INVALID_TOKENS.iter().any(|&token| lower == token)
}

// =============================================================================
// Numeric Coercion
// =============================================================================

// Decimal literals accepted by JavaScript's Number(): optional sign, digits
// with an optional fraction (either side may be empty, not both), exponent.
static DECIMAL_LITERAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("Invalid regex: decimal literal")
});

/// Parse a string the way JavaScript's `Number()` does, keeping finite results.
///
/// Accepts decimal and exponent forms plus unsigned `0x`, `0o` and `0b`
/// integer literals. Spellings only Rust understands (`inf`, `NaN`) are
/// rejected, and infinities are dropped so downstream statistics stay finite.
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(value) = parse_radix_literal(trimmed) {
        return Some(value).filter(|v| v.is_finite());
    }

    if !DECIMAL_LITERAL.is_match(trimmed) {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_radix_literal(s: &str) -> Option<f64> {
    let prefix = s.get(..2)?.to_ascii_lowercase();
    let radix = match prefix.as_str() {
        "0x" => 16,
        "0o" => 8,
        "0b" => 2,
        _ => return None,
    };
    let digits = s.get(2..)?;
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}

/// Check if a string coerces to a finite number.
pub fn is_numeric_string(s: &str) -> bool {
    parse_number(s).is_some()
}

// =============================================================================
// Formatting
// =============================================================================

/// Format a number the way JavaScript's `String(number)` prints it.
///
/// Magnitudes of at least `1e21` or below `1e-6` use exponent form with an
/// explicit sign (`1e+21`, `1.5e-7`); everything else is plain decimal with
/// the shortest round-tripping digits.
///
/// ```rust
/// use tabwash::utils::format_number;
///
/// assert_eq!(format_number(2.0), "2");
/// assert_eq!(format_number(2.5), "2.5");
/// assert_eq!(format_number(-0.0), "0");
/// ```
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        let exponent_form = format!("{:e}", value);
        return match exponent_form.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => exponent_form,
        };
    }
    format!("{}", value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_invalid_token() {
        for token in ["N/A", "na", " NULL ", "undefined", "-", "", "NaN", "#N/A", "   "] {
            assert!(is_invalid_token(token), "{:?} should be invalid", token);
        }
        assert!(!is_invalid_token("0"));
        assert!(!is_invalid_token("none"));
        assert!(!is_invalid_token("--"));
    }

    #[test]
    fn test_parse_number_decimal_forms() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number("  -3.5 "), Some(-3.5));
        assert_eq!(parse_number("+7"), Some(7.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("5."), Some(5.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
        assert_eq!(parse_number("2.5E-1"), Some(0.25));
    }

    #[test]
    fn test_parse_number_radix_forms() {
        assert_eq!(parse_number("0x1A"), Some(26.0));
        assert_eq!(parse_number("0o17"), Some(15.0));
        assert_eq!(parse_number("0b101"), Some(5.0));
        assert_eq!(parse_number("0x"), None);
        assert_eq!(parse_number("-0x10"), None);
    }

    #[test]
    fn test_parse_number_rejects_non_numbers() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("1,000"), None);
        assert_eq!(parse_number("$5"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("Infinity"), None);
        assert_eq!(parse_number("1e"), None);
        assert_eq!(parse_number("."), None);
        assert_eq!(parse_number("1e999"), None);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(26.5), "26.5");
        assert_eq!(format_number(-4.0), "-4");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_format_number_exponent_range() {
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(-2.5e22), "-2.5e+22");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(1e-6), "0.000001");
        assert_eq!(format_number(999999999999999900000.0), "999999999999999900000");
    }
}
