//! Write-path normalization of raw request values.
//!
//! Salary is default-filled rather than rejected: anything that does not
//! yield a finite, non-negative number is stored as `0`. String fields are
//! not coerced; a non-string value is reported back to the caller.

use serde_json::Value;

/// Reads a salary from an arbitrary JSON value.
///
/// Numbers are taken as-is, strings are read with `parseFloat` prefix rules
/// (`"1500.5"`, `" 12abc"`), every other value becomes `0`.
pub fn salary(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_float_prefix(s),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v > 0.0 => v,
        _ => 0.0,
    }
}

/// Parses the longest leading decimal literal of `s`, ignoring leading
/// whitespace. Returns `None` when no digits are found.
pub fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }

    if digits == 0 {
        return None;
    }

    // exponent only counts when at least one digit follows
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// A string field carried some other JSON type.
#[derive(Debug, PartialEq, Eq)]
pub struct NotAString;

/// Trimmed string field; `null` counts as absent.
pub fn trimmed(value: Option<&Value>) -> Result<Option<String>, NotAString> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(NotAString),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn salary_from_numbers_and_numeric_strings() {
        assert_eq!(salary(Some(&json!(1500.5))), 1500.5);
        assert_eq!(salary(Some(&json!("1500.5"))), 1500.5);
        assert_eq!(salary(Some(&json!("  42"))), 42.0);
        assert_eq!(salary(Some(&json!("12abc"))), 12.0);
        assert_eq!(salary(Some(&json!("1e3"))), 1000.0);
        assert_eq!(salary(Some(&json!(".5"))), 0.5);
    }

    #[test]
    fn invalid_salary_defaults_to_zero() {
        assert_eq!(salary(None), 0.0);
        assert_eq!(salary(Some(&json!(null))), 0.0);
        assert_eq!(salary(Some(&json!("abc"))), 0.0);
        assert_eq!(salary(Some(&json!(""))), 0.0);
        assert_eq!(salary(Some(&json!(true))), 0.0);
        assert_eq!(salary(Some(&json!([1]))), 0.0);
        assert_eq!(salary(Some(&json!("Infinity"))), 0.0);
    }

    #[test]
    fn negative_salary_is_clamped() {
        assert_eq!(salary(Some(&json!(-10))), 0.0);
        assert_eq!(salary(Some(&json!("-3.5"))), 0.0);
    }

    #[test]
    fn prefix_parser_stops_at_garbage() {
        assert_eq!(parse_float_prefix("2.5.5"), Some(2.5));
        assert_eq!(parse_float_prefix("7e"), Some(7.0));
        assert_eq!(parse_float_prefix("7e+"), Some(7.0));
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("5."), Some(5.0));
    }

    #[test]
    fn trimmed_rejects_non_strings() {
        assert_eq!(trimmed(Some(&json!("  Ann "))), Ok(Some("Ann".to_string())));
        assert_eq!(trimmed(None), Ok(None));
        assert_eq!(trimmed(Some(&json!(null))), Ok(None));
        assert_eq!(trimmed(Some(&json!(12))), Err(NotAString));
    }
}
