//! Per-cell formatting
//!
//! Turns a single [`Value`] into display text plus its display width. One
//! `match` on the value kind selects the rule; timestamps are their own kind,
//! so the date rule can never cut them short.

use crate::connection::Value;
use crate::repl::session_config::SessionConfig;

/// Suffix of a value cut short for display
pub const TRUNCATION_MARKER: &str = "[...]";

/// Text shown for values no formatter understands
pub const UNSUPPORTED_SENTINEL: &str = "#unknown#";

/// Width reserved for booleans, enough for `false`
const BOOL_WIDTH: usize = 5;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// A formatted cell: display text and the width its column must reserve
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedCell {
    pub text: String,
    pub width: usize,
}

impl FormattedCell {
    /// Cell whose width is the character count of its text
    fn measured(text: String) -> Self {
        let width = text.chars().count();
        Self { text, width }
    }
}

/// Format one value for the terminal grid
pub fn format_value(value: &Value, config: &SessionConfig) -> FormattedCell {
    match value {
        Value::Null => FormattedCell::measured(config.null_string.clone()),
        Value::Bool(b) => FormattedCell {
            text: b.to_string(),
            width: BOOL_WIDTH,
        },
        Value::Integer(n) => FormattedCell {
            text: n.to_string(),
            width: int_len(*n),
        },
        Value::Float(f) => format_float(*f),
        Value::Timestamp(ts) => FormattedCell::measured(ts.format(TIMESTAMP_FORMAT).to_string()),
        Value::Date(d) => FormattedCell::measured(d.format(DATE_FORMAT).to_string()),
        Value::Time(t) => FormattedCell::measured(t.format(TIME_FORMAT).to_string()),
        Value::Text(s) => format_text(s, config),
        Value::Binary(bytes) => format_text(&format!("0x{}", hex::encode(bytes)), config),
        Value::Unsupported(type_name) => {
            tracing::debug!("No formatter for driver type {type_name}");
            FormattedCell {
                text: UNSUPPORTED_SENTINEL.to_string(),
                width: UNSUPPORTED_SENTINEL.len(),
            }
        }
    }
}

/// Substitute control characters, then truncate to the configured width.
///
/// A cut value keeps `width - 5` characters followed by [`TRUNCATION_MARKER`],
/// so it is exactly `width` characters long. Widths too narrow for the marker
/// are cut without it.
pub fn format_text(text: &str, config: &SessionConfig) -> FormattedCell {
    let replaced = text
        .replace('\n', &config.newline_replacement)
        .replace('\t', &config.tab_replacement);

    let max = config.column_display_width;
    let length = replaced.chars().count();
    if max == 0 || length <= max {
        return FormattedCell {
            text: replaced,
            width: length,
        };
    }

    let marker_len = TRUNCATION_MARKER.len();
    let text = if max > marker_len {
        let mut cut: String = replaced.chars().take(max - marker_len).collect();
        cut.push_str(TRUNCATION_MARKER);
        cut
    } else {
        replaced.chars().take(max).collect()
    };
    FormattedCell { text, width: max }
}

/// Display width of an integer: its decimal digits plus a sign for negatives
pub fn int_len(n: i64) -> usize {
    let digits = n.unsigned_abs().checked_ilog10().map_or(1, |log| log as usize + 1);
    digits + usize::from(n < 0)
}

/// Display width of a finite float: its digits, one separator and a sign for
/// negatives
pub fn decimal_len(f: f64) -> usize {
    let digits = decimal_text(f.abs())
        .bytes()
        .filter(u8::is_ascii_digit)
        .count();
    digits + 1 + usize::from(f.is_sign_negative())
}

/// Plain positional notation that always carries a fractional part
fn decimal_text(f: f64) -> String {
    let mut text = f.to_string();
    if !text.contains('.') {
        text.push_str(".0");
    }
    text
}

fn format_float(f: f64) -> FormattedCell {
    if !f.is_finite() {
        return FormattedCell::measured(f.to_string());
    }
    FormattedCell {
        text: decimal_text(f),
        width: decimal_len(f),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn config() -> SessionConfig {
        SessionConfig::default()
    }

    #[test]
    fn test_null_uses_configured_string_width() {
        let mut config = config();
        config.null_string = "N/A".to_string();
        let cell = format_value(&Value::Null, &config);
        assert_eq!(cell.text, "N/A");
        assert_eq!(cell.width, 3);
    }

    #[test]
    fn test_null_off_is_empty() {
        let mut config = config();
        config.null_string = String::new();
        assert_eq!(format_value(&Value::Null, &config).width, 0);
    }

    #[test]
    fn test_bool_fixed_width() {
        let cell = format_value(&Value::Bool(true), &config());
        assert_eq!(cell.text, "true");
        assert_eq!(cell.width, 5);
    }

    #[test]
    fn test_int_len() {
        assert_eq!(int_len(0), 1);
        assert_eq!(int_len(9), 1);
        assert_eq!(int_len(10), 2);
        assert_eq!(int_len(-42), 3);
        assert_eq!(int_len(i64::MIN), 20);
    }

    #[test]
    fn test_decimal_len_matches_text() {
        for f in [1.25, -1.25, 3.0, 0.5, -1000.125] {
            let cell = format_value(&Value::Float(f), &config());
            assert_eq!(cell.width, cell.text.chars().count(), "{f}");
        }
    }

    #[test]
    fn test_large_float_is_not_exponential() {
        let cell = format_value(&Value::Float(1e20), &config());
        assert_eq!(cell.text, "100000000000000000000.0");
        assert_eq!(cell.width, 23);
    }

    #[test]
    fn test_nan_uses_text_length() {
        let cell = format_value(&Value::Float(f64::NAN), &config());
        assert_eq!(cell.text, "NaN");
        assert_eq!(cell.width, 3);
    }

    #[test]
    fn test_timestamp_keeps_time_part() {
        let ts = NaiveDate::from_ymd_opt(2023, 12, 1)
            .unwrap()
            .and_hms_opt(8, 30, 15)
            .unwrap();
        let cell = format_value(&Value::Timestamp(ts), &config());
        assert_eq!(cell.text, "2023-12-01T08:30:15");
        assert_eq!(cell.width, 19);
    }

    #[test]
    fn test_date_and_time_iso() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let time = NaiveTime::from_hms_milli_opt(23, 59, 1, 500).unwrap();
        assert_eq!(format_value(&Value::Date(date), &config()).text, "2024-01-02");
        assert_eq!(format_value(&Value::Time(time), &config()).text, "23:59:01.500");
    }

    #[test]
    fn test_truncation_is_exact_width() {
        let mut config = config();
        config.column_display_width = 10;
        let cell = format_text("abcdefghijklmnop", &config);
        assert_eq!(cell.text, "abcde[...]");
        assert_eq!(cell.text.chars().count(), 10);
        assert_eq!(cell.width, 10);
    }

    #[test]
    fn test_text_at_width_is_unchanged() {
        let mut config = config();
        config.column_display_width = 10;
        assert_eq!(format_text("abcdefghij", &config).text, "abcdefghij");
    }

    #[test]
    fn test_zero_width_never_truncates() {
        let mut config = config();
        config.column_display_width = 0;
        let long = "x".repeat(500);
        assert_eq!(format_text(&long, &config).width, 500);
    }

    #[test]
    fn test_narrow_width_cuts_without_marker() {
        let mut config = config();
        config.column_display_width = 3;
        assert_eq!(format_text("abcdef", &config).text, "abc");
    }

    #[test]
    fn test_newline_off_keeps_raw_character() {
        let mut config = config();
        config.newline_replacement = "\n".to_string();
        assert_eq!(format_text("a\nb", &config).text, "a\nb");

        config.newline_replacement = "<NL>".to_string();
        assert_eq!(format_text("a\nb\nc", &config).text, "a<NL>b<NL>c");
    }

    #[test]
    fn test_default_replacements_are_visible() {
        let cell = format_text("a\tb", &config());
        assert_eq!(cell.text, "a[\\t]b");
    }

    #[test]
    fn test_binary_as_hex_text() {
        let mut config = config();
        config.column_display_width = 8;
        let cell = format_value(&Value::Binary(vec![0xca, 0xfe, 0xba, 0xbe]), &config);
        assert_eq!(cell.text, "0xc[...]");
    }

    #[test]
    fn test_unsupported_sentinel() {
        let cell = format_value(&Value::Unsupported("GEOMETRY".to_string()), &config());
        assert_eq!(cell.text, "#unknown#");
        assert_eq!(cell.width, 9);
    }
}
