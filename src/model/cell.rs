//! Cell value model.

use serde::{Serialize, Serializer};
use std::fmt;

/// Offset between the 1904 and 1900 date systems, in days.
pub const DATE_1904_OFFSET: f64 = 1462.0;

/// How date-formatted numeric cells are exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRendering {
    /// Keep the raw serial number
    #[default]
    Serial,
    /// Convert to an ISO 8601 date (or date-time) value
    Iso,
}

/// A single non-empty cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Text (shared, inline, or formula string result)
    String(String),
    /// Numeric value
    Number(f64),
    /// Boolean value
    Bool(bool),
    /// Spreadsheet error code such as `#DIV/0!`
    Error(String),
    /// Date/time as a 1900-system serial number
    DateTime(f64),
    /// Explicit empty value, kept for `#NULL!` cells in records
    Null,
}

impl CellValue {
    /// Build a value for a numeric cell, honoring date detection.
    pub fn numeric(value: f64, is_date: bool, dates: DateRendering) -> Self {
        if is_date && dates == DateRendering::Iso {
            CellValue::DateTime(value)
        } else {
            CellValue::Number(value)
        }
    }

    /// Check whether this is a string value.
    pub fn is_string(&self) -> bool {
        matches!(self, CellValue::String(_))
    }

    /// Get the string content if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the numeric content for numbers and dates.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) | CellValue::DateTime(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Error(code) => f.write_str(code),
            CellValue::Null => Ok(()),
            CellValue::DateTime(serial) => match serial_to_date(*serial) {
                Some(date) => f.write_str(&date),
                None => write!(f, "{}", serial),
            },
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::String(s) | CellValue::Error(s) => serializer.serialize_str(s),
            CellValue::Number(n) => serializer.serialize_f64(*n),
            CellValue::Bool(b) => serializer.serialize_bool(*b),
            CellValue::Null => serializer.serialize_unit(),
            CellValue::DateTime(serial) => match serial_to_date(*serial) {
                Some(date) => serializer.serialize_str(&date),
                None => serializer.serialize_f64(*serial),
            },
        }
    }
}

/// Built-in date formats: 14-22 dates, 45-47 times.
pub fn is_builtin_date_format(num_fmt_id: u32) -> bool {
    (14..=22).contains(&num_fmt_id) || (45..=47).contains(&num_fmt_id)
}

/// Check if a format code string represents a date format.
///
/// Looks for d, m, y outside of `[...]` sections and quoted literals.
pub fn is_date_format_code(format_code: &str) -> bool {
    let mut in_bracket = false;
    let mut in_quote = false;
    let mut prev_char = '\0';

    for c in format_code.chars() {
        match c {
            '[' if !in_quote => in_bracket = true,
            ']' if !in_quote => in_bracket = false,
            '"' => in_quote = !in_quote,
            _ if !in_bracket && !in_quote && prev_char != '\\' => {
                match c.to_ascii_lowercase() {
                    'd' | 'y' => return true,
                    'm' => {
                        // 'm' is month next to a day/year token, minutes otherwise
                        let lower_prev = prev_char.to_ascii_lowercase();
                        if lower_prev == 'd' || lower_prev == 'y' {
                            return true;
                        }
                        let lower_format = format_code.to_lowercase();
                        if lower_format.contains('d') || lower_format.contains('y') {
                            return true;
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
        prev_char = c;
    }

    false
}

/// Convert an Excel serial date number to an ISO 8601 date string.
pub fn serial_to_date(serial: f64) -> Option<String> {
    // Excel date system: days since December 30, 1899
    // (Excel incorrectly treats 1900 as a leap year for Lotus 1-2-3 compatibility)
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }

    // Serial 60 = Feb 29, 1900 (doesn't exist)
    let adjusted_serial = if serial > 60.0 { serial - 1.0 } else { serial };
    let days = adjusted_serial.floor() as i64;

    let (year, month, day) = days_to_ymd(days)?;

    let time_fraction = serial.fract();
    if time_fraction > 0.0001 {
        let total_seconds = (time_fraction * 86400.0).round() as u32;
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;
        Some(format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            year, month, day, hours, minutes, seconds
        ))
    } else {
        Some(format!("{:04}-{:02}-{:02}", year, month, day))
    }
}

/// Convert days since December 31, 1899 to (year, month, day).
fn days_to_ymd(days: i64) -> Option<(i32, u32, u32)> {
    if days < 1 {
        return None;
    }

    let mut year = 1900;
    let mut remaining_days = days;

    loop {
        let days_in_year = if is_leap_year(year) { 366 } else { 365 };
        if remaining_days <= days_in_year {
            break;
        }
        remaining_days -= days_in_year;
        year += 1;
    }

    let months_days = if is_leap_year(year) {
        [31, 29, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    } else {
        [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31]
    };

    let mut month = 1u32;
    for &days_in_month in &months_days {
        if remaining_days <= days_in_month as i64 {
            break;
        }
        remaining_days -= days_in_month as i64;
        month += 1;
    }

    let day = remaining_days.max(1) as u32;

    Some((year, month, day))
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0)
}
