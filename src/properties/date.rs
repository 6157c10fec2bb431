//! Capture time adapter

use chrono::{NaiveDate, NaiveDateTime};

use crate::filter::PropertyKind;

use super::{PropertyAdapter, PropertyValue};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Codec for capture time constraints: `[start;end]` with either bound
/// optional, or a single date/datetime for that exact day or second.
/// A bare `YYYY-MM-DD` expands to the whole day.
pub struct DateAdapter;

impl PropertyAdapter for DateAdapter {
    fn kind(&self) -> PropertyKind {
        PropertyKind::CaptureTime
    }

    fn decode(&self, raw_text: &str) -> PropertyValue {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return PropertyValue::Empty;
        }

        if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            if let Some((lo, hi)) = inner.split_once(';') {
                let start = parse_bound(lo, false);
                let end = parse_bound(hi, true);
                let lo_ok = lo.trim().is_empty() || start.is_some();
                let hi_ok = hi.trim().is_empty() || end.is_some();
                if lo_ok && hi_ok && (start.is_some() || end.is_some()) {
                    return PropertyValue::DateRange { start, end };
                }
            }
            return PropertyValue::Text(raw_text.to_string());
        }

        // a single date covers the whole day, a single datetime that second
        if let Some(start) = parse_stamp(trimmed, false) {
            let end = parse_stamp(trimmed, true);
            return PropertyValue::DateRange {
                start: Some(start),
                end,
            };
        }
        PropertyValue::Text(raw_text.to_string())
    }

    fn encode(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::DateRange { start, end } => format!(
                "[{};{}]",
                start.map(|t| t.format(DATETIME_FORMAT).to_string()).unwrap_or_default(),
                end.map(|t| t.format(DATETIME_FORMAT).to_string()).unwrap_or_default()
            ),
            PropertyValue::Text(text) => text.clone(),
            _ => String::new(),
        }
    }
}

fn parse_bound(text: &str, end_of_day: bool) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        parse_stamp(text, end_of_day)
    }
}

fn parse_stamp(text: &str, end_of_day: bool) -> Option<NaiveDateTime> {
    if let Ok(stamp) = NaiveDateTime::parse_from_str(text, DATETIME_FORMAT) {
        return Some(stamp);
    }
    let date = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
    if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).unwrap()
    }

    #[test]
    fn test_decode_range() {
        let value = DateAdapter.decode("[2023-06-01 10:00:00;2023-06-30 18:30:00]");
        assert_eq!(
            value,
            PropertyValue::DateRange {
                start: Some(stamp("2023-06-01 10:00:00")),
                end: Some(stamp("2023-06-30 18:30:00")),
            }
        );
    }

    #[test]
    fn test_decode_date_only_bounds() {
        let value = DateAdapter.decode("[2023-06-01;2023-06-30]");
        assert_eq!(
            value,
            PropertyValue::DateRange {
                start: Some(stamp("2023-06-01 00:00:00")),
                end: Some(stamp("2023-06-30 23:59:59")),
            }
        );
    }

    #[test]
    fn test_decode_single_day() {
        let value = DateAdapter.decode("2023-06-01");
        assert_eq!(
            value,
            PropertyValue::DateRange {
                start: Some(stamp("2023-06-01 00:00:00")),
                end: Some(stamp("2023-06-01 23:59:59")),
            }
        );
    }

    #[test]
    fn test_decode_open_end() {
        let value = DateAdapter.decode("[2023-06-01;]");
        assert_eq!(
            value,
            PropertyValue::DateRange {
                start: Some(stamp("2023-06-01 00:00:00")),
                end: None,
            }
        );
    }

    #[test]
    fn test_unparsable_kept_verbatim() {
        assert_eq!(
            DateAdapter.decode("last tuesday"),
            PropertyValue::Text("last tuesday".to_string())
        );
        assert_eq!(
            DateAdapter.decode("[2023-13-99;]"),
            PropertyValue::Text("[2023-13-99;]".to_string())
        );
    }

    #[test]
    fn test_encode_round_trip() {
        let raw = "[2023-06-01 10:00:00;2023-06-30 18:30:00]";
        assert_eq!(DateAdapter.encode(&DateAdapter.decode(raw)), raw);
    }
}
