//! Numeric range adapter (aperture, exposure, ISO, focal length, aspect ratio)

use crate::filter::PropertyKind;

use super::{PropertyAdapter, PropertyValue};

/// Codec for `[min;max]` ranges with either bound optional, or a bare number
/// for an exact match. One instance per numeric property kind.
pub struct RangeAdapter {
    kind: PropertyKind,
}

impl RangeAdapter {
    pub const fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }
}

impl PropertyAdapter for RangeAdapter {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn decode(&self, raw_text: &str) -> PropertyValue {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return PropertyValue::Empty;
        }

        if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            if let Some((lo, hi)) = inner.split_once(';') {
                let min = parse_bound(lo);
                let max = parse_bound(hi);
                let lo_ok = lo.trim().is_empty() || min.is_some();
                let hi_ok = hi.trim().is_empty() || max.is_some();
                if lo_ok && hi_ok && (min.is_some() || max.is_some()) {
                    return PropertyValue::Range { min, max };
                }
            }
            return PropertyValue::Text(raw_text.to_string());
        }

        match trimmed.parse::<f64>() {
            Ok(v) => PropertyValue::Range {
                min: Some(v),
                max: Some(v),
            },
            Err(_) => PropertyValue::Text(raw_text.to_string()),
        }
    }

    fn encode(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::Range { min, max } => match (min, max) {
                (Some(lo), Some(hi)) if lo == hi => format_number(*lo),
                (lo, hi) => format!(
                    "[{};{}]",
                    lo.map(format_number).unwrap_or_default(),
                    hi.map(format_number).unwrap_or_default()
                ),
            },
            PropertyValue::Text(text) => text.clone(),
            _ => String::new(),
        }
    }
}

fn parse_bound(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        text.parse().ok()
    }
}

/// Trim trailing zeros so `2.0` prints as `2` but `1.4` stays `1.4`.
fn format_number(v: f64) -> String {
    if v == v.trunc() && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}
