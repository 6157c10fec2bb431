//! Star rating adapter

use serde::{Deserialize, Serialize};

use crate::filter::PropertyKind;

use super::{PropertyAdapter, PropertyValue};

/// Comparison operator in a rating constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Comparator {
    GreaterOrEqual,
    LessOrEqual,
    #[default]
    Equal,
    Greater,
    Less,
    NotEqual,
}

impl Comparator {
    pub fn symbol(self) -> &'static str {
        match self {
            Comparator::GreaterOrEqual => ">=",
            Comparator::LessOrEqual => "<=",
            Comparator::Equal => "=",
            Comparator::Greater => ">",
            Comparator::Less => "<",
            Comparator::NotEqual => "!=",
        }
    }

    /// Split a leading comparator off the text. Two-char symbols first so
    /// `>=` never parses as `>` followed by `=2`.
    fn strip(text: &str) -> (Self, &str) {
        for comparator in [
            Comparator::GreaterOrEqual,
            Comparator::LessOrEqual,
            Comparator::NotEqual,
            Comparator::Greater,
            Comparator::Less,
            Comparator::Equal,
        ] {
            if let Some(rest) = text.strip_prefix(comparator.symbol()) {
                return (comparator, rest);
            }
        }
        (Comparator::Equal, text)
    }
}

/// Codec for rating constraints like `>=2`, `!=0` or a bare `3`.
/// `-1` means rejected.
pub struct RatingAdapter;

impl PropertyAdapter for RatingAdapter {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Rating
    }

    fn decode(&self, raw_text: &str) -> PropertyValue {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return PropertyValue::Empty;
        }

        let (comparator, rest) = Comparator::strip(trimmed);
        match rest.trim().parse::<i32>() {
            Ok(stars) if (-1..=5).contains(&stars) => PropertyValue::Rating { comparator, stars },
            _ => PropertyValue::Text(raw_text.to_string()),
        }
    }

    fn encode(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::Rating { comparator, stars } => {
                format!("{}{}", comparator.symbol(), stars)
            }
            PropertyValue::Text(text) => text.clone(),
            _ => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_comparators() {
        let adapter = RatingAdapter;
        assert_eq!(
            adapter.decode(">=2"),
            PropertyValue::Rating {
                comparator: Comparator::GreaterOrEqual,
                stars: 2
            }
        );
        assert_eq!(
            adapter.decode("!=0"),
            PropertyValue::Rating {
                comparator: Comparator::NotEqual,
                stars: 0
            }
        );
        assert_eq!(
            adapter.decode("3"),
            PropertyValue::Rating {
                comparator: Comparator::Equal,
                stars: 3
            }
        );
    }

    #[test]
    fn test_rejected_is_minus_one() {
        let adapter = RatingAdapter;
        assert_eq!(
            adapter.decode("=-1"),
            PropertyValue::Rating {
                comparator: Comparator::Equal,
                stars: -1
            }
        );
    }

    #[test]
    fn test_unparsable_kept_verbatim() {
        let adapter = RatingAdapter;
        assert_eq!(
            adapter.decode(">=lots"),
            PropertyValue::Text(">=lots".to_string())
        );
        assert_eq!(adapter.decode("9"), PropertyValue::Text("9".to_string()));
    }

    #[test]
    fn test_encode_is_canonical() {
        let adapter = RatingAdapter;
        // bare numbers canonicalize to an explicit '='
        assert_eq!(adapter.encode(&adapter.decode("2")), "=2");
        assert_eq!(adapter.encode(&adapter.decode(">=2")), ">=2");
        assert_eq!(adapter.encode(&PropertyValue::Empty), "");
    }
}
