//! Free-text fallback adapter

use crate::filter::PropertyKind;

use super::{PropertyAdapter, PropertyValue, ValueSource, ValueSummary};

/// Pass-through codec for kinds whose values the engine treats as plain
/// text (tags, color labels, and the generic fallback).
pub struct TextAdapter {
    kind: PropertyKind,
}

impl TextAdapter {
    pub const fn new(kind: PropertyKind) -> Self {
        Self { kind }
    }
}

impl PropertyAdapter for TextAdapter {
    fn kind(&self) -> PropertyKind {
        self.kind
    }

    fn decode(&self, raw_text: &str) -> PropertyValue {
        if raw_text.is_empty() {
            PropertyValue::Empty
        } else {
            PropertyValue::Text(raw_text.to_string())
        }
    }

    fn encode(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::Text(text) => text.clone(),
            _ => String::new(),
        }
    }

    fn summary(&self, source: &dyn ValueSource) -> Option<ValueSummary> {
        let mut values = source.distinct_values(self.kind);
        if values.is_empty() {
            return None;
        }
        // alphabetical, the way tag and label pickers list them
        values.sort_by(|a, b| a.0.cmp(&b.0));
        Some(ValueSummary { values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_through() {
        let adapter = TextAdapter::new(PropertyKind::Tag);
        assert_eq!(
            adapter.decode("travel|iceland"),
            PropertyValue::Text("travel|iceland".to_string())
        );
        assert_eq!(adapter.encode(&adapter.decode("travel|iceland")), "travel|iceland");
        assert_eq!(adapter.decode(""), PropertyValue::Empty);
    }

    struct Labels;

    impl ValueSource for Labels {
        fn distinct_values(&self, _kind: PropertyKind) -> Vec<(String, u32)> {
            vec![("red".to_string(), 4), ("blue".to_string(), 9)]
        }
    }

    #[test]
    fn test_summary_sorted() {
        let adapter = TextAdapter::new(PropertyKind::ColorLabel);
        let summary = adapter.summary(&Labels).unwrap();
        assert_eq!(summary.values[0].0, "blue");
        assert_eq!(summary.values[1].0, "red");
    }
}
