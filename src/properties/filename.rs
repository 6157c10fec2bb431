//! Filename adapter

use crate::filter::PropertyKind;

use super::{PropertyAdapter, PropertyValue};

/// Codec for filename constraints of the form `name/ext` (either side
/// optional, e.g. `IMG_%/jpg` or `50/jpg`). Wildcards in either part pass
/// through untouched; matching happens in the query engine.
pub struct FilenameAdapter;

impl PropertyAdapter for FilenameAdapter {
    fn kind(&self) -> PropertyKind {
        PropertyKind::Filename
    }

    fn decode(&self, raw_text: &str) -> PropertyValue {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return PropertyValue::Empty;
        }

        let (name, extension) = match trimmed.split_once('/') {
            Some((name, ext)) => (name, ext),
            None => (trimmed, ""),
        };
        PropertyValue::Name {
            name: name.to_string(),
            extension: extension.to_string(),
        }
    }

    fn encode(&self, value: &PropertyValue) -> String {
        match value {
            PropertyValue::Name { name, extension } => {
                if extension.is_empty() {
                    name.clone()
                } else {
                    format!("{}/{}", name, extension)
                }
            }
            PropertyValue::Text(text) => text.clone(),
            _ => String::new(),
        }
    }
}
