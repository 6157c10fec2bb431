//! Key-value persistence for filter state
//!
//! The filter engine never talks to the filesystem directly; everything goes
//! through the narrow [`ConfigStore`] interface. A missing key always means
//! "use the default", never an error.

mod toml_store;

pub use toml_store::TomlStore;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single persisted value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// Narrow key-value persistence interface consumed by the filter engine.
pub trait ConfigStore {
    fn get_int(&self, key: &str) -> Option<i64>;
    fn set_int(&mut self, key: &str, value: i64);

    fn get_string(&self, key: &str) -> Option<String>;
    fn set_string(&mut self, key: &str, value: &str);

    fn get_bool(&self, key: &str) -> Option<bool>;
    fn set_bool(&mut self, key: &str, value: bool);
}

/// In-memory store, used on its own in tests and as the backing map of
/// [`TomlStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(flatten)]
    entries: IndexMap<String, ConfigValue>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ConfigStore for MemoryStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        match self.entries.get(key)? {
            ConfigValue::Int(v) => Some(*v),
            // tolerate older files that stored numbers as text
            ConfigValue::Text(s) => s.trim().parse().ok(),
            ConfigValue::Bool(b) => Some(*b as i64),
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), ConfigValue::Int(value));
    }

    fn get_string(&self, key: &str) -> Option<String> {
        match self.entries.get(key)? {
            ConfigValue::Text(s) => Some(s.clone()),
            ConfigValue::Int(v) => Some(v.to_string()),
            ConfigValue::Bool(b) => Some(b.to_string()),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.entries
            .insert(key.to_string(), ConfigValue::Text(value.to_string()));
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        match self.entries.get(key)? {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::Int(v) => Some(*v != 0),
            ConfigValue::Text(s) => match s.as_str() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
        }
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.entries.insert(key.to_string(), ConfigValue::Bool(value));
    }
}

/// Shared single-threaded handle: lets the session and other collaborators
/// point at one store. Execution is cooperative (no locks needed), so
/// `Rc<RefCell<_>>` is the sharing primitive.
impl<S: ConfigStore> ConfigStore for std::rc::Rc<std::cell::RefCell<S>> {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.borrow().get_int(key)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.borrow_mut().set_int(key, value);
    }

    fn get_string(&self, key: &str) -> Option<String> {
        self.borrow().get_string(key)
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.borrow_mut().set_string(key, value);
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.borrow().get_bool(key)
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.borrow_mut().set_bool(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get_int("filters/num_rules"), None);
        assert_eq!(store.get_string("filters/string0"), None);
        assert_eq!(store.get_bool("filters/raw_text_0"), None);
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut store = MemoryStore::new();
        store.set_int("a", 42);
        store.set_string("b", "hello");
        store.set_bool("c", true);

        assert_eq!(store.get_int("a"), Some(42));
        assert_eq!(store.get_string("b"), Some("hello".to_string()));
        assert_eq!(store.get_bool("c"), Some(true));
    }

    #[test]
    fn test_lenient_type_coercion() {
        let mut store = MemoryStore::new();
        store.set_string("n", "7");
        assert_eq!(store.get_int("n"), Some(7));

        store.set_int("f", 0);
        assert_eq!(store.get_bool("f"), Some(false));
    }
}
