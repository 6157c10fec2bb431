//! Viewfinder - composable rule-based filtering for photo catalogs
//!
//! Builds a compound filter over a catalog by combining up to ten property
//! rules (rating, exposure, filename, capture date, ...) with logical
//! operators, keeps a deduplicating history of past filters for one-click
//! recall, and persists everything through a narrow key-value store.

pub mod filter;
pub mod properties;
pub mod session;
pub mod store;

pub use filter::{
    FilterError, HistoryStack, MAX_RULES, PropertyKind, RAW_TEXT_MAX, Rule, RuleOperator,
    RuleSetManager, SortField, SortOrder,
};
pub use properties::{PropertyAdapter, PropertyValue, adapter_for};
pub use session::FilterSession;
pub use store::{ConfigStore, MemoryStore, TomlStore};

/// Current version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
