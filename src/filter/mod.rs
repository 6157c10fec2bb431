//! Filter rule engine - rules, history, change notification

mod history;
mod manager;
mod notify;
mod preset;
mod serialize;

pub use history::HistoryStack;
pub use manager::RuleSetManager;
pub use notify::ChangeNotifier;
pub use preset::{PRESET_RECORD_SIZE, decode_preset, encode_preset};
pub use serialize::{deserialize, pretty_print, serialize};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of rules in a rule set.
pub const MAX_RULES: usize = 10;

/// Maximum raw text length in bytes.
pub const RAW_TEXT_MAX: usize = 255;

/// Delimiter between serialized rules. Stripped from raw text on entry.
pub(crate) const RULE_DELIMITER: char = '$';

/// Errors surfaced to the caller. Everything else (malformed persisted
/// fields, out-of-range indices on lookups) is recovered with defaults.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("rule limit reached ({0} rules maximum)")]
    CapacityExceeded(usize),

    #[error("preset record is truncated or malformed")]
    MalformedPreset,
}

/// The catalog attribute a rule constrains.
///
/// Ids are part of the persisted format; never renumber. Unknown ids load as
/// the generic [`PropertyKind::Text`] fallback so newer state files degrade
/// gracefully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyKind {
    Rating,
    Aperture,
    Exposure,
    Iso,
    FocalLength,
    AspectRatio,
    CaptureTime,
    Filename,
    Tag,
    ColorLabel,
    /// Generic free-text fallback for properties without a specialized adapter.
    Text,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 11] = [
        PropertyKind::Rating,
        PropertyKind::Aperture,
        PropertyKind::Exposure,
        PropertyKind::Iso,
        PropertyKind::FocalLength,
        PropertyKind::AspectRatio,
        PropertyKind::CaptureTime,
        PropertyKind::Filename,
        PropertyKind::Tag,
        PropertyKind::ColorLabel,
        PropertyKind::Text,
    ];

    /// Stable persisted id.
    pub fn id(self) -> u16 {
        match self {
            PropertyKind::Rating => 0,
            PropertyKind::Aperture => 1,
            PropertyKind::Exposure => 2,
            PropertyKind::Iso => 3,
            PropertyKind::FocalLength => 4,
            PropertyKind::AspectRatio => 5,
            PropertyKind::CaptureTime => 6,
            PropertyKind::Filename => 7,
            PropertyKind::Tag => 8,
            PropertyKind::ColorLabel => 9,
            PropertyKind::Text => 10,
        }
    }

    /// Decode a persisted id; unknown ids fall back to [`PropertyKind::Text`].
    pub fn from_id(id: u16) -> Self {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .unwrap_or(PropertyKind::Text)
    }

    /// Display name for history summaries and the CLI.
    pub fn display_name(self) -> &'static str {
        match self {
            PropertyKind::Rating => "rating",
            PropertyKind::Aperture => "aperture",
            PropertyKind::Exposure => "exposure",
            PropertyKind::Iso => "ISO",
            PropertyKind::FocalLength => "focal length",
            PropertyKind::AspectRatio => "aspect ratio",
            PropertyKind::CaptureTime => "capture time",
            PropertyKind::Filename => "filename",
            PropertyKind::Tag => "tag",
            PropertyKind::ColorLabel => "color label",
            PropertyKind::Text => "text",
        }
    }
}

impl std::str::FromStr for PropertyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|k| k.display_name().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| format!("unknown property: {}", s))
    }
}

impl std::fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// How a rule combines with the rules before it. Ignored for rule 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    #[default]
    And,
    Or,
    AndNot,
}

impl RuleOperator {
    pub fn id(self) -> u16 {
        match self {
            RuleOperator::And => 0,
            RuleOperator::Or => 1,
            RuleOperator::AndNot => 2,
        }
    }

    /// Decode a persisted id; unknown ids fall back to `And`.
    pub fn from_id(id: u16) -> Self {
        match id {
            1 => RuleOperator::Or,
            2 => RuleOperator::AndNot,
            _ => RuleOperator::And,
        }
    }

    /// Connective word used in history summaries.
    pub fn join_word(self) -> &'static str {
        match self {
            RuleOperator::And => "and",
            RuleOperator::Or => "or",
            RuleOperator::AndNot => "but not",
        }
    }
}

impl std::str::FromStr for RuleOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "and" => Ok(RuleOperator::And),
            "or" => Ok(RuleOperator::Or),
            "and-not" | "and_not" | "andnot" | "but-not" => Ok(RuleOperator::AndNot),
            _ => Err(format!("unknown operator: {}", s)),
        }
    }
}

/// One property constraint in a rule set.
///
/// A rule's index is its position in the owning [`RuleSetManager`]'s list;
/// rules never exist free-standing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    /// Which catalog attribute this rule constrains
    pub property: PropertyKind,

    /// Combination with the preceding rules (ignored for rule 0)
    #[serde(default)]
    pub operator: RuleOperator,

    /// A disabled rule is kept and displayed but excluded from the predicate
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Property-kind-specific encoded value; opaque to the engine
    #[serde(default)]
    pub raw_text: String,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    /// Create a fresh, enabled rule with empty text.
    pub fn new(property: PropertyKind) -> Self {
        Self {
            property,
            operator: RuleOperator::And,
            enabled: true,
            raw_text: String::new(),
        }
    }

    /// Bound text to [`RAW_TEXT_MAX`] bytes (on a char boundary) and strip
    /// the serialization delimiter.
    pub(crate) fn sanitize_text(text: &str) -> String {
        let mut out: String = text.chars().filter(|c| *c != RULE_DELIMITER).collect();
        if out.len() > RAW_TEXT_MAX {
            let mut cut = RAW_TEXT_MAX;
            while !out.is_char_boundary(cut) {
                cut -= 1;
            }
            out.truncate(cut);
        }
        out
    }
}

/// Sort field for the image grid. Only relevant to the engine through the
/// tag-order snapshot (rule 0 switching in or out of the tag property).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Filename,
    CaptureTime,
    Rating,
    Id,
    Aperture,
    Shuffle,
}

impl SortField {
    pub fn id(self) -> u16 {
        match self {
            SortField::Filename => 0,
            SortField::CaptureTime => 1,
            SortField::Rating => 2,
            SortField::Id => 3,
            SortField::Aperture => 4,
            SortField::Shuffle => 5,
        }
    }

    pub fn from_id(id: u16) -> Self {
        match id {
            1 => SortField::CaptureTime,
            2 => SortField::Rating,
            3 => SortField::Id,
            4 => SortField::Aperture,
            5 => SortField::Shuffle,
            _ => SortField::Filename,
        }
    }
}

/// Current sort order, encodable to a single integer for the snapshot key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortOrder {
    pub field: SortField,
    pub descending: bool,
}

/// High bit carrying the sort direction in the encoded form.
const ORDER_DESCENDING_FLAG: i64 = 1 << 15;

impl SortOrder {
    pub fn new(field: SortField, descending: bool) -> Self {
        Self { field, descending }
    }

    pub fn encode(self) -> i64 {
        i64::from(self.field.id()) | if self.descending { ORDER_DESCENDING_FLAG } else { 0 }
    }

    pub fn decode(value: i64) -> Self {
        Self {
            field: SortField::from_id((value & !ORDER_DESCENDING_FLAG) as u16),
            descending: value & ORDER_DESCENDING_FLAG != 0,
        }
    }
}
