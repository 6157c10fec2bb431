//! Property adapters - per-kind value codecs and the dispatch registry
//!
//! The engine stores a rule's value as opaque raw text; adapters give that
//! text meaning at the UI boundary. Each property kind maps to exactly one
//! adapter; kinds without a specialized one fall back to free text.

mod date;
mod filename;
mod range;
mod rating;
mod text;

pub use date::DateAdapter;
pub use filename::FilenameAdapter;
pub use range::RangeAdapter;
pub use rating::{Comparator, RatingAdapter};
pub use text::TextAdapter;

use crate::filter::PropertyKind;
use chrono::NaiveDateTime;

/// Decoded, UI-facing form of a rule's raw text.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// No constraint yet
    Empty,
    /// Star rating comparison (`stars == -1` means rejected)
    Rating { comparator: Comparator, stars: i32 },
    /// Numeric range with optional bounds
    Range { min: Option<f64>, max: Option<f64> },
    /// Capture time range with optional bounds
    DateRange {
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    },
    /// Filename pattern split into name and extension parts
    Name { name: String, extension: String },
    /// Opaque text (fallback kinds, or unparsable input kept verbatim)
    Text(String),
}

/// Distinct values with occurrence counts, sourced from the catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueSummary {
    pub values: Vec<(String, u32)>,
}

/// Catalog-side collaborator feeding value-domain summaries. The engine
/// never queries the catalog itself.
pub trait ValueSource {
    fn distinct_values(&self, kind: PropertyKind) -> Vec<(String, u32)>;
}

/// Value codec for one property kind.
///
/// `decode` is total: input it cannot parse comes back as
/// [`PropertyValue::Text`] with the bytes preserved, so nothing is lost in
/// transit. `encode(decode(raw))` yields the canonical spelling.
pub trait PropertyAdapter {
    fn kind(&self) -> PropertyKind;

    /// Produce a fresh value representation from raw text.
    fn decode(&self, raw_text: &str) -> PropertyValue;

    /// Convert a value change back into raw text.
    fn encode(&self, value: &PropertyValue) -> String;

    /// Value-domain summary for pickers and histograms.
    fn summary(&self, source: &dyn ValueSource) -> Option<ValueSummary> {
        let values = source.distinct_values(self.kind());
        if values.is_empty() {
            None
        } else {
            Some(ValueSummary { values })
        }
    }
}

static RATING: RatingAdapter = RatingAdapter;
static APERTURE: RangeAdapter = RangeAdapter::new(PropertyKind::Aperture);
static EXPOSURE: RangeAdapter = RangeAdapter::new(PropertyKind::Exposure);
static ISO: RangeAdapter = RangeAdapter::new(PropertyKind::Iso);
static FOCAL_LENGTH: RangeAdapter = RangeAdapter::new(PropertyKind::FocalLength);
static ASPECT_RATIO: RangeAdapter = RangeAdapter::new(PropertyKind::AspectRatio);
static CAPTURE_TIME: DateAdapter = DateAdapter;
static FILENAME: FilenameAdapter = FilenameAdapter;
static TAG: TextAdapter = TextAdapter::new(PropertyKind::Tag);
static COLOR_LABEL: TextAdapter = TextAdapter::new(PropertyKind::ColorLabel);
static TEXT: TextAdapter = TextAdapter::new(PropertyKind::Text);

/// Look up the adapter for a property kind.
pub fn adapter_for(kind: PropertyKind) -> &'static dyn PropertyAdapter {
    match kind {
        PropertyKind::Rating => &RATING,
        PropertyKind::Aperture => &APERTURE,
        PropertyKind::Exposure => &EXPOSURE,
        PropertyKind::Iso => &ISO,
        PropertyKind::FocalLength => &FOCAL_LENGTH,
        PropertyKind::AspectRatio => &ASPECT_RATIO,
        PropertyKind::CaptureTime => &CAPTURE_TIME,
        PropertyKind::Filename => &FILENAME,
        PropertyKind::Tag => &TAG,
        PropertyKind::ColorLabel => &COLOR_LABEL,
        PropertyKind::Text => &TEXT,
    }
}
