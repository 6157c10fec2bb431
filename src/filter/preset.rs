//! Preset interchange record
//!
//! A rule set travels between installations as a fixed-size little-endian
//! record: a `u32` count, then `MAX_RULES` slots of
//! `(item: u16, mode: u16, off: u16, text: [u8; 256])` with NUL-padded text.
//! Field order and widths are part of the format and must round-trip.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{FilterError, MAX_RULES, PropertyKind, Rule, RuleOperator};

/// Per-slot text field size (255 text bytes + NUL padding).
const SLOT_TEXT_SIZE: usize = 256;

/// Bytes per slot: three u16 fields plus the text block.
const SLOT_SIZE: usize = 6 + SLOT_TEXT_SIZE;

/// Total record size: count field plus all slots, populated or not.
pub const PRESET_RECORD_SIZE: usize = 4 + MAX_RULES * SLOT_SIZE;

/// Encode the active rules into a preset record. Inactive slots are zeroed.
pub fn encode_preset(rules: &[Rule]) -> Bytes {
    let count = rules.len().min(MAX_RULES);
    let mut buf = BytesMut::with_capacity(PRESET_RECORD_SIZE);

    buf.put_u32_le(count as u32);
    for rule in &rules[..count] {
        buf.put_u16_le(rule.property.id());
        buf.put_u16_le(rule.operator.id());
        buf.put_u16_le(u16::from(!rule.enabled));

        // sanitized text is always in bounds; clamp anyway so a hand-built
        // rule cannot corrupt the slot layout
        let text = rule.raw_text.as_bytes();
        let text = &text[..text.len().min(SLOT_TEXT_SIZE - 1)];
        buf.put_slice(text);
        buf.put_bytes(0, SLOT_TEXT_SIZE - text.len());
    }
    buf.put_bytes(0, (MAX_RULES - count) * SLOT_SIZE);

    buf.freeze()
}

/// Decode a preset record. Slots beyond the count field are ignored.
pub fn decode_preset(record: &[u8]) -> Result<Vec<Rule>, FilterError> {
    if record.len() != PRESET_RECORD_SIZE {
        return Err(FilterError::MalformedPreset);
    }

    let mut buf = record;
    let count = (buf.get_u32_le() as usize).min(MAX_RULES);

    let mut rules = Vec::with_capacity(count);
    for _ in 0..count {
        let item = buf.get_u16_le();
        let mode = buf.get_u16_le();
        let off = buf.get_u16_le();

        let text_block = &buf[..SLOT_TEXT_SIZE];
        let end = text_block.iter().position(|&b| b == 0).unwrap_or(SLOT_TEXT_SIZE);
        let text = String::from_utf8_lossy(&text_block[..end]);
        buf.advance(SLOT_TEXT_SIZE);

        rules.push(Rule {
            property: PropertyKind::from_id(item),
            operator: RuleOperator::from_id(mode),
            enabled: off == 0,
            raw_text: Rule::sanitize_text(&text),
        });
    }

    Ok(rules)
}
