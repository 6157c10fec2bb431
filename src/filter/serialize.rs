//! Canonical textual form of a rule set
//!
//! Format: `{n}:` followed by one `{mode}:{item}:{off}:{text}$` record per
//! rule. The same string is used for persistence and for history
//! comparisons, so it must be a pure function of the rule values.

use tracing::trace;

use super::{MAX_RULES, PropertyKind, Rule, RuleOperator};

/// Serialize a rule set. Total: raw text is sanitized at entry, so the
/// delimiter cannot occur inside a record.
pub fn serialize(rules: &[Rule]) -> String {
    let mut out = format!("{}:", rules.len());
    for rule in rules {
        out.push_str(&format!(
            "{}:{}:{}:{}$",
            rule.operator.id(),
            rule.property.id(),
            u16::from(!rule.enabled),
            rule.raw_text,
        ));
    }
    out
}

/// Deserialize a rule set, best-effort.
///
/// Stops at the first unparsable record and keeps whatever parsed before it;
/// never fails. The declared count is clamped to [`MAX_RULES`] and to the
/// number of records actually present.
pub fn deserialize(input: &str) -> Vec<Rule> {
    let Some((count, rest)) = input.split_once(':') else {
        return Vec::new();
    };
    let Ok(count) = count.trim().parse::<usize>() else {
        trace!("unparsable rule count in {:?}", input);
        return Vec::new();
    };
    let count = count.min(MAX_RULES);

    let mut rules = Vec::with_capacity(count);
    for record in rest.split_terminator('$').take(count) {
        let Some(rule) = parse_record(record) else {
            trace!("stopping at unparsable rule record {:?}", record);
            break;
        };
        rules.push(rule);
    }
    rules
}

fn parse_record(record: &str) -> Option<Rule> {
    let mut parts = record.splitn(4, ':');
    let mode: u16 = parts.next()?.trim().parse().ok()?;
    let item: u16 = parts.next()?.trim().parse().ok()?;
    let off: u16 = parts.next()?.trim().parse().ok()?;
    let text = parts.next()?;

    Some(Rule {
        property: PropertyKind::from_id(item),
        operator: RuleOperator::from_id(mode),
        enabled: off == 0,
        raw_text: Rule::sanitize_text(text),
    })
}

/// Human readable one-line summary of a serialized rule set, for history
/// menus: `rating >=2 and filename IMG_%/jpg (off)`.
pub fn pretty_print(serialized: &str) -> String {
    let rules = deserialize(serialized);
    let mut out = String::new();
    for (i, rule) in rules.iter().enumerate() {
        if i > 0 {
            out.push(' ');
            out.push_str(rule.operator.join_word());
            out.push(' ');
        }
        out.push_str(rule.property.display_name());
        if !rule.raw_text.is_empty() {
            out.push(' ');
            out.push_str(&rule.raw_text);
        }
        if !rule.enabled {
            out.push_str(" (off)");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rules() -> Vec<Rule> {
        vec![
            Rule {
                property: PropertyKind::Rating,
                operator: RuleOperator::And,
                enabled: true,
                raw_text: ">=2".to_string(),
            },
            Rule {
                property: PropertyKind::Filename,
                operator: RuleOperator::Or,
                enabled: false,
                raw_text: "IMG_%/jpg".to_string(),
            },
            Rule {
                property: PropertyKind::Iso,
                operator: RuleOperator::AndNot,
                enabled: true,
                raw_text: "[100;800]".to_string(),
            },
        ]
    }

    #[test]
    fn test_serialized_form_is_exact() {
        let rules = sample_rules();
        assert_eq!(
            serialize(&rules),
            "3:0:0:0:>=2$1:7:1:IMG_%/jpg$2:3:0:[100;800]$"
        );
    }

    #[test]
    fn test_round_trip() {
        for n in 0..=sample_rules().len() {
            let rules = sample_rules()[..n].to_vec();
            assert_eq!(deserialize(&serialize(&rules)), rules);
        }
    }

    #[test]
    fn test_empty_set() {
        assert_eq!(serialize(&[]), "0:");
        assert_eq!(deserialize("0:"), Vec::new());
    }

    #[test]
    fn test_deserialize_garbage() {
        assert_eq!(deserialize(""), Vec::new());
        assert_eq!(deserialize("not a rule set"), Vec::new());
        assert_eq!(deserialize("2"), Vec::new());
    }

    #[test]
    fn test_deserialize_stops_at_corrupt_record() {
        // second record is missing fields; the first survives
        let rules = deserialize("2:0:0:0:>=2$0:junk$");
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].raw_text, ">=2");
    }

    #[test]
    fn test_deserialize_truncated_input_keeps_prefix() {
        let full = serialize(&sample_rules());
        // cut mid-way through the second record
        let cut = &full[..full.find("IMG").unwrap()];
        let rules = deserialize(cut);
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].property, PropertyKind::Rating);
        assert_eq!(rules[1].raw_text, "");
    }

    #[test]
    fn test_deserialize_clamps_count() {
        let mut input = format!("{}:", MAX_RULES + 5);
        for _ in 0..MAX_RULES + 5 {
            input.push_str("0:0:0:x$");
        }
        assert_eq!(deserialize(&input).len(), MAX_RULES);
    }

    #[test]
    fn test_unknown_property_id_degrades_to_text() {
        let rules = deserialize("1:0:99:0:whatever$");
        assert_eq!(rules[0].property, PropertyKind::Text);
    }

    #[test]
    fn test_pretty_print() {
        let s = serialize(&sample_rules());
        assert_eq!(
            pretty_print(&s),
            "rating >=2 or filename IMG_%/jpg (off) but not ISO [100;800]"
        );
    }
}
