//! Filter session - the long-lived object tying the engine together

use tracing::debug;

use crate::filter::{
    FilterError, PropertyKind, Rule, RuleSetManager, decode_preset, encode_preset,
};
use crate::store::ConfigStore;

/// One user-visible filtering session: the rule set manager plus preset
/// interchange. Collaborators (UI layer, query engine) receive a reference
/// to this object explicitly; there is no global instance.
pub struct FilterSession {
    manager: RuleSetManager,
}

impl FilterSession {
    /// Open a session on a store, loading rules, history and sort order.
    pub fn open(store: Box<dyn ConfigStore>) -> Self {
        Self {
            manager: RuleSetManager::load(store),
        }
    }

    pub fn manager(&self) -> &RuleSetManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut RuleSetManager {
        &mut self.manager
    }

    /// Export the current rule set as a preset record.
    pub fn export_preset(&self) -> bytes::Bytes {
        encode_preset(self.manager.rules())
    }

    /// Replace the current rule set from a preset record. One rebuild
    /// signal fires for the whole import.
    pub fn import_preset(&mut self, record: &[u8]) -> Result<(), FilterError> {
        let rules = decode_preset(record)?;
        debug!("importing preset with {} rules", rules.len());
        self.manager.replace_all(rules);
        Ok(())
    }

    /// Apply one of the built-in presets by name.
    pub fn apply_builtin_preset(&mut self, name: &str) -> bool {
        let Some((_, rules)) = builtin_presets().into_iter().find(|(n, _)| *n == name) else {
            return false;
        };
        self.manager.replace_all(rules);
        true
    }
}

/// Factory presets offered out of the box.
pub fn builtin_presets() -> Vec<(&'static str, Vec<Rule>)> {
    let rule = |property, text: &str| Rule {
        raw_text: text.to_string(),
        ..Rule::new(property)
    };

    vec![
        (
            "rating: all except rejected",
            vec![rule(PropertyKind::Rating, ">=0")],
        ),
        ("rating: two stars", vec![rule(PropertyKind::Rating, ">=2")]),
        (
            "color label: red",
            vec![rule(PropertyKind::ColorLabel, "red")],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::RuleOperator;
    use crate::store::MemoryStore;

    fn session() -> FilterSession {
        FilterSession::open(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_preset_export_import_round_trip() {
        let mut source = session();
        source.manager_mut().append(PropertyKind::Rating).unwrap();
        source.manager_mut().set_raw_text(0, ">=2");
        source.manager_mut().append(PropertyKind::Iso).unwrap();
        source.manager_mut().set_operator(1, RuleOperator::Or);
        let record = source.export_preset();

        let mut target = session();
        target.import_preset(&record).unwrap();

        assert_eq!(target.manager().rules(), source.manager().rules());
    }

    #[test]
    fn test_import_rejects_malformed_record() {
        let mut s = session();
        assert!(matches!(
            s.import_preset(&[1, 2, 3]),
            Err(FilterError::MalformedPreset)
        ));
        assert_eq!(s.manager().nb_rules(), 0);
    }

    #[test]
    fn test_builtin_preset_apply() {
        let mut s = session();
        assert!(s.apply_builtin_preset("rating: two stars"));
        assert_eq!(s.manager().nb_rules(), 1);
        assert_eq!(s.manager().rule(0).unwrap().raw_text, ">=2");

        assert!(!s.apply_builtin_preset("no such preset"));
    }

    #[test]
    fn test_builtin_presets_fit_in_a_record() {
        for (name, rules) in builtin_presets() {
            let record = encode_preset(&rules);
            assert_eq!(decode_preset(&record).unwrap(), rules, "preset {}", name);
        }
    }
}
