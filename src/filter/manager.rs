//! Rule set management - the ordered, bounded rule list and its persistence

use tracing::{debug, trace, warn};

use crate::store::ConfigStore;

use super::{
    ChangeNotifier, FilterError, HistoryStack, MAX_RULES, PropertyKind, Rule, RuleOperator,
    SortOrder, serialize,
};

/// Owns the active rule set, persists every committed mutation to the
/// config store, records it in the history stack and signals the downstream
/// query engine through the [`ChangeNotifier`].
///
/// Rules are identified by their position in the list; indices stay
/// contiguous across removals.
pub struct RuleSetManager {
    store: Box<dyn ConfigStore>,
    rules: Vec<Rule>,
    history: HistoryStack,
    notifier: ChangeNotifier,
    sort: SortOrder,
}

impl RuleSetManager {
    /// Load the rule set, history and sort order from the store.
    ///
    /// Malformed or missing slots default to an enabled rating rule with
    /// empty text; the rule count is clamped to `[0, MAX_RULES]`.
    pub fn load(store: Box<dyn ConfigStore>) -> Self {
        let count = store
            .get_int("filters/num_rules")
            .unwrap_or(0)
            .clamp(0, MAX_RULES as i64) as usize;

        let mut rules = Vec::with_capacity(count);
        for i in 0..count {
            rules.push(Self::load_slot(store.as_ref(), i));
        }

        let sort = store
            .get_int("filters/sort")
            .map(SortOrder::decode)
            .unwrap_or_default();

        let history = HistoryStack::load(store.as_ref());
        debug!("loaded {} rules, {} history entries", rules.len(), history.len());

        Self {
            store,
            rules,
            history,
            notifier: ChangeNotifier::new(),
            sort,
        }
    }

    fn load_slot(store: &dyn ConfigStore, index: usize) -> Rule {
        let item = store
            .get_int(&format!("filters/item{}", index))
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(0);
        let mode = store
            .get_int(&format!("filters/mode{}", index))
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(0);
        let off = store
            .get_int(&format!("filters/off{}", index))
            .unwrap_or(0);
        let text = store
            .get_string(&format!("filters/string{}", index))
            .unwrap_or_default();

        Rule {
            property: PropertyKind::from_id(item),
            operator: RuleOperator::from_id(mode),
            enabled: off == 0,
            raw_text: Rule::sanitize_text(&text),
        }
    }

    // --- accessors -------------------------------------------------------

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn nb_rules(&self) -> usize {
        self.rules.len()
    }

    pub fn rule(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    /// The ordered sequence handed to the query engine. Rule 0's operator is
    /// ignored there; rule i (i >= 1) combines with the left-fold of rules
    /// 0..i-1 per its own operator, and disabled rules are skipped.
    pub fn combined_state(&self) -> &[Rule] {
        &self.rules
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    /// Canonical serialized form of the current rule set.
    pub fn serialize(&self) -> String {
        serialize::serialize(&self.rules)
    }

    // --- notification ----------------------------------------------------

    /// Register the downstream rebuild callback.
    pub fn on_rebuild(&mut self, listener: impl FnMut() + 'static) {
        self.notifier.on_rebuild(listener);
    }

    /// Defer rebuild signals until the matching [`Self::end_batch`].
    pub fn begin_batch(&mut self) {
        self.notifier.begin_batch();
    }

    pub fn end_batch(&mut self) {
        self.notifier.end_batch();
    }

    // --- mutation --------------------------------------------------------

    /// Append a fresh rule for `property` (operator `and`, enabled, empty
    /// text). Fails with [`FilterError::CapacityExceeded`] at the cap.
    pub fn append(&mut self, property: PropertyKind) -> Result<(), FilterError> {
        if self.rules.len() >= MAX_RULES {
            warn!("cannot add more than {} rules", MAX_RULES);
            return Err(FilterError::CapacityExceeded(MAX_RULES));
        }

        let index = self.rules.len();
        self.rules.push(Rule::new(property));
        self.save_slot(index);
        self.store.set_int("filters/num_rules", self.rules.len() as i64);
        self.bump_usage(property);

        debug!("appended {} rule at index {}", property, index);
        self.commit();
        Ok(())
    }

    /// Remove the rule at `index`, shifting later rules down by one so
    /// indices stay contiguous. Out-of-range is a logged no-op.
    pub fn remove(&mut self, index: usize) {
        if index >= self.rules.len() {
            warn!("remove: no rule at index {}", index);
            return;
        }

        self.rules.remove(index);
        // rewrite the shifted tail; the slot past the end goes stale but is
        // masked by num_rules
        for i in index..self.rules.len() {
            self.save_slot(i);
        }
        self.store.set_int("filters/num_rules", self.rules.len() as i64);

        debug!("removed rule {}, {} remaining", index, self.rules.len());
        self.commit();
    }

    /// Change which property a rule constrains. No-op if unchanged.
    ///
    /// The raw text is reset so a stale value from the previous property
    /// never leaks into the new adapter. Switching rule 0 into the tag
    /// property snapshots the global sort order; switching it back out
    /// restores the snapshot.
    pub fn set_property(&mut self, index: usize, property: PropertyKind) {
        let Some(rule) = self.rules.get_mut(index) else {
            warn!("set_property: no rule at index {}", index);
            return;
        };
        let previous = rule.property;
        if previous == property {
            return;
        }

        rule.property = property;
        rule.raw_text.clear();
        self.save_slot(index);
        self.bump_usage(property);

        if index == 0 {
            self.handle_tag_order(previous, property);
        }

        self.commit();
    }

    /// Set how the rule combines with the rules before it.
    pub fn set_operator(&mut self, index: usize, operator: RuleOperator) {
        let Some(rule) = self.rules.get_mut(index) else {
            warn!("set_operator: no rule at index {}", index);
            return;
        };
        rule.operator = operator;
        self.save_slot(index);
        self.commit();
    }

    /// Enable or disable a rule without removing it.
    pub fn set_enabled(&mut self, index: usize, enabled: bool) {
        let Some(rule) = self.rules.get_mut(index) else {
            warn!("set_enabled: no rule at index {}", index);
            return;
        };
        rule.enabled = enabled;
        self.save_slot(index);
        self.commit();
    }

    /// Set a rule's encoded value. The text is bounded to 255 bytes and
    /// stripped of the serialization delimiter; it is otherwise opaque here.
    pub fn set_raw_text(&mut self, index: usize, text: &str) {
        let Some(rule) = self.rules.get_mut(index) else {
            warn!("set_raw_text: no rule at index {}", index);
            return;
        };
        rule.raw_text = Rule::sanitize_text(text);
        self.save_slot(index);
        self.commit();
    }

    /// Replace the whole rule set in one batch (history recall, preset
    /// import). Fires a single rebuild signal.
    pub fn replace_all(&mut self, rules: Vec<Rule>) {
        self.begin_batch();

        self.rules = rules;
        self.rules.truncate(MAX_RULES);
        // Rule fields are public, so incoming text may carry the delimiter
        // or exceed the byte bound; serialization totality depends on it
        for rule in &mut self.rules {
            rule.raw_text = Rule::sanitize_text(&rule.raw_text);
        }
        for i in 0..self.rules.len() {
            self.save_slot(i);
        }
        self.store.set_int("filters/num_rules", self.rules.len() as i64);
        self.commit();

        self.end_batch();
    }

    /// Recall a past rule set. Out-of-range or empty entries are silently
    /// ignored.
    pub fn apply_history(&mut self, index: usize) {
        let Some(line) = self.history.get(index) else {
            trace!("apply_history: no entry at index {}", index);
            return;
        };
        if line.is_empty() {
            return;
        }
        let rules = serialize::deserialize(line);
        debug!("recalling history entry {} ({} rules)", index, rules.len());
        self.replace_all(rules);
    }

    /// Set the grid sort order. While a tag filter drives rule 0 the order
    /// belongs to that tag, so it is mirrored to the tag-order key; the
    /// global snapshot in `filters/order` stays untouched.
    pub fn set_sort(&mut self, sort: SortOrder) {
        if self.sort == sort {
            return;
        }
        self.sort = sort;
        self.store.set_int("filters/sort", sort.encode());
        if self.rules.first().is_some_and(|r| r.property == PropertyKind::Tag) {
            self.store.set_int("filters/tag_order", sort.encode());
        }
        self.notifier.notify();
    }

    // --- per-property bookkeeping ----------------------------------------

    /// How often a property was picked; drives popup ordering in the UI.
    pub fn usage_count(&self, property: PropertyKind) -> i64 {
        self.store
            .get_int(&format!("filters/nb_use_{}", property.id()))
            .unwrap_or(0)
    }

    /// Per-property "prefer raw text entry over the specialized widget"
    /// flag. Persisted here, consumed only by the UI layer.
    pub fn prefer_raw_text(&self, property: PropertyKind) -> bool {
        self.store
            .get_bool(&format!("filters/raw_text_{}", property.id()))
            .unwrap_or(false)
    }

    pub fn set_prefer_raw_text(&mut self, property: PropertyKind, prefer: bool) {
        self.store
            .set_bool(&format!("filters/raw_text_{}", property.id()), prefer);
    }

    // --- internals -------------------------------------------------------

    /// Persist, record history, signal. Every committed mutation ends here.
    fn commit(&mut self) {
        let serialized = serialize::serialize(&self.rules);
        self.history.push(&serialized, self.store.as_mut());
        self.notifier.notify();
    }

    fn save_slot(&mut self, index: usize) {
        let rule = &self.rules[index];
        self.store
            .set_int(&format!("filters/item{}", index), i64::from(rule.property.id()));
        self.store
            .set_int(&format!("filters/mode{}", index), i64::from(rule.operator.id()));
        self.store
            .set_int(&format!("filters/off{}", index), i64::from(!rule.enabled));
        self.store
            .set_string(&format!("filters/string{}", index), &rule.raw_text);
    }

    fn bump_usage(&mut self, property: PropertyKind) {
        let key = format!("filters/nb_use_{}", property.id());
        let count = self.store.get_int(&key).unwrap_or(0);
        self.store.set_int(&key, count + 1);
    }

    /// One-shot side effect when rule 0 switches in or out of the tag
    /// property: the tag brings its own image order, so the global sort
    /// order is stashed before it is superseded and restored afterwards.
    fn handle_tag_order(&mut self, previous: PropertyKind, current: PropertyKind) {
        if previous != PropertyKind::Tag && current == PropertyKind::Tag {
            self.store.set_int("filters/order", self.sort.encode());
            debug!("tag filter active, sort order snapshotted");
        } else if previous == PropertyKind::Tag && current != PropertyKind::Tag {
            if let Some(saved) = self.store.get_int("filters/order") {
                self.sort = SortOrder::decode(saved);
                self.store.set_int("filters/sort", saved);
                debug!("tag filter gone, sort order restored");
            }
        }
    }
}
