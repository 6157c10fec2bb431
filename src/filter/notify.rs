//! Rebuild-signal batching

use tracing::trace;

/// Coalesces "query needs rebuild" signals.
///
/// Outside a batch every committed mutation fires the listener once,
/// synchronously but only after the mutation itself has finished. Inside a
/// batch signals are deferred; `end_batch` fires at most one. Batches nest.
///
/// The listener cannot capture the manager mutably, so a rebuild can never
/// re-enter an in-flight mutation.
#[derive(Default)]
pub struct ChangeNotifier {
    batch_depth: u32,
    pending: bool,
    listener: Option<Box<dyn FnMut()>>,
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("batch_depth", &self.batch_depth)
            .field("pending", &self.pending)
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the downstream rebuild callback, replacing any previous one.
    pub fn on_rebuild(&mut self, listener: impl FnMut() + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Open a batch; signals are deferred until the matching `end_batch`.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Close a batch. At depth zero, fires once if anything notified during
    /// the batch, zero times otherwise.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            trace!("end_batch without begin_batch");
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 && self.pending {
            self.pending = false;
            self.fire();
        }
    }

    /// Signal that a committed mutation happened.
    pub fn notify(&mut self) {
        if self.batch_depth > 0 {
            self.pending = true;
        } else {
            self.fire();
        }
    }

    fn fire(&mut self) {
        trace!("firing rebuild signal");
        if let Some(listener) = &mut self.listener {
            listener();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counted() -> (ChangeNotifier, Rc<Cell<usize>>) {
        let count = Rc::new(Cell::new(0));
        let mut notifier = ChangeNotifier::new();
        let c = count.clone();
        notifier.on_rebuild(move || c.set(c.get() + 1));
        (notifier, count)
    }

    #[test]
    fn test_fires_outside_batch() {
        let (mut notifier, count) = counted();
        notifier.notify();
        notifier.notify();
        assert_eq!(count.get(), 2);
    }

    #[test]
    fn test_batch_coalesces_to_one() {
        let (mut notifier, count) = counted();
        notifier.begin_batch();
        notifier.notify();
        notifier.notify();
        assert_eq!(count.get(), 0);
        notifier.end_batch();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_empty_batch_fires_nothing() {
        let (mut notifier, count) = counted();
        notifier.begin_batch();
        notifier.end_batch();
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_nested_batches_fire_once_at_outermost() {
        let (mut notifier, count) = counted();
        notifier.begin_batch();
        notifier.notify();
        notifier.begin_batch();
        notifier.notify();
        notifier.end_batch();
        assert_eq!(count.get(), 0);
        notifier.end_batch();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unbalanced_end_batch_is_harmless() {
        let (mut notifier, count) = counted();
        notifier.end_batch();
        notifier.notify();
        assert_eq!(count.get(), 1);
    }
}
