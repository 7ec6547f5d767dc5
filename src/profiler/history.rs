//! Ordered, deduplicating storage for history records.

use std::collections::BTreeSet;
use std::mem;

use parking_lot::Mutex;

/// Ascending set of history records shared between the partition thread
/// and the reporting thread.
///
/// Every lock hold is an O(log n) insert, a pointer-sized swap, or a bulk
/// copy for the non-destructive snapshot path; exported sets are iterated
/// outside the lock. A record whose sort key equals one already present is
/// silently dropped.
pub(crate) struct History<T> {
    records: Mutex<BTreeSet<T>>,
}

impl<T: Ord + Clone> History<T> {
    pub(crate) fn new() -> Self {
        Self {
            records: Mutex::new(BTreeSet::new()),
        }
    }

    /// Inserts `record`, keeping ascending order. Fire-and-forget.
    pub(crate) fn insert(&self, record: T) {
        self.records.lock().insert(record);
    }

    /// Takes the current contents, leaving the history empty.
    ///
    /// The swap is atomic with respect to concurrent inserts: a racing
    /// insert lands either in the returned sequence or in the fresh set,
    /// never both and never neither.
    pub(crate) fn export_and_clear(&self) -> Vec<T> {
        let drained = mem::take(&mut *self.records.lock());
        drained.into_iter().collect()
    }

    /// Ascending copy of the current contents.
    pub(crate) fn snapshot(&self) -> Vec<T> {
        self.records.lock().iter().cloned().collect()
    }

    pub(crate) fn clear(&self) {
        self.records.lock().clear();
    }
}
