// Order normalization: reconcile the live feed list against whatever order
// map was persisted. Unseen feeds get a balanced default slot; stale entries
// for feeds no longer live are retained (projection ignores them).

use tracing::debug;

use crate::order::{OrderEntry, OrderMap, COLUMNS};
use crate::store::PreferenceStore;

/// Default slot for the feed at list index `i` of `n`: the list is split
/// into three `ceil(n/3)`-sized groups in backend order, one group per
/// column.
pub fn default_slot(i: usize, n: usize) -> OrderEntry {
    let per_column = n.div_ceil(COLUMNS).max(1);
    OrderEntry::new((i / per_column) as i64, (i % per_column) as i64)
}

/// Pure normalization step. Returns the reconciled map and whether it
/// differs from `existing` (i.e. whether a write-back is due). Well-formed
/// persisted entries are kept verbatim, including out-of-range columns;
/// only missing (or malformed, dropped at load) entries get defaults.
pub fn normalized(live_keys: &[String], existing: &OrderMap) -> (OrderMap, bool) {
    let mut result = existing.clone();
    let n = live_keys.len();
    for (i, key) in live_keys.iter().enumerate() {
        if !result.contains_key(key) {
            result.insert(key.clone(), default_slot(i, n));
        }
    }
    let changed = result != *existing;
    (result, changed)
}

/// Normalize against the store, persisting the corrected map immediately
/// when anything changed. This is the only path that writes defaults back
/// to storage.
pub fn normalize_feed_order(live_keys: &[String], store: &PreferenceStore) -> OrderMap {
    let existing = store.load_order();
    let (result, changed) = normalized(live_keys, &existing);
    if changed {
        debug!(feeds = live_keys.len(), "persisting normalized feed order");
        store.save_order(&result);
    }
    result
}
