// Reorder engine: the two drag-drop outcomes as pure transforms over the
// order map. No I/O here; callers persist the returned map.

use crate::order::{OrderEntry, OrderMap};

/// Entry used for a live feed the map does not know yet.
fn resolve(order: &OrderMap, feed: &str) -> OrderEntry {
    order.get(feed).copied().unwrap_or(OrderEntry::new(0, 0))
}

/// Move `feed` to the last position of `column`: one past the greatest
/// position currently held by any other live feed in that column. An empty
/// column yields position 0.
pub fn move_to_column_end(
    order: &OrderMap,
    live_keys: &[String],
    feed: &str,
    column: i64,
) -> OrderMap {
    let max_position = live_keys
        .iter()
        .filter(|key| key.as_str() != feed)
        .map(|key| resolve(order, key))
        .filter(|entry| entry.column == column)
        .map(|entry| entry.position)
        .max()
        .unwrap_or(-1);

    let mut result = order.clone();
    result.insert(feed.to_string(), OrderEntry::new(column, max_position + 1));
    result
}

/// Insert `feed` immediately before `target`: the dragged feed takes over
/// the target's exact slot and every live feed in that column at or after
/// it shifts right by one. Positions need not be contiguous; the shift is
/// open-ended. Dropping a feed on itself is a no-op.
pub fn insert_before(
    order: &OrderMap,
    live_keys: &[String],
    feed: &str,
    target: &str,
) -> OrderMap {
    let mut result = order.clone();
    if feed == target {
        return result;
    }

    let target_entry = resolve(order, target);

    // Live feeds sharing the target's column, dragged feed excluded,
    // position ascending (stable for ties).
    let mut column_feeds: Vec<(&String, OrderEntry)> = live_keys
        .iter()
        .filter(|key| key.as_str() != feed)
        .map(|key| (key, resolve(order, key)))
        .filter(|(_, entry)| entry.column == target_entry.column)
        .collect();
    column_feeds.sort_by_key(|(_, entry)| entry.position);

    for (key, entry) in column_feeds {
        if entry.position >= target_entry.position {
            result.insert(
                key.clone(),
                OrderEntry::new(target_entry.column, entry.position + 1),
            );
        }
    }

    result.insert(
        feed.to_string(),
        OrderEntry::new(target_entry.column, target_entry.position),
    );
    result
}
