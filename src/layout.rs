// Layout projection: turn live feed groups plus the normalized order map
// into three render-ready columns. Rendering-agnostic; the TUI consumes the
// view-models produced here.

use crate::model::FeedGroup;
use crate::order::{OrderEntry, OrderMap, COLUMNS};
use crate::store::{FeedCountPreference, DEFAULT_FEED_COUNT};

/// One feed card, ready to draw.
#[derive(Debug, Clone)]
pub struct FeedCard {
    pub key: String,
    pub title: String,
    pub accent: String,
    pub site_url: String,
    /// Items already truncated to the per-feed count preference.
    pub items: Vec<crate::model::FeedItem>,
    pub item_count: i64,
    pub column: usize,
    position: i64,
}

/// Three ordered card sequences, one per column index 0-2.
#[derive(Debug, Clone, Default)]
pub struct DashboardLayout {
    pub columns: [Vec<FeedCard>; COLUMNS],
}

impl DashboardLayout {
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Card keys of one column, top to bottom.
    pub fn column_keys(&self, column: usize) -> Vec<&str> {
        self.columns[column]
            .iter()
            .map(|card| card.key.as_str())
            .collect()
    }
}

fn count_for(counts: &FeedCountPreference, key: &str) -> i64 {
    match counts.get(key) {
        Some(&count) if count > 0 => count,
        _ => DEFAULT_FEED_COUNT,
    }
}

/// Project feed groups into columns. Column indices are clamped into [0,2]
/// here, so out-of-range persisted columns degrade gracefully instead of
/// being dropped. Returns `None` when there are no feed groups at all: an
/// explicit no-data state rather than an empty layout.
pub fn project(
    feeds: &[FeedGroup],
    order: &OrderMap,
    counts: &FeedCountPreference,
) -> Option<DashboardLayout> {
    if feeds.is_empty() {
        return None;
    }

    let mut layout = DashboardLayout::default();
    for group in feeds {
        let key = group.identity().to_string();
        let entry = order
            .get(&key)
            .copied()
            .unwrap_or(OrderEntry::new(0, 0));
        let column = entry.clamped_column();
        let item_count = count_for(counts, &key);
        let items = group
            .items
            .iter()
            .take(item_count.max(0) as usize)
            .cloned()
            .collect();
        layout.columns[column].push(FeedCard {
            title: key.clone(),
            key,
            accent: group.accent().to_string(),
            site_url: group.site_url.clone(),
            items,
            item_count,
            column,
            position: entry.position,
        });
    }

    // Stable sort: equal positions keep backend response order.
    for column in layout.columns.iter_mut() {
        column.sort_by_key(|card| card.position);
    }

    Some(layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FeedItem;
    use crate::normalize::normalized;
    use crate::reorder::{insert_before, move_to_column_end};

    fn group(source: &str) -> FeedGroup {
        FeedGroup {
            source: source.to_string(),
            ..FeedGroup::default()
        }
    }

    fn group_with_items(source: &str, n: usize) -> FeedGroup {
        let mut g = group(source);
        g.items = (0..n)
            .map(|i| FeedItem {
                title: format!("{source} item {i}"),
                ..FeedItem::default()
            })
            .collect();
        g
    }

    fn live_keys(feeds: &[FeedGroup]) -> Vec<String> {
        feeds.iter().map(|g| g.identity().to_string()).collect()
    }

    #[test]
    fn no_feeds_is_an_explicit_no_data_state() {
        assert!(project(&[], &OrderMap::new(), &FeedCountPreference::new()).is_none());
    }

    #[test]
    fn normalized_five_feeds_project_balanced() {
        let feeds: Vec<FeedGroup> = ["A", "B", "C", "D", "E"].iter().map(|s| group(s)).collect();
        let (order, _) = normalized(&live_keys(&feeds), &OrderMap::new());
        let layout = project(&feeds, &order, &FeedCountPreference::new()).unwrap();
        assert_eq!(layout.column_keys(0), vec!["A", "B"]);
        assert_eq!(layout.column_keys(1), vec!["C", "D"]);
        assert_eq!(layout.column_keys(2), vec!["E"]);
    }

    #[test]
    fn insert_before_lands_immediately_before_target() {
        let feeds: Vec<FeedGroup> = ["A", "B", "C"].iter().map(|s| group(s)).collect();
        let live = live_keys(&feeds);
        let mut order = OrderMap::new();
        order.insert("A".to_string(), OrderEntry::new(0, 0));
        order.insert("B".to_string(), OrderEntry::new(0, 1));
        order.insert("C".to_string(), OrderEntry::new(1, 0));

        let order = insert_before(&order, &live, "C", "B");
        let layout = project(&feeds, &order, &FeedCountPreference::new()).unwrap();
        assert_eq!(layout.column_keys(0), vec!["A", "C", "B"]);
        assert!(layout.column_keys(1).is_empty());
    }

    #[test]
    fn move_to_column_end_projects_strictly_last() {
        let feeds: Vec<FeedGroup> = ["A", "B", "C", "D"].iter().map(|s| group(s)).collect();
        let live = live_keys(&feeds);
        let (order, _) = normalized(&live, &OrderMap::new());

        let order = move_to_column_end(&order, &live, "A", 1);
        let layout = project(&feeds, &order, &FeedCountPreference::new()).unwrap();
        let col1 = layout.column_keys(1);
        assert_eq!(col1.last(), Some(&"A"));
        assert!(!layout.column_keys(0).contains(&"A"));
    }

    #[test]
    fn out_of_range_columns_clamp_instead_of_dropping() {
        let feeds = vec![group("A"), group("B")];
        let mut order = OrderMap::new();
        order.insert("A".to_string(), OrderEntry::new(9, 0));
        order.insert("B".to_string(), OrderEntry::new(-2, 0));
        let layout = project(&feeds, &order, &FeedCountPreference::new()).unwrap();
        assert_eq!(layout.column_keys(2), vec!["A"]);
        assert_eq!(layout.column_keys(0), vec!["B"]);
        assert_eq!(layout.card_count(), 2);
    }

    #[test]
    fn duplicate_positions_keep_backend_order() {
        let feeds = vec![group("A"), group("B"), group("C")];
        let mut order = OrderMap::new();
        order.insert("A".to_string(), OrderEntry::new(0, 1));
        order.insert("B".to_string(), OrderEntry::new(0, 1));
        order.insert("C".to_string(), OrderEntry::new(0, 0));
        let layout = project(&feeds, &order, &FeedCountPreference::new()).unwrap();
        assert_eq!(layout.column_keys(0), vec!["C", "A", "B"]);
    }

    #[test]
    fn stale_order_entries_are_invisible() {
        let feeds = vec![group("A")];
        let mut order = OrderMap::new();
        order.insert("A".to_string(), OrderEntry::new(0, 0));
        order.insert("Gone".to_string(), OrderEntry::new(1, 0));
        let layout = project(&feeds, &order, &FeedCountPreference::new()).unwrap();
        assert_eq!(layout.card_count(), 1);
        assert!(layout.column_keys(1).is_empty());
    }

    #[test]
    fn items_truncate_to_count_preference() {
        let feeds = vec![group_with_items("A", 20)];
        let mut counts = FeedCountPreference::new();
        counts.insert("A".to_string(), 5);
        let (order, _) = normalized(&live_keys(&feeds), &OrderMap::new());

        let layout = project(&feeds, &order, &counts).unwrap();
        assert_eq!(layout.columns[0][0].items.len(), 5);
        assert_eq!(layout.columns[0][0].item_count, 5);

        // No preference: default of 10.
        let layout = project(&feeds, &order, &FeedCountPreference::new()).unwrap();
        assert_eq!(layout.columns[0][0].items.len(), 10);
        assert_eq!(layout.columns[0][0].item_count, DEFAULT_FEED_COUNT);
    }

    #[test]
    fn missing_order_entry_projects_to_origin() {
        let feeds = vec![group("A")];
        let layout = project(&feeds, &OrderMap::new(), &FeedCountPreference::new()).unwrap();
        assert_eq!(layout.column_keys(0), vec!["A"]);
    }
}
