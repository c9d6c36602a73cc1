// Durable per-device preferences: feed order, per-feed item counts, theme.
// One JSON document per key under the state directory. Loads never fail the
// caller (corrupt documents read as empty) and saves never throw (the
// in-memory state the caller computed stays authoritative for the session).

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::error::DashboardError;
use crate::order::{decode_order_document, encode_order_document, OrderMap};

const FEED_ORDER_KEY: &str = "feed_order";
const FEED_COUNT_KEY: &str = "feed_item_counts";
const THEME_KEY: &str = "theme";

/// Items shown per feed card when no preference is stored.
pub const DEFAULT_FEED_COUNT: i64 = 10;

/// The selectable per-card item counts.
pub const COUNT_CHOICES: [i64; 10] = [3, 4, 5, 6, 7, 8, 9, 10, 15, 20];

pub const DEFAULT_THEME: &str = "warm-neutral";

pub type FeedCountPreference = HashMap<String, i64>;

pub struct PreferenceStore {
    dir: PathBuf,
}

impl PreferenceStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        PreferenceStore { dir: dir.into() }
    }

    /// Store rooted at the platform data directory.
    pub fn default_location() -> Self {
        let dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("feedboard");
        PreferenceStore::new(dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    // ------------------------------------------------------------------
    // Feed order
    // ------------------------------------------------------------------

    /// Load the persisted order map. Malformed per-feed entries are dropped
    /// (the normalizer re-defaults them); an unparsable document reads as
    /// empty.
    pub fn load_order(&self) -> OrderMap {
        let raw: HashMap<String, Value> = self.load_document(FEED_ORDER_KEY);
        let (map, malformed) = decode_order_document(&raw);
        for feed in malformed {
            warn!(%feed, "dropping malformed feed order entry");
        }
        map
    }

    pub fn save_order(&self, order: &OrderMap) {
        self.save_document(FEED_ORDER_KEY, &encode_order_document(order));
    }

    // ------------------------------------------------------------------
    // Item counts
    // ------------------------------------------------------------------

    pub fn load_counts(&self) -> FeedCountPreference {
        let raw: HashMap<String, Value> = self.load_document(FEED_COUNT_KEY);
        raw.into_iter()
            .filter_map(|(feed, value)| value.as_i64().map(|count| (feed, count)))
            .collect()
    }

    pub fn save_counts(&self, counts: &FeedCountPreference) {
        self.save_document(FEED_COUNT_KEY, counts);
    }

    /// Displayed item count for a feed: the stored value if positive, else
    /// the default of 10.
    pub fn feed_count(&self, feed: &str) -> i64 {
        match self.load_counts().get(feed) {
            Some(&count) if count > 0 => count,
            _ => DEFAULT_FEED_COUNT,
        }
    }

    pub fn set_feed_count(&self, feed: &str, count: i64) {
        let mut counts = self.load_counts();
        counts.insert(feed.to_string(), count);
        self.save_counts(&counts);
    }

    // ------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------

    pub fn load_theme(&self) -> String {
        let theme: String = self.load_document(THEME_KEY);
        if theme.is_empty() {
            DEFAULT_THEME.to_string()
        } else {
            theme
        }
    }

    pub fn save_theme(&self, theme: &str) {
        self.save_document(THEME_KEY, &theme.to_string());
    }

    // ------------------------------------------------------------------
    // Document plumbing
    // ------------------------------------------------------------------

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn load_document<T: serde::de::DeserializeOwned + Default>(&self, key: &str) -> T {
        let path = self.path_for(key);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            // Missing document is the normal first-run case.
            Err(_) => return T::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(parsed) => parsed,
            Err(err) => {
                let corrupt = DashboardError::StorageCorrupt {
                    key: key.to_string(),
                    reason: err.to_string(),
                };
                warn!(error = %corrupt, "treating persisted document as empty");
                T::default()
            }
        }
    }

    fn save_document<T: serde::Serialize>(&self, key: &str, value: &T) {
        let result = fs::create_dir_all(&self.dir)
            .map_err(|e| e.to_string())
            .and_then(|_| serde_json::to_string(value).map_err(|e| e.to_string()))
            .and_then(|json| fs::write(self.path_for(key), json).map_err(|e| e.to_string()));
        if let Err(reason) = result {
            let failed = DashboardError::StorageWriteFailed {
                key: key.to_string(),
                reason,
            };
            warn!(error = %failed, "preference write failed; in-memory state stays authoritative");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderEntry;
    use tempfile::TempDir;

    fn store() -> (TempDir, PreferenceStore) {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn missing_documents_read_as_defaults() {
        let (_dir, store) = store();
        assert!(store.load_order().is_empty());
        assert!(store.load_counts().is_empty());
        assert_eq!(store.load_theme(), DEFAULT_THEME);
        assert_eq!(store.feed_count("anything"), DEFAULT_FEED_COUNT);
    }

    #[test]
    fn order_round_trip() {
        let (_dir, store) = store();
        let mut order = OrderMap::new();
        order.insert("A".to_string(), OrderEntry::new(0, 0));
        order.insert("B".to_string(), OrderEntry::new(2, 5));
        store.save_order(&order);
        assert_eq!(store.load_order(), order);
    }

    #[test]
    fn corrupt_order_document_reads_as_empty() {
        let (_dir, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(store.dir().join("feed_order.json"), "{not json").unwrap();
        assert!(store.load_order().is_empty());
    }

    #[test]
    fn malformed_entry_is_dropped_but_others_survive() {
        let (_dir, store) = store();
        fs::create_dir_all(store.dir()).unwrap();
        fs::write(
            store.dir().join("feed_order.json"),
            r#"{"A": "bogus", "B": [1, 2]}"#,
        )
        .unwrap();
        let order = store.load_order();
        assert!(!order.contains_key("A"));
        assert_eq!(order.get("B"), Some(&OrderEntry::new(1, 2)));
    }

    #[test]
    fn count_round_trip_and_defaulting() {
        let (_dir, store) = store();
        store.set_feed_count("Lobsters", 15);
        assert_eq!(store.feed_count("Lobsters"), 15);

        // Non-positive stored counts fall back to the default.
        store.set_feed_count("Lobsters", 0);
        assert_eq!(store.feed_count("Lobsters"), DEFAULT_FEED_COUNT);
        store.set_feed_count("Lobsters", -4);
        assert_eq!(store.feed_count("Lobsters"), DEFAULT_FEED_COUNT);
    }

    #[test]
    fn save_counts_of_loaded_counts_is_a_noop() {
        let (_dir, store) = store();
        store.set_feed_count("A", 7);
        let counts = store.load_counts();
        store.save_counts(&counts);
        assert_eq!(store.load_counts(), counts);
    }

    #[test]
    fn theme_round_trip() {
        let (_dir, store) = store();
        store.save_theme("midnight");
        assert_eq!(store.load_theme(), "midnight");
    }

    #[test]
    fn write_failure_is_silent() {
        // A file where the directory should be makes every write fail.
        let dir = TempDir::new().unwrap();
        let blocked = dir.path().join("blocked");
        fs::write(&blocked, b"").unwrap();
        let store = PreferenceStore::new(&blocked);
        store.set_feed_count("A", 5); // must not panic
        assert_eq!(store.feed_count("A"), DEFAULT_FEED_COUNT);
    }
}
