// Order map: feed identity → (column, position).
// Persisted as `{ "<identity>": [column, position] }`. Entries are validated
// one at a time so a single bad value never discards the rest of the map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DashboardError;

/// Number of layout columns. Column indices are clamped into [0, COLUMNS-1]
/// at projection time only; stored entries keep whatever they were given.
pub const COLUMNS: usize = 3;

/// A feed's slot: column index and rank within the column. Positions need
/// not be contiguous or start at 0; ordering is plain numeric comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEntry {
    pub column: i64,
    pub position: i64,
}

impl OrderEntry {
    pub fn new(column: i64, position: i64) -> Self {
        OrderEntry { column, position }
    }

    /// Column index clamped into the renderable range.
    pub fn clamped_column(&self) -> usize {
        self.column.clamp(0, COLUMNS as i64 - 1) as usize
    }

    /// Accept a raw persisted value if it is an array of at least two finite
    /// numbers; anything else is a malformed entry for the normalizer to
    /// repair.
    pub fn from_value(feed: &str, value: &Value) -> Result<Self, DashboardError> {
        let malformed = || DashboardError::MalformedFeedEntry {
            feed: feed.to_string(),
        };
        let pair = value.as_array().ok_or_else(malformed)?;
        if pair.len() < 2 {
            return Err(malformed());
        }
        let column = number_as_i64(&pair[0]).ok_or_else(malformed)?;
        let position = number_as_i64(&pair[1]).ok_or_else(malformed)?;
        Ok(OrderEntry { column, position })
    }

    /// The on-disk `[column, position]` shape.
    pub fn to_value(&self) -> Value {
        Value::Array(vec![Value::from(self.column), Value::from(self.position)])
    }
}

fn number_as_i64(value: &Value) -> Option<i64> {
    // Accept integral and float JSON numbers; NaN/Infinity are not
    // representable in JSON so any f64 here is finite.
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}

pub type OrderMap = HashMap<String, OrderEntry>;

/// Decode a persisted order document, keeping well-formed entries and
/// reporting the identities whose entries were malformed.
pub fn decode_order_document(raw: &HashMap<String, Value>) -> (OrderMap, Vec<String>) {
    let mut map = OrderMap::new();
    let mut malformed = Vec::new();
    for (feed, value) in raw {
        match OrderEntry::from_value(feed, value) {
            Ok(entry) => {
                map.insert(feed.clone(), entry);
            }
            Err(_) => malformed.push(feed.clone()),
        }
    }
    (map, malformed)
}

/// Encode an order map back into the persisted document shape.
pub fn encode_order_document(map: &OrderMap) -> HashMap<String, Value> {
    map.iter()
        .map(|(feed, entry)| (feed.clone(), entry.to_value()))
        .collect()
}
