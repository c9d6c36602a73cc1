// Feedboard - Core Library
// Feed layout & ordering engine plus the backend client and session state,
// exposed for the TUI binary and tests.

pub mod client;
pub mod drag;
pub mod error;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod order;
pub mod reorder;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use client::{DashboardClient, DEFAULT_BASE_URL};
pub use drag::{apply_intent, DragController, DropTarget, MoveIntent};
pub use error::{DashboardError, Result};
pub use layout::{project, DashboardLayout, FeedCard};
pub use model::{
    DashboardData, FeedGroup, FeedItem, RecommendedItem, StockQuote, TimezoneEntry,
};
pub use normalize::{normalize_feed_order, normalized};
pub use order::{OrderEntry, OrderMap, COLUMNS};
pub use reorder::{insert_before, move_to_column_end};
pub use session::{ErrorOverlay, Session};
pub use store::{FeedCountPreference, PreferenceStore, COUNT_CHOICES, DEFAULT_FEED_COUNT};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
