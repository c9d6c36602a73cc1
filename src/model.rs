// Backend data contract.
// One JSON document from GET /api/dashboard; every top-level field is
// optional so a partial or malformed response degrades to empty sections
// instead of failing the whole render.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Accent used for a feed card when the backend supplies no color.
pub const DEFAULT_FEED_COLOR: &str = "#4ba6cd";

/// Identity fallback when a group carries neither source nor category.
pub const FALLBACK_FEED_KEY: &str = "Feed";

// ============================================================================
// DASHBOARD SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    #[serde(default)]
    pub feeds: Vec<FeedGroup>,

    #[serde(default)]
    pub stocks: Vec<StockQuote>,

    #[serde(default)]
    pub recommendations: Vec<RecommendedItem>,

    #[serde(default)]
    pub timezones: Vec<TimezoneEntry>,

    #[serde(default)]
    pub current_time: Option<DateTime<Utc>>,
}

impl DashboardData {
    /// True when there is nothing at all to render.
    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty() && self.stocks.is_empty() && self.recommendations.is_empty()
    }

    /// Live feed identities in backend response order.
    pub fn feed_keys(&self) -> Vec<String> {
        self.feeds.iter().map(|g| g.identity().to_string()).collect()
    }
}

// ============================================================================
// FEED GROUPS
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedGroup {
    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub color: String,

    #[serde(default)]
    pub site_url: String,

    #[serde(default)]
    pub items: Vec<FeedItem>,
}

impl FeedGroup {
    /// Identity key: source, else category, else a constant fallback.
    /// The engine does not validate uniqueness; duplicate keys collapse to
    /// one order-map entry (last write wins).
    pub fn identity(&self) -> &str {
        if !self.source.is_empty() {
            &self.source
        } else if !self.category.is_empty() {
            &self.category
        } else {
            FALLBACK_FEED_KEY
        }
    }

    pub fn accent(&self) -> &str {
        if self.color.is_empty() {
            DEFAULT_FEED_COLOR
        } else {
            &self.color
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub age: String,
}

impl FeedItem {
    /// Compact "12m ago" / "3h ago" / "2d ago" label.
    pub fn humanized_age(&self, now: DateTime<Utc>) -> String {
        let Some(published) = self.published_at else {
            return self.age.clone();
        };
        let diff = now.signed_duration_since(published);
        let minutes = diff.num_minutes().max(0);
        if minutes < 60 {
            return format!("{}m ago", minutes);
        }
        let hours = diff.num_hours();
        if hours < 24 {
            return format!("{}h ago", hours);
        }
        format!("{}d ago", diff.num_days())
    }

    /// Items older than a day render dimmed.
    pub fn is_old(&self, now: DateTime<Utc>) -> bool {
        match self.published_at {
            Some(published) => now.signed_duration_since(published).num_hours() >= 24,
            None => false,
        }
    }
}

// ============================================================================
// MARKETS
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    #[serde(default)]
    pub symbol: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub price: f64,

    #[serde(default)]
    pub change: f64,

    #[serde(default)]
    pub change_percent: f64,

    /// Last 7 days high/low trend.
    #[serde(default)]
    pub trend: Vec<i64>,

    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl StockQuote {
    pub fn has_quote(&self) -> bool {
        self.price > 0.0
    }

    /// "(+1.23 +0.45%)" with the sign repeated, as the web frontend shows it.
    pub fn change_label(&self) -> String {
        let sign = if self.change >= 0.0 { "+" } else { "" };
        format!(
            "({}{:.2} {}{:.2}%)",
            sign, self.change, sign, self.change_percent
        )
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneEntry {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub city: String,

    /// UTC offset as the backend ships it: "-8", "+5:30", "0".
    #[serde(default)]
    pub offset: String,
}

impl TimezoneEntry {
    pub fn is_valid(&self) -> bool {
        !self.name.is_empty() && !self.city.is_empty()
    }

    /// Offset in fractional hours. Unparseable offsets read as 0.
    pub fn offset_hours(&self) -> f64 {
        let raw = if self.offset.is_empty() { "0" } else { &self.offset };
        if let Some((h, m)) = raw.split_once(':') {
            let hours: f64 = h.parse().unwrap_or(0.0);
            let mins: f64 = m.parse().unwrap_or(0.0);
            let sign = if hours >= 0.0 { 1.0 } else { -1.0 };
            hours + (mins / 60.0) * sign
        } else {
            raw.parse().unwrap_or(0.0)
        }
    }

    /// "HH:MM" local wall time derived from the UTC clock and the offset.
    pub fn local_time(&self, now: DateTime<Utc>) -> String {
        use chrono::Timelike;
        let utc_hours = now.hour() as f64;
        let local_hours = ((utc_hours + self.offset_hours() + 24.0) % 24.0).floor() as u32;
        format!("{:02}:{:02}", local_hours, now.minute())
    }
}

// ============================================================================
// RECOMMENDATIONS
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedItem {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub link: String,

    #[serde(default)]
    pub age: String,

    #[serde(default)]
    pub source: String,

    /// ML ranking score in [0, 1].
    #[serde(default)]
    pub score: f64,

    /// Free-text explanation shown as a tooltip next to the score.
    #[serde(default)]
    pub reason: String,
}

impl RecommendedItem {
    pub fn score_percent(&self) -> i64 {
        (self.score * 100.0).round() as i64
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn identity_prefers_source_then_category() {
        let mut group = FeedGroup::default();
        assert_eq!(group.identity(), "Feed");

        group.category = "Tech".to_string();
        assert_eq!(group.identity(), "Tech");

        group.source = "Hacker News".to_string();
        assert_eq!(group.identity(), "Hacker News");
    }

    #[test]
    fn missing_top_level_fields_degrade_to_empty() {
        let data: DashboardData = serde_json::from_str("{}").unwrap();
        assert!(data.feeds.is_empty());
        assert!(data.stocks.is_empty());
        assert!(data.recommendations.is_empty());
        assert!(data.timezones.is_empty());
        assert!(data.is_empty());
    }

    #[test]
    fn feed_group_parses_backend_shape() {
        let json = r##"{
            "feeds": [
                {
                    "source": "Lobsters",
                    "category": "Tech",
                    "color": "#ff8800",
                    "siteUrl": "https://lobste.rs",
                    "items": [
                        {"title": "A post", "link": "https://example.com", "publishedAt": "2026-08-29T10:00:00Z"}
                    ]
                }
            ]
        }"##;
        let data: DashboardData = serde_json::from_str(json).unwrap();
        assert_eq!(data.feed_keys(), vec!["Lobsters".to_string()]);
        assert_eq!(data.feeds[0].accent(), "#ff8800");
        assert_eq!(data.feeds[0].site_url, "https://lobste.rs");
        assert!(data.feeds[0].items[0].published_at.is_some());
    }

    #[test]
    fn offset_parsing_handles_half_hours() {
        let tz = TimezoneEntry {
            name: "IST".to_string(),
            city: "Mumbai".to_string(),
            offset: "+5:30".to_string(),
        };
        assert!((tz.offset_hours() - 5.5).abs() < 1e-9);

        let tz = TimezoneEntry {
            offset: "-8".to_string(),
            ..tz
        };
        assert!((tz.offset_hours() + 8.0).abs() < 1e-9);
    }

    #[test]
    fn local_time_wraps_around_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 23, 15, 0).unwrap();
        let tz = TimezoneEntry {
            name: "JST".to_string(),
            city: "Tokyo".to_string(),
            offset: "+9".to_string(),
        };
        assert_eq!(tz.local_time(now), "08:15");
    }

    #[test]
    fn humanized_age_buckets() {
        let now = Utc.with_ymd_and_hms(2026, 8, 30, 12, 0, 0).unwrap();
        let item = |minutes_ago: i64| FeedItem {
            published_at: Some(now - chrono::Duration::minutes(minutes_ago)),
            ..FeedItem::default()
        };
        assert_eq!(item(12).humanized_age(now), "12m ago");
        assert_eq!(item(3 * 60).humanized_age(now), "3h ago");
        assert_eq!(item(50 * 60).humanized_age(now), "2d ago");
        assert!(item(25 * 60).is_old(now));
        assert!(!item(60).is_old(now));
    }

    #[test]
    fn score_percent_rounds() {
        let item = RecommendedItem {
            score: 0.876,
            ..RecommendedItem::default()
        };
        assert_eq!(item.score_percent(), 88);
    }
}
