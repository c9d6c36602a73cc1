// Session state: the single-slot cache of the last successful snapshot plus
// the error-overlay lifecycle. Owned by the top-level controller and passed
// into handlers explicitly; re-projections triggered by local preference
// changes read the cached snapshot with no network round-trip.

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use crate::error::DashboardError;
use crate::model::DashboardData;

/// Cadence of the background refresh, in seconds.
pub const REFRESH_INTERVAL_SECS: i64 = 5 * 60;

/// How long a dismissable overlay stays up before clearing itself.
pub const OVERLAY_AUTO_DISMISS_SECS: i64 = 10;

pub fn refresh_interval() -> Duration {
    Duration::seconds(REFRESH_INTERVAL_SECS)
}

/// Shown under a sticky overlay when no data has ever loaded.
pub const REMEDIATION_HINTS: [&str; 4] = [
    "Backend server is running on port 8080",
    "config.yaml is properly configured",
    "Finnhub API key is set (if using stock data)",
    "RSS feed URLs are accessible",
];

/// Non-blocking failure notice drawn on top of the previous layout.
#[derive(Debug, Clone)]
pub struct ErrorOverlay {
    pub message: String,
    /// `None` means sticky: no cached data exists, so the overlay stays up
    /// with remediation hints until a refresh succeeds.
    pub auto_dismiss_at: Option<DateTime<Utc>>,
}

impl ErrorOverlay {
    pub fn is_sticky(&self) -> bool {
        self.auto_dismiss_at.is_none()
    }
}

#[derive(Debug, Default)]
pub struct Session {
    data: Option<DashboardData>,
    overlay: Option<ErrorOverlay>,
    last_attempt: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    /// The cached snapshot, if any refresh ever succeeded.
    pub fn data(&self) -> Option<&DashboardData> {
        self.data.as_ref()
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn overlay(&self) -> Option<&ErrorOverlay> {
        self.overlay.as_ref()
    }

    /// Record the outcome of a refresh. Success replaces the snapshot and
    /// clears any overlay; failure keeps the previous snapshot visible and
    /// raises an overlay that auto-dismisses only when cached data exists.
    pub fn apply_fetch(
        &mut self,
        result: Result<DashboardData, DashboardError>,
        now: DateTime<Utc>,
    ) {
        self.last_attempt = Some(now);
        match result {
            Ok(data) => {
                info!(feeds = data.feeds.len(), "dashboard refreshed");
                self.data = Some(data);
                self.overlay = None;
            }
            Err(err) => {
                warn!(error = %err, cached = self.has_data(), "dashboard refresh failed");
                let auto_dismiss_at = self
                    .has_data()
                    .then(|| now + Duration::seconds(OVERLAY_AUTO_DISMISS_SECS));
                self.overlay = Some(ErrorOverlay {
                    message: err.to_string(),
                    auto_dismiss_at,
                });
            }
        }
    }

    /// Expire an auto-dismissable overlay once its deadline passes.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if let Some(overlay) = &self.overlay {
            if matches!(overlay.auto_dismiss_at, Some(at) if now >= at) {
                self.overlay = None;
            }
        }
    }

    /// Manual close (the overlay's close button).
    pub fn dismiss_overlay(&mut self) {
        self.overlay = None;
    }

    /// True when the next scheduled refresh is due.
    pub fn refresh_due(&self, now: DateTime<Utc>) -> bool {
        match self.last_attempt {
            Some(at) => now - at >= refresh_interval(),
            None => true,
        }
    }
}
