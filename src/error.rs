// Error taxonomy for the dashboard engine.
// Nothing here is fatal to the app: storage errors are recovered locally,
// backend errors surface as an overlay on top of the previous layout.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
    /// Persisted JSON that no longer parses. Callers treat the document as
    /// empty and let normalization rebuild defaults.
    #[error("corrupt persisted state in {key}: {reason}")]
    StorageCorrupt { key: String, reason: String },

    /// A save that could not complete (disk full, serialization). The
    /// in-memory state stays authoritative for the session.
    #[error("failed to persist {key}: {reason}")]
    StorageWriteFailed { key: String, reason: String },

    /// Fetch failure, timeout, or non-2xx status from the backend.
    #[error("dashboard backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    /// A persisted order entry that is not a `[column, position]` pair.
    /// Repaired to a computed default by the normalizer.
    #[error("malformed order entry for feed {feed}")]
    MalformedFeedEntry { feed: String },
}

impl DashboardError {
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DashboardError;

    #[test]
    fn backend_error_carries_reason() {
        let err = DashboardError::backend("connection refused");
        assert_eq!(
            err.to_string(),
            "dashboard backend unavailable: connection refused"
        );
    }
}
