// Backend HTTP client. One endpoint: GET {base}/api/dashboard returning the
// full dashboard snapshot. Transport errors, timeouts, and non-2xx statuses
// all collapse into BackendUnavailable; the session layer decides how to
// surface that.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::error::{DashboardError, Result};
use crate::model::DashboardData;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub struct DashboardClient {
    base_url: String,
    http: Client,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| DashboardError::backend(err.to_string()))?;
        Ok(DashboardClient {
            base_url: base_url.into(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn dashboard_url(&self) -> String {
        format!("{}/api/dashboard", self.base_url.trim_end_matches('/'))
    }

    /// Fetch the current snapshot. A response that is not parseable JSON of
    /// the expected shape counts as the backend being unavailable too.
    pub fn fetch(&self) -> Result<DashboardData> {
        let response = self
            .http
            .get(self.dashboard_url())
            .send()
            .map_err(|err| DashboardError::backend(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::backend(format!("HTTP {}", status.as_u16())));
        }

        response
            .json::<DashboardData>()
            .map_err(|err| DashboardError::backend(format!("bad response body: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_url_tolerates_trailing_slash() {
        let client = DashboardClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.dashboard_url(), "http://localhost:8080/api/dashboard");

        let client = DashboardClient::new("https://dash.example.com").unwrap();
        assert_eq!(
            client.dashboard_url(),
            "https://dash.example.com/api/dashboard"
        );
    }
}
