//! HTTP client construction.

use std::time::Duration;

/// Build an HTTP client with the per-request timeout applied.
pub(super) fn build_http_client(timeout: Duration) -> reqwest::Client {
    // Fall back to reqwest defaults if builder creation fails for any reason.
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
