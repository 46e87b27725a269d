//! Shared HTTP client and runtime.
//!
//! Uses async reqwest internally but presents a sync interface: callers
//! block on the shared runtime for each request, matching the pipeline's
//! strictly sequential control flow.

use std::sync::LazyLock;
use std::time::Duration;

/// Connect timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Overall per-request timeout (connect + headers + body)
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Shared HTTP client with connection pooling.
static SHARED_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("failed to build HTTP client")
});

/// Get shared HTTP client.
pub fn http_client() -> &'static reqwest::Client {
    &SHARED_CLIENT
}

/// Shared tokio runtime for HTTP operations.
pub static SHARED_RUNTIME: LazyLock<tokio::runtime::Runtime> = LazyLock::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
});
