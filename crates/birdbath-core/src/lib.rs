//! Birdbath Core - shared infrastructure for the tweet hydration pipeline
//!
//! This crate provides the reusable pieces of the pipeline: run-state
//! reconciliation, batched CSV persistence, the failure log, retry and
//! pacing policies, and the shared HTTP client.

pub mod error;
pub mod http;
pub mod ledger;
pub mod logging;
pub mod pacer;
pub mod progress;
pub mod retry;
pub mod sink;

// Re-exports for convenience
pub use error::FetchError;
pub use http::{SHARED_RUNTIME, http_client};
pub use logging::{DualLogger, init_logging};
pub use pacer::Pacer;
pub use progress::{ProgressContext, SharedProgress, fmt_num};
pub use retry::{RetryPolicy, retry_with_policy};
pub use sink::{CsvBatchWriter, FailureLog};
