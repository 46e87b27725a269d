//! Birdbath X - platform client for tweet hydration
//!
//! This crate provides the platform-facing half of the pipeline:
//! session establishment (cookie reuse or login), the single-status
//! endpoint, the per-id fetcher with bounded retry, and the run
//! orchestration that wires everything to the core sinks.

pub mod api;
pub mod fetcher;
pub mod record;
pub mod runner;
pub mod session;
pub mod stats;

// Re-exports
pub use fetcher::{FetchFailure, Fetcher};
pub use record::TweetRecord;
pub use runner::{RunConfig, run};
pub use session::{Credentials, Session};
pub use stats::RunSummary;
