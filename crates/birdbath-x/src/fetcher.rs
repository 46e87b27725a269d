//! Per-identifier retrieval with bounded retry.

use birdbath_core::{RetryPolicy, retry_with_policy};

use crate::api;
use crate::record::TweetRecord;
use crate::session::Session;

/// A permanently failed identifier with its last error text.
///
/// This is a value, not an error type: retry exhaustion is an expected
/// outcome the orchestrator counts and logs, never a fault it unwinds on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    pub id: String,
    pub message: String,
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.id, self.message)
    }
}

/// Session handle plus retry policy.
pub struct Fetcher<'a> {
    session: &'a Session,
    policy: RetryPolicy,
}

impl<'a> Fetcher<'a> {
    pub fn new(session: &'a Session, policy: RetryPolicy) -> Self {
        Self { session, policy }
    }

    /// Hydrate one id. Each failed attempt goes to the diagnostic log;
    /// exhaustion comes back as a [`FetchFailure`] value.
    pub fn fetch_one(&self, id: &str) -> Result<TweetRecord, FetchFailure> {
        let label = format!("tweet {id}");
        retry_with_policy(&self.policy, &label, || api::get_tweet(self.session, id)).map_err(|e| {
            log::warn!(
                "tweet {id}: giving up after {} attempts: {e}",
                self.policy.max_attempts
            );
            FetchFailure {
                id: id.to_string(),
                message: e.to_string(),
            }
        })
    }
}
