//! Single-status endpoint access.

use birdbath_core::{FetchError, SHARED_RUNTIME, http_client};

use crate::record::{ApiTweet, TweetRecord};
use crate::session::{self, Session};

/// GET one status by id. Transport failures, missing payloads, and
/// missing authors all come back as [`FetchError`] for the retry loop;
/// nothing here distinguishes them beyond the diagnostic text.
pub fn get_tweet(session: &Session, id: &str) -> Result<TweetRecord, FetchError> {
    let url = format!(
        "{}/1.1/statuses/show.json?id={id}&tweet_mode=extended",
        session.base_url()
    );

    let result = SHARED_RUNTIME.handle().block_on(async {
        let mut request = http_client()
            .get(&url)
            .header(reqwest::header::USER_AGENT, session::USER_AGENT)
            .header(reqwest::header::COOKIE, session.cookie_header());
        if let Some(token) = session.csrf_token() {
            request = request.header("x-csrf-token", token);
        }
        let response = request.send().await?.error_for_status()?;
        response.text().await
    });

    let body = match result {
        Ok(body) => body,
        Err(e) if e.status() == Some(reqwest::StatusCode::NOT_FOUND) => {
            return Err(FetchError::MissingTweet);
        }
        Err(e) => return Err(FetchError::from_reqwest(&e)),
    };
    parse_tweet(&body)
}

/// Parse a response body. A null payload or an `errors` envelope (the
/// API's shape for deleted/protected statuses) is a missing tweet.
pub(crate) fn parse_tweet(body: &str) -> Result<TweetRecord, FetchError> {
    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| FetchError::Http {
        status: None,
        message: format!("invalid JSON payload: {e}"),
    })?;

    if value.is_null() || value.get("errors").is_some() {
        return Err(FetchError::MissingTweet);
    }

    let tweet: ApiTweet = serde_json::from_value(value).map_err(|e| FetchError::Http {
        status: None,
        message: format!("unexpected payload shape: {e}"),
    })?;
    tweet.into_record()
}
