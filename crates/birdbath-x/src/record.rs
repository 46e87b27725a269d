//! Tweet record model and API payload mapping.

use birdbath_core::FetchError;
use serde::{Deserialize, Serialize};

/// One hydrated tweet. Field order is the output CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TweetRecord {
    pub id: String,
    pub text: String,
    pub created_at: String,
    pub like_count: u64,
    pub retweet_count: u64,
    pub lang: String,
    pub username: String,
}

/// Raw single-status payload as the API serves it.
#[derive(Debug, Deserialize)]
pub struct ApiTweet {
    pub id_str: String,
    /// Extended text (tweet_mode=extended); classic `text` is the fallback
    #[serde(default)]
    pub full_text: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub user: Option<ApiUser>,
}

#[derive(Debug, Deserialize)]
pub struct ApiUser {
    #[serde(default)]
    pub screen_name: Option<String>,
}

impl ApiTweet {
    /// Convert into the CSV row shape. A payload without an author object
    /// is a failure like any other and goes back through the retry loop.
    pub fn into_record(self) -> Result<TweetRecord, FetchError> {
        let user = self.user.ok_or(FetchError::MissingAuthor)?;
        Ok(TweetRecord {
            id: self.id_str,
            text: self.full_text.or(self.text).unwrap_or_default(),
            created_at: self.created_at,
            like_count: self.favorite_count,
            retweet_count: self.retweet_count,
            lang: self.lang.unwrap_or_default(),
            username: user.screen_name.unwrap_or_else(|| "unknown".to_string()),
        })
    }
}
