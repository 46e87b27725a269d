//! Error taxonomy for per-identifier fetch operations.

/// Error from a single hydration attempt.
///
/// Every kind is retried identically up to the policy ceiling; the
/// variants exist so the diagnostic log can say what actually happened.
#[derive(Debug)]
pub enum FetchError {
    /// Transport or HTTP-level failure (network, auth expiry, 4xx/5xx)
    Http {
        status: Option<u16>,
        message: String,
    },
    /// Local I/O failure
    Io(std::io::Error),
    /// The API answered but carried no tweet (deleted, suspended, bad id)
    MissingTweet,
    /// Tweet present but no author object attached
    MissingAuthor,
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Http {
                status: Some(s),
                message,
            } => write!(f, "HTTP {s}: {message}"),
            Self::Http {
                status: None,
                message,
            } => write!(f, "HTTP error: {message}"),
            Self::Io(e) => write!(f, "IO: {e}"),
            Self::MissingTweet => write!(f, "tweet not available"),
            Self::MissingAuthor => write!(f, "tweet has no author"),
        }
    }
}

impl std::error::Error for FetchError {}

impl FetchError {
    /// Create HTTP error from a reqwest error
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        Self::Http {
            status: e.status().map(|s| s.as_u16()),
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
