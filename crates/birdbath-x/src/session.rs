//! Authenticated platform session: cookie cache reuse or fresh login.
//!
//! The session is an explicit capability handle. Everything that talks to
//! the API takes it as a parameter; there is no ambient client state.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;
use birdbath_core::{SHARED_RUNTIME, http_client};

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) birdbath/0.1";

/// Credential triple for interactive login.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// An authenticated session. Cookies are presented on every API call;
/// the `ct0` cookie doubles as the csrf token header when present.
#[derive(Debug)]
pub struct Session {
    base_url: String,
    cookies: BTreeMap<String, String>,
}

impl Session {
    /// Cookie reuse if the cache file exists, else interactive login
    /// persisting a fresh cache. Fails fatally; there is no degraded
    /// unauthenticated mode.
    pub fn establish(
        base_url: &str,
        cookie_path: &Path,
        credentials: Option<&Credentials>,
    ) -> anyhow::Result<Self> {
        if cookie_path.exists() {
            log::info!("Reusing session cookies from {}", cookie_path.display());
            return Self::from_cookie_file(base_url, cookie_path);
        }
        let credentials = credentials.with_context(|| {
            format!(
                "No cookie cache at {} and no credentials configured",
                cookie_path.display()
            )
        })?;
        let session = Self::login(base_url, credentials)?;
        session.save_cookies(cookie_path)?;
        log::info!("Login succeeded, cookies saved to {}", cookie_path.display());
        Ok(session)
    }

    fn from_cookie_file(base_url: &str, path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read cookie file {}", path.display()))?;
        let cookies: BTreeMap<String, String> = serde_json::from_str(&content)
            .with_context(|| format!("Invalid cookie file {}", path.display()))?;
        anyhow::ensure!(!cookies.is_empty(), "Cookie file {} is empty", path.display());
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            cookies,
        })
    }

    fn login(base_url: &str, credentials: &Credentials) -> anyhow::Result<Self> {
        let base = base_url.trim_end_matches('/').to_string();
        let url = format!("{base}/1.1/account/login.json");
        log::info!("No cookie cache found, logging in as {}", credentials.username);

        let body = serde_json::json!({
            "username": credentials.username,
            "email": credentials.email,
            "password": credentials.password,
        });
        let response = SHARED_RUNTIME
            .handle()
            .block_on(async {
                http_client()
                    .post(&url)
                    .header(reqwest::header::USER_AGENT, USER_AGENT)
                    .header(reqwest::header::CONTENT_TYPE, "application/json")
                    .body(body.to_string())
                    .send()
                    .await?
                    .error_for_status()
            })
            .context("Login request failed")?;

        let mut cookies = BTreeMap::new();
        for value in response.headers().get_all(reqwest::header::SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                if let Some((name, val)) = parse_set_cookie(raw) {
                    cookies.insert(name, val);
                }
            }
        }
        anyhow::ensure!(!cookies.is_empty(), "Login response carried no session cookies");
        Ok(Self { base_url: base, cookies })
    }

    fn save_cookies(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(&self.cookies)?;
        std::fs::write(path, content)
            .with_context(|| format!("Cannot write cookie file {}", path.display()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cookie request header: `name=value; name=value`
    pub(crate) fn cookie_header(&self) -> String {
        self.cookies
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; ")
    }

    pub(crate) fn csrf_token(&self) -> Option<&str> {
        self.cookies.get("ct0").map(String::as_str)
    }
}

/// First `name=value` pair of a Set-Cookie line; attributes are dropped.
fn parse_set_cookie(raw: &str) -> Option<(String, String)> {
    let pair = raw.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parse_set_cookie_strips_attributes() {
        assert_eq!(
            parse_set_cookie("auth_token=abc123; Path=/; Secure; HttpOnly"),
            Some(("auth_token".to_string(), "abc123".to_string()))
        );
    }

    #[test]
    fn parse_set_cookie_empty_value() {
        assert_eq!(
            parse_set_cookie("guest_id=; Path=/"),
            Some(("guest_id".to_string(), String::new()))
        );
    }

    #[test]
    fn parse_set_cookie_rejects_malformed() {
        assert_eq!(parse_set_cookie("no-equals-sign"), None);
        assert_eq!(parse_set_cookie("=value-without-name"), None);
    }

    #[test]
    fn establish_reuses_cookie_file_without_credentials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, r#"{"auth_token": "abc", "ct0": "csrf123"}"#).unwrap();

        let session = Session::establish("https://api.example.com/", &path, None).unwrap();
        assert_eq!(session.base_url(), "https://api.example.com");
        assert_eq!(session.cookie_header(), "auth_token=abc; ct0=csrf123");
        assert_eq!(session.csrf_token(), Some("csrf123"));
    }

    #[test]
    fn establish_without_cache_or_credentials_fails() {
        let dir = TempDir::new().unwrap();
        let err = Session::establish("https://api.example.com", &dir.path().join("none.json"), None)
            .unwrap_err();
        assert!(err.to_string().contains("no credentials"));
    }

    #[test]
    fn invalid_cookie_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(Session::establish("https://api.example.com", &path, None).is_err());
    }

    #[test]
    fn empty_cookie_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, "{}").unwrap();
        assert!(Session::establish("https://api.example.com", &path, None).is_err());
    }

    #[test]
    fn save_cookies_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cookies.json");
        let session = Session {
            base_url: "https://api.example.com".to_string(),
            cookies: [("auth_token".to_string(), "abc".to_string())].into(),
        };
        session.save_cookies(&path).unwrap();

        let reloaded = Session::establish("https://api.example.com", &path, None).unwrap();
        assert_eq!(reloaded.cookie_header(), "auth_token=abc");
        assert_eq!(reloaded.csrf_token(), None);
    }
}
