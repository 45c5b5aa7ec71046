//! Multi-user backend over a PostgREST-style HTTP table API.
//!
//! Reports and screenshots live in two tables. Nested report fields are sent
//! as JSON-encoded strings, which is how the shared tables were first laid
//! out; reading accepts either form. There is no locking or versioning, so
//! concurrent updates are last-write-wins. New reports are inserted without
//! merging, so an id taken by another client is a conflict, not an overwrite.

mod reports;
mod rows;
mod screenshots;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, Result};

pub use reports::RemoteReportStore;
pub use rows::{ReportRow, ScreenshotRow};
pub use screenshots::RemoteScreenshotStore;

/// Default reports table.
pub const DEFAULT_REPORTS_TABLE: &str = "reports";

/// Default screenshots table.
pub const DEFAULT_SCREENSHOTS_TABLE: &str = "screenshots";

/// Connection settings for the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Project URL; tables are served under `<url>/rest/v1/`.
    pub url: String,
    pub api_key: String,
    pub reports_table: String,
    pub screenshots_table: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            reports_table: DEFAULT_REPORTS_TABLE.to_string(),
            screenshots_table: DEFAULT_SCREENSHOTS_TABLE.to_string(),
        }
    }
}

/// HTTP client with the API key applied to every request.
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http: reqwest::Client,
    base: Url,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        Self::with_builder(config, reqwest::Client::builder())
    }

    /// Like [`RemoteClient::new`], starting from a caller-tuned builder
    /// (proxy, timeouts). The API key headers are added on top.
    pub fn with_builder(config: &RemoteConfig, builder: reqwest::ClientBuilder) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(PersistenceError::InvalidConfig {
                reason: "remote url is empty".to_string(),
            });
        }
        let base = base_url(&config.url)?;

        let key = HeaderValue::from_str(config.api_key.trim()).map_err(|_| {
            PersistenceError::InvalidConfig {
                reason: "api key contains invalid characters".to_string(),
            }
        })?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key.trim())).map_err(
            |_| PersistenceError::InvalidConfig {
                reason: "api key contains invalid characters".to_string(),
            },
        )?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = builder
            .default_headers(headers)
            .build()
            .map_err(|e| PersistenceError::Network {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { http, base })
    }

    /// URL of `table` with the given query pairs.
    pub fn table_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url> {
        table_url(&self.base, table, query)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, %url, "remote store request");
        self.http.request(method, url)
    }
}

/// `<url>/rest/v1/`, the root every table is served under.
fn base_url(url: &str) -> Result<Url> {
    Url::parse(&format!("{}/rest/v1/", url.trim().trim_end_matches('/'))).map_err(|e| {
        PersistenceError::InvalidConfig {
            reason: format!("invalid remote url: {e}"),
        }
    })
}

fn table_url(base: &Url, table: &str, query: &[(&str, &str)]) -> Result<Url> {
    let mut url = base
        .join(table)
        .map_err(|e| PersistenceError::InvalidConfig {
            reason: format!("invalid table name '{table}': {e}"),
        })?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url)
}

/// Maps a non-success status to [`PersistenceError::Remote`].
pub(crate) async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PersistenceError::Remote {
        status: status.as_u16(),
        body,
    })
}

/// Reads a JSON body through serde_json so decode failures are reported as
/// deserialization errors rather than transport errors.
pub(crate) async fn json_body<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| PersistenceError::Deserialization {
        source: Box::new(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url_with_filters() {
        let base = base_url("https://example.supabase.co/").unwrap();
        let url = table_url(&base, "screenshots", &[("requisition_id", "eq.REQ 1&2")]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.supabase.co/rest/v1/screenshots?requisition_id=eq.REQ+1%262"
        );
    }

    #[test]
    fn test_empty_url_rejected() {
        let err = RemoteClient::new(&RemoteConfig::default()).unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidConfig { .. }));
        assert!(matches!(
            base_url("not a url"),
            Err(PersistenceError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_config_defaults_tables() {
        let parsed: RemoteConfig =
            serde_json::from_str(r#"{"url": "https://x", "api_key": "k"}"#).unwrap();
        assert_eq!(parsed.reports_table, "reports");
        assert_eq!(parsed.screenshots_table, "screenshots");
    }
}
