//! Evergreen REST v2 statistics client.
//!
//! Talks to the `test_stats` and `builds/{id}/tasks` endpoints. Credentials
//! are read from the same YAML file the Evergreen CLI uses
//! (`~/.evergreen.yml` by default):
//!
//! ```yaml
//! api_server_host: https://evergreen.mongodb.com/api
//! user: jane.doe
//! api_key: 0123456789abcdef
//! ```
//!
//! Both endpoints are paginated: each response may carry a
//! `Link: <url>; rel="next"` header, which is followed until exhausted.

use std::path::Path;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{BuildTask, HistoryError, HistoryResult, StatsQuery, StatsSource, TestStatsRecord};

/// Default location of the Evergreen credentials file.
pub const DEFAULT_CONFIG_FILE: &str = "~/.evergreen.yml";

/// API host used when the credentials file does not name one.
pub const DEFAULT_API_SERVER_HOST: &str = "https://evergreen.mongodb.com/api";

static NEXT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<([^>]+)>\s*;\s*rel="next""#).expect("valid link regex"));

/// Connection settings for the Evergreen API.
#[derive(Debug, Clone, Deserialize)]
pub struct EvergreenApiConfig {
    /// Base URL of the API, e.g. `https://evergreen.mongodb.com/api`.
    #[serde(default = "default_api_server_host")]
    pub api_server_host: String,

    /// API user name, sent as the `Api-User` header.
    pub user: Option<String>,

    /// API key, sent as the `Api-Key` header.
    pub api_key: Option<String>,
}

fn default_api_server_host() -> String {
    DEFAULT_API_SERVER_HOST.to_string()
}

impl EvergreenApiConfig {
    /// Loads settings from a YAML credentials file. `~` is expanded.
    pub fn load(path: &str) -> HistoryResult<Self> {
        let expanded = shellexpand::tilde(path).into_owned();
        debug!("Loading Evergreen API config from: {}", expanded);
        let contents = std::fs::read_to_string(Path::new(&expanded))
            .map_err(|e| HistoryError::Config(format!("{}: {}", expanded, e)))?;
        Self::from_yaml_str(&contents)
    }

    /// Parses settings from YAML text.
    pub fn from_yaml_str(contents: &str) -> HistoryResult<Self> {
        serde_yaml::from_str(contents).map_err(|e| HistoryError::Config(e.to_string()))
    }
}

/// [`StatsSource`] backed by the Evergreen REST v2 API.
pub struct EvergreenClient {
    http: reqwest::Client,
    base_url: String,
    user: Option<String>,
    api_key: Option<String>,
}

impl EvergreenClient {
    /// Creates a client from explicit settings.
    pub fn new(config: EvergreenApiConfig) -> HistoryResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("suitesplit/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HistoryError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base_url: format!("{}/rest/v2", config.api_server_host.trim_end_matches('/')),
            user: config.user,
            api_key: config.api_key,
        })
    }

    /// Creates a client from a credentials file.
    pub fn from_config_file(path: &str) -> HistoryResult<Self> {
        Self::new(EvergreenApiConfig::load(path)?)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn get_paginated<T: DeserializeOwned>(
        &self,
        url: String,
        params: &[(&str, String)],
    ) -> HistoryResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url);
        let mut first_page = true;

        while let Some(url) = next.take() {
            let mut request = self.http.get(&url);
            // Follow-up pages carry their parameters in the link itself.
            if first_page {
                request = request.query(params);
                first_page = false;
            }
            if let Some(user) = &self.user {
                request = request.header("Api-User", user);
            }
            if let Some(key) = &self.api_key {
                request = request.header("Api-Key", key);
            }

            debug!("GET {}", url);
            let response = request
                .send()
                .await
                .map_err(|e| HistoryError::Request(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(status_error(status, body));
            }

            next = next_page_url(response.headers());
            let page: Vec<T> = response
                .json()
                .await
                .map_err(|e| HistoryError::Decode(e.to_string()))?;
            debug!("Received page with {} items", page.len());
            items.extend(page);
        }

        Ok(items)
    }
}

#[async_trait]
impl StatsSource for EvergreenClient {
    async fn test_stats(&self, query: &StatsQuery) -> HistoryResult<Vec<TestStatsRecord>> {
        let url = self.endpoint(&format!("projects/{}/test_stats", query.project));
        self.get_paginated(url, &query.to_params()).await
    }

    async fn tasks_by_build_id(&self, build_id: &str) -> HistoryResult<Vec<BuildTask>> {
        let url = self.endpoint(&format!("builds/{}/tasks", build_id));
        self.get_paginated(url, &[]).await
    }

    fn name(&self) -> &str {
        "evergreen"
    }
}

/// Maps a non-success status to an error, singling out 503.
fn status_error(status: StatusCode, body: String) -> HistoryError {
    if status == StatusCode::SERVICE_UNAVAILABLE {
        HistoryError::ServiceUnavailable(body)
    } else {
        HistoryError::Status {
            status: status.as_u16(),
            message: body,
        }
    }
}

/// Extracts the `rel="next"` target from a `Link` header, if any.
fn next_page_url(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    NEXT_LINK
        .captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_config_from_yaml() {
        let config = EvergreenApiConfig::from_yaml_str(
            "api_server_host: https://evg.example.com/api/\nuser: me\napi_key: secret\n",
        )
        .unwrap();
        assert_eq!(config.api_server_host, "https://evg.example.com/api/");
        assert_eq!(config.user.as_deref(), Some("me"));

        let client = EvergreenClient::new(config).unwrap();
        assert_eq!(
            client.endpoint("projects/p/test_stats"),
            "https://evg.example.com/api/rest/v2/projects/p/test_stats"
        );
    }

    #[test]
    fn test_config_default_host() {
        let config = EvergreenApiConfig::from_yaml_str("user: me\n").unwrap();
        assert_eq!(config.api_server_host, DEFAULT_API_SERVER_HOST);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_missing_file() {
        let result = EvergreenApiConfig::load("/nonexistent/evergreen.yml");
        assert!(matches!(result, Err(HistoryError::Config(_))));
    }

    #[test]
    fn test_next_page_url() {
        let mut headers = HeaderMap::new();
        headers.insert(
            LINK,
            HeaderValue::from_static(
                r#"<https://evg/rest/v2/x?start_at=abc>; rel="next", <https://evg/rest/v2/x>; rel="prev""#,
            ),
        );
        assert_eq!(
            next_page_url(&headers).as_deref(),
            Some("https://evg/rest/v2/x?start_at=abc")
        );
    }

    #[test]
    fn test_next_page_url_absent() {
        let mut headers = HeaderMap::new();
        assert!(next_page_url(&headers).is_none());

        headers.insert(LINK, HeaderValue::from_static(r#"<https://evg/x>; rel="prev""#));
        assert!(next_page_url(&headers).is_none());
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(status_error(StatusCode::SERVICE_UNAVAILABLE, String::new()).is_service_unavailable());
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "missing".into()),
            HistoryError::Status { status: 404, .. }
        ));
    }
}
