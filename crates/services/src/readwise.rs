use std::env;
use std::time::Duration;

use async_trait::async_trait;
use challenge_core::model::{ApiBaseUrl, DocumentFilter, DocumentPage};
use reqwest::Client;
use reqwest::header::AUTHORIZATION;

use crate::error::{ConfigError, SyncError};
use crate::sync::{DEFAULT_MAX_PAGES, DocumentSource};

pub const DEFAULT_BASE_URL: &str = "https://readwise.io";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const LIST_PATH: &str = "api/v3/list/";

#[derive(Clone, Debug)]
pub struct ReadwiseConfig {
    pub base_url: ApiBaseUrl,
    /// Per-request timeout.
    pub timeout: Duration,
    pub max_pages: usize,
}

impl Default for ReadwiseConfig {
    fn default() -> Self {
        Self {
            base_url: ApiBaseUrl::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            timeout: DEFAULT_TIMEOUT,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl ReadwiseConfig {
    /// Read `READWISE_BASE_URL`, `READWISE_TIMEOUT_SECS` and
    /// `READWISE_MAX_PAGES`, falling back to defaults for unset variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Like [`ReadwiseConfig::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(raw) = lookup("READWISE_BASE_URL").filter(|raw| !raw.trim().is_empty()) {
            config.base_url = ApiBaseUrl::parse(&raw)?;
        }
        if let Some(secs) = positive_number(&lookup, "READWISE_TIMEOUT_SECS")? {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(pages) = positive_number(&lookup, "READWISE_MAX_PAGES")? {
            config.max_pages = usize::try_from(pages).unwrap_or(usize::MAX);
        }
        Ok(config)
    }
}

fn positive_number(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Ok(Some(value)),
        _ => Err(ConfigError::InvalidNumber { var, raw }),
    }
}

/// HTTP client for the Readwise Reader document list.
#[derive(Clone)]
pub struct ReadwiseClient {
    client: Client,
    config: ReadwiseConfig,
}

impl ReadwiseClient {
    /// Build a client honoring the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the TLS backend cannot be initialized.
    pub fn new(config: ReadwiseConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &ReadwiseConfig {
        &self.config
    }
}

/// Query pairs in wire order: `pageCursor`, `updatedAfter`, `location`.
fn list_query(filter: &DocumentFilter, cursor: Option<&str>) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(3);
    if let Some(cursor) = cursor.filter(|c| !c.is_empty()) {
        params.push(("pageCursor", cursor.to_string()));
    }
    if let Some(updated_after) = filter.updated_after_param() {
        params.push(("updatedAfter", updated_after));
    }
    if let Some(location) = filter.location {
        params.push(("location", location.as_str().to_string()));
    }
    params
}

#[async_trait]
impl DocumentSource for ReadwiseClient {
    async fn fetch_page(
        &self,
        token: &str,
        filter: &DocumentFilter,
        cursor: Option<&str>,
    ) -> Result<DocumentPage, SyncError> {
        let url = self.config.base_url.endpoint(LIST_PATH);
        let params = list_query(filter, cursor);
        tracing::debug!(?params, "requesting document list page");

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, format!("Token {token}"))
            .query(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| SyncError::MalformedResponse(err.to_string()))
    }
}
