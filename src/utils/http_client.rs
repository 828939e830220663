use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::HttpConfig;
use crate::errors::{AppError, AppResult, SourceError};
use crate::utils::url::UrlUtils;

/// Fetches upstream text content such as playlists
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> AppResult<String>;
}

/// reqwest-backed fetcher shared by every worker
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }

    /// Fetch and deserialize a JSON document
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> AppResult<T> {
        let response = self.get_checked(url).await?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            SourceError::parse(
                "json",
                format!("{} - URL: {}", e, UrlUtils::obfuscate_credentials(url)),
            )
            .into()
        })
    }

    async fn get_checked(&self, url: &str) -> AppResult<reqwest::Response> {
        debug!("Fetching {}", UrlUtils::obfuscate_credentials(url));

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::from(SourceError::Timeout {
                    url: UrlUtils::obfuscate_credentials(url),
                })
            } else {
                AppError::from(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: format!(
                    "{} - URL: {}",
                    status.canonical_reason().unwrap_or("Unknown"),
                    UrlUtils::obfuscate_credentials(url)
                ),
            }
            .into());
        }

        Ok(response)
    }
}

#[async_trait]
impl TextFetcher for HttpFetcher {
    async fn fetch_text(&self, url: &str) -> AppResult<String> {
        let response = self.get_checked(url).await?;
        let text = response.text().await?;
        debug!(
            "Fetched {} bytes from {}",
            text.len(),
            UrlUtils::obfuscate_credentials(url)
        );
        Ok(text)
    }
}
