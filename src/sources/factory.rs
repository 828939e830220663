//! Source worker factory
//!
//! Builds the worker variant that matches a source's configured type. All
//! validation of a [`SourceConfig`] happens here, so a configuration that
//! passes the factory yields a fully usable worker.

use std::sync::Arc;
use tracing::debug;

use super::ace::AcePlaylistSource;
use super::api::{ApiPollingSource, ChannelApiClient, HttpChannelApiClient};
use super::traits::SourceWorker;
use crate::app_data::AppData;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::{ChannelGroups, SourceConfig, SourceType};
use crate::repositories::ChannelRepository;
use crate::utils::{HttpFetcher, TextFetcher, UrlUtils};

/// Collaborators shared by every worker
#[derive(Clone)]
pub struct SourceDependencies {
    pub fetcher: Arc<dyn TextFetcher>,
    pub app_data: AppData,
    pub repository: Arc<dyn ChannelRepository>,
    /// Only required when an `api` source is configured
    pub api_client: Option<Arc<dyn ChannelApiClient>>,
}

impl SourceDependencies {
    pub fn from_config(config: &Config, repository: Arc<dyn ChannelRepository>) -> AppResult<Self> {
        let http = HttpFetcher::new(&config.http)?;

        let api_client = match &config.api {
            Some(api) => {
                let client: Arc<dyn ChannelApiClient> =
                    Arc::new(HttpChannelApiClient::new(http.clone(), &api.base_url)?);
                Some(client)
            }
            None => None,
        };

        Ok(Self {
            fetcher: Arc::new(http),
            app_data: AppData::new(config.app.data_dir.clone()),
            repository,
            api_client,
        })
    }
}

pub struct SourceWorkerFactory;

impl SourceWorkerFactory {
    /// Create a worker for the named source
    ///
    /// # Errors
    /// Returns a configuration error when the source definition cannot be
    /// served by its type (missing or invalid url, zero interval, no API
    /// client for an `api` source).
    pub fn create_worker(
        name: &str,
        config: &SourceConfig,
        groups: &Arc<ChannelGroups>,
        dependencies: &SourceDependencies,
    ) -> AppResult<Arc<dyn SourceWorker>> {
        if config.update_interval.is_zero() {
            return Err(AppError::configuration(format!(
                "Source '{name}': update_interval must be greater than zero"
            )));
        }

        debug!("Creating {} worker for source '{}'", config.source_type, name);

        match config.source_type {
            SourceType::Ace => {
                let url = config.url.as_deref().ok_or_else(|| {
                    AppError::configuration(format!("Source '{name}': ace sources require a url"))
                })?;
                UrlUtils::parse_http_url(url).map_err(|e| match e {
                    AppError::Configuration { message } => {
                        AppError::configuration(format!("Source '{name}': {message}"))
                    }
                    other => other,
                })?;

                Ok(Arc::new(AcePlaylistSource::new(
                    name,
                    url.trim(),
                    config.update_interval,
                    dependencies.fetcher.clone(),
                    dependencies.app_data.clone(),
                    dependencies.repository.clone(),
                    groups.clone(),
                )))
            }
            SourceType::Api => {
                if config.url.is_some() {
                    return Err(AppError::configuration(format!(
                        "Source '{name}': api sources take their endpoint from [api], not a url"
                    )));
                }
                let client = dependencies.api_client.clone().ok_or_else(|| {
                    AppError::configuration(format!(
                        "Source '{name}': api sources require an [api] section"
                    ))
                })?;

                Ok(Arc::new(ApiPollingSource::new(
                    name,
                    config.update_interval,
                    client,
                    dependencies.repository.clone(),
                    groups.clone(),
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryChannelRepository;
    use crate::sources::api::MockChannelApiClient;
    use crate::utils::http_client::MockTextFetcher;
    use std::time::Duration;

    fn dependencies(api_client: bool) -> SourceDependencies {
        let api_client: Option<Arc<dyn ChannelApiClient>> = if api_client {
            Some(Arc::new(MockChannelApiClient::new()))
        } else {
            None
        };
        SourceDependencies {
            fetcher: Arc::new(MockTextFetcher::new()),
            app_data: AppData::new("/tmp/channel-aggregator-test"),
            repository: Arc::new(InMemoryChannelRepository::new()),
            api_client,
        }
    }

    fn groups() -> Arc<ChannelGroups> {
        Arc::new(ChannelGroups::new())
    }

    #[test]
    fn test_creates_ace_and_api_workers() {
        let deps = dependencies(true);
        let ace = SourceConfig::ace("Ace", "https://example.com/a.m3u", Duration::from_secs(60));
        let api = SourceConfig::api("API", Duration::from_secs(60));

        let ace_worker = SourceWorkerFactory::create_worker("ace", &ace, &groups(), &deps).unwrap();
        let api_worker = SourceWorkerFactory::create_worker("api", &api, &groups(), &deps).unwrap();

        assert!(ace_worker.current_channels().is_empty());
        assert!(!api_worker.status().running);
    }

    #[test]
    fn test_ace_without_url_is_configuration_error() {
        let mut config = SourceConfig::ace("Ace", "x", Duration::from_secs(60));
        config.url = None;

        let err = SourceWorkerFactory::create_worker("ace", &config, &groups(), &dependencies(false))
            .err()
            .unwrap();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("require a url"));
    }

    #[test]
    fn test_ace_with_bad_url_is_configuration_error() {
        let config = SourceConfig::ace("Ace", "acestream://abc", Duration::from_secs(60));
        let err = SourceWorkerFactory::create_worker("ace", &config, &groups(), &dependencies(false))
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_api_rules() {
        let config = SourceConfig::api("API", Duration::from_secs(60));
        let err = SourceWorkerFactory::create_worker("api", &config, &groups(), &dependencies(false))
            .err()
            .unwrap();
        assert!(err.to_string().contains("[api]"));

        let mut with_url = config.clone();
        with_url.url = Some("http://example.com".to_string());
        let err = SourceWorkerFactory::create_worker("api", &with_url, &groups(), &dependencies(true))
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let config = SourceConfig::ace("Ace", "https://example.com/a.m3u", Duration::ZERO);
        let err = SourceWorkerFactory::create_worker("ace", &config, &groups(), &dependencies(false))
            .err()
            .unwrap();
        assert!(err.is_configuration());
    }
}
