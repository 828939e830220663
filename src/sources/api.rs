//! Polling API source
//!
//! Pulls the channel list from a JSON API on a fixed cadence. The client is a
//! trait object so deployments can swap the transport.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::refresh::RefreshLoop;
use super::traits::{SnapshotFetcher, SourceWorker};
use crate::errors::AppResult;
use crate::models::{Channel, ChannelGroups, WorkerStatus};
use crate::repositories::ChannelRepository;
use crate::utils::{HttpFetcher, UrlUtils};

/// Channel record as delivered by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiChannel {
    pub name: String,
    #[serde(default)]
    pub group: Option<String>,
    pub content_id: String,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelApiClient: Send + Sync {
    async fn fetch_channels(&self) -> AppResult<Vec<ApiChannel>>;
}

/// GETs `{base_url}/channels`
pub struct HttpChannelApiClient {
    fetcher: HttpFetcher,
    channels_url: String,
}

impl HttpChannelApiClient {
    pub fn new(fetcher: HttpFetcher, base_url: &str) -> AppResult<Self> {
        UrlUtils::parse_http_url(base_url)?;
        let channels_url = format!("{}/channels", base_url.trim().trim_end_matches('/'));
        Ok(Self {
            fetcher,
            channels_url,
        })
    }

    pub fn channels_url(&self) -> &str {
        &self.channels_url
    }
}

#[async_trait]
impl ChannelApiClient for HttpChannelApiClient {
    async fn fetch_channels(&self) -> AppResult<Vec<ApiChannel>> {
        self.fetcher.fetch_json(&self.channels_url).await
    }
}

struct ApiSnapshotFetcher {
    client: Arc<dyn ChannelApiClient>,
    groups: Arc<ChannelGroups>,
}

#[async_trait]
impl SnapshotFetcher for ApiSnapshotFetcher {
    async fn fetch_snapshot(&self) -> AppResult<Vec<Channel>> {
        let records = self.client.fetch_channels().await?;
        let total = records.len();

        let channels: Vec<Channel> = records
            .into_iter()
            .filter_map(|record| {
                let name = record.name.trim();
                let content_id = record.content_id.trim();
                if name.is_empty() || content_id.is_empty() {
                    return None;
                }
                let group = record
                    .group
                    .as_deref()
                    .map(str::trim)
                    .and_then(|label| self.groups.resolve(label));
                Some(Channel::new(name, group, content_id))
            })
            .collect();

        if channels.len() < total {
            debug!("Dropped {} incomplete API records", total - channels.len());
        }
        Ok(channels)
    }
}

pub struct ApiPollingSource {
    refresh: RefreshLoop,
}

impl ApiPollingSource {
    pub fn new(
        name: &str,
        update_interval: Duration,
        client: Arc<dyn ChannelApiClient>,
        repository: Arc<dyn ChannelRepository>,
        groups: Arc<ChannelGroups>,
    ) -> Self {
        let fetcher = Arc::new(ApiSnapshotFetcher { client, groups });
        Self {
            refresh: RefreshLoop::new(name, update_interval, fetcher, repository),
        }
    }
}

#[async_trait]
impl SourceWorker for ApiPollingSource {
    async fn start(&self) -> AppResult<()> {
        self.refresh.start().await
    }

    async fn stop(&self) -> AppResult<()> {
        self.refresh.stop().await
    }

    fn current_channels(&self) -> Arc<Vec<Channel>> {
        self.refresh.current_channels()
    }

    fn status(&self) -> WorkerStatus {
        self.refresh.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::models::ChannelGroup;
    use crate::repositories::InMemoryChannelRepository;

    fn record(name: &str, group: Option<&str>, content_id: &str) -> ApiChannel {
        ApiChannel {
            name: name.to_string(),
            group: group.map(str::to_string),
            content_id: content_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_records_are_mapped_and_incomplete_ones_dropped() {
        let mut groups = ChannelGroups::new();
        groups.insert(
            "Sport",
            Arc::new(ChannelGroup {
                id: "sport".to_string(),
                title: "Sport".to_string(),
            }),
        );

        let mut client = MockChannelApiClient::new();
        client.expect_fetch_channels().returning(|| {
            Ok(vec![
                record(" Match TV ", Some(" Sport "), "m1"),
                record("", None, "m2"),
                record("No Id", None, "  "),
                record("Unknown Group", Some("Cooking"), "m3"),
            ])
        });

        let worker = ApiPollingSource::new(
            "api",
            Duration::from_secs(300),
            Arc::new(client),
            Arc::new(InMemoryChannelRepository::new()),
            Arc::new(groups),
        );
        worker.start().await.unwrap();

        let channels = worker.current_channels();
        assert_eq!(channels.len(), 2);
        assert_eq!(channels[0].name, "Match TV");
        assert_eq!(channels[0].group.as_ref().unwrap().id, "sport");
        assert_eq!(channels[1].name, "Unknown Group");
        assert!(channels[1].group.is_none());

        worker.stop().await.unwrap();
    }

    #[test]
    fn test_http_client_builds_channels_url() {
        let fetcher = HttpFetcher::new(&HttpConfig::default()).unwrap();
        let client = HttpChannelApiClient::new(fetcher.clone(), "http://api.local/v1/").unwrap();
        assert_eq!(client.channels_url(), "http://api.local/v1/channels");

        assert!(HttpChannelApiClient::new(fetcher, "api.local").is_err());
    }

    #[test]
    fn test_api_channel_group_is_optional() {
        let parsed: Vec<ApiChannel> =
            serde_json::from_str(r#"[{"name":"A","content_id":"1"},{"name":"B","group":"News","content_id":"2"}]"#)
                .unwrap();
        assert_eq!(parsed[0].group, None);
        assert_eq!(parsed[1].group.as_deref(), Some("News"));
    }
}
