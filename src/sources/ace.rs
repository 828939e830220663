//! AceStream playlist source
//!
//! Fetches a community playlist over HTTP on a fixed cadence and exposes the
//! parsed channels. The last good playlist is kept in [`AppData`] and used to
//! seed the snapshot on start, before the upstream has answered.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::refresh::RefreshLoop;
use super::traits::{SnapshotFetcher, SourceWorker};
use crate::app_data::AppData;
use crate::errors::AppResult;
use crate::ingestor::parse_ace_playlist;
use crate::models::{Channel, ChannelGroups, WorkerStatus};
use crate::repositories::ChannelRepository;
use crate::utils::TextFetcher;

struct AcePlaylistFetcher {
    source_name: String,
    url: String,
    fetcher: Arc<dyn TextFetcher>,
    app_data: AppData,
    groups: Arc<ChannelGroups>,
}

#[async_trait]
impl SnapshotFetcher for AcePlaylistFetcher {
    async fn fetch_snapshot(&self) -> AppResult<Vec<Channel>> {
        let content = self.fetcher.fetch_text(&self.url).await?;
        let channels = parse_ace_playlist(&content, &self.groups);

        if let Err(e) = self.app_data.store_playlist(&self.url, &content).await {
            warn!(
                "Failed to cache playlist for source '{}': {}",
                self.source_name, e
            );
        }

        Ok(channels)
    }
}

pub struct AcePlaylistSource {
    fetcher: Arc<AcePlaylistFetcher>,
    refresh: RefreshLoop,
}

impl AcePlaylistSource {
    pub fn new(
        name: &str,
        url: &str,
        update_interval: Duration,
        fetcher: Arc<dyn TextFetcher>,
        app_data: AppData,
        repository: Arc<dyn ChannelRepository>,
        groups: Arc<ChannelGroups>,
    ) -> Self {
        let fetcher = Arc::new(AcePlaylistFetcher {
            source_name: name.to_string(),
            url: url.to_string(),
            fetcher,
            app_data,
            groups,
        });
        let refresh = RefreshLoop::new(name, update_interval, fetcher.clone(), repository);
        Self { fetcher, refresh }
    }

    pub fn url(&self) -> &str {
        &self.fetcher.url
    }

    async fn seed_from_cache(&self) {
        let cached = match self.fetcher.app_data.load_playlist(&self.fetcher.url).await {
            Ok(Some(cached)) => cached,
            Ok(None) => {
                debug!("No cached playlist for source '{}'", self.refresh.name());
                return;
            }
            Err(e) => {
                warn!(
                    "Failed to read cached playlist for source '{}': {}",
                    self.refresh.name(),
                    e
                );
                return;
            }
        };

        let channels = parse_ace_playlist(&cached, &self.fetcher.groups);
        info!(
            "Seeded source '{}' with {} cached channels",
            self.refresh.name(),
            channels.len()
        );
        self.refresh.seed(channels);
    }
}

#[async_trait]
impl SourceWorker for AcePlaylistSource {
    async fn start(&self) -> AppResult<()> {
        if self.refresh.is_running() {
            return Ok(());
        }

        self.fetcher.app_data.ensure_dir().await?;
        if self.refresh.current_channels().is_empty() {
            self.seed_from_cache().await;
        }

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
