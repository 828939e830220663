use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::AppResult;
use crate::models::Channel;

#[async_trait]
pub trait ChannelRepository: Send + Sync {
    /// Replace everything previously stored for `source_name`
    async fn store_snapshot(&self, source_name: &str, channels: Arc<Vec<Channel>>) -> AppResult<()>;

    /// First channel with the given content id, searching sources by name
    async fn find_by_content_id(&self, content_id: &str) -> AppResult<Option<Channel>>;

    async fn source_channel_count(&self, source_name: &str) -> AppResult<usize>;
}

#[derive(Clone, Default)]
pub struct InMemoryChannelRepository {
    snapshots: Arc<RwLock<HashMap<String, Arc<Vec<Channel>>>>>,
}

impl InMemoryChannelRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChannelRepository for InMemoryChannelRepository {
    async fn store_snapshot(&self, source_name: &str, channels: Arc<Vec<Channel>>) -> AppResult<()> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(source_name.to_string(), channels);
        Ok(())
    }

    async fn find_by_content_id(&self, content_id: &str) -> AppResult<Option<Channel>> {
        let snapshots = self.snapshots.read().await;
        let mut names: Vec<&String> = snapshots.keys().collect();
        names.sort();

        Ok(names.into_iter().find_map(|name| {
            snapshots[name]
                .iter()
                .find(|channel| channel.content_id == content_id)
                .cloned()
        }))
    }

    async fn source_channel_count(&self, source_name: &str) -> AppResult<usize> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.get(source_name).map_or(0, |channels| channels.len()))
    }
}
