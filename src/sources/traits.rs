//! Source worker trait definitions

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::models::{Channel, WorkerStatus};

/// Lifecycle and snapshot access for one configured source
///
/// Workers refresh their channel list on their own cadence. Readers only ever
/// see the last successful snapshot, so `current_channels` never blocks on
/// the network.
#[async_trait]
pub trait SourceWorker: Send + Sync {
    /// Begin refreshing. Calling `start` on a running worker is a no-op.
    async fn start(&self) -> AppResult<()>;

    /// Stop the refresh cadence. An in-flight refresh is allowed to finish.
    async fn stop(&self) -> AppResult<()>;

    /// Latest snapshot, empty before the first successful refresh
    fn current_channels(&self) -> Arc<Vec<Channel>>;

    fn status(&self) -> WorkerStatus {
        WorkerStatus {
            channel_count: self.current_channels().len(),
            ..WorkerStatus::default()
        }
    }
}

/// Produces a fresh channel list for a [`RefreshLoop`](super::refresh::RefreshLoop)
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch_snapshot(&self) -> AppResult<Vec<Channel>>;
}
