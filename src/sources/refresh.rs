//! Timed refresh loop shared by all polling workers

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::traits::SnapshotFetcher;
use crate::errors::AppResult;
use crate::models::{Channel, WorkerStatus};
use crate::repositories::ChannelRepository;

#[derive(Default)]
struct RefreshMeta {
    last_refreshed_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

#[derive(Default)]
struct SharedState {
    snapshot: RwLock<Arc<Vec<Channel>>>,
    meta: Mutex<RefreshMeta>,
    running: AtomicBool,
}

struct RunningTask {
    token: CancellationToken,
    // Dropping the handle detaches the task; it exits on its next tick check
    _handle: JoinHandle<()>,
}

/// Everything a single refresh needs, cloned into the background task
#[derive(Clone)]
struct Refresher {
    name: Arc<str>,
    fetcher: Arc<dyn SnapshotFetcher>,
    repository: Arc<dyn ChannelRepository>,
    state: Arc<SharedState>,
}

impl Refresher {
    async fn refresh_once(&self) -> bool {
        match self.fetcher.fetch_snapshot().await {
            Ok(channels) => {
                let channels = Arc::new(channels);
                *self
                    .state
                    .snapshot
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = channels.clone();
                {
                    let mut meta = self.state.meta.lock().unwrap_or_else(PoisonError::into_inner);
                    meta.last_refreshed_at = Some(Utc::now());
                    meta.last_error = None;
                }
                info!(
                    "Refreshed source '{}': {} channels",
                    self.name,
                    channels.len()
                );

                if let Err(e) = self.repository.store_snapshot(&self.name, channels).await {
                    warn!("Failed to store channels for source '{}': {}", self.name, e);
                }
                true
            }
            Err(e) => {
                let kept = self
                    .state
                    .snapshot
                    .read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .len();
                warn!(
                    "Refresh of source '{}' failed, keeping {} cached channels: {}",
                    self.name, kept, e
                );
                self.state
                    .meta
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .last_error = Some(e.to_string());
                false
            }
        }
    }

    async fn run(self, period: Duration, token: CancellationToken) {
        // The initial refresh already happened in start()
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    debug!("Refresh tick for source '{}'", self.name);
                    self.refresh_once().await;
                }
            }
        }

        debug!("Refresh loop for source '{}' exited", self.name);
    }
}

/// Owns a worker's snapshot and its cancellable background refresh task
pub struct RefreshLoop {
    refresher: Refresher,
    period: Duration,
    task: AsyncMutex<Option<RunningTask>>,
}

impl RefreshLoop {
    pub fn new(
        name: &str,
        period: Duration,
        fetcher: Arc<dyn SnapshotFetcher>,
        repository: Arc<dyn ChannelRepository>,
    ) -> Self {
        Self {
            refresher: Refresher {
                name: Arc::from(name),
                fetcher,
                repository,
                state: Arc::new(SharedState::default()),
            },
            period,
            task: AsyncMutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.refresher.name
    }

    pub fn is_running(&self) -> bool {
        self.refresher.state.running.load(Ordering::Acquire)
    }

    /// Run one refresh inline, then keep refreshing every period until stopped
    pub async fn start(&self) -> AppResult<()> {
        let mut task = self.task.lock().await;
        if task.is_some() {
            debug!("Source '{}' is already running", self.name());
            return Ok(());
        }

        self.refresher.refresh_once().await;

        let token = CancellationToken::new();
        let handle = tokio::spawn(self.refresher.clone().run(self.period, token.clone()));
        *task = Some(RunningTask {
            token,
            _handle: handle,
        });
        self.refresher.state.running.store(true, Ordering::Release);

        info!(
            "Started source '{}' (refresh every {})",
            self.name(),
            humantime::format_duration(self.period)
        );
        Ok(())
    }

    pub async fn stop(&self) -> AppResult<()> {
        let mut task = self.task.lock().await;
        match task.take() {
            Some(running) => {
                running.token.cancel();
                self.refresher.state.running.store(false, Ordering::Release);
                info!("Stopped source '{}'", self.name());
            }
            None => debug!("Source '{}' is not running", self.name()),
        }
        Ok(())
    }

    /// Force a refresh outside the cadence; returns whether it succeeded
    pub async fn refresh_now(&self) -> bool {
        self.refresher.refresh_once().await
    }

    /// Install channels obtained outside a refresh (e.g. from a local cache)
    /// without marking the source as refreshed
    pub fn seed(&self, channels: Vec<Channel>) {
        *self
            .refresher
            .state
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(channels);
    }

    pub fn current_channels(&self) -> Arc<Vec<Channel>> {
        self.refresher
            .state
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn status(&self) -> WorkerStatus {
        let meta = self
            .refresher
            .state
            .meta
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        WorkerStatus {
            running: self.is_running(),
            channel_count: self.current_channels().len(),
            last_refreshed_at: meta.last_refreshed_at,
            last_error: meta.last_error.clone(),
        }
    }
}
