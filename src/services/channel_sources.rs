//! Channel source aggregation
//!
//! [`ChannelSources`] owns one worker per configured source, drives their
//! lifecycle and merges their snapshots into a single channel directory.
//!
//! # Lifecycle semantics
//!
//! `start` and `stop` dispatch every worker's operation as an independent
//! task before looking at any outcome. The first failure is returned
//! immediately; the remaining tasks keep running on their own and nothing is
//! rolled back. A failed `start` can therefore leave some workers running,
//! and calling `start` again only affects workers that are not running yet.

use futures::stream::{FuturesUnordered, StreamExt};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, error, info};

use crate::errors::{AppError, AppResult, LifecycleOperation};
use crate::models::{ChannelGroups, ChannelInfo, SourceConfig, WorkerStatus};
use crate::sources::{SourceDependencies, SourceWorker, SourceWorkerFactory};

struct RegisteredSource {
    config: SourceConfig,
    worker: Arc<dyn SourceWorker>,
}

pub struct ChannelSources {
    sources: HashMap<String, RegisteredSource>,
}

impl ChannelSources {
    /// Build a worker for every configured source
    ///
    /// # Errors
    /// Fails with a configuration error if any source cannot be built; no
    /// partially populated registry is ever returned.
    pub fn new(
        configs: HashMap<String, SourceConfig>,
        groups: Arc<ChannelGroups>,
        dependencies: SourceDependencies,
    ) -> AppResult<Self> {
        let mut sources = HashMap::with_capacity(configs.len());

        for (name, config) in configs {
            let worker = SourceWorkerFactory::create_worker(&name, &config, &groups, &dependencies)?;
            sources.insert(name, RegisteredSource { config, worker });
        }

        info!("Configured {} channel sources", sources.len());
        Ok(Self { sources })
    }

    /// Build the registry from ready-made workers
    pub fn from_workers<I>(entries: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (String, SourceConfig, Arc<dyn SourceWorker>)>,
    {
        let mut sources = HashMap::new();

        for (name, config, worker) in entries {
            if sources.contains_key(&name) {
                return Err(AppError::configuration(format!(
                    "Duplicate source name '{name}'"
                )));
            }
            sources.insert(name, RegisteredSource { config, worker });
        }

        Ok(Self { sources })
    }

    /// Start every worker concurrently
    pub async fn start(&self) -> AppResult<()> {
        info!("Starting {} channel sources", self.sources.len());
        self.fan_out(LifecycleOperation::Start, |worker| async move {
            worker.start().await
        })
        .await
    }

    /// Stop every worker concurrently
    pub async fn stop(&self) -> AppResult<()> {
        info!("Stopping {} channel sources", self.sources.len());
        self.fan_out(LifecycleOperation::Stop, |worker| async move {
            worker.stop().await
        })
        .await
    }

    async fn fan_out<F, Fut>(&self, operation: LifecycleOperation, op: F) -> AppResult<()>
    where
        F: Fn(Arc<dyn SourceWorker>) -> Fut,
        Fut: Future<Output = AppResult<()>> + Send + 'static,
    {
        // Spawning dispatches every operation up front; dropping an unfinished
        // handle on the error path detaches the task instead of cancelling it
        let mut tasks: FuturesUnordered<_> = self
            .sources
            .iter()
            .map(|(name, source)| {
                let name = name.clone();
                let fut = op(source.worker.clone());
                tokio::spawn(async move { (name, fut.await) })
            })
            .collect();

        while let Some(joined) = tasks.next().await {
            match joined {
                Ok((name, Ok(()))) => debug!("Source '{}' completed {}", name, operation),
                Ok((name, Err(e))) => {
                    error!("Source '{}' failed to {}: {}", name, operation, e);
                    return Err(AppError::lifecycle(name, operation, e));
                }
                Err(join_error) => {
                    error!("Source {} task failed: {}", operation, join_error);
                    return Err(AppError::internal(format!(
                        "source {operation} task failed: {join_error}"
                    )));
                }
            }
        }

        Ok(())
    }

    /// Merge the current snapshots of the named sources
    ///
    /// Sources are visited in the given order and the first source to
    /// provide a channel name (compared case-insensitively) wins. Names that
    /// are not configured contribute nothing.
    pub fn query<S: AsRef<str>>(&self, source_names: &[S]) -> Vec<ChannelInfo> {
        let mut seen = HashSet::new();
        let mut result = Vec::new();

        for name in source_names {
            let Some(source) = self.sources.get(name.as_ref()) else {
                continue;
            };

            for channel in source.worker.current_channels().iter() {
                if !seen.insert(channel.dedup_key()) {
                    continue;
                }
                result.push(ChannelInfo {
                    channel: channel.clone(),
                    source_label: source.config.label.clone(),
                });
            }
        }

        result
    }

    /// Configured source names, sorted
    pub fn source_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        self.sources.get(name).map(|source| source.config.label.as_str())
    }

    pub fn status(&self) -> BTreeMap<String, WorkerStatus> {
        self.sources
            .iter()
            .map(|(name, source)| (name.clone(), source.worker.status()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
