//! Source workers
//!
//! One worker per configured source. Each variant owns its refresh cadence and
//! exposes the last good channel snapshot through [`SourceWorker`].

pub mod ace;
pub mod api;
pub mod factory;
pub mod refresh;
pub mod traits;

pub use ace::AcePlaylistSource;
pub use api::{ApiChannel, ApiPollingSource, ChannelApiClient, HttpChannelApiClient};
pub use factory::{SourceDependencies, SourceWorkerFactory};
pub use refresh::RefreshLoop;
pub use traits::{SnapshotFetcher, SourceWorker};
