pub mod channel;
pub mod source;

pub use channel::{Channel, ChannelGroup, ChannelGroups, ChannelInfo};
pub use source::{SourceConfig, SourceType, WorkerStatus};
