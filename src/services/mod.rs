pub mod channel_sources;

pub use channel_sources::ChannelSources;
