//! Channel storage seam
//!
//! Workers publish every refreshed snapshot through [`ChannelRepository`] so
//! the downstream catalog sees the same channels the directory serves.

pub mod channel;

pub use channel::{ChannelRepository, InMemoryChannelRepository};
