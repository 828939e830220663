use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::duration_serde;

/// Provider variant of a configured source
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SourceType {
    /// AceStream playlist fetched from a URL
    Ace,
    /// Remote channel API polled on an interval
    Api,
}

/// Declarative definition of one upstream source, keyed by name in the config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    /// Display label attached to every channel taken from this source
    pub label: String,
    /// Playlist location, required for `ace` sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default = "default_update_interval",
        with = "duration_serde::duration"
    )]
    pub update_interval: Duration,
}

pub fn default_update_interval() -> Duration {
    Duration::from_secs(600)
}

impl SourceConfig {
    pub fn ace<L: Into<String>, U: Into<String>>(label: L, url: U, update_interval: Duration) -> Self {
        Self {
            source_type: SourceType::Ace,
            label: label.into(),
            url: Some(url.into()),
            update_interval,
        }
    }

    pub fn api<L: Into<String>>(label: L, update_interval: Duration) -> Self {
        Self {
            source_type: SourceType::Api,
            label: label.into(),
            url: None,
            update_interval,
        }
    }
}

/// Diagnostic view of a worker's refresh state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WorkerStatus {
    pub running: bool,
    pub channel_count: usize,
    pub last_refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_source_type_round_trip_names() {
        assert_eq!(SourceType::Ace.to_string(), "ace");
        assert_eq!(SourceType::from_str("api").unwrap(), SourceType::Api);
        assert!(SourceType::from_str("ftp").is_err());
    }

    #[test]
    fn test_source_config_deserialize_defaults() {
        let config: SourceConfig = toml::from_str(
            r#"
            type = "ace"
            label = "Ace Main"
            url = "https://example.com/playlist.m3u"
            "#,
        )
        .unwrap();

        assert_eq!(config.source_type, SourceType::Ace);
        assert_eq!(config.update_interval, Duration::from_secs(600));
    }

    #[test]
    fn test_source_config_human_readable_interval() {
        let config: SourceConfig = toml::from_str(
            r#"
            type = "api"
            label = "API"
            update_interval = "1h30m"
            "#,
        )
        .unwrap();

        assert_eq!(config.url, None);
        assert_eq!(config.update_interval, Duration::from_secs(5400));
    }

    #[test]
    fn test_unknown_source_type_is_rejected() {
        let result: Result<SourceConfig, _> = toml::from_str(
            r#"
            type = "torrent"
            label = "Nope"
            "#,
        );
        assert!(result.is_err());
    }
}
