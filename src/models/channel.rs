use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::GroupConfig;

/// Normalized channel group descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelGroup {
    pub id: String,
    pub title: String,
}

/// Lookup from free-text group labels (as they appear in playlist titles) to
/// the normalized group they belong to.
///
/// Built once at startup and shared read-only between all workers.
#[derive(Debug, Clone, Default)]
pub struct ChannelGroups {
    by_label: HashMap<String, Arc<ChannelGroup>>,
}

impl ChannelGroups {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the lookup from configured groups. Each group is reachable by its
    /// title and by every alias; later definitions win on label collisions.
    pub fn from_config(groups: &[GroupConfig]) -> Self {
        let mut result = Self::new();
        for group in groups {
            let descriptor = Arc::new(ChannelGroup {
                id: group.id.clone(),
                title: group.title.clone(),
            });
            result.insert(group.title.clone(), descriptor.clone());
            for alias in &group.aliases {
                result.insert(alias.clone(), descriptor.clone());
            }
        }
        result
    }

    pub fn insert<S: Into<String>>(&mut self, label: S, group: Arc<ChannelGroup>) {
        self.by_label.insert(label.into(), group);
    }

    /// Exact label lookup; unknown labels resolve to no group
    pub fn resolve(&self, label: &str) -> Option<Arc<ChannelGroup>> {
        self.by_label.get(label).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

/// A single live channel as produced by a source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub group: Option<Arc<ChannelGroup>>,
    /// Opaque stream identifier (the AceStream content id for playlist sources)
    pub content_id: String,
}

impl Channel {
    pub fn new<N: Into<String>, C: Into<String>>(
        name: N,
        group: Option<Arc<ChannelGroup>>,
        content_id: C,
    ) -> Self {
        Self {
            name: name.into(),
            group,
            content_id: content_id.into(),
        }
    }

    /// Identity used when merging channels across sources
    pub fn dedup_key(&self) -> String {
        self.name.to_lowercase()
    }
}

/// A channel together with the label of the source it was taken from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub channel: Channel,
    pub source_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_groups_resolve_title_and_aliases() {
        let groups = ChannelGroups::from_config(&[GroupConfig {
            id: "news".to_string(),
            title: "News".to_string(),
            aliases: vec!["Новости".to_string(), "Informational".to_string()],
        }]);

        let news = groups.resolve("News").unwrap();
        assert_eq!(news.id, "news");
        assert_eq!(groups.resolve("Новости"), Some(news.clone()));
        assert_eq!(groups.resolve("Informational"), Some(news));
        assert_eq!(groups.resolve("news"), None);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_dedup_key_is_lowercase() {
        let channel = Channel::new("NEWS1 HD", None, "abc");
        assert_eq!(channel.dedup_key(), "news1 hd");
    }
}
