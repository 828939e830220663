//! AceStream community playlist parser
//!
//! Playlists pair an `#EXTINF:` metadata line with an `acestream://` line:
//!
//! ```text
//! #EXTINF:-1,Sports Channel (News)
//! acestream://abcd1234
//! ```
//!
//! The title may end with a `(group)` tag that is resolved through
//! [`ChannelGroups`]. Parsing is best effort: malformed entries are dropped,
//! nothing here returns an error.

use crate::models::{Channel, ChannelGroups};

pub const EXTINF_MARKER: &str = "#EXTINF:";
pub const ACESTREAM_MARKER: &str = "acestream://";

/// Parse playlist text into channels in source order. Duplicates are kept.
pub fn parse_ace_playlist(content: &str, groups: &ChannelGroups) -> Vec<Channel> {
    let lines: Vec<&str> = content
        .lines()
        .map(trim_line)
        .filter(|line| !line.is_empty())
        .collect();

    let mut channels = Vec::new();
    let mut k = 0;

    while k + 1 < lines.len() {
        let meta = lines[k];
        if !meta.starts_with(EXTINF_MARKER) {
            k += 1;
            continue;
        }

        let uri = lines[k + 1];
        if !uri.starts_with(ACESTREAM_MARKER) {
            // Orphaned metadata line, retry from the next line
            k += 1;
            continue;
        }

        if let Some(channel) = parse_entry(meta, uri, groups) {
            channels.push(channel);
        }
        k += 2;
    }

    channels
}

/// Whitespace trim that also drops byte order marks
fn trim_line(line: &str) -> &str {
    line.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

fn parse_entry(meta: &str, uri: &str, groups: &ChannelGroups) -> Option<Channel> {
    // The comma search starts past the marker so the duration field is skipped
    let after_marker = &meta[EXTINF_MARKER.len()..];
    let comma = after_marker.find(',')?;
    let title = &after_marker[comma + 1..];

    let (name, group) = match (title.rfind('('), title.rfind(')')) {
        (Some(open), Some(close)) => {
            let label = if close > open {
                title[open + 1..close].trim()
            } else {
                ""
            };
            let group = if label.is_empty() {
                None
            } else {
                groups.resolve(label)
            };
            (title[..open].trim(), group)
        }
        _ => (title.trim(), None),
    };

    if name.is_empty() {
        return None;
    }

    let content_id = uri.rsplit('/').next().unwrap_or_default();
    if content_id.is_empty() {
        return None;
    }

    Some(Channel::new(name, group, content_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChannelGroup;
    use rstest::rstest;
    use std::sync::Arc;

    fn news_groups() -> (ChannelGroups, Arc<ChannelGroup>) {
        let news = Arc::new(ChannelGroup {
            id: "news".to_string(),
            title: "News".to_string(),
        });
        let mut groups = ChannelGroups::new();
        groups.insert("News", news.clone());
        (groups, news)
    }

    #[test]
    fn test_grouped_channel() {
        let (groups, news) = news_groups();
        let playlist = "#EXTM3U\n#EXTINF:-1,Sports Channel (News)\nacestream://abcd1234\n";

        let channels = parse_ace_playlist(playlist, &groups);

        assert_eq!(
            channels,
            vec![Channel::new("Sports Channel", Some(news), "abcd1234")]
        );
    }

    #[test]
    fn test_plain_channel_has_no_group() {
        let (groups, _) = news_groups();
        let channels =
            parse_ace_playlist("#EXTINF:-1,Plain Channel\nacestream://ffff0000", &groups);

        assert_eq!(channels, vec![Channel::new("Plain Channel", None, "ffff0000")]);
    }

    #[test]
    fn test_unknown_group_label_is_not_an_error() {
        let (groups, _) = news_groups();
        let channels =
            parse_ace_playlist("#EXTINF:-1,Movie One (Cinema)\nacestream://c1", &groups);

        assert_eq!(channels, vec![Channel::new("Movie One", None, "c1")]);
    }

    #[test]
    fn test_last_parentheses_win() {
        let (groups, news) = news_groups();
        let channels = parse_ace_playlist(
            "#EXTINF:-1,Channel (1) Extra (News)\nacestream://x1",
            &groups,
        );

        assert_eq!(
            channels,
            vec![Channel::new("Channel (1) Extra", Some(news), "x1")]
        );
    }

    #[test]
    fn test_reversed_parentheses_resolve_no_group() {
        let (groups, _) = news_groups();
        let channels = parse_ace_playlist("#EXTINF:-1,Odd ) Name (\nacestream://x2", &groups);

        assert_eq!(channels, vec![Channel::new("Odd ) Name", None, "x2")]);
    }

    #[test]
    fn test_orphaned_metadata_skips_one_line_at_a_time() {
        let (groups, _) = news_groups();
        // The first EXTINF has no URI; the second EXTINF must still be paired
        let playlist = "#EXTINF:-1,Orphan\n#EXTINF:-1,Real\nacestream://r1\n";

        let channels = parse_ace_playlist(playlist, &groups);

        assert_eq!(channels, vec![Channel::new("Real", None, "r1")]);
    }

    #[test]
    fn test_stray_lines_are_skipped() {
        let (groups, _) = news_groups();
        let playlist = "garbage\n\n   \nacestream://lonely\n#EXTINF:-1,Kept\nacestream://k1";

        let channels = parse_ace_playlist(playlist, &groups);

        assert_eq!(channels, vec![Channel::new("Kept", None, "k1")]);
    }

    #[rstest]
    #[case::no_comma("#EXTINF:-1 Missing Comma\nacestream://m1")]
    #[case::empty_name("#EXTINF:-1,   \nacestream://m2")]
    #[case::empty_name_with_group("#EXTINF:-1, (News)\nacestream://m3")]
    #[case::empty_content_id("#EXTINF:-1,No Id\nacestream://")]
    #[case::trailing_slash("#EXTINF:-1,No Id\nacestream://abc/")]
    fn test_malformed_pair_is_dropped(#[case] bad_pair: &str) {
        let (groups, _) = news_groups();
        let playlist = format!(
            "#EXTINF:-1,Before\nacestream://b1\n{bad_pair}\n#EXTINF:-1,After\nacestream://a1"
        );

        let channels = parse_ace_playlist(&playlist, &groups);

        // Only the malformed pair disappears; its neighbours survive
        let names: Vec<_> = channels.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Before", "After"]);
    }

    #[test]
    fn test_comma_in_duration_field_not_used_before_marker() {
        let (groups, _) = news_groups();
        let channels = parse_ace_playlist(
            "#EXTINF:-1 tvg-name=\"x\",Title, With Comma\nacestream://t1",
            &groups,
        );

        assert_eq!(channels, vec![Channel::new("Title, With Comma", None, "t1")]);
    }

    #[test]
    fn test_content_id_is_last_path_segment() {
        let (groups, _) = news_groups();
        let channels = parse_ace_playlist(
            "#EXTINF:-1,Nested\nacestream://host/path/deadbeef",
            &groups,
        );

        assert_eq!(channels[0].content_id, "deadbeef");
    }

    #[test]
    fn test_duplicates_are_preserved_and_crlf_handled() {
        let (groups, _) = news_groups();
        let playlist = "#EXTINF:-1,Dup\r\nacestream://d1\r\n#EXTINF:-1,dup\r\nacestream://d2\r\n";

        let channels = parse_ace_playlist(playlist, &groups);

        assert_eq!(
            channels,
            vec![Channel::new("Dup", None, "d1"), Channel::new("dup", None, "d2")]
        );
    }

    #[test]
    fn test_final_metadata_line_without_partner() {
        let (groups, _) = news_groups();
        assert!(parse_ace_playlist("#EXTINF:-1,Alone", &groups).is_empty());
        assert!(parse_ace_playlist("", &groups).is_empty());
    }

    #[test]
    fn test_leading_byte_order_mark_is_ignored() {
        let playlist = "\u{feff}#EXTINF:-1,First\nacestream://aaa\n#EXTINF:-1,Second\nacestream://bbb\n";

        let channels = parse_ace_playlist(playlist, &ChannelGroups::new());

        assert_eq!(
            channels,
            vec![
                Channel::new("First", None, "aaa"),
                Channel::new("Second", None, "bbb"),
            ]
        );
    }

    #[test]
    fn test_parser_is_deterministic() {
        let (groups, _) = news_groups();
        let playlist = "#EXTINF:-1,A (News)\nacestream://1\n#EXTINF:-1,B\nacestream://2\nnoise";

        assert_eq!(
            parse_ace_playlist(playlist, &groups),
            parse_ace_playlist(playlist, &groups)
        );
    }

    #[test]
    fn test_parser_total_over_odd_input() {
        let (groups, _) = news_groups();
        for input in [
            "#EXTINF:",
            "#EXTINF:\nacestream://",
            "#EXTINF:(,)\nacestream://z",
            "#EXTINF:,))((\nacestream://z",
            "\u{feff}#EXTINF:-1,Ünïcödé (News)\nacestream://ü",
        ] {
            let _ = parse_ace_playlist(input, &groups);
        }
    }
}
