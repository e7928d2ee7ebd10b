// YouTube upload feed + Data API client
// The upload feed is the public Atom document YouTube serves per channel

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("feed request returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("feed for channel {0} has no entries")]
    Empty(String),
}

/// Most recent upload of a watched channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub video_id: String,
}

impl FeedEntry {
    pub fn video_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.video_id)
    }
}

fn feed_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/feeds/videos.xml?channel_id={channel_id}")
}

/// Pull the latest entry's video id out of the Atom feed.
///
/// Entries carry a `<yt:videoId>` element and the feed lists newest first,
/// so the first occurrence is all we need; no XML parser required.
fn parse_latest_video_id(feed: &str) -> Option<String> {
    let start = feed.find("<yt:videoId>")? + "<yt:videoId>".len();
    let rest = &feed[start..];
    let end = rest.find("</yt:videoId>")?;
    let id = rest[..end].trim();
    if id.is_empty() {
        return None;
    }
    Some(id.to_string())
}

/// Fetch the most recent upload of a channel from its public feed
pub async fn fetch_latest_video(
    client: &reqwest::Client,
    channel_id: &str,
) -> Result<FeedEntry, FeedError> {
    let response = client.get(feed_url(channel_id)).send().await?;
    if !response.status().is_success() {
        return Err(FeedError::Status(response.status()));
    }

    let body = response.text().await?;
    let video_id = parse_latest_video_id(&body)
        .ok_or_else(|| FeedError::Empty(channel_id.to_string()))?;
    Ok(FeedEntry { video_id })
}

/// Fetch a channel's display title from the YouTube Data API.
/// Returns None when the API has nothing for the id; callers fall back to
/// the raw channel id.
pub async fn fetch_channel_title(
    client: &reqwest::Client,
    api_key: &str,
    channel_id: &str,
) -> Result<Option<String>, FeedError> {
    let url = format!(
        "https://www.googleapis.com/youtube/v3/channels?part=snippet&id={}&key={}",
        channel_id, api_key
    );

    let response = client.get(&url).send().await?;
    if !response.status().is_success() {
        return Ok(None);
    }

    let data: ChannelsResponse = response.json().await?;
    Ok(data
        .items
        .into_iter()
        .next()
        .map(|item| item.snippet.title))
}

// YouTube API response structures
#[derive(Debug, Deserialize)]
struct ChannelsResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Debug, Deserialize)]
struct ChannelItem {
    snippet: ChannelSnippet,
}

#[derive(Debug, Deserialize)]
struct ChannelSnippet {
    title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED_SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015"
      xmlns="http://www.w3.org/2005/Atom">
 <title>Uploads</title>
 <entry>
  <id>yt:video:dQw4w9WgXcQ</id>
  <yt:videoId>dQw4w9WgXcQ</yt:videoId>
  <link rel="alternate" href="https://www.youtube.com/watch?v=dQw4w9WgXcQ"/>
 </entry>
 <entry>
  <id>yt:video:oldvideo123</id>
  <yt:videoId>oldvideo123</yt:videoId>
 </entry>
</feed>"#;

    #[test]
    fn latest_entry_is_the_first_one() {
        assert_eq!(
            parse_latest_video_id(FEED_SAMPLE),
            Some("dQw4w9WgXcQ".to_string())
        );
    }

    #[test]
    fn feed_without_entries_yields_nothing() {
        let empty = r#"<?xml version="1.0"?><feed><title>Uploads</title></feed>"#;
        assert_eq!(parse_latest_video_id(empty), None);
        assert_eq!(parse_latest_video_id("<yt:videoId></yt:videoId>"), None);
    }

    #[test]
    fn video_url_points_at_watch_page() {
        let entry = FeedEntry {
            video_id: "dQw4w9WgXcQ".to_string(),
        };
        assert_eq!(
            entry.video_url(),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
    }
}
