// YouTube upload watcher
// Periodic poll of every watched channel's public feed, per guild

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::{debug, info, warn};

use crate::api::youtube;
use crate::store::{ConfigStore, StoreError};
use crate::utils::config::POLL_INTERVAL_SECS;
use crate::utils::template::render;

/// A notification is due whenever the fetched id differs from the stored
/// one, including the never-seen state.
pub fn should_notify(last_seen: Option<&str>, latest: &str) -> bool {
    last_seen != Some(latest)
}

/// Hard cap on one feed fetch; a stalled connection counts as a failed
/// fetch for this tick instead of holding up every other guild.
const FEED_FETCH_TIMEOUT: Duration = Duration::from_secs(20);

async fn bounded<F, T>(fut: F) -> Option<T>
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(FEED_FETCH_TIMEOUT, fut).await.ok()
}

pub fn spawn(
    http: Arc<serenity::Http>,
    http_client: reqwest::Client,
    store: Arc<ConfigStore>,
    api_key: Option<String>,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(POLL_INTERVAL_SECS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if let Err(e) = tick(&http, &http_client, &store, api_key.as_deref()).await {
                warn!("video watch tick failed: {}", e);
            }
        }
    });
}

/// One poll pass over every guild. A failing channel or guild never stops
/// the others.
pub async fn tick(
    http: &Arc<serenity::Http>,
    http_client: &reqwest::Client,
    store: &ConfigStore,
    api_key: Option<&str>,
) -> Result<(), StoreError> {
    for guild_id in store.guild_ids().await? {
        let config = match store.load(guild_id).await {
            Ok(config) => config,
            Err(e) => {
                warn!("skipping guild {} this tick: {}", guild_id, e);
                continue;
            }
        };
        let survey = config.youtube_survey;
        if survey.youtube_channels_id.is_empty() {
            continue;
        }
        let Some(notify_channel) = survey
            .channel_id
            .as_deref()
            .and_then(|id| id.parse::<u64>().ok())
        else {
            continue;
        };

        // fetch all of this guild's feeds concurrently, one slow channel
        // must not hold up the rest
        let fetches = survey.youtube_channels_id.keys().map(|yt_channel| {
            let yt_channel = yt_channel.clone();
            async move {
                let result = bounded(youtube::fetch_latest_video(http_client, &yt_channel)).await;
                (yt_channel, result)
            }
        });
        let results = futures::future::join_all(fetches).await;

        for (yt_channel, result) in results {
            let entry = match result {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => {
                    debug!("feed fetch for {} failed, skipping: {}", yt_channel, e);
                    continue;
                }
                None => {
                    debug!("feed fetch for {} timed out, skipping", yt_channel);
                    continue;
                }
            };
            let last_seen = survey
                .youtube_channels_id
                .get(&yt_channel)
                .cloned()
                .flatten();
            if !should_notify(last_seen.as_deref(), &entry.video_id) {
                continue;
            }

            let display_name = channel_display_name(http_client, api_key, &yt_channel).await;
            let video_url = entry.video_url();
            let vars = HashMap::from([
                ("youtube_channel", display_name.as_str()),
                ("youtube_video", video_url.as_str()),
            ]);
            let text = match render(&survey.new_video_message_template, &vars) {
                Ok(text) => text,
                Err(e) => {
                    warn!("guild {} has a broken video template: {}", guild_id, e);
                    continue;
                }
            };

            // announce first, persist after, so a failed send retries on
            // the next tick
            let send = serenity::ChannelId::new(notify_channel)
                .send_message(http, serenity::CreateMessage::new().content(text))
                .await;
            if let Err(e) = send {
                warn!("failed to announce video for guild {}: {}", guild_id, e);
                continue;
            }
            info!(
                "announced video {} of {} in guild {}",
                entry.video_id, yt_channel, guild_id
            );

            let video_id = entry.video_id.clone();
            if let Err(e) = store
                .update(guild_id, move |config| {
                    config
                        .youtube_survey
                        .youtube_channels_id
                        .insert(yt_channel, Some(video_id));
                    Ok(())
                })
                .await
            {
                warn!("failed to persist seen video for guild {}: {}", guild_id, e);
            }
        }
    }
    Ok(())
}

/// Human-readable channel name, falling back to the raw id
async fn channel_display_name(
    http_client: &reqwest::Client,
    api_key: Option<&str>,
    yt_channel: &str,
) -> String {
    if let Some(key) = api_key {
        match youtube::fetch_channel_title(http_client, key, yt_channel).await {
            Ok(Some(title)) => return title,
            Ok(None) => {}
            Err(e) => debug!("channel title lookup for {} failed: {}", yt_channel, e),
        }
    }
    yt_channel.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sighting_notifies() {
        assert!(should_notify(None, "v2"));
    }

    #[test]
    fn changed_id_notifies() {
        assert!(should_notify(Some("v1"), "v2"));
    }

    #[test]
    fn unchanged_id_stays_silent() {
        assert!(!should_notify(Some("v2"), "v2"));
    }

    // paused time lets the deadline fire without waiting for it
    #[tokio::test(start_paused = true)]
    async fn stalled_fetch_is_cut_off_and_quick_one_passes() {
        assert_eq!(bounded(std::future::pending::<u8>()).await, None);
        assert_eq!(bounded(async { 7u8 }).await, Some(7));
    }

    // the decide-then-persist sequence of one tick, minus the network
    #[tokio::test]
    async fn seen_state_transition_round_trips_through_the_store() {
        let root = std::env::temp_dir().join(format!("tyr-watch-test-{}", std::process::id()));
        let store = ConfigStore::new(root);
        let guild = 42;
        let _ = store.delete(guild).await;
        store.create_default(guild).await.unwrap();
        store
            .update(guild, |config| {
                config
                    .youtube_survey
                    .youtube_channels_id
                    .insert("UC123".to_string(), None);
                Ok(())
            })
            .await
            .unwrap();

        // first tick: never-seen channel, feed says "v2"
        let config = store.load(guild).await.unwrap();
        let last_seen = config.youtube_survey.youtube_channels_id["UC123"].clone();
        assert!(should_notify(last_seen.as_deref(), "v2"));
        store
            .update(guild, |config| {
                config
                    .youtube_survey
                    .youtube_channels_id
                    .insert("UC123".to_string(), Some("v2".to_string()));
                Ok(())
            })
            .await
            .unwrap();

        // second tick: feed still says "v2", nothing to announce
        let config = store.load(guild).await.unwrap();
        let last_seen = config.youtube_survey.youtube_channels_id["UC123"].clone();
        assert_eq!(last_seen.as_deref(), Some("v2"));
        assert!(!should_notify(last_seen.as_deref(), "v2"));
    }
}
