// YouTube upload watcher administration

use std::collections::HashMap;

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::api::youtube;
use crate::commands::{require_guild, say_key};
use crate::utils::template::render;
use crate::{Context, Error};

/// Adds a youtube channel to be watched
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn add_ytb(
    ctx: Context<'_>,
    #[description = "The id of the youtube channel to be watched"] ytb_channel_id: String,
    #[description = "The discord channel in which the new videos will be posted, actual if never specified"]
    dc_channel: Option<serenity::Channel>,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };
    ctx.defer().await?;

    let config = ctx.data().store.load(guild_id).await?;
    let language = config.language;

    if config
        .youtube_survey
        .youtube_channels_id
        .contains_key(&ytb_channel_id)
    {
        return say_key(&ctx, language, "youtube_channel_already_watched").await;
    }

    // prove the feed exists before recording anything
    if let Err(e) = youtube::fetch_latest_video(&ctx.data().http_client, &ytb_channel_id).await {
        info!("rejecting watch of youtube channel {}: {}", ytb_channel_id, e);
        return say_key(&ctx, language, "youtube_channel_fetch_error").await;
    }

    // an explicit channel always wins; otherwise keep the configured one,
    // falling back to where the command was typed
    let target_channel = dc_channel
        .map(|channel| channel.id().to_string())
        .or(config.youtube_survey.channel_id)
        .unwrap_or_else(|| ctx.channel_id().to_string());

    ctx.data()
        .store
        .update(guild_id, |config| {
            config.youtube_survey.channel_id = Some(target_channel.clone());
            config
                .youtube_survey
                .youtube_channels_id
                .insert(ytb_channel_id.clone(), None);
            Ok(())
        })
        .await?;

    let template = ctx.data().langs.message(language, "youtube_channel_added");
    let vars = HashMap::from([("dc_channel_id", target_channel.as_str())]);
    let reply = render(template, &vars)
        .unwrap_or_else(|_| format!("Watching, uploads go to <#{target_channel}>"));
    ctx.say(reply).await?;
    Ok(())
}

/// Removes a youtube channel from the watched channels
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn remove_ytb(
    ctx: Context<'_>,
    #[description = "The id of the youtube channel to be removed"] ytb_channel_id: String,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let (language, removed) = ctx
        .data()
        .store
        .update(guild_id, |config| {
            let removed = config
                .youtube_survey
                .youtube_channels_id
                .remove(&ytb_channel_id)
                .is_some();
            Ok((config.language, removed))
        })
        .await?;

    if !removed {
        return say_key(&ctx, language, "youtube_channel_not_watched").await;
    }
    say_key(&ctx, language, "youtube_channel_removed").await
}
