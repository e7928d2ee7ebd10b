// Join-to-create channel administration

use poise::serenity_prelude as serenity;

use crate::commands::{require_guild, say_key};
use crate::{Context, Error};

/// Adds a private voice channel creator
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn add_join_to_create_channel(
    ctx: Context<'_>,
    #[description = "The voice channel to be set as a private voice channel creator"]
    channel: serenity::Channel,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let channel_id = channel.id().to_string();
    let (language, inserted) = ctx
        .data()
        .store
        .update(guild_id, |config| {
            let inserted = config
                .join_to_create_channel_system
                .join_to_create_channels_id
                .insert(channel_id);
            Ok((config.language, inserted))
        })
        .await?;

    if !inserted {
        return say_key(&ctx, language, "channel_already_used").await;
    }
    say_key(&ctx, language, "join_to_create_channel_added").await
}

/// Deletes a private voice channel creator
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn remove_join_to_create_channel(
    ctx: Context<'_>,
    #[description = "The voice channel to be removed from the private voice channel creators"]
    channel: serenity::Channel,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let channel_id = channel.id().to_string();
    let (language, removed) = ctx
        .data()
        .store
        .update(guild_id, |config| {
            let removed = config
                .join_to_create_channel_system
                .join_to_create_channels_id
                .remove(&channel_id);
            Ok((config.language, removed))
        })
        .await?;

    if !removed {
        return say_key(&ctx, language, "is_not_join_to_create_channel").await;
    }
    say_key(&ctx, language, "join_to_create_channel_removed").await
}
