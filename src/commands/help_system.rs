// Help ticket system administration

use poise::serenity_prelude as serenity;
use tracing::warn;

use crate::commands::{require_guild, say_key};
use crate::features::help_ticket;
use crate::{Context, Error};

/// Adds a help ticket system to a text channel
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn add_help_channel(
    ctx: Context<'_>,
    #[description = "The text channel to which the help ticket system will be added"]
    channel: serenity::Channel,
    #[description = "The role that manages the help tickets"] help_role: serenity::Role,
    #[description = "The category in which the help tickets will be created, actual if never specified"]
    help_category: Option<serenity::Channel>,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let config = ctx.data().store.load(guild_id).await?;
    let language = config.language;
    let channel_key = channel.id().to_string();

    if config.help_system.channels_id.contains_key(&channel_key) {
        return say_key(&ctx, language, "help_system_channel_already_defined").await;
    }

    // explicit category, else the stored one, else the channel's own
    let category_id = help_category
        .map(|category| category.id().to_string())
        .or(config.help_system.help_category_id)
        .or_else(|| {
            channel
                .clone()
                .guild()
                .and_then(|guild_channel| guild_channel.parent_id)
                .map(|id| id.to_string())
        });

    ctx.data()
        .store
        .update(guild_id, |config| {
            config.help_system.help_category_id = category_id;
            config
                .help_system
                .channels_id
                .insert(channel_key, help_role.id.to_string());
            Ok(())
        })
        .await?;

    let prompt = help_ticket::ticket_prompt(ctx.data(), language);
    channel.id().send_message(ctx.http(), prompt).await?;

    say_key(&ctx, language, "help_channel_system_added").await
}

/// Removes a help ticket system from a text channel
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn remove_help_channel(
    ctx: Context<'_>,
    #[description = "The text channel from which the help ticket system will be removed"]
    channel: serenity::Channel,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let channel_key = channel.id().to_string();
    let (language, removed) = ctx
        .data()
        .store
        .update(guild_id, |config| {
            let removed = config.help_system.channels_id.remove(&channel_key).is_some();
            Ok((config.language, removed))
        })
        .await?;

    if !removed {
        return say_key(&ctx, language, "help_system_channel_not_defined").await;
    }

    if let Err(e) = channel.id().delete(ctx.http()).await {
        warn!(
            "could not delete help channel {} in guild {}: {}",
            channel_key, guild_id, e
        );
        return say_key(&ctx, language, "help_system_channel_deletion_error").await;
    }
    say_key(&ctx, language, "help_system_channel_removed").await
}
