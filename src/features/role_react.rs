// Role reactions: reactions on mapped messages grant and revoke roles

use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

use crate::models::guild::GuildConfig;
use crate::store::StoreError;
use crate::{Data, Error};

pub async fn reaction_add(
    ctx: &serenity::Context,
    data: &Data,
    reaction: &serenity::Reaction,
) -> Result<(), Error> {
    let Some((guild_id, user_id)) = reacting_member(ctx, reaction) else {
        return Ok(());
    };
    let Some((config, role_id)) = mapped_role(data, guild_id, reaction).await? else {
        return Ok(());
    };

    if let Err(e) = ctx
        .http
        .add_member_role(guild_id, user_id, role_id, Some("role react"))
        .await
    {
        warn!(
            "failed to grant role {} to {} in guild {}: {}",
            role_id, user_id, guild_id, e
        );
        report_role_error(ctx, data, &config).await;
    }
    Ok(())
}

pub async fn reaction_remove(
    ctx: &serenity::Context,
    data: &Data,
    reaction: &serenity::Reaction,
) -> Result<(), Error> {
    let Some((guild_id, user_id)) = reacting_member(ctx, reaction) else {
        return Ok(());
    };
    let Some((config, role_id)) = mapped_role(data, guild_id, reaction).await? else {
        return Ok(());
    };

    if let Err(e) = ctx
        .http
        .remove_member_role(guild_id, user_id, role_id, Some("role react"))
        .await
    {
        warn!(
            "failed to revoke role {} from {} in guild {}: {}",
            role_id, user_id, guild_id, e
        );
        report_role_error(ctx, data, &config).await;
    }
    Ok(())
}

/// Message deletion invalidates every mapping attached to it
pub async fn message_delete(
    data: &Data,
    message_id: serenity::MessageId,
    guild_id: Option<serenity::GuildId>,
) -> Result<(), Error> {
    let Some(guild_id) = guild_id else {
        return Ok(());
    };

    let result = data
        .store
        .update(guild_id.get(), |config| {
            config.remove_message_reacts(&message_id.to_string());
            Ok(())
        })
        .await;
    match result {
        Ok(()) | Err(StoreError::NotFound(_)) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Guild and reacting user, dropping the bot's own reactions
fn reacting_member(
    ctx: &serenity::Context,
    reaction: &serenity::Reaction,
) -> Option<(serenity::GuildId, serenity::UserId)> {
    let guild_id = reaction.guild_id?;
    let user_id = reaction.user_id?;
    let bot_id = { ctx.cache.current_user().id };
    if user_id == bot_id {
        return None;
    }
    Some((guild_id, user_id))
}

/// Config and role mapped to this reaction, if the message is tracked
async fn mapped_role(
    data: &Data,
    guild_id: serenity::GuildId,
    reaction: &serenity::Reaction,
) -> Result<Option<(GuildConfig, serenity::RoleId)>, Error> {
    let config = match data.store.load(guild_id.get()).await {
        Ok(config) => config,
        Err(StoreError::NotFound(_)) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let emoji = reaction.emoji.to_string();
    let Some(role_id) = config.role_for(&reaction.message_id.to_string(), &emoji) else {
        return Ok(None);
    };
    let Ok(role_id) = role_id.parse::<u64>() else {
        warn!(
            "guild {} has a non-numeric role id mapped to {}",
            guild_id, emoji
        );
        return Ok(None);
    };
    Ok(Some((config, serenity::RoleId::new(role_id))))
}

/// Permission failures go to the guild's logs channel when one is set
async fn report_role_error(ctx: &serenity::Context, data: &Data, config: &GuildConfig) {
    let Some(channel_id) = config
        .logs_channel_id
        .as_deref()
        .and_then(|id| id.parse::<u64>().ok())
    else {
        debug!("no logs channel configured, dropping role error report");
        return;
    };

    let text = data
        .langs
        .message(config.language, "role_add_delete_error_log")
        .to_string();
    if let Err(e) = serenity::ChannelId::new(channel_id)
        .send_message(&ctx.http, serenity::CreateMessage::new().content(text))
        .await
    {
        warn!("failed to report role error to logs channel: {}", e);
    }
}
