// Role-react administration

use poise::serenity_prelude as serenity;
use tracing::warn;

use crate::commands::{require_guild, say_key};
use crate::{Context, Error};

/// Adds a role react to a message
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn add_role_react(
    ctx: Context<'_>,
    #[description = "The emoji to be used as a role react"] emoji: String,
    #[description = "The role to be assigned when the emoji is clicked"] role: serenity::Role,
    #[description = "The id of the message to which the role react will be added"]
    message_id: String,
    #[description = "The channel in which the message is located, actual if not specified"]
    channel: Option<serenity::Channel>,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };
    let language = ctx.data().store.load(guild_id).await?.language;

    let Ok(message_id_num) = message_id.trim().parse::<u64>() else {
        return say_key(&ctx, language, "invalid_message_id").await;
    };
    let Ok(reaction) = serenity::ReactionType::try_from(emoji.as_str()) else {
        return say_key(&ctx, language, "invalid_emoji").await;
    };
    let emoji_key = reaction.to_string();

    let added = ctx
        .data()
        .store
        .update(guild_id, |config| {
            Ok(config.add_role_react(
                &message_id_num.to_string(),
                &emoji_key,
                &role.id.to_string(),
            ))
        })
        .await?;
    if !added {
        return say_key(&ctx, language, "emoji_already_used").await;
    }

    let channel_id = channel.map(|c| c.id()).unwrap_or_else(|| ctx.channel_id());
    let react_result = channel_id
        .create_reaction(
            ctx.http(),
            serenity::MessageId::new(message_id_num),
            reaction,
        )
        .await;
    if let Err(e) = react_result {
        warn!(
            "could not react to message {} in guild {}: {}",
            message_id_num, guild_id, e
        );
        // roll the mapping back, a react the bot could not place would
        // never fire
        ctx.data()
            .store
            .update(guild_id, |config| {
                config.remove_role_react(&message_id_num.to_string(), &emoji_key);
                Ok(())
            })
            .await?;
        return say_key(&ctx, language, "message_fetch_error").await;
    }

    say_key(&ctx, language, "role_react_added").await
}

/// Deletes a role react from a message
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn remove_role_react(
    ctx: Context<'_>,
    #[description = "The emoji to be removed"] emoji: String,
    #[description = "The id of the message from which the role react will be removed"]
    message_id: String,
    #[description = "The channel in which the message is located, actual if not specified"]
    channel: Option<serenity::Channel>,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };
    let language = ctx.data().store.load(guild_id).await?.language;

    let Ok(message_id_num) = message_id.trim().parse::<u64>() else {
        return say_key(&ctx, language, "invalid_message_id").await;
    };
    let Ok(reaction) = serenity::ReactionType::try_from(emoji.as_str()) else {
        return say_key(&ctx, language, "invalid_emoji").await;
    };
    let emoji_key = reaction.to_string();

    let removed = ctx
        .data()
        .store
        .update(guild_id, |config| {
            Ok(config.remove_role_react(&message_id_num.to_string(), &emoji_key))
        })
        .await?;
    if !removed {
        return say_key(&ctx, language, "emoji_not_used").await;
    }

    let channel_id = channel.map(|c| c.id()).unwrap_or_else(|| ctx.channel_id());
    // drop the bot's own reaction, member reactions stay
    if let Err(e) = channel_id
        .delete_reaction(
            ctx.http(),
            serenity::MessageId::new(message_id_num),
            None,
            reaction,
        )
        .await
    {
        warn!(
            "could not remove reaction from message {} in guild {}: {}",
            message_id_num, guild_id, e
        );
    }

    say_key(&ctx, language, "role_react_removed").await
}
