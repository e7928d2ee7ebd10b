// Join-to-create voice channels: spawn private channels and reap empty ones

use std::collections::HashMap;

use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

use crate::models::guild::GuildConfig;
use crate::store::StoreError;
use crate::utils::template::render;
use crate::{Data, Error};

pub async fn voice_state_update(
    ctx: &serenity::Context,
    data: &Data,
    old: Option<&serenity::VoiceState>,
    new: &serenity::VoiceState,
) -> Result<(), Error> {
    let Some(guild_id) = new.guild_id else {
        return Ok(());
    };
    let config = match data.store.load(guild_id.get()).await {
        Ok(config) => config,
        Err(StoreError::NotFound(_)) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    if let Some(left) = old.and_then(|state| state.channel_id) {
        reap_if_empty(ctx, data, guild_id, left, &config).await?;
    }
    if let Some(joined) = new.channel_id {
        spawn_private_channel(ctx, data, guild_id, joined, new, &config).await?;
    }
    Ok(())
}

/// Delete a temporary channel once its last occupant leaves
async fn reap_if_empty(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    left: serenity::ChannelId,
    config: &GuildConfig,
) -> Result<(), Error> {
    let left_key = left.get().to_string();
    if !config
        .join_to_create_channel_system
        .temp_voice_channels_id
        .contains(&left_key)
    {
        return Ok(());
    }

    let still_occupied = {
        ctx.cache
            .guild(guild_id)
            .map(|guild| {
                guild
                    .voice_states
                    .values()
                    .any(|state| state.channel_id == Some(left))
            })
            // without cache data, assume occupied rather than cut a call short
            .unwrap_or(true)
    };
    if still_occupied {
        return Ok(());
    }

    if let Err(e) = left.delete(&ctx.http).await {
        warn!("failed to delete temp voice channel {}: {}", left, e);
    }
    data.store
        .update(guild_id.get(), |config| {
            config
                .join_to_create_channel_system
                .temp_voice_channels_id
                .remove(&left_key);
            Ok(())
        })
        .await?;
    Ok(())
}

/// Joining a creator channel spawns a private channel owned by the joiner
async fn spawn_private_channel(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    joined: serenity::ChannelId,
    state: &serenity::VoiceState,
    config: &GuildConfig,
) -> Result<(), Error> {
    let system = &config.join_to_create_channel_system;
    if !system
        .join_to_create_channels_id
        .contains(&joined.get().to_string())
    {
        return Ok(());
    }

    let member = match &state.member {
        Some(member) => member.clone(),
        None => guild_id.member(&ctx.http, state.user_id).await?,
    };
    let vars = HashMap::from([("member", member.user.name.as_str())]);
    let name = render(&system.channel_name_template, &vars)
        .unwrap_or_else(|_| format!("{}'s channel", member.user.name));

    let category = match joined.to_channel(ctx).await {
        Ok(channel) => channel.guild().and_then(|channel| channel.parent_id),
        Err(e) => {
            debug!("could not resolve creator channel {}: {}", joined, e);
            None
        }
    };

    let mut builder = serenity::CreateChannel::new(name).kind(serenity::ChannelType::Voice);
    if let Some(category) = category {
        builder = builder.category(category);
    }
    let channel = match guild_id.create_channel(&ctx.http, builder).await {
        Ok(channel) => channel,
        Err(e) => {
            warn!("failed to create private channel in guild {}: {}", guild_id, e);
            return Ok(());
        }
    };

    data.store
        .update(guild_id.get(), |config| {
            config
                .join_to_create_channel_system
                .temp_voice_channels_id
                .insert(channel.id.get().to_string());
            Ok(())
        })
        .await?;

    guild_id
        .edit_member(
            &ctx.http,
            member.user.id,
            serenity::EditMember::new().voice_channel(channel.id),
        )
        .await?;

    // the creator manages their own channel
    let overwrite = serenity::PermissionOverwrite {
        allow: serenity::Permissions::CONNECT
            | serenity::Permissions::MUTE_MEMBERS
            | serenity::Permissions::DEAFEN_MEMBERS
            | serenity::Permissions::MOVE_MEMBERS
            | serenity::Permissions::MANAGE_CHANNELS
            | serenity::Permissions::MANAGE_ROLES,
        deny: serenity::Permissions::empty(),
        kind: serenity::PermissionOverwriteType::Member(member.user.id),
    };
    if let Err(e) = channel.create_permission(&ctx.http, overwrite).await {
        warn!(
            "failed to grant {} control of their channel: {}",
            member.user.name, e
        );
    }
    Ok(())
}
