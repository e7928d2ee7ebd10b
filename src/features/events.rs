// Gateway event dispatch

use poise::serenity_prelude::{self as serenity, FullEvent};
use tracing::info;

use crate::features::{guilds, help_ticket, role_react, voice, welcome};
use crate::{Data, Error};

pub async fn handle(
    ctx: &serenity::Context,
    event: &FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        FullEvent::Ready { data_about_bot } => {
            info!("Connected as {}", data_about_bot.user.name);
        }
        FullEvent::GuildCreate { guild, is_new } => {
            guilds::guild_create(data, guild, *is_new).await?;
        }
        FullEvent::GuildDelete { incomplete, .. } => {
            guilds::guild_delete(data, incomplete).await?;
        }
        FullEvent::GuildMemberAddition { new_member } => {
            welcome::member_join(ctx, data, new_member).await?;
        }
        FullEvent::ReactionAdd { add_reaction } => {
            role_react::reaction_add(ctx, data, add_reaction).await?;
        }
        FullEvent::ReactionRemove { removed_reaction } => {
            role_react::reaction_remove(ctx, data, removed_reaction).await?;
        }
        FullEvent::MessageDelete {
            deleted_message_id,
            guild_id,
            ..
        } => {
            role_react::message_delete(data, *deleted_message_id, *guild_id).await?;
        }
        FullEvent::VoiceStateUpdate { old, new } => {
            voice::voice_state_update(ctx, data, old.as_ref(), new).await?;
        }
        FullEvent::InteractionCreate { interaction } => {
            help_ticket::interaction_create(ctx, data, interaction).await?;
        }
        _ => {}
    }
    Ok(())
}
