// Guild lifecycle: storage slots follow the bot joining and leaving

use poise::serenity_prelude as serenity;
use tracing::{debug, info, warn};

use crate::store::StoreError;
use crate::{Data, Error};

pub async fn guild_create(
    data: &Data,
    guild: &serenity::Guild,
    is_new: Option<bool>,
) -> Result<(), Error> {
    if is_new != Some(true) {
        return Ok(());
    }

    match data.store.create_default(guild.id.get()).await {
        Ok(()) => info!("Joined guild {} ({})", guild.name, guild.id),
        // a slot can survive a leave/rejoin cycle, keep it
        Err(StoreError::AlreadyExists(_)) => {
            debug!("guild {} rejoined, keeping existing config", guild.id);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

pub async fn guild_delete(
    data: &Data,
    incomplete: &serenity::UnavailableGuild,
) -> Result<(), Error> {
    // unavailable means an outage, not a kick
    if incomplete.unavailable {
        return Ok(());
    }

    match data.store.delete(incomplete.id.get()).await {
        Ok(()) => info!("Left guild {}, config removed", incomplete.id),
        Err(StoreError::NotFound(_)) => {
            warn!("left guild {} but no config was stored", incomplete.id);
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
