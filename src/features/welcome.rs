// Welcome cards on member join

use std::collections::HashMap;

use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

use crate::models::guild::GuildConfig;
use crate::store::StoreError;
use crate::utils::config::{assets_dir, DEFAULT_BACKGROUND_FILE};
use crate::utils::template::render;
use crate::utils::welcome_card;
use crate::{Data, Error};

pub async fn member_join(
    ctx: &serenity::Context,
    data: &Data,
    member: &serenity::Member,
) -> Result<(), Error> {
    let guild_id = member.guild_id.get();
    let config = match data.store.load(guild_id).await {
        Ok(config) => config,
        Err(StoreError::NotFound(_)) => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if !config.welcome_system.active {
        return Ok(());
    }

    // guard must not live across an await
    let (system_channel, guild_name) = {
        match ctx.cache.guild(member.guild_id) {
            Some(guild) => (guild.system_channel_id, guild.name.clone()),
            None => return Ok(()),
        }
    };
    let Some(channel_id) = system_channel else {
        debug!("guild {} has no system channel, skipping welcome", guild_id);
        return Ok(());
    };

    let card = match build_card(data, &config, member, &guild_name).await {
        Ok(card) => Some(card),
        Err(e) => {
            warn!("skipping welcome card for guild {}: {}", guild_id, e);
            None
        }
    };

    let mention = format!("<@{}>", member.user.id.get());
    let vars = HashMap::from([("member", mention.as_str()), ("server", guild_name.as_str())]);
    let template = data.langs.message(config.language, "welcome_message");
    let content = match render(template, &vars) {
        Ok(content) => content,
        Err(e) => {
            warn!("welcome message template for guild {} is broken: {}", guild_id, e);
            format!("Welcome {}!", mention)
        }
    };

    let mut message = serenity::CreateMessage::new().content(content);
    if let Some(bytes) = card {
        message = message.add_file(serenity::CreateAttachment::bytes(bytes, "welcome_card.png"));
    }
    channel_id.send_message(&ctx.http, message).await?;
    Ok(())
}

async fn build_card(
    data: &Data,
    config: &GuildConfig,
    member: &serenity::Member,
    guild_name: &str,
) -> Result<Vec<u8>, Error> {
    let background_path = config
        .welcome_system
        .background_image
        .as_ref()
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| assets_dir().join(DEFAULT_BACKGROUND_FILE));
    let background_bytes = tokio::fs::read(&background_path).await?;
    let background = image::load_from_memory(&background_bytes)?;

    // the CDN serves webp by default, ask for png instead
    let avatar_url = member.face().replace(".webp", ".png");
    let avatar_bytes = data
        .http_client
        .get(&avatar_url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let vars = HashMap::from([
        ("member", member.user.name.as_str()),
        ("server", guild_name),
    ]);
    let text = render(&config.welcome_system.welcome_message_template, &vars)
        .unwrap_or_else(|_| format!("Welcome {}!", member.user.name));

    let card = welcome_card::compose(&avatar_bytes, &background, data.card_font.as_ref(), &text)?;
    Ok(card)
}
