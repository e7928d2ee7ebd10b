// Welcome system administration

use poise::serenity_prelude as serenity;

use crate::commands::{require_guild, say_key};
use crate::utils::config::GUILD_BACKGROUND_FILE;
use crate::{Context, Error};

/// Enables/disables the welcome system
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn switch_welcome_system(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let language = ctx
        .data()
        .store
        .update(guild_id, |config| {
            config.welcome_system.active = !config.welcome_system.active;
            Ok(config.language)
        })
        .await?;

    say_key(&ctx, language, "welcome_system_switched").await
}

/// Defines the background image for the welcome card
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn set_welcome_background(
    ctx: Context<'_>,
    #[description = "The image to be set as the welcome card background"]
    background_image: serenity::Attachment,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };
    ctx.defer().await?;

    let bytes = background_image.download().await?;
    let store = &ctx.data().store;
    let path = store.guild_dir(guild_id).join(GUILD_BACKGROUND_FILE);
    tokio::fs::create_dir_all(store.guild_dir(guild_id)).await?;
    tokio::fs::write(&path, &bytes).await?;

    let language = store
        .update(guild_id, |config| {
            config.welcome_system.background_image = Some(path.to_string_lossy().into_owned());
            Ok(config.language)
        })
        .await?;

    say_key(&ctx, language, "welcome_background_image_defined").await
}

/// Removes the personalized welcome card background image
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn remove_welcome_background(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let store = &ctx.data().store;
    let language = store
        .update(guild_id, |config| {
            config.welcome_system.background_image = None;
            Ok(config.language)
        })
        .await?;

    let path = store.guild_dir(guild_id).join(GUILD_BACKGROUND_FILE);
    if let Err(e) = tokio::fs::remove_file(&path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            return Err(e.into());
        }
    }

    say_key(&ctx, language, "welcome_background_image_removed").await
}

/// Defines the message to be set as the welcome message
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn set_welcome_message_template(
    ctx: Context<'_>,
    #[description = "The message to be set as the welcome message"] message_template: String,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let language = ctx
        .data()
        .store
        .update(guild_id, |config| {
            config.welcome_system.welcome_message_template = message_template;
            Ok(config.language)
        })
        .await?;

    say_key(&ctx, language, "welcome_message_defined").await
}
