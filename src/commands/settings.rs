// Guild-level settings: language, logs channel, config export/import

use poise::serenity_prelude as serenity;
use tracing::info;

use crate::commands::{require_guild, say_key};
use crate::models::guild::{GuildConfig, Language};
use crate::{Context, Error};

/// Languages offered by the set_language command
#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum LanguageChoice {
    #[name = "en"]
    En,
    #[name = "fr"]
    Fr,
}

impl From<LanguageChoice> for Language {
    fn from(choice: LanguageChoice) -> Self {
        match choice {
            LanguageChoice::En => Language::En,
            LanguageChoice::Fr => Language::Fr,
        }
    }
}

/// Changes the bot's language
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn set_language(
    ctx: Context<'_>,
    #[description = "The language to be set"] language_prefix: LanguageChoice,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let language = Language::from(language_prefix);
    ctx.data()
        .store
        .update(guild_id, |config| {
            config.language = language;
            Ok(())
        })
        .await?;

    info!("guild {} switched language to {}", guild_id, language.code());
    say_key(&ctx, language, "language_defined").await
}

/// Defines where the bot will send important logs
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn set_logs_channel(
    ctx: Context<'_>,
    #[description = "The channel to be set as the logs channel"] channel: serenity::Channel,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let channel_id = channel.id().to_string();
    let language = ctx
        .data()
        .store
        .update(guild_id, |config| {
            config.logs_channel_id = Some(channel_id);
            Ok(config.language)
        })
        .await?;

    say_key(&ctx, language, "logs_channel_defined").await
}

/// Exports the server's configuration
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn export_config(ctx: Context<'_>) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };

    let config = ctx.data().store.load(guild_id).await?;
    let json = serde_json::to_vec_pretty(&config)?;

    let content = ctx
        .data()
        .langs
        .message(config.language, "server_config")
        .to_string();
    ctx.send(
        poise::CreateReply::default()
            .content(content)
            .attachment(serenity::CreateAttachment::bytes(json, "config.json")),
    )
    .await?;
    Ok(())
}

/// Imports a server's configuration
#[poise::command(slash_command, required_permissions = "ADMINISTRATOR")]
pub async fn import_config(
    ctx: Context<'_>,
    #[description = "JSON file containing the configuration to be imported"]
    conf_file: serenity::Attachment,
) -> Result<(), Error> {
    let Some(guild_id) = require_guild(&ctx).await? else {
        return Ok(());
    };
    let current = ctx.data().store.load(guild_id).await?;

    if !conf_file.filename.ends_with(".json") {
        return say_key(&ctx, current.language, "not_json_file").await;
    }

    let bytes = conf_file.download().await?;
    // validate before replacing anything, a broken import must not brick
    // the guild's config
    let imported: GuildConfig = match serde_json::from_slice(&bytes) {
        Ok(config) => config,
        Err(_) => return say_key(&ctx, current.language, "invalid_config_file").await,
    };

    ctx.data().store.save(guild_id, &imported).await?;
    say_key(&ctx, imported.language, "server_config_imported").await
}
