// Slash commands
pub mod general;
pub mod help_system;
pub mod role_react;
pub mod settings;
pub mod voice;
pub mod welcome;
pub mod youtube;

use crate::models::guild::Language;
use crate::{Context, Error};

/// Guild the command was invoked in; replies and bails for DMs
pub(crate) async fn require_guild(ctx: &Context<'_>) -> Result<Option<u64>, Error> {
    match ctx.guild_id() {
        Some(id) => Ok(Some(id.get())),
        None => {
            ctx.say("This command can only be used in a server.").await?;
            Ok(None)
        }
    }
}

/// Language of the invoking guild, English for DMs or unconfigured guilds
pub(crate) async fn guild_language(ctx: &Context<'_>) -> Language {
    match ctx.guild_id() {
        Some(id) => ctx
            .data()
            .store
            .load(id.get())
            .await
            .map(|config| config.language)
            .unwrap_or_default(),
        None => Language::default(),
    }
}

/// Reply with a language-pack message
pub(crate) async fn say_key(
    ctx: &Context<'_>,
    language: Language,
    key: &str,
) -> Result<(), Error> {
    let text = ctx.data().langs.message(language, key).to_string();
    ctx.say(text).await?;
    Ok(())
}
