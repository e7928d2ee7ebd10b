// TyrBot - Rust Edition
// A multi-purpose Discord server management bot

mod api;
mod commands;
mod features;
mod models;
mod store;
mod utils;

use std::env;
use std::sync::Arc;

use ab_glyph::FontVec;
use poise::serenity_prelude as serenity;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::models::lang::LanguagePacks;
use crate::store::ConfigStore;
use crate::utils::config::{assets_dir, servers_dir, templates_dir, CARD_FONT_FILE, HTTP_TIMEOUT_SECS};

/// User data shared across all commands
pub struct Data {
    pub http_client: reqwest::Client,
    pub store: Arc<ConfigStore>,
    pub langs: Arc<LanguagePacks>,
    pub card_font: Arc<FontVec>,
    pub youtube_api_key: Option<String>,
}

// Manual Debug impl since FontVec doesn't impl Debug
impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Data")
            .field("http_client", &"reqwest::Client")
            .field("store", &"ConfigStore")
            .finish()
    }
}

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Register all slash commands
fn get_commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        commands::general::help(),
        commands::general::ping(),
        commands::general::qr(),
        commands::settings::set_language(),
        commands::settings::set_logs_channel(),
        commands::settings::export_config(),
        commands::settings::import_config(),
        commands::welcome::switch_welcome_system(),
        commands::welcome::set_welcome_background(),
        commands::welcome::remove_welcome_background(),
        commands::welcome::set_welcome_message_template(),
        commands::role_react::add_role_react(),
        commands::role_react::remove_role_react(),
        commands::voice::add_join_to_create_channel(),
        commands::voice::remove_join_to_create_channel(),
        commands::youtube::add_ytb(),
        commands::youtube::remove_ytb(),
        commands::help_system::add_help_channel(),
        commands::help_system::remove_help_channel(),
    ]
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            env::var("RUST_LOG").unwrap_or_else(|_| "tyr_rs=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let token = env::var("DISCORD_TOKEN").expect("DISCORD_TOKEN must be set");
    let youtube_api_key = env::var("YOUTUBE_API_KEY").ok();

    info!("Starting TyrBot (Rust Edition)...");

    // Build HTTP client for avatar downloads and feed polling
    let http_client = reqwest::Client::builder()
        .user_agent("Tyr-Bot/1.0")
        .timeout(std::time::Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .expect("Failed to create HTTP client");

    let store = Arc::new(ConfigStore::new(servers_dir()));
    let langs = Arc::new(
        LanguagePacks::load(&templates_dir()).expect("Failed to load language packs"),
    );

    // Missing font is a configuration error, nothing to do without it
    let font_path = assets_dir().join(CARD_FONT_FILE);
    let font_data = std::fs::read(&font_path)
        .unwrap_or_else(|e| panic!("Failed to read card font {}: {}", font_path.display(), e));
    let card_font = Arc::new(FontVec::try_from_vec(font_data).expect("Invalid card font"));

    // Setup framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: get_commands(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(features::events::handle(ctx, event, framework, data))
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Command error: {:?}", error);
                            let _ = ctx.say(format!("❌ Error: {}", error)).await;
                        }
                        err => {
                            error!("Framework error: {:?}", err);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Bot is ready! Registering commands...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("Commands registered successfully!");

                features::video_watch::spawn(
                    ctx.http.clone(),
                    http_client.clone(),
                    store.clone(),
                    youtube_api_key.clone(),
                );

                Ok(Data {
                    http_client,
                    store,
                    langs,
                    card_font,
                    youtube_api_key,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS
        | serenity::GatewayIntents::GUILD_VOICE_STATES;

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .expect("Failed to create client");

    // Run with graceful shutdown
    let shard_manager = client.shard_manager.clone();

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to register Ctrl+C handler");
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    info!("Goodbye!");
}
