// Centralized configuration for TyrBot

use std::path::PathBuf;

/// How often the YouTube upload watcher polls each guild's watched channels
pub const POLL_INTERVAL_SECS: u64 = 300;

/// Outbound HTTP request timeout (feed polls, avatar downloads).
/// A stalled connection must never hold a poll tick or a join event open.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Font used for the welcome card text, relative to the assets directory
pub const CARD_FONT_FILE: &str = "Geologica-Regular.ttf";

/// Stock welcome card background, used when a guild has not uploaded one
pub const DEFAULT_BACKGROUND_FILE: &str = "new_member_background.jpg";

/// File name a guild's custom welcome background is stored under
pub const GUILD_BACKGROUND_FILE: &str = "welcome_background.png";

/// Root data directory, overridable for deployments
pub fn data_dir() -> PathBuf {
    std::env::var("TYR_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Per-guild storage slots live here
pub fn servers_dir() -> PathBuf {
    data_dir().join("servers")
}

/// Language packs live here
pub fn templates_dir() -> PathBuf {
    data_dir().join("templates")
}

/// Static assets (font, stock background)
pub fn assets_dir() -> PathBuf {
    data_dir().join("assets")
}

/// Discord embed colors
pub mod colors {
    pub const PRIMARY: u32 = 0x00bfff;
    pub const SUCCESS: u32 = 0x2ecc71;
    pub const ERROR: u32 = 0xff0000;
    pub const INFO: u32 = 0x3498db;
}
