// Gateway event handlers and background tasks
pub mod events;
pub mod guilds;
pub mod help_ticket;
pub mod role_react;
pub mod video_watch;
pub mod voice;
pub mod welcome;
