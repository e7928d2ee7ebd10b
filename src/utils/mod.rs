// Utility functions module
pub mod config;
pub mod template;
pub mod welcome_card;
