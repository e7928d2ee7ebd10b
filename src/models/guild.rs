use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Language a guild's bot replies are looked up in
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "en" => Some(Language::En),
            "fr" => Some(Language::Fr),
            _ => None,
        }
    }
}

/// Guild (Server) specific configuration
///
/// One JSON document per guild. All Discord and YouTube identifiers are
/// stored as strings so the document survives JSON's 53-bit integer limit.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GuildConfig {
    /// Language used for all bot replies in this guild
    #[serde(default)]
    pub language: Language,
    /// Channel ID where permission failures get reported
    #[serde(default)]
    pub logs_channel_id: Option<String>,
    #[serde(default)]
    pub welcome_system: WelcomeSystem,
    /// message-id -> emoji -> role-id
    #[serde(default)]
    pub role_react: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub join_to_create_channel_system: JoinToCreateSystem,
    #[serde(default)]
    pub youtube_survey: YoutubeSurvey,
    #[serde(default)]
    pub help_system: HelpSystem,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WelcomeSystem {
    pub active: bool,
    /// Path to a guild-supplied background, falls back to the stock asset
    pub background_image: Option<String>,
    pub welcome_message_template: String,
}

impl Default for WelcomeSystem {
    fn default() -> Self {
        Self {
            active: false,
            background_image: None,
            welcome_message_template: "Welcome {member} to {server}!".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JoinToCreateSystem {
    pub join_to_create_channels_id: BTreeSet<String>,
    pub channel_name_template: String,
    /// Temporary channels spawned by the system, reaped once empty
    #[serde(default)]
    pub temp_voice_channels_id: BTreeSet<String>,
}

impl Default for JoinToCreateSystem {
    fn default() -> Self {
        Self {
            join_to_create_channels_id: BTreeSet::new(),
            channel_name_template: "{member}'s channel".to_string(),
            temp_voice_channels_id: BTreeSet::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct YoutubeSurvey {
    /// Discord channel new-video notifications are posted to
    pub channel_id: Option<String>,
    /// youtube-channel-id -> last seen video id (None until first poll)
    pub youtube_channels_id: BTreeMap<String, Option<String>>,
    pub new_video_message_template: String,
}

impl Default for YoutubeSurvey {
    fn default() -> Self {
        Self {
            channel_id: None,
            youtube_channels_id: BTreeMap::new(),
            new_video_message_template: "{youtube_channel} uploaded a new video! {youtube_video}"
                .to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HelpSystem {
    pub help_category_id: Option<String>,
    /// ticket-entry-channel-id -> helper-role-id
    pub channels_id: BTreeMap<String, String>,
    pub help_channel_name_template: String,
}

impl Default for HelpSystem {
    fn default() -> Self {
        Self {
            help_category_id: None,
            channels_id: BTreeMap::new(),
            help_channel_name_template: "help-{member}".to_string(),
        }
    }
}

impl GuildConfig {
    /// Role mapped to an emoji reaction on a message, if any
    pub fn role_for(&self, message_id: &str, emoji: &str) -> Option<&str> {
        self.role_react
            .get(message_id)?
            .get(emoji)
            .map(String::as_str)
    }

    /// Returns false if the emoji is already mapped on that message
    pub fn add_role_react(&mut self, message_id: &str, emoji: &str, role_id: &str) -> bool {
        let reacts = self.role_react.entry(message_id.to_string()).or_default();
        if reacts.contains_key(emoji) {
            return false;
        }
        reacts.insert(emoji.to_string(), role_id.to_string());
        true
    }

    /// Removes an emoji mapping; the message entry goes with its last emoji.
    /// Returns false if the emoji was not mapped.
    pub fn remove_role_react(&mut self, message_id: &str, emoji: &str) -> bool {
        let Some(reacts) = self.role_react.get_mut(message_id) else {
            return false;
        };
        if reacts.remove(emoji).is_none() {
            return false;
        }
        if reacts.is_empty() {
            self.role_react.remove(message_id);
        }
        true
    }

    /// Drops every mapping attached to a message (message deleted)
    pub fn remove_message_reacts(&mut self, message_id: &str) -> bool {
        self.role_react.remove(message_id).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_lookup_role_react() {
        let mut config = GuildConfig::default();
        assert!(config.add_role_react("1", "🔥", "42"));
        assert!(!config.add_role_react("1", "🔥", "43"));
        assert_eq!(config.role_for("1", "🔥"), Some("42"));
        assert_eq!(config.role_for("1", "💧"), None);
        assert_eq!(config.role_for("2", "🔥"), None);
    }

    #[test]
    fn removing_last_emoji_drops_message_entry() {
        let mut config = GuildConfig::default();
        config.add_role_react("1", "🔥", "42");
        config.add_role_react("1", "💧", "43");

        assert!(config.remove_role_react("1", "🔥"));
        assert!(config.role_react.contains_key("1"));
        assert!(config.remove_role_react("1", "💧"));
        assert!(!config.role_react.contains_key("1"));
    }

    #[test]
    fn removing_absent_emoji_is_reported() {
        let mut config = GuildConfig::default();
        assert!(!config.remove_role_react("1", "🔥"));
        config.add_role_react("1", "🔥", "42");
        assert!(!config.remove_role_react("1", "💧"));
        assert_eq!(config.role_for("1", "🔥"), Some("42"));
    }

    #[test]
    fn message_delete_drops_all_mappings() {
        let mut config = GuildConfig::default();
        config.add_role_react("1", "🔥", "42");
        config.add_role_react("1", "💧", "43");
        assert!(config.remove_message_reacts("1"));
        assert!(!config.remove_message_reacts("1"));
    }

    #[test]
    fn old_documents_without_new_fields_still_parse() {
        let doc = r#"{
            "language": "fr",
            "logs_channel_id": "123",
            "welcome_system": {
                "active": true,
                "background_image": null,
                "welcome_message_template": "hi {member}"
            }
        }"#;
        let config: GuildConfig = serde_json::from_str(doc).unwrap();
        assert_eq!(config.language, Language::Fr);
        assert!(config.welcome_system.active);
        assert!(config.role_react.is_empty());
        assert!(config
            .join_to_create_channel_system
            .temp_voice_channels_id
            .is_empty());
    }
}
