//! User and bot identity types.

use serde::{Deserialize, Serialize};

/// A Bale user or bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for this user or bot.
    pub id: i64,
    /// Whether this user is a bot.
    #[serde(default)]
    pub is_bot: bool,
    /// The user's first name.
    #[serde(default)]
    pub first_name: String,
    /// The user's last name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// The user's username, without the leading `@`.
    #[serde(default)]
    pub username: Option<String>,
    /// IETF language tag of the user's client.
    #[serde(default)]
    pub language_code: Option<String>,
}

impl User {
    /// Returns the full display name (first name plus last name when present).
    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

/// The bot's own identity as returned by `getMe`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotInfo {
    /// Unique identifier of the bot.
    pub id: i64,
    /// Always `true` for a bot account.
    #[serde(default)]
    pub is_bot: bool,
    /// The bot's display name.
    #[serde(default)]
    pub first_name: String,
    /// Optional last-name part of the display name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// The bot's username, without the leading `@`.
    #[serde(default)]
    pub username: Option<String>,
    /// IETF language tag, if the API reports one.
    #[serde(default)]
    pub language_code: Option<String>,
    /// Whether the bot can be added to groups.
    #[serde(default)]
    pub can_join_groups: Option<bool>,
    /// Whether privacy mode is disabled for the bot.
    #[serde(default)]
    pub can_read_all_group_messages: Option<bool>,
    /// Whether the bot supports inline queries.
    #[serde(default)]
    pub supports_inline_queries: Option<bool>,
}

impl BotInfo {
    /// A usable identity must carry a non-zero id.
    ///
    /// The polling runtime refuses to start against an identity that fails
    /// this check.
    pub fn is_usable(&self) -> bool {
        self.id != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_name() {
        let user = User {
            id: 1,
            first_name: "Ada".into(),
            last_name: Some("Lovelace".into()),
            ..Default::default()
        };
        assert_eq!(user.full_name(), "Ada Lovelace");

        let bare = User {
            id: 2,
            first_name: "Ada".into(),
            ..Default::default()
        };
        assert_eq!(bare.full_name(), "Ada");
    }

    #[test]
    fn test_bot_info_usable() {
        assert!(!BotInfo::default().is_usable());
        let info = BotInfo {
            id: 42,
            is_bot: true,
            ..Default::default()
        };
        assert!(info.is_usable());
    }
}
