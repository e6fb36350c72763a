//! Chat objects, membership records and chat-scoped enums.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::user::User;

/// A chat target accepted by outbound calls: either a numeric chat id or a
/// public `@username`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatId {
    /// Numeric chat identifier.
    Id(i64),
    /// Public channel or group username, including the leading `@`.
    Username(String),
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        ChatId::Id(id)
    }
}

impl From<&str> for ChatId {
    fn from(username: &str) -> Self {
        ChatId::Username(username.to_string())
    }
}

impl From<String> for ChatId {
    fn from(username: String) -> Self {
        ChatId::Username(username)
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatId::Id(id) => write!(f, "{id}"),
            ChatId::Username(name) => f.write_str(name),
        }
    }
}

/// The kind of a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
}

/// A conversation the bot participates in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    /// Unique identifier of the chat.
    pub id: i64,
    /// The kind of chat.
    #[serde(rename = "type")]
    pub chat_type: ChatType,
    /// Title, for groups and channels.
    #[serde(default)]
    pub title: Option<String>,
    /// Username, for private chats and public channels.
    #[serde(default)]
    pub username: Option<String>,
    /// Chat photo, only present in `getChat` responses.
    #[serde(default)]
    pub photo: Option<ChatPhoto>,
    /// Description, for groups and channels.
    #[serde(default)]
    pub description: Option<String>,
    /// Primary invite link, only present in `getChat` responses.
    #[serde(default)]
    pub invite_link: Option<String>,
    /// Default member permissions, for groups.
    #[serde(default)]
    pub permissions: Option<ChatPermissions>,
}

impl Chat {
    /// Returns `true` for one-on-one conversations.
    pub fn is_private(&self) -> bool {
        self.chat_type == ChatType::Private
    }
}

/// Small and big versions of a chat photo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPhoto {
    /// File id of the small (160x160) version.
    pub small_file_id: String,
    /// Unique file id of the small version.
    #[serde(default)]
    pub small_file_unique_id: Option<String>,
    /// File id of the big (640x640) version.
    pub big_file_id: String,
    /// Unique file id of the big version.
    #[serde(default)]
    pub big_file_unique_id: Option<String>,
}

/// Actions members are allowed to take in a chat.
///
/// Every flag is optional on the wire; `None` means "not reported".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatPermissions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_send_messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_send_media_messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_send_other_messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_add_web_page_previews: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_change_info: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_invite_users: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_pin_messages: Option<bool>,
}

/// A user's standing within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

/// Information about one member of a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMember {
    /// The member.
    pub user: User,
    /// The member's status in the chat.
    pub status: ChatMemberStatus,
    /// Restriction expiry as a unix timestamp, for restricted/kicked members.
    #[serde(default)]
    pub until_date: Option<i64>,
    #[serde(default)]
    pub can_be_edited: Option<bool>,
    #[serde(default)]
    pub can_change_info: Option<bool>,
    #[serde(default)]
    pub can_delete_messages: Option<bool>,
    #[serde(default)]
    pub can_invite_users: Option<bool>,
    #[serde(default)]
    pub can_restrict_members: Option<bool>,
    #[serde(default)]
    pub can_pin_messages: Option<bool>,
    #[serde(default)]
    pub can_promote_members: Option<bool>,
    #[serde(default)]
    pub can_send_messages: Option<bool>,
    #[serde(default)]
    pub can_send_media_messages: Option<bool>,
}

impl ChatMember {
    /// Returns `true` for the chat creator and administrators.
    pub fn is_admin(&self) -> bool {
        matches!(
            self.status,
            ChatMemberStatus::Creator | ChatMemberStatus::Administrator
        )
    }
}

/// An invite link created for a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatInviteLink {
    /// The link itself.
    pub invite_link: String,
    /// The administrator that created the link.
    #[serde(default)]
    pub creator: Option<User>,
    /// Whether this is the chat's primary link.
    #[serde(default)]
    pub is_primary: bool,
    /// Whether the link has been revoked.
    #[serde(default)]
    pub is_revoked: bool,
    /// Optional administrator-assigned name.
    #[serde(default)]
    pub name: Option<String>,
    /// Expiry as a unix timestamp.
    #[serde(default)]
    pub expire_date: Option<i64>,
    /// Maximum number of simultaneous members joined through the link.
    #[serde(default)]
    pub member_limit: Option<u32>,
}

/// Chat action shown to users while the bot prepares a response.
///
/// The wire format only accepts these values; anything else is rejected by
/// the API, so the enum makes invalid actions unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatAction {
    Typing,
    UploadPhoto,
    RecordVideo,
    UploadVideo,
    RecordVoice,
    UploadVoice,
    UploadDocument,
    ChooseSticker,
    FindLocation,
    RecordVideoNote,
    UploadVideoNote,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_serialization() {
        assert_eq!(
            serde_json::to_string(&ChatId::from(42)).unwrap(),
            "42"
        );
        assert_eq!(
            serde_json::to_string(&ChatId::from("@news")).unwrap(),
            "\"@news\""
        );
    }

    #[test]
    fn test_chat_type_wire_names() {
        let chat: Chat =
            serde_json::from_str(r#"{"id": 10, "type": "private"}"#).unwrap();
        assert!(chat.is_private());
        assert_eq!(
            serde_json::to_value(ChatAction::UploadPhoto).unwrap(),
            serde_json::json!("upload_photo")
        );
    }

    #[test]
    fn test_member_admin_check() {
        let member: ChatMember = serde_json::from_value(serde_json::json!({
            "user": {"id": 1, "is_bot": false, "first_name": "A"},
            "status": "administrator"
        }))
        .unwrap();
        assert!(member.is_admin());
    }
}
