//! Incoming update envelope.

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::payments::PreCheckoutQuery;
use crate::user::User;

/// A press on an inline keyboard button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Message the originating button is attached to.
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub inline_message_id: Option<String>,
    #[serde(default)]
    pub chat_instance: Option<String>,
    /// Payload set when the button was created.
    #[serde(default)]
    pub data: Option<String>,
}

/// One entry from `getUpdates`.
///
/// Exactly one payload field is set per update; [`Update::kind`] reports
/// which one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub edited_message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
    #[serde(default)]
    pub pre_checkout_query: Option<PreCheckoutQuery>,
}

/// Payload discriminant of an [`Update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Message,
    EditedMessage,
    CallbackQuery,
    PreCheckoutQuery,
    /// Carried no recognized payload.
    Unknown,
}

impl Update {
    pub fn kind(&self) -> UpdateKind {
        if self.message.is_some() {
            UpdateKind::Message
        } else if self.edited_message.is_some() {
            UpdateKind::EditedMessage
        } else if self.callback_query.is_some() {
            UpdateKind::CallbackQuery
        } else if self.pre_checkout_query.is_some() {
            UpdateKind::PreCheckoutQuery
        } else {
            UpdateKind::Unknown
        }
    }

    /// The carried message, whether new or edited.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref().or(self.edited_message.as_ref())
    }

    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        self.callback_query.as_ref()
    }

    pub fn pre_checkout_query(&self) -> Option<&PreCheckoutQuery> {
        self.pre_checkout_query.as_ref()
    }

    /// The user who triggered the update, regardless of payload kind.
    pub fn from_user(&self) -> Option<&User> {
        if let Some(query) = &self.callback_query {
            return Some(&query.from);
        }
        if let Some(query) = &self.pre_checkout_query {
            return Some(&query.from);
        }
        self.message().and_then(|m| m.from.as_ref())
    }

    /// Whether this update is a button press or a checkout confirmation.
    ///
    /// These route through the interaction registry instead of the message
    /// registry.
    pub fn is_interaction(&self) -> bool {
        self.callback_query.is_some() || self.pre_checkout_query.is_some()
    }
}

/// Current webhook state, from `getWebhookInfo`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookInfo {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub has_custom_certificate: bool,
    #[serde(default)]
    pub pending_update_count: i64,
    #[serde(default)]
    pub last_error_date: Option<i64>,
    #[serde(default)]
    pub last_error_message: Option<String>,
    #[serde(default)]
    pub max_connections: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(payload: serde_json::Value) -> Update {
        let mut value = serde_json::json!({"update_id": 7});
        value
            .as_object_mut()
            .unwrap()
            .extend(payload.as_object().unwrap().clone());
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_kind_discrimination() {
        let message = update(serde_json::json!({
            "message": {"message_id": 1, "date": 0, "chat": {"id": 1, "type": "private"}}
        }));
        assert_eq!(message.kind(), UpdateKind::Message);
        assert!(!message.is_interaction());

        let callback = update(serde_json::json!({
            "callback_query": {"id": "q", "from": {"id": 5}, "data": "go"}
        }));
        assert_eq!(callback.kind(), UpdateKind::CallbackQuery);
        assert!(callback.is_interaction());

        let empty = update(serde_json::json!({}));
        assert_eq!(empty.kind(), UpdateKind::Unknown);
    }

    #[test]
    fn test_message_accessor_covers_edits() {
        let edited = update(serde_json::json!({
            "edited_message": {
                "message_id": 2,
                "date": 0,
                "chat": {"id": 1, "type": "private"},
                "text": "fixed"
            }
        }));
        assert_eq!(edited.kind(), UpdateKind::EditedMessage);
        assert_eq!(edited.message().and_then(|m| m.text.as_deref()), Some("fixed"));
    }

    #[test]
    fn test_from_user_prefers_interaction_sender() {
        let callback = update(serde_json::json!({
            "callback_query": {
                "id": "q",
                "from": {"id": 42},
                "message": {
                    "message_id": 3,
                    "date": 0,
                    "chat": {"id": 1, "type": "private"},
                    "from": {"id": 99}
                }
            }
        }));
        assert_eq!(callback.from_user().map(|u| u.id), Some(42));
    }
}
