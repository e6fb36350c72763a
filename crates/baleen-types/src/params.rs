//! Request parameter structs for the richer API calls.
//!
//! Each struct serializes exactly the fields the wire call takes; optional
//! fields are skipped when unset. Constructors take the required fields and
//! leave the rest `None` for the caller to fill in.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatId, ChatPermissions};
use crate::keyboard::{InlineKeyboardMarkup, ReplyMarkup};
use crate::message::ParseMode;
use crate::payments::LabeledPrice;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageParams {
    pub chat_id: ChatId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable_notification: Option<bool>,
}

impl SendMessageParams {
    pub fn new(chat_id: impl Into<ChatId>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
            reply_to_message_id: None,
            disable_notification: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyMessageParams {
    pub chat_id: ChatId,
    pub from_chat_id: ChatId,
    pub message_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl CopyMessageParams {
    pub fn new(
        chat_id: impl Into<ChatId>,
        from_chat_id: impl Into<ChatId>,
        message_id: i64,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            from_chat_id: from_chat_id.into(),
            message_id,
            caption: None,
            reply_to_message_id: None,
            reply_markup: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMessageTextParams {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl EditMessageTextParams {
    pub fn new(chat_id: impl Into<ChatId>, message_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_id,
            text: text.into(),
            parse_mode: None,
            reply_markup: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditMessageCaptionParams {
    pub chat_id: ChatId,
    pub message_id: i64,
    pub caption: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl EditMessageCaptionParams {
    pub fn new(chat_id: impl Into<ChatId>, message_id: i64, caption: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            message_id,
            caption: caption.into(),
            parse_mode: None,
            reply_markup: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendContactParams {
    pub chat_id: ChatId,
    pub phone_number: String,
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendContactParams {
    pub fn new(
        chat_id: impl Into<ChatId>,
        phone_number: impl Into<String>,
        first_name: impl Into<String>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            phone_number: phone_number.into(),
            first_name: first_name.into(),
            last_name: None,
            reply_to_message_id: None,
            reply_markup: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendLocationParams {
    pub chat_id: ChatId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendLocationParams {
    pub fn new(chat_id: impl Into<ChatId>, latitude: f64, longitude: f64) -> Self {
        Self {
            chat_id: chat_id.into(),
            latitude,
            longitude,
            reply_to_message_id: None,
            reply_markup: None,
        }
    }
}

/// Admin rights granted by `promoteChatMember`; unset flags stay unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteChatMemberParams {
    pub chat_id: ChatId,
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_change_info: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_post_messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_edit_messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_delete_messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_invite_users: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_restrict_members: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_pin_messages: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_promote_members: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_manage_chat: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_manage_video_chats: Option<bool>,
}

impl PromoteChatMemberParams {
    pub fn new(chat_id: impl Into<ChatId>, user_id: i64) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_id,
            can_change_info: None,
            can_post_messages: None,
            can_edit_messages: None,
            can_delete_messages: None,
            can_invite_users: None,
            can_restrict_members: None,
            can_pin_messages: None,
            can_promote_members: None,
            can_manage_chat: None,
            can_manage_video_chats: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestrictChatMemberParams {
    pub chat_id: ChatId,
    pub user_id: i64,
    pub permissions: ChatPermissions,
}

impl RestrictChatMemberParams {
    pub fn new(chat_id: impl Into<ChatId>, user_id: i64, permissions: ChatPermissions) -> Self {
        Self {
            chat_id: chat_id.into(),
            user_id,
            permissions,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatInviteLinkParams {
    pub chat_id: ChatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_date: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_limit: Option<i64>,
}

impl CreateChatInviteLinkParams {
    pub fn new(chat_id: impl Into<ChatId>) -> Self {
        Self {
            chat_id: chat_id.into(),
            expire_date: None,
            member_limit: None,
        }
    }
}

/// Options shared by every media sender.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendMediaOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendMediaOptions {
    pub fn caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }

    pub fn reply_markup(mut self, markup: impl Into<ReplyMarkup>) -> Self {
        self.reply_markup = Some(markup.into());
        self
    }
}

/// Parameters for `sendInvoice`. The platform only bills in rials, so the
/// currency is fixed at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendInvoiceParams {
    pub chat_id: ChatId,
    pub title: String,
    pub description: String,
    pub payload: String,
    pub provider_token: String,
    pub currency: String,
    pub prices: Vec<LabeledPrice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

impl SendInvoiceParams {
    pub fn new(
        chat_id: impl Into<ChatId>,
        title: impl Into<String>,
        description: impl Into<String>,
        payload: impl Into<String>,
        provider_token: impl Into<String>,
        prices: Vec<LabeledPrice>,
    ) -> Self {
        Self {
            chat_id: chat_id.into(),
            title: title.into(),
            description: description.into(),
            payload: payload.into(),
            provider_token: provider_token.into(),
            currency: "IRR".into(),
            prices,
            photo_url: None,
            reply_to_message_id: None,
            reply_markup: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_skipped() {
        let params = SendMessageParams::new(77, "hello");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"chat_id": 77, "text": "hello"})
        );
    }

    #[test]
    fn test_username_chat_id_serializes_as_string() {
        let params = SendMessageParams::new("@channel", "hello");
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["chat_id"], serde_json::json!("@channel"));
    }

    #[test]
    fn test_invoice_currency_is_fixed() {
        let params = SendInvoiceParams::new(
            1,
            "t",
            "d",
            "p",
            "token",
            vec![LabeledPrice::new("item", 1000)],
        );
        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["currency"], serde_json::json!("IRR"));
        assert_eq!(value["prices"][0]["amount"], serde_json::json!(1000));
    }
}
