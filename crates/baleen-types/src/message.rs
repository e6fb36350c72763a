//! Message objects and message-level enums.

use serde::{Deserialize, Serialize};

use crate::chat::Chat;
use crate::keyboard::InlineKeyboardMarkup;
use crate::media::{
    Animation, Audio, Contact, Document, Location, PhotoSize, Sticker, Video, Voice,
};
use crate::payments::{Invoice, SuccessfulPayment};
use crate::user::User;

/// Text formatting mode for outbound messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseMode {
    Markdown,
    MarkdownV2,
    #[serde(rename = "HTML")]
    Html,
}

/// One message in a chat.
///
/// Every payload field is optional; which ones are present depends on the
/// message kind (text, media, service message).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier within the chat.
    pub message_id: i64,
    /// The sender; absent for channel posts.
    #[serde(default)]
    pub from: Option<User>,
    /// Unix timestamp of the message.
    #[serde(default)]
    pub date: i64,
    /// The chat the message belongs to.
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    /// Available photo sizes, smallest first.
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub video: Option<Video>,
    #[serde(default)]
    pub animation: Option<Animation>,
    #[serde(default)]
    pub audio: Option<Audio>,
    #[serde(default)]
    pub document: Option<Document>,
    #[serde(default)]
    pub voice: Option<Voice>,
    #[serde(default)]
    pub sticker: Option<Sticker>,
    #[serde(default)]
    pub contact: Option<Contact>,
    #[serde(default)]
    pub location: Option<Location>,
    /// The message this one replies to, one level deep.
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
    /// Original sender of a forwarded message.
    #[serde(default)]
    pub forward_from: Option<User>,
    /// Original chat of a forwarded channel post.
    #[serde(default)]
    pub forward_from_chat: Option<Chat>,
    /// Unix timestamp of the original message.
    #[serde(default)]
    pub forward_date: Option<i64>,
    /// Members added to the chat by this service message.
    #[serde(default)]
    pub new_chat_members: Option<Vec<User>>,
    /// Member removed from the chat by this service message.
    #[serde(default)]
    pub left_chat_member: Option<User>,
    #[serde(default)]
    pub new_chat_title: Option<String>,
    #[serde(default)]
    pub new_chat_photo: Option<Vec<PhotoSize>>,
    /// Message pinned by this service message, one level deep.
    #[serde(default)]
    pub pinned_message: Option<Box<Message>>,
    #[serde(default)]
    pub invoice: Option<Invoice>,
    #[serde(default)]
    pub successful_payment: Option<SuccessfulPayment>,
    #[serde(default)]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl Message {
    /// The chat id the message arrived in.
    pub fn chat_id(&self) -> i64 {
        self.chat.id
    }

    /// Text or caption, whichever is present.
    pub fn text_or_caption(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    /// Whether this message carries any media attachment.
    ///
    /// Stickers deliberately do not count; they behave like reactions rather
    /// than shared files.
    pub fn has_media(&self) -> bool {
        self.photo.is_some()
            || self.video.is_some()
            || self.document.is_some()
            || self.audio.is_some()
            || self.voice.is_some()
    }

    /// Whether this message was forwarded from another user or chat.
    pub fn is_forwarded(&self) -> bool {
        self.forward_from.is_some() || self.forward_from_chat.is_some()
    }
}

/// Bare message id, returned by calls that create a message without
/// echoing it back in full.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MessageId {
    pub message_id: i64,
}

/// Content kinds accepted by handler registration options.
///
/// Parsed from lowercase names; unknown names are not representable, letting
/// the registry decide how to treat them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Photo,
    Video,
    Document,
    Audio,
    Voice,
    Sticker,
    Location,
    Contact,
}

impl ContentType {
    /// Parses a lowercase content-type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(Self::Text),
            "photo" => Some(Self::Photo),
            "video" => Some(Self::Video),
            "document" => Some(Self::Document),
            "audio" => Some(Self::Audio),
            "voice" => Some(Self::Voice),
            "sticker" => Some(Self::Sticker),
            "location" => Some(Self::Location),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }

    /// Returns the lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Photo => "photo",
            Self::Video => "video",
            Self::Document => "document",
            Self::Audio => "audio",
            Self::Voice => "voice",
            Self::Sticker => "sticker",
            Self::Location => "location",
            Self::Contact => "contact",
        }
    }

    /// Whether `message` carries this kind of content.
    pub fn matches(self, message: &Message) -> bool {
        match self {
            Self::Text => message.text.is_some(),
            Self::Photo => message.photo.is_some(),
            Self::Video => message.video.is_some(),
            Self::Document => message.document.is_some(),
            Self::Audio => message.audio.is_some(),
            Self::Voice => message.voice.is_some(),
            Self::Sticker => message.sticker.is_some(),
            Self::Location => message.location.is_some(),
            Self::Contact => message.contact.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_message(text: &str) -> Message {
        serde_json::from_value(serde_json::json!({
            "message_id": 1,
            "date": 0,
            "chat": {"id": 10, "type": "private"},
            "text": text
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_mode_wire_names() {
        assert_eq!(
            serde_json::to_value(ParseMode::Html).unwrap(),
            serde_json::json!("HTML")
        );
        assert_eq!(
            serde_json::to_value(ParseMode::MarkdownV2).unwrap(),
            serde_json::json!("MarkdownV2")
        );
    }

    #[test]
    fn test_media_excludes_stickers() {
        let mut message = text_message("hi");
        message.sticker = Some(Sticker {
            file_id: "s".into(),
            file_unique_id: None,
            width: 512,
            height: 512,
            emoji: None,
            set_name: None,
            file_size: None,
        });
        assert!(!message.has_media());

        message.voice = Some(Voice {
            file_id: "v".into(),
            file_unique_id: None,
            duration: 3,
            mime_type: None,
            file_size: None,
        });
        assert!(message.has_media());
    }

    #[test]
    fn test_content_type_lookup() {
        assert_eq!(ContentType::from_name("photo"), Some(ContentType::Photo));
        assert_eq!(ContentType::from_name("poll"), None);
        assert!(ContentType::Text.matches(&text_message("hi")));
        assert!(!ContentType::Photo.matches(&text_message("hi")));
    }
}
