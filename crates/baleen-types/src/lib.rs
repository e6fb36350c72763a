//! # Baleen Types
//!
//! Data model for the Bale Bot API.
//!
//! This crate contains all the serde structures exchanged with the API:
//! the update envelope, messages and their payloads, chat and user objects,
//! keyboards, payments, outbound media sources, request parameter structs,
//! and the response envelope. It carries no I/O; the client and runtime
//! crates build on top of it.
//!
//! Incoming objects tolerate missing optional fields (`#[serde(default)]`),
//! outgoing structs skip unset optionals so the wire only carries what the
//! caller set.

pub mod chat;
pub mod input_file;
pub mod keyboard;
pub mod media;
pub mod message;
pub mod params;
pub mod payments;
pub mod response;
pub mod update;
pub mod user;

pub use chat::{
    Chat, ChatAction, ChatId, ChatInviteLink, ChatMember, ChatMemberStatus, ChatPermissions,
    ChatPhoto, ChatType,
};
pub use input_file::{InputFile, InputFileError, InputMedia, InputMediaKind};
pub use keyboard::{
    CopyTextButton, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton,
    ReplyKeyboardMarkup, ReplyKeyboardRemove, ReplyMarkup, WebAppInfo,
};
pub use media::{
    Animation, Audio, Contact, Document, File, Location, PhotoSize, Sticker, StickerFormat,
    StickerSet, Video, Voice,
};
pub use message::{ContentType, Message, MessageId, ParseMode};
pub use params::{
    CopyMessageParams, CreateChatInviteLinkParams, EditMessageCaptionParams,
    EditMessageTextParams, PromoteChatMemberParams, RestrictChatMemberParams, SendContactParams,
    SendInvoiceParams, SendLocationParams, SendMediaOptions, SendMessageParams,
};
pub use payments::{Invoice, LabeledPrice, PreCheckoutQuery, SuccessfulPayment, Transaction};
pub use response::{ApiResponse, ResponseError, ResponseParameters};
pub use update::{CallbackQuery, Update, UpdateKind, WebhookInfo};
pub use user::{BotInfo, User};
