//! The typed Bot API surface.
//!
//! `Bot` wraps [`ApiClient`] with one method per API call. Simple JSON calls
//! are generated by the `impl_api!` macro; calls with upload branches or
//! client-side validation are written out by hand.
//!
//! # Usage
//!
//! ```rust,ignore
//! use baleen_client::Bot;
//! use baleen_types::SendMessageParams;
//!
//! let bot = Bot::new("123:token");
//! let me = bot.get_me().await?;
//! bot.send_message(&SendMessageParams::new(1234, "Hello!")).await?;
//! ```

use std::time::Duration;

use reqwest::multipart::Form;
use serde_json::json;
use tracing::warn;

use baleen_types::{
    BotInfo, Chat, ChatAction, ChatId, ChatInviteLink, ChatMember, CopyMessageParams,
    CreateChatInviteLinkParams, EditMessageCaptionParams, EditMessageTextParams, File, InputFile,
    InputMedia, Message, MessageId, PromoteChatMemberParams, RestrictChatMemberParams,
    SendContactParams, SendInvoiceParams, SendLocationParams, SendMediaOptions,
    SendMessageParams, StickerFormat, StickerSet, Transaction, Update, WebhookInfo,
};

use crate::error::{ClientError, ClientResult};
use crate::http::{ApiClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::upload;

/// Extra slack on top of the long-poll duration before the HTTP layer
/// gives up on a `getUpdates` call.
const POLL_TIMEOUT_MARGIN: Duration = Duration::from_secs(10);

// =============================================================================
// Bot
// =============================================================================

/// A Bot API client with a typed method per API call.
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Clone)]
pub struct Bot {
    client: ApiClient,
}

impl Bot {
    /// Creates a bot against the default endpoint.
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_options(token, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Creates a bot against a custom endpoint.
    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self::with_options(token, base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a bot with full control over endpoint and request timeout.
    pub fn with_options(
        token: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: ApiClient::new(token, base_url, timeout),
        }
    }

    pub fn base_url(&self) -> &str {
        self.client.base_url()
    }

    /// Shared body of the media senders: string sources go out as JSON,
    /// local sources as multipart.
    async fn send_media(
        &self,
        method: &str,
        field: &str,
        chat_id: ChatId,
        file: InputFile,
        options: SendMediaOptions,
    ) -> ClientResult<Message> {
        if let Some(value) = file.as_string_param() {
            let mut params = json!({ "chat_id": chat_id });
            params[field] = json!(value);
            if let Some(caption) = &options.caption {
                params["caption"] = json!(caption);
            }
            if let Some(message_id) = options.reply_to_message_id {
                params["reply_to_message_id"] = json!(message_id);
            }
            if let Some(markup) = &options.reply_markup {
                params["reply_markup"] = json!(markup);
            }
            self.client.post_json(method, &params).await
        } else {
            let form = upload::media_form(&chat_id, field, file, &options).await?;
            self.client.post_multipart(method, form).await
        }
    }
}

// =============================================================================
// API methods
// =============================================================================

macro_rules! impl_api {
    // Required parameters only
    ($(#[$meta:meta])* $name:ident, $method:literal, ($($arg:ident: $typ:ty),* $(,)?) -> $ret:ty $(,)?) => {
        $(#[$meta])*
        pub async fn $name(&self, $($arg: $typ),*) -> ClientResult<$ret> {
            self.client
                .post_json($method, &json!({ $(stringify!($arg): $arg),* }))
                .await
        }
    };
    // Trailing optional parameters, omitted from the body when `None`
    ($(#[$meta:meta])* $name:ident, $method:literal, ($($arg:ident: $typ:ty),* $(,)?), [$($opt:ident: $opttyp:ty),+ $(,)?] -> $ret:ty $(,)?) => {
        $(#[$meta])*
        pub async fn $name(&self, $($arg: $typ,)* $($opt: Option<$opttyp>),+) -> ClientResult<$ret> {
            let mut params = json!({ $(stringify!($arg): $arg),* });
            $(
                if let Some(value) = $opt {
                    params[stringify!($opt)] = json!(value);
                }
            )+
            self.client.post_json($method, &params).await
        }
    };
}

impl Bot {
    // =========================================================================
    // Identity & updates
    // =========================================================================

    impl_api!(
        /// Fetches the bot's own identity.
        get_me,
        "getMe",
        () -> BotInfo
    );

    /// Long-polls for new updates.
    ///
    /// The HTTP timeout is widened past `timeout` so the server can hold the
    /// connection for the full poll duration.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        limit: i64,
        timeout: u64,
    ) -> ClientResult<Vec<Update>> {
        let mut params = json!({ "timeout": timeout, "limit": limit });
        if let Some(offset) = offset {
            params["offset"] = json!(offset);
        }
        self.client
            .post_json_with_timeout(
                "getUpdates",
                &params,
                Duration::from_secs(timeout) + POLL_TIMEOUT_MARGIN,
            )
            .await
    }

    // =========================================================================
    // Webhooks
    // =========================================================================

    /// Registers a webhook, uploading a local certificate when given one.
    pub async fn set_webhook(
        &self,
        url: &str,
        certificate: Option<InputFile>,
    ) -> ClientResult<bool> {
        match certificate {
            Some(certificate) if certificate.needs_upload() => {
                let form = Form::new().text("url", url.to_string());
                let form = upload::attach(form, "certificate", certificate).await?;
                self.client.post_multipart("setWebhook", form).await
            }
            Some(certificate) => {
                let mut params = json!({ "url": url });
                if let Some(value) = certificate.as_string_param() {
                    params["certificate"] = json!(value);
                }
                self.client.post_json("setWebhook", &params).await
            }
            None => {
                self.client
                    .post_json("setWebhook", &json!({ "url": url }))
                    .await
            }
        }
    }

    impl_api!(
        /// Removes the registered webhook.
        delete_webhook,
        "deleteWebhook",
        (),
        [drop_pending_updates: bool] -> bool
    );

    impl_api!(
        /// Reports the current webhook state.
        get_webhook_info,
        "getWebhookInfo",
        () -> WebhookInfo
    );

    // =========================================================================
    // Messaging
    // =========================================================================

    /// Sends a text message.
    pub async fn send_message(&self, params: &SendMessageParams) -> ClientResult<Message> {
        self.client.post_json("sendMessage", params).await
    }

    /// Sends plain text with no extra options.
    pub async fn send_text(
        &self,
        chat_id: impl Into<ChatId>,
        text: impl Into<String>,
    ) -> ClientResult<Message> {
        self.send_message(&SendMessageParams::new(chat_id, text)).await
    }

    impl_api!(
        /// Forwards a message between chats.
        forward_message,
        "forwardMessage",
        (chat_id: ChatId, from_chat_id: ChatId, message_id: i64) -> Message
    );

    /// Copies a message without the forward header.
    pub async fn copy_message(&self, params: &CopyMessageParams) -> ClientResult<MessageId> {
        self.client.post_json("copyMessage", params).await
    }

    /// Replaces the text of an existing message.
    pub async fn edit_message_text(
        &self,
        params: &EditMessageTextParams,
    ) -> ClientResult<Message> {
        self.client.post_json("editMessageText", params).await
    }

    /// Replaces the caption of an existing media message.
    pub async fn edit_message_caption(
        &self,
        params: &EditMessageCaptionParams,
    ) -> ClientResult<Message> {
        self.client.post_json("editMessageCaption", params).await
    }

    impl_api!(
        /// Deletes a message.
        delete_message,
        "deleteMessage",
        (chat_id: ChatId, message_id: i64) -> bool
    );

    impl_api!(
        /// Broadcasts a chat action ("typing", "upload_photo", ...).
        send_chat_action,
        "sendChatAction",
        (chat_id: ChatId, action: ChatAction) -> bool
    );

    /// Sends a phone contact.
    pub async fn send_contact(&self, params: &SendContactParams) -> ClientResult<Message> {
        self.client.post_json("sendContact", params).await
    }

    /// Sends a point on the map.
    pub async fn send_location(&self, params: &SendLocationParams) -> ClientResult<Message> {
        self.client.post_json("sendLocation", params).await
    }

    impl_api!(
        /// Sends several media as an album.
        send_media_group,
        "sendMediaGroup",
        (chat_id: ChatId, media: Vec<InputMedia>),
        [reply_to_message_id: i64] -> Vec<Message>
    );

    // =========================================================================
    // Media senders
    // =========================================================================

    pub async fn send_photo(
        &self,
        chat_id: impl Into<ChatId>,
        photo: InputFile,
        options: SendMediaOptions,
    ) -> ClientResult<Message> {
        self.send_media("sendPhoto", "photo", chat_id.into(), photo, options)
            .await
    }

    pub async fn send_video(
        &self,
        chat_id: impl Into<ChatId>,
        video: InputFile,
        options: SendMediaOptions,
    ) -> ClientResult<Message> {
        self.send_media("sendVideo", "video", chat_id.into(), video, options)
            .await
    }

    /// Sends an animation; local files must carry a video extension.
    pub async fn send_animation(
        &self,
        chat_id: impl Into<ChatId>,
        animation: InputFile,
        options: SendMediaOptions,
    ) -> ClientResult<Message> {
        upload::require_extension(&animation, upload::ANIMATION_EXTENSIONS, "animation")?;
        self.send_media("sendAnimation", "animation", chat_id.into(), animation, options)
            .await
    }

    /// Sends an audio track; local files must carry an audio extension.
    pub async fn send_audio(
        &self,
        chat_id: impl Into<ChatId>,
        audio: InputFile,
        options: SendMediaOptions,
    ) -> ClientResult<Message> {
        upload::require_extension(&audio, upload::AUDIO_EXTENSIONS, "audio")?;
        self.send_media("sendAudio", "audio", chat_id.into(), audio, options)
            .await
    }

    pub async fn send_document(
        &self,
        chat_id: impl Into<ChatId>,
        document: InputFile,
        options: SendMediaOptions,
    ) -> ClientResult<Message> {
        self.send_media("sendDocument", "document", chat_id.into(), document, options)
            .await
    }

    pub async fn send_voice(
        &self,
        chat_id: impl Into<ChatId>,
        voice: InputFile,
        options: SendMediaOptions,
    ) -> ClientResult<Message> {
        self.send_media("sendVoice", "voice", chat_id.into(), voice, options)
            .await
    }

    /// Sends a sticker; local files must be `.webp`.
    pub async fn send_sticker(
        &self,
        chat_id: impl Into<ChatId>,
        sticker: InputFile,
        options: SendMediaOptions,
    ) -> ClientResult<Message> {
        upload::require_extension(&sticker, upload::STICKER_EXTENSIONS, "sticker")?;
        self.send_media("sendSticker", "sticker", chat_id.into(), sticker, options)
            .await
    }

    // =========================================================================
    // Interaction answers
    // =========================================================================

    /// Answers a callback query; rejects an empty id before any request goes
    /// out.
    pub async fn answer_callback_query(
        &self,
        callback_query_id: &str,
        text: Option<&str>,
        show_alert: Option<bool>,
    ) -> ClientResult<bool> {
        if callback_query_id.trim().is_empty() {
            return Err(ClientError::invalid_input(
                "callback_query_id must be a non-empty string",
            ));
        }
        let mut params = json!({ "callback_query_id": callback_query_id });
        if let Some(text) = text {
            params["text"] = json!(text);
        }
        if let Some(show_alert) = show_alert {
            params["show_alert"] = json!(show_alert);
        }
        self.client.post_json("answerCallbackQuery", &params).await
    }

    /// Confirms or rejects a pre-checkout query.
    ///
    /// A rejection without an explicit message goes out as `"Payment
    /// failed"`; the server requires some text on the declined path.
    pub async fn answer_pre_checkout_query(
        &self,
        pre_checkout_query_id: &str,
        ok: bool,
        error_message: Option<&str>,
    ) -> ClientResult<bool> {
        let mut params = json!({ "pre_checkout_query_id": pre_checkout_query_id, "ok": ok });
        match error_message {
            Some(message) => params["error_message"] = json!(message),
            None if !ok => {
                warn!("pre-checkout rejected without a message, sending default");
                params["error_message"] = json!("Payment failed");
            }
            None => {}
        }
        self.client
            .post_json("answerPreCheckoutQuery", &params)
            .await
    }

    // =========================================================================
    // Chat information
    // =========================================================================

    impl_api!(
        /// Fetches a chat by id or username.
        get_chat,
        "getChat",
        (chat_id: ChatId) -> Chat
    );

    impl_api!(
        /// Lists the administrators of a chat.
        get_chat_administrators,
        "getChatAdministrators",
        (chat_id: ChatId) -> Vec<ChatMember>
    );

    impl_api!(
        /// Fetches one member of a chat.
        get_chat_member,
        "getChatMember",
        (chat_id: ChatId, user_id: i64) -> ChatMember
    );

    impl_api!(
        /// Counts the members of a chat.
        get_chat_members_count,
        "getChatMembersCount",
        (chat_id: ChatId) -> i64
    );

    // =========================================================================
    // Chat administration
    // =========================================================================

    impl_api!(
        /// Bans a member from a chat.
        ban_chat_member,
        "banChatMember",
        (chat_id: ChatId, user_id: i64) -> bool
    );

    impl_api!(
        /// Lifts a ban.
        unban_chat_member,
        "unbanChatMember",
        (chat_id: ChatId, user_id: i64),
        [only_if_banned: bool] -> bool
    );

    /// Grants admin rights to a member.
    pub async fn promote_chat_member(
        &self,
        params: &PromoteChatMemberParams,
    ) -> ClientResult<bool> {
        self.client.post_json("promoteChatMember", params).await
    }

    /// Restricts what a member may do in the chat.
    pub async fn restrict_chat_member(
        &self,
        params: &RestrictChatMemberParams,
    ) -> ClientResult<bool> {
        self.client.post_json("restrictChatMember", params).await
    }

    /// Sets the chat photo, uploading local sources.
    pub async fn set_chat_photo(
        &self,
        chat_id: impl Into<ChatId>,
        photo: InputFile,
    ) -> ClientResult<bool> {
        let chat_id = chat_id.into();
        if let Some(value) = photo.as_string_param() {
            let mut params = json!({ "chat_id": chat_id });
            params["photo"] = json!(value);
            self.client.post_json("setChatPhoto", &params).await
        } else {
            let form = Form::new().text("chat_id", chat_id.to_string());
            let form = upload::attach(form, "photo", photo).await?;
            self.client.post_multipart("setChatPhoto", form).await
        }
    }

    impl_api!(
        /// Renames the chat.
        set_chat_title,
        "setChatTitle",
        (chat_id: ChatId, title: &str) -> bool
    );

    impl_api!(
        /// Sets the chat description.
        set_chat_description,
        "setChatDescription",
        (chat_id: ChatId, description: &str) -> bool
    );

    impl_api!(
        /// Pins a message in the chat.
        pin_chat_message,
        "pinChatMessage",
        (chat_id: ChatId, message_id: i64) -> bool
    );

    impl_api!(
        /// Unpins one message, or the most recent one when no id is given.
        unpin_chat_message,
        "unpinChatMessage",
        (chat_id: ChatId),
        [message_id: i64] -> bool
    );

    impl_api!(
        /// Unpins every pinned message in the chat.
        unpin_all_chat_messages,
        "unpinAllChatMessages",
        (chat_id: ChatId) -> bool
    );

    impl_api!(
        /// Removes the bot from the chat.
        leave_chat,
        "leaveChat",
        (chat_id: ChatId) -> bool
    );

    /// Creates an additional invite link.
    pub async fn create_chat_invite_link(
        &self,
        params: &CreateChatInviteLinkParams,
    ) -> ClientResult<ChatInviteLink> {
        self.client.post_json("createChatInviteLink", params).await
    }

    impl_api!(
        /// Revokes an invite link created by the bot.
        revoke_chat_invite_link,
        "revokeChatInviteLink",
        (chat_id: ChatId, invite_link: &str) -> ChatInviteLink
    );

    impl_api!(
        /// Regenerates the primary invite link.
        export_chat_invite_link,
        "exportChatInviteLink",
        (chat_id: ChatId) -> String
    );

    // =========================================================================
    // Files & stickers
    // =========================================================================

    impl_api!(
        /// Resolves a file id into download information.
        get_file,
        "getFile",
        (file_id: &str) -> File
    );

    impl_api!(
        /// Fetches a sticker set by name.
        get_sticker_set,
        "getStickerSet",
        (name: &str) -> StickerSet
    );

    /// Uploads a sticker file for later set operations.
    pub async fn upload_sticker_file(
        &self,
        user_id: i64,
        sticker: InputFile,
        format: StickerFormat,
    ) -> ClientResult<File> {
        let field = format.param_name();
        if let Some(value) = sticker.as_string_param() {
            let mut params = json!({ "user_id": user_id });
            params[field] = json!(value);
            self.client.post_json("uploadStickerFile", &params).await
        } else {
            let form = Form::new().text("user_id", user_id.to_string());
            let form = upload::attach(form, field, sticker).await?;
            self.client.post_multipart("uploadStickerFile", form).await
        }
    }

    /// Creates a sticker set owned by a user.
    pub async fn create_new_sticker_set(
        &self,
        user_id: i64,
        name: &str,
        title: &str,
        sticker: InputFile,
        emojis: &str,
        format: StickerFormat,
    ) -> ClientResult<bool> {
        let field = format.param_name();
        if let Some(value) = sticker.as_string_param() {
            let mut params = json!({
                "user_id": user_id,
                "name": name,
                "title": title,
                "emojis": emojis,
                "sticker_format": format.as_str(),
            });
            params[field] = json!(value);
            self.client.post_json("createNewStickerSet", &params).await
        } else {
            let form = Form::new()
                .text("user_id", user_id.to_string())
                .text("name", name.to_string())
                .text("title", title.to_string())
                .text("emojis", emojis.to_string())
                .text("sticker_format", format.as_str());
            let form = upload::attach(form, field, sticker).await?;
            self.client.post_multipart("createNewStickerSet", form).await
        }
    }

    /// Adds a sticker to an existing set.
    pub async fn add_sticker_to_set(
        &self,
        user_id: i64,
        name: &str,
        sticker: InputFile,
        emojis: &str,
        format: StickerFormat,
    ) -> ClientResult<bool> {
        let field = format.param_name();
        if let Some(value) = sticker.as_string_param() {
            let mut params = json!({
                "user_id": user_id,
                "name": name,
                "emojis": emojis,
            });
            params[field] = json!(value);
            self.client.post_json("addStickerToSet", &params).await
        } else {
            let form = Form::new()
                .text("user_id", user_id.to_string())
                .text("name", name.to_string())
                .text("emojis", emojis.to_string());
            let form = upload::attach(form, field, sticker).await?;
            self.client.post_multipart("addStickerToSet", form).await
        }
    }

    impl_api!(
        /// Removes a sticker from its set.
        delete_sticker_from_set,
        "deleteStickerFromSet",
        (sticker: &str) -> bool
    );

    // =========================================================================
    // Payments
    // =========================================================================

    /// Sends an invoice; the platform bills in rials only.
    pub async fn send_invoice(&self, params: &SendInvoiceParams) -> ClientResult<Message> {
        self.client.post_json("sendInvoice", params).await
    }

    impl_api!(
        /// Looks up the state of a payment transaction.
        inquire_transaction,
        "inquireTransaction",
        (transaction_id: &str) -> Transaction
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_answer_callback_query_rejects_empty_id() {
        let bot = Bot::new("123:token");
        let err = bot
            .answer_callback_query("  ", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_media_extension_gates_run_before_io() {
        let bot = Bot::new("123:token");

        let err = bot
            .send_animation(1, InputFile::path("/tmp/clip.txt"), SendMediaOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));

        let err = bot
            .send_sticker(
                1,
                InputFile::bytes("sticker.png", vec![0u8; 8]),
                SendMediaOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::InvalidInput(_)));
    }
}
