//! The per-update execution context.
//!
//! One [`Context`] is created for every dispatched update and shared by the
//! selected filter chain and handler. It bundles everything a handler can
//! reach: the API client, the update payload, and the session store, plus
//! reply-style conveniences so common responses do not require digging chat
//! ids out of the envelope.

use std::sync::Arc;

use tracing::debug;

use baleen_client::{Bot, ClientError, ClientResult};
use baleen_types::{CallbackQuery, Message, PreCheckoutQuery, Update, User};

use crate::session::SessionStore;

/// Execution context handed to filters and handlers for one update.
///
/// The context is cheap to clone: all of its parts sit behind `Arc`s.
/// Handlers can take it as a plain parameter through the extraction system.
///
/// # Example
///
/// ```rust,ignore
/// async fn handle(ctx: Context) {
///     if let Some(message) = ctx.message() {
///         ctx.reply(format!("got: {:?}", message.text)).await.ok();
///     }
/// }
/// ```
#[derive(Clone)]
pub struct Context {
    bot: Arc<Bot>,
    bot_name: Arc<str>,
    update: Arc<Update>,
    sessions: Arc<dyn SessionStore>,
}

impl Context {
    /// Creates a new context.
    ///
    /// `bot_name` keys the session store; the runtime passes the username
    /// resolved at startup.
    pub fn new(
        bot: Arc<Bot>,
        bot_name: Arc<str>,
        update: Arc<Update>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            bot,
            bot_name,
            update,
            sessions,
        }
    }

    /// Returns a reference to the API client.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    /// Returns a clone of the API client `Arc`.
    pub fn bot_arc(&self) -> Arc<Bot> {
        Arc::clone(&self.bot)
    }

    /// Returns the bot identity used for session keys.
    pub fn bot_name(&self) -> &str {
        &self.bot_name
    }

    /// Returns a reference to the update being processed.
    pub fn update(&self) -> &Update {
        &self.update
    }

    /// Returns a clone of the update `Arc`.
    pub fn update_arc(&self) -> Arc<Update> {
        Arc::clone(&self.update)
    }

    /// Returns a reference to the session store.
    pub fn sessions(&self) -> &dyn SessionStore {
        self.sessions.as_ref()
    }

    // ─── Payload accessors ────────────────────────────────────────────────

    /// Returns the message payload, covering edited messages too.
    pub fn message(&self) -> Option<&Message> {
        self.update.message()
    }

    /// Returns the callback query payload, if any.
    pub fn callback_query(&self) -> Option<&CallbackQuery> {
        self.update.callback_query()
    }

    /// Returns the pre-checkout query payload, if any.
    pub fn pre_checkout_query(&self) -> Option<&PreCheckoutQuery> {
        self.update.pre_checkout_query()
    }

    /// Returns the user the update originated from, if identifiable.
    pub fn from_user(&self) -> Option<&User> {
        self.update.from_user()
    }

    /// Returns the id of the chat the update originated in.
    ///
    /// For callback interactions this is the chat of the message the button
    /// was attached to. Pre-checkout queries carry no chat.
    pub fn chat_id(&self) -> Option<i64> {
        if let Some(message) = self.update.message() {
            return Some(message.chat_id());
        }
        self.update
            .callback_query()
            .and_then(|query| query.message.as_ref())
            .map(|message| message.chat_id())
    }

    /// Returns the message text or caption, if any.
    pub fn text(&self) -> Option<&str> {
        self.message().and_then(|message| message.text_or_caption())
    }

    // ─── Session conveniences ─────────────────────────────────────────────

    /// Returns the session state label for the originating user.
    pub fn state(&self) -> Option<String> {
        let user = self.from_user()?;
        self.sessions.get(&self.bot_name, user.id)
    }

    /// Sets the session state label for the originating user.
    ///
    /// Does nothing when the update carries no identifiable user.
    pub fn set_state(&self, state: &str) {
        match self.from_user() {
            Some(user) => self.sessions.set(&self.bot_name, user.id, state),
            None => debug!("set_state skipped, update has no user"),
        }
    }

    /// Clears the session state label for the originating user.
    pub fn clear_state(&self) {
        if let Some(user) = self.from_user() {
            self.sessions.clear(&self.bot_name, user.id);
        }
    }

    // ─── Reply conveniences ───────────────────────────────────────────────

    /// Sends `text` to the chat the update originated in.
    pub async fn reply(&self, text: impl Into<String>) -> ClientResult<Message> {
        let chat_id = self
            .chat_id()
            .ok_or_else(|| ClientError::invalid_input("update has no chat to reply to"))?;
        self.bot.send_text(chat_id, text).await
    }

    /// Answers the callback query carried by this update.
    pub async fn answer_callback(
        &self,
        text: Option<&str>,
        show_alert: bool,
    ) -> ClientResult<bool> {
        let query = self
            .callback_query()
            .ok_or_else(|| ClientError::invalid_input("update has no callback query"))?;
        self.bot
            .answer_callback_query(&query.id, text, Some(show_alert))
            .await
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("bot_name", &self.bot_name)
            .field("update_id", &self.update.update_id)
            .finish_non_exhaustive()
    }
}
