//! Parameter extraction for handlers.
//!
//! Handler functions declare what they need as typed parameters; the
//! dispatch machinery produces each parameter from the current [`Context`]
//! through [`FromContext`]. When any parameter cannot be produced the
//! handler is skipped for that update.

use std::sync::Arc;

use baleen_client::Bot;
use baleen_types::{CallbackQuery, Message, PreCheckoutQuery, Update};

use crate::context::Context;
use crate::error::{ExtractError, ExtractResult};

/// A trait for types that can be extracted from a [`Context`].
///
/// Implement it to give handlers access to application-specific views of an
/// update:
///
/// ```rust,ignore
/// struct SenderId(i64);
///
/// impl FromContext for SenderId {
///     fn from_context(ctx: &Context) -> ExtractResult<Self> {
///         ctx.from_user()
///             .map(|user| SenderId(user.id))
///             .ok_or(ExtractError::MissingPayload { expected: "user" })
///     }
/// }
/// ```
pub trait FromContext: Sized {
    /// Attempts to extract this type from the given context.
    fn from_context(ctx: &Context) -> ExtractResult<Self>;
}

/// The whole context, for handlers that want replies or session access.
impl FromContext for Context {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(ctx.clone())
    }
}

/// The API client, for handlers that call the Bot API directly.
impl FromContext for Arc<Bot> {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(ctx.bot_arc())
    }
}

/// The raw update envelope.
impl FromContext for Arc<Update> {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(ctx.update_arc())
    }
}

/// The message payload; fails on non-message updates.
impl FromContext for Message {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        ctx.message()
            .cloned()
            .ok_or(ExtractError::MissingPayload {
                expected: "message",
            })
    }
}

/// The callback-query payload; fails on other updates.
impl FromContext for CallbackQuery {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        ctx.callback_query()
            .cloned()
            .ok_or(ExtractError::MissingPayload {
                expected: "callback_query",
            })
    }
}

/// The pre-checkout payload; fails on other updates.
impl FromContext for PreCheckoutQuery {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        ctx.pre_checkout_query()
            .cloned()
            .ok_or(ExtractError::MissingPayload {
                expected: "pre_checkout_query",
            })
    }
}

/// Optional extraction: `None` instead of a skipped handler.
impl<T: FromContext> FromContext for Option<T> {
    fn from_context(ctx: &Context) -> ExtractResult<Self> {
        Ok(T::from_context(ctx).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{callback_update, context_from, message_context};

    #[test]
    fn test_message_extraction() {
        let ctx = message_context("hello");
        let message = Message::from_context(&ctx).unwrap();
        assert_eq!(message.text.as_deref(), Some("hello"));

        let callback_ctx = context_from(callback_update("x"));
        assert!(Message::from_context(&callback_ctx).is_err());
    }

    #[test]
    fn test_callback_extraction() {
        let ctx = context_from(callback_update("pick:3"));
        let query = CallbackQuery::from_context(&ctx).unwrap();
        assert_eq!(query.data.as_deref(), Some("pick:3"));

        assert!(CallbackQuery::from_context(&message_context("hi")).is_err());
    }

    #[test]
    fn test_optional_extraction_never_fails() {
        let ctx = message_context("hi");
        let message: Option<Message> = Option::from_context(&ctx).unwrap();
        assert!(message.is_some());

        let query: Option<CallbackQuery> = Option::from_context(&ctx).unwrap();
        assert!(query.is_none());
    }

    #[test]
    fn test_infallible_extractions() {
        let ctx = message_context("hi");
        assert!(Context::from_context(&ctx).is_ok());
        assert!(Arc::<Bot>::from_context(&ctx).is_ok());

        let update = Arc::<Update>::from_context(&ctx).unwrap();
        assert_eq!(update.update_id, 1);
    }
}
