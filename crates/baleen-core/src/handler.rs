//! Handler functions and their return values.
//!
//! A handler is an async function whose parameters all implement
//! [`FromContext`] and whose return value implements [`HandleResponse`].
//! The blanket [`Handler`] implementations cover arities 0 through 8, so
//! plain functions register without wrappers:
//!
//! ```rust,ignore
//! async fn greet(message: Message) -> String {
//!     format!("hello, message {}", message.message_id)
//! }
//!
//! async fn audit(ctx: Context, update: Arc<Update>) {
//!     tracing::info!(update_id = update.update_id, "seen");
//! }
//! ```
//!
//! Return values drive a response step after the handler body: a `String`
//! is sent back to the originating chat, a [`HandlerOutcome`] is logged
//! when it reports failure, `()` does nothing. Errors surfacing from the
//! response step feed the dispatcher's retry wrapper.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use tracing::{debug, error};

use baleen_client::ClientResult;

use crate::context::Context;
use crate::extract::FromContext;

// ============================================================================
// HandleResponse - handler return values
// ============================================================================

/// An explicit handler verdict.
///
/// Useful when a handler wants to report failure without sending anything:
/// a not-ok outcome is logged by the response step and shows up in dispatch
/// telemetry, but is not retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOutcome {
    /// Whether the handler considers the update successfully processed.
    pub ok: bool,
    /// Optional human-readable detail, logged when `ok` is false.
    pub description: Option<String>,
}

impl HandlerOutcome {
    /// An ok outcome with no message.
    pub fn success() -> Self {
        Self {
            ok: true,
            description: None,
        }
    }

    /// A not-ok outcome carrying a reason.
    pub fn failure(description: impl Into<String>) -> Self {
        Self {
            ok: false,
            description: Some(description.into()),
        }
    }
}

/// A trait for types that can conclude a handler invocation.
///
/// The response step runs after the handler body and may itself perform API
/// calls (sending the `String` reply). Errors it returns reach the
/// dispatcher, which applies the handler retry policy.
#[async_trait]
pub trait HandleResponse: Send {
    /// Converts this value into a response.
    async fn into_response(self, ctx: Arc<Context>) -> ClientResult<()>;
}

/// `()` concludes without any response.
#[async_trait]
impl HandleResponse for () {
    async fn into_response(self, _ctx: Arc<Context>) -> ClientResult<()> {
        Ok(())
    }
}

/// A not-ok [`HandlerOutcome`] is logged; nothing is sent either way.
#[async_trait]
impl HandleResponse for HandlerOutcome {
    async fn into_response(self, _ctx: Arc<Context>) -> ClientResult<()> {
        if !self.ok {
            error!(
                "Handler reported failure: {}",
                self.description.as_deref().unwrap_or("no description")
            );
        }
        Ok(())
    }
}

/// A `String` is sent as a reply to the originating chat.
#[async_trait]
impl HandleResponse for String {
    async fn into_response(self, ctx: Arc<Context>) -> ClientResult<()> {
        ctx.reply(self).await.map(|_| ())
    }
}

/// `Some` responds with the inner value, `None` concludes silently.
#[async_trait]
impl<T: HandleResponse> HandleResponse for Option<T> {
    async fn into_response(self, ctx: Arc<Context>) -> ClientResult<()> {
        match self {
            Some(value) => value.into_response(ctx).await,
            None => Ok(()),
        }
    }
}

/// `Ok` responds with the inner value; `Err` is logged, never propagated.
#[async_trait]
impl<T: HandleResponse, E: std::fmt::Display + Send> HandleResponse for Result<T, E> {
    async fn into_response(self, ctx: Arc<Context>) -> ClientResult<()> {
        match self {
            Ok(value) => value.into_response(ctx).await,
            Err(e) => {
                error!("Handler error: {e}");
                Ok(())
            }
        }
    }
}

// ============================================================================
// Handler trait
// ============================================================================

/// The core trait for update handlers.
///
/// Automatically implemented for async functions of 0 to 8 parameters where
/// every parameter implements [`FromContext`] and the return type implements
/// [`HandleResponse`]. A parameter that fails to extract skips the whole
/// invocation; the update simply was not of the shape the handler asks for.
#[async_trait]
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Calls the handler with the given context.
    async fn call(self, ctx: Arc<Context>) -> ClientResult<()>;
}

// ============================================================================
// BoxedHandler - type-erased handler stored in registries
// ============================================================================

/// A type-erased handler that can be stored in registries.
///
/// Internally a closure that captures the original handler and calls it
/// with a cloned copy on each invocation.
pub type BoxedHandler =
    Arc<dyn Fn(Arc<Context>) -> BoxFuture<'static, ClientResult<()>> + Send + Sync>;

/// Converts a handler function into a boxed handler.
pub fn into_handler<F, T>(f: F) -> BoxedHandler
where
    F: Handler<T> + Send + Sync + 'static,
    T: 'static,
{
    Arc::new(move |ctx| f.clone().call(ctx))
}

// ============================================================================
// Handler implementations for functions
// ============================================================================

macro_rules! impl_handler {
    (
        $($ty:ident),*
    ) => {
        #[allow(non_snake_case)]
        #[async_trait]
        impl<F, Fut, Res, $($ty,)*> Handler<($($ty,)*)> for F
        where
            F: FnOnce($($ty,)*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = Res> + Send + 'static,
            Res: HandleResponse + 'static,
            $( $ty: FromContext + Send + 'static, )*
        {
            async fn call(self, ctx: Arc<Context>) -> ClientResult<()> {
                $(
                    let $ty = match $ty::from_context(&ctx) {
                        Ok(value) => value,
                        Err(e) => {
                            debug!("Handler skipped: {e}");
                            return Ok(());
                        }
                    };
                )*

                let res = (self)($($ty,)*).await;
                res.into_response(ctx).await
            }
        }
    };
}

// Arities 0 through 8.
impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use baleen_types::Message;
    use crate::test_support::{callback_update, context_from, message_context};

    #[tokio::test]
    async fn test_handler_runs_with_extracted_parameters() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let boxed = into_handler(move |message: Message| {
            let c = Arc::clone(&counter_clone);
            async move {
                assert_eq!(message.text.as_deref(), Some("hi"));
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        let result = boxed(Arc::new(message_context("hi"))).await;
        assert!(result.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_extraction_failure_skips_handler() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let boxed = into_handler(move |_message: Message| {
            let c = Arc::clone(&counter_clone);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        // A callback update has no message payload.
        let result = boxed(Arc::new(context_from(callback_update("x")))).await;
        assert!(result.is_ok());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_string_response_fails_without_a_chat() {
        let boxed = into_handler(|| async { String::from("reply text") });

        // Pre-checkout updates carry no chat, so the reply is rejected
        // before any request is attempted.
        let ctx = context_from(json!({
            "update_id": 1,
            "pre_checkout_query": {
                "id": "pcq-1",
                "from": { "id": 99, "is_bot": false, "first_name": "u" },
            },
        }));
        let result = boxed(Arc::new(ctx)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_result_response_is_logged_not_propagated() {
        let boxed = into_handler(|| async { Err::<(), String>("boom".into()) });
        let result = boxed(Arc::new(message_context("hi"))).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_outcome_and_option_responses() {
        let failing = into_handler(|| async { HandlerOutcome::failure("nothing matched") });
        assert!(failing(Arc::new(message_context("hi"))).await.is_ok());

        let silent = into_handler(|| async { None::<HandlerOutcome> });
        assert!(silent(Arc::new(message_context("hi"))).await.is_ok());
    }

    #[tokio::test]
    async fn test_zero_parameter_handler() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let boxed = into_handler(move || {
            let c = Arc::clone(&counter_clone);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        boxed(Arc::new(message_context("hi"))).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
