//! Update dispatch.
//!
//! The [`Dispatcher`] owns the handler registries, the concurrency limiter,
//! the handler retry policy and the session store. The poll loop hands it
//! one update at a time; everything that happens to that update afterwards
//! (selection, extraction, the handler itself, retries, panic containment)
//! stays inside [`dispatch`](Dispatcher::dispatch).
//!
//! # Example
//!
//! ```rust,ignore
//! use baleen_core::{Dispatcher, MessageOptions};
//!
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.on_message(
//!     MessageOptions::new().commands(["start"]),
//!     |ctx: Context| async move { ctx.reply("hello").await.map(|_| ()) },
//! )?;
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use parking_lot::RwLock;
use tokio::sync::Semaphore;
use tracing::{debug, error};

use baleen_client::Bot;
use baleen_types::Update;

use crate::context::Context;
use crate::error::RegistryResult;
use crate::filter::Filter;
use crate::handler::Handler;
use crate::registry::{MessageOptions, Registry};
use crate::retry::RetryPolicy;
use crate::session::{MemorySessionStore, SessionStore};

/// Default number of updates processed concurrently.
pub const DEFAULT_CONCURRENCY_LIMIT: usize = 120;

/// What became of one dispatched update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A handler was selected and completed.
    Handled,
    /// No registration matched the update.
    Unhandled,
    /// The selected handler failed after retries, or panicked.
    Failed,
}

/// The central update dispatcher.
///
/// Thread-safe; the poll loop shares one dispatcher across all in-flight
/// update tasks through an `Arc`.
pub struct Dispatcher {
    registry: Registry,
    limiter: Arc<Semaphore>,
    retry: RetryPolicy,
    sessions: Arc<dyn SessionStore>,
    /// Session-store key prefix, set by the runtime once the bot identity
    /// is known.
    bot_name: RwLock<Arc<str>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Creates a dispatcher with default limiter, retry policy and an
    /// in-memory session store.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            limiter: Arc::new(Semaphore::new(DEFAULT_CONCURRENCY_LIMIT)),
            retry: RetryPolicy::handler(),
            sessions: Arc::new(MemorySessionStore::new()),
            bot_name: RwLock::new(Arc::from("")),
        }
    }

    /// Replaces the concurrency limit.
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.limiter = Arc::new(Semaphore::new(limit));
        self
    }

    /// Replaces the handler retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the session store.
    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    /// Returns a clone of the session store handle.
    pub fn session_store(&self) -> Arc<dyn SessionStore> {
        Arc::clone(&self.sessions)
    }

    /// Sets the bot identity used for session keys.
    pub fn set_bot_name(&self, name: impl Into<Arc<str>>) {
        *self.bot_name.write() = name.into();
    }

    // ─── Registration (delegates to the registry pair) ────────────────────

    /// Registers a message handler; see [`Registry::on_message`].
    pub fn on_message<F, T>(&mut self, options: MessageOptions, handler: F) -> RegistryResult<()>
    where
        F: Handler<T>,
        T: 'static,
    {
        self.registry.on_message(options, handler)
    }

    /// Registers a callback handler; see [`Registry::on_callback`].
    pub fn on_callback<F, T>(&mut self, filters: impl IntoIterator<Item = Filter>, handler: F)
    where
        F: Handler<T>,
        T: 'static,
    {
        self.registry.on_callback(filters, handler);
    }

    /// Registers a data-matched callback handler; see
    /// [`Registry::on_callback_data`].
    pub fn on_callback_data<F, T>(&mut self, pattern: impl Into<String>, handler: F)
    where
        F: Handler<T>,
        T: 'static,
    {
        self.registry.on_callback_data(pattern, handler);
    }

    /// Registers a pre-checkout handler; see [`Registry::on_pre_checkout`].
    pub fn on_pre_checkout<F, T>(&mut self, filters: impl IntoIterator<Item = Filter>, handler: F)
    where
        F: Handler<T>,
        T: 'static,
    {
        self.registry.on_pre_checkout(filters, handler);
    }

    /// Returns the registry, for inspection.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    // ─── Dispatch ─────────────────────────────────────────────────────────

    /// Dispatches one update.
    ///
    /// Suspends until the concurrency limiter grants a permit, scans the
    /// registry matching the update's payload kind, and runs the first
    /// matching handler through the retry policy. Handler panics are caught
    /// and logged; they never reach the caller.
    pub async fn dispatch(&self, bot: Arc<Bot>, update: Update) -> DispatchOutcome {
        let _permit = match self.limiter.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                // The semaphore is never closed; keep the failure visible
                // anyway.
                error!("Concurrency limiter closed, dropping update");
                return DispatchOutcome::Failed;
            }
        };

        let update_id = update.update_id;
        let update = Arc::new(update);
        let ctx = Arc::new(Context::new(
            bot,
            self.bot_name.read().clone(),
            Arc::clone(&update),
            Arc::clone(&self.sessions),
        ));

        let selected = if update.is_interaction() {
            self.registry.select_interaction(&ctx)
        } else if update.message().is_some() {
            self.registry.select_message(&ctx)
        } else {
            debug!(update_id, "Update payload not recognised, skipping");
            return DispatchOutcome::Unhandled;
        };

        let Some((label, handler)) = selected else {
            debug!(update_id, "No registration matched");
            return DispatchOutcome::Unhandled;
        };

        let invocation = self.retry.run(|| handler(Arc::clone(&ctx)));
        match AssertUnwindSafe(invocation).catch_unwind().await {
            Ok(Ok(())) => {
                debug!(update_id, filter = %label, "Update handled");
                DispatchOutcome::Handled
            }
            Ok(Err(e)) => {
                error!(update_id, filter = %label, "Handler failed: {e}");
                DispatchOutcome::Failed
            }
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".to_string());
                error!(update_id, filter = %label, "Handler panicked: {message}");
                DispatchOutcome::Failed
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("registry", &self.registry)
            .field("available_permits", &self.limiter.available_permits())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use futures::future::join_all;
    use serde_json::json;

    use super::*;
    use crate::filters;
    use crate::test_support;

    fn test_bot() -> Arc<Bot> {
        Arc::new(Bot::new("42:test-token"))
    }

    fn message_update(text: &str) -> Update {
        serde_json::from_value(test_support::message_update(text)).unwrap()
    }

    fn callback_update(data: &str) -> Update {
        serde_json::from_value(test_support::callback_update(data)).unwrap()
    }

    #[tokio::test]
    async fn test_unmatched_update_is_unhandled() {
        let dispatcher = Dispatcher::new();
        let outcome = dispatcher.dispatch(test_bot(), message_update("hi")).await;
        assert_eq!(outcome, DispatchOutcome::Unhandled);
    }

    #[tokio::test]
    async fn test_first_matching_registration_runs() {
        let counter = Arc::new(AtomicUsize::new(0));
        let first = Arc::clone(&counter);
        let second = Arc::clone(&counter);

        let mut dispatcher = Dispatcher::new();
        dispatcher
            .on_message(MessageOptions::new(), move || {
                let c = Arc::clone(&first);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                }
            })
            .unwrap();
        dispatcher
            .on_message(MessageOptions::new(), move || {
                let c = Arc::clone(&second);
                async move {
                    c.fetch_add(10, Ordering::SeqCst);
                }
            })
            .unwrap();

        let outcome = dispatcher.dispatch(test_bot(), message_update("hi")).await;
        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_interactions_scan_the_callback_registry() {
        let message_hits = Arc::new(AtomicUsize::new(0));
        let callback_hits = Arc::new(AtomicUsize::new(0));
        let message_counter = Arc::clone(&message_hits);
        let callback_counter = Arc::clone(&callback_hits);

        let mut dispatcher = Dispatcher::new();
        dispatcher
            .on_message(MessageOptions::new(), move || {
                let c = Arc::clone(&message_counter);
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                }
            })
            .unwrap();
        dispatcher.on_callback([filters::callback_query()], move || {
            let c = Arc::clone(&callback_counter);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        let outcome = dispatcher
            .dispatch(test_bot(), callback_update("pick"))
            .await;
        assert_eq!(outcome, DispatchOutcome::Handled);
        assert_eq!(message_hits.load(Ordering::SeqCst), 0);
        assert_eq!(callback_hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_handler_is_contained() {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .on_message(MessageOptions::new(), || async {
                panic!("handler bug");
                #[allow(unreachable_code)]
                ()
            })
            .unwrap();

        let outcome = dispatcher.dispatch(test_bot(), message_update("hi")).await;
        assert_eq!(outcome, DispatchOutcome::Failed);

        // The dispatcher stays usable afterwards.
        let outcome = dispatcher
            .dispatch(test_bot(), message_update("again"))
            .await;
        assert_eq!(outcome, DispatchOutcome::Failed);
    }

    #[tokio::test]
    async fn test_response_error_marks_dispatch_failed() {
        let mut dispatcher = Dispatcher::new();
        // A String response cannot be delivered for an update without a
        // chat, and the resulting error has no code, so no retry happens.
        dispatcher.on_pre_checkout([], || async { String::from("paid") });

        let checkout: Update = serde_json::from_value(json!({
            "update_id": 3,
            "pre_checkout_query": {
                "id": "pcq-1",
                "from": { "id": 99, "is_bot": false, "first_name": "u" },
            },
        }))
        .unwrap();

        let outcome = dispatcher.dispatch(test_bot(), checkout).await;
        assert_eq!(outcome, DispatchOutcome::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_limiter_bounds_concurrent_handlers() {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let current_clone = Arc::clone(&current);
        let peak_clone = Arc::clone(&peak);

        let mut dispatcher = Dispatcher::new().with_concurrency_limit(2);
        dispatcher
            .on_message(MessageOptions::new(), move || {
                let current = Arc::clone(&current_clone);
                let peak = Arc::clone(&peak_clone);
                async move {
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                }
            })
            .unwrap();

        let bot = test_bot();
        join_all(
            (0..5).map(|_| dispatcher.dispatch(Arc::clone(&bot), message_update("hi"))),
        )
        .await;

        assert_eq!(peak.load(Ordering::SeqCst), 2);
        assert_eq!(current.load(Ordering::SeqCst), 0);
    }
}
