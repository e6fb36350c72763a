//! Long-polling update source and poll loop.
//!
//! The poll loop fetches update batches through an [`UpdateSource`], advances
//! the cursor past the highest `update_id` in the batch, and spawns one
//! dispatch task per update. A batch is joined to completion before the next
//! fetch, so at most one batch is in flight at a time.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use baleen_client::{Bot, ClientResult};
use baleen_core::{Dispatcher, RetryPolicy};
use baleen_types::Update;

/// Status codes the poll loop reports at warn level instead of error.
const TOLERATED_FETCH_CODES: [i64; 2] = [420, 404];

/// Source of update batches for the poll loop.
///
/// The production implementation long-polls `getUpdates`; tests substitute a
/// scripted source.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Fetches the next batch of updates starting at `offset`.
    async fn fetch(
        &self,
        offset: Option<i64>,
        limit: i64,
        timeout: u64,
    ) -> ClientResult<Vec<Update>>;
}

/// Update source backed by the Bot API.
pub struct ApiUpdateSource {
    bot: Arc<Bot>,
}

impl ApiUpdateSource {
    /// Creates a source that polls through the given client.
    pub fn new(bot: Arc<Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl UpdateSource for ApiUpdateSource {
    async fn fetch(
        &self,
        offset: Option<i64>,
        limit: i64,
        timeout: u64,
    ) -> ClientResult<Vec<Update>> {
        self.bot.get_updates(offset, limit, timeout).await
    }
}

/// Returns the offset for the next fetch: one past the highest update id in
/// the batch, or the current cursor when the batch is empty.
pub(crate) fn advance_cursor(cursor: Option<i64>, batch: &[Update]) -> Option<i64> {
    batch
        .iter()
        .map(|update| update.update_id)
        .max()
        .map(|highest| highest + 1)
        .or(cursor)
}

/// Drives fetch and dispatch until cancelled.
pub(crate) struct Poller {
    source: Arc<dyn UpdateSource>,
    dispatcher: Arc<Dispatcher>,
    bot: Arc<Bot>,
    retry: RetryPolicy,
    limit: i64,
    timeout: u64,
    cursor: Option<i64>,
    cancel: CancellationToken,
}

impl Poller {
    pub(crate) fn new(
        source: Arc<dyn UpdateSource>,
        dispatcher: Arc<Dispatcher>,
        bot: Arc<Bot>,
        retry: RetryPolicy,
        limit: i64,
        timeout: u64,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            dispatcher,
            bot,
            retry,
            limit,
            timeout,
            cursor: None,
            cancel,
        }
    }

    /// Runs the loop until the cancellation token fires.
    ///
    /// A cancellation during the long-poll wait aborts the fetch early; a
    /// cancellation during dispatch lets the current batch finish first.
    pub(crate) async fn run(mut self) {
        info!(
            limit = self.limit,
            timeout = self.timeout,
            "Polling loop started"
        );

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let fetch = self.retry.run(|| {
                let source = Arc::clone(&self.source);
                let cursor = self.cursor;
                let limit = self.limit;
                let timeout = self.timeout;
                async move { source.fetch(cursor, limit, timeout).await }
            });

            let batch = tokio::select! {
                _ = self.cancel.cancelled() => break,
                fetched = fetch => match fetched {
                    Ok(batch) => batch,
                    Err(e) => {
                        if e.code().is_some_and(|code| TOLERATED_FETCH_CODES.contains(&code)) {
                            warn!(error = %e, "Update fetch failed with tolerated status");
                        } else {
                            error!(error = %e, "Update fetch failed");
                        }
                        continue;
                    }
                },
            };

            if batch.is_empty() {
                continue;
            }

            // The cursor moves past the whole batch before any handler runs,
            // so handler failures never cause a refetch.
            self.cursor = advance_cursor(self.cursor, &batch);
            debug!(
                count = batch.len(),
                next_offset = ?self.cursor,
                "Dispatching update batch"
            );

            let mut tasks = JoinSet::new();
            for update in batch {
                let dispatcher = Arc::clone(&self.dispatcher);
                let bot = Arc::clone(&self.bot);
                tasks.spawn(async move { dispatcher.dispatch(bot, update).await });
            }

            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    error!(error = %e, "Dispatch task panicked");
                }
            }
        }

        info!("Polling loop stopped");
    }
}
