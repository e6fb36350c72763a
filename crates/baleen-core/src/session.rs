//! Per-user conversation state.
//!
//! Handlers often need to remember where a user is in a multi-step flow
//! ("waiting for a name", "confirming an order"). The [`SessionStore`] trait
//! models that as a small keyed string map: the key is the pair of bot
//! identity and user id, the value is an opaque state label chosen by the
//! application. The [`state`](crate::filters::state) filter reads the store
//! so registration can route messages by conversation phase.
//!
//! The default [`MemorySessionStore`] keeps everything in process memory.
//! A runtime can inject any other implementation (a database, a cache) at
//! construction time without the dispatcher noticing.

use std::collections::HashMap;

use parking_lot::RwLock;

/// Storage backend for per-user conversation state.
///
/// Keys are composite: the same user talking to two different bots has two
/// independent sessions. All three operations are synchronous; persistent
/// implementations are expected to keep a write-through cache so `get` stays
/// cheap on the dispatch path.
///
/// Concurrent handlers touching the same key race benignly: the last write
/// wins. The store does not serialize handler executions.
pub trait SessionStore: Send + Sync {
    /// Returns the state label for `user_id` under `bot`, if any.
    fn get(&self, bot: &str, user_id: i64) -> Option<String>;

    /// Sets the state label for `user_id` under `bot`.
    fn set(&self, bot: &str, user_id: i64, state: &str);

    /// Removes any state label for `user_id` under `bot`.
    fn clear(&self, bot: &str, user_id: i64);
}

/// In-memory [`SessionStore`] backed by a [`HashMap`].
///
/// State lives only as long as the process; restarting the bot drops every
/// conversation back to its initial phase.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<(String, i64), String>>,
}

impl MemorySessionStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns `true` if no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, bot: &str, user_id: i64) -> Option<String> {
        self.entries.read().get(&(bot.to_string(), user_id)).cloned()
    }

    fn set(&self, bot: &str, user_id: i64, state: &str) {
        self.entries
            .write()
            .insert((bot.to_string(), user_id), state.to_string());
    }

    fn clear(&self, bot: &str, user_id: i64) {
        self.entries.write().remove(&(bot.to_string(), user_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear_roundtrip() {
        let store = MemorySessionStore::new();
        assert!(store.get("bot", 1).is_none());

        store.set("bot", 1, "awaiting_name");
        assert_eq!(store.get("bot", 1).as_deref(), Some("awaiting_name"));

        store.set("bot", 1, "confirming");
        assert_eq!(store.get("bot", 1).as_deref(), Some("confirming"));

        store.clear("bot", 1);
        assert!(store.get("bot", 1).is_none());
    }

    #[test]
    fn test_sessions_are_scoped_per_bot() {
        let store = MemorySessionStore::new();
        store.set("alpha", 7, "one");
        store.set("beta", 7, "two");

        assert_eq!(store.get("alpha", 7).as_deref(), Some("one"));
        assert_eq!(store.get("beta", 7).as_deref(), Some("two"));
        assert_eq!(store.len(), 2);

        store.clear("alpha", 7);
        assert!(store.get("alpha", 7).is_none());
        assert_eq!(store.get("beta", 7).as_deref(), Some("two"));
    }
}
