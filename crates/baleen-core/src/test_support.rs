//! Shared builders for the crate's unit tests.

use std::sync::Arc;

use serde_json::{Value, json};

use baleen_client::Bot;
use baleen_types::Update;

use crate::context::Context;
use crate::session::{MemorySessionStore, SessionStore};

pub(crate) fn context_from(update: Value) -> Context {
    context_with_store(update, Arc::new(MemorySessionStore::new()))
}

pub(crate) fn context_with_store(update: Value, sessions: Arc<dyn SessionStore>) -> Context {
    let update: Update = serde_json::from_value(update).expect("test update must deserialize");
    Context::new(
        Arc::new(Bot::new("42:test-token")),
        Arc::from("testbot"),
        Arc::new(update),
        sessions,
    )
}

pub(crate) fn message_update(text: &str) -> Value {
    json!({
        "update_id": 1,
        "message": {
            "message_id": 1,
            "chat": { "id": 10, "type": "private" },
            "from": { "id": 99, "is_bot": false, "first_name": "u" },
            "text": text,
        },
    })
}

pub(crate) fn message_context(text: &str) -> Context {
    context_from(message_update(text))
}

pub(crate) fn callback_update(data: &str) -> Value {
    json!({
        "update_id": 1,
        "callback_query": {
            "id": "cq-1",
            "from": { "id": 99, "is_bot": false, "first_name": "u" },
            "message": {
                "message_id": 1,
                "chat": { "id": 10, "type": "private" },
            },
            "data": data,
        },
    })
}
