//! Named filter constructors.
//!
//! Each function builds a [`Filter`] leaf over one observable property of
//! the update. Combine them with [`Filter::and`], [`Filter::or`] and
//! [`Filter::not`] to express routing rules:
//!
//! ```rust,ignore
//! use baleen_core::filters;
//!
//! let rule = filters::command("order").and(filters::private());
//! let media_in_groups = filters::media().and(filters::group());
//! ```
//!
//! Message-shaped filters never match callback or pre-checkout updates, and
//! vice versa.

use baleen_types::Message;

use crate::context::Context;
use crate::filter::Filter;

fn message_filter(
    name: impl Into<String>,
    predicate: impl Fn(&Message) -> bool + Send + Sync + 'static,
) -> Filter {
    Filter::leaf(name, move |ctx| {
        ctx.message().is_some_and(|message| predicate(message))
    })
}

fn text_filter(
    name: impl Into<String>,
    predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
) -> Filter {
    message_filter(name, move |message| {
        message.text.as_deref().is_some_and(|text| predicate(text))
    })
}

// ─── Update shape ─────────────────────────────────────────────────────────────

/// Matches every update that carries a message payload.
pub fn any_message() -> Filter {
    Filter::leaf("any_message", |ctx| ctx.message().is_some())
}

/// Matches any callback-query update.
pub fn callback_query() -> Filter {
    Filter::leaf("callback_query", |ctx| ctx.callback_query().is_some())
}

/// Matches a callback-query update whose data equals `data`.
pub fn callback_query_data(data: impl Into<String>) -> Filter {
    let data = data.into();
    Filter::leaf(format!("callback_query_data({data})"), move |ctx| {
        ctx.callback_query()
            .and_then(|query| query.data.as_deref())
            .is_some_and(|value| value == data)
    })
}

/// Matches a callback-query update whose data starts with `prefix`.
pub fn callback_query_data_startswith(prefix: impl Into<String>) -> Filter {
    let prefix = prefix.into();
    Filter::leaf(
        format!("callback_query_data_startswith({prefix})"),
        move |ctx| {
            ctx.callback_query()
                .and_then(|query| query.data.as_deref())
                .is_some_and(|value| value.starts_with(&prefix))
        },
    )
}

/// Matches any pre-checkout-query update.
pub fn pre_checkout_query() -> Filter {
    Filter::leaf("pre_checkout_query", |ctx| {
        ctx.pre_checkout_query().is_some()
    })
}

// ─── Chat kind ────────────────────────────────────────────────────────────────

/// Matches messages from private chats.
pub fn private() -> Filter {
    message_filter("private", |message| {
        matches!(message.chat.chat_type, baleen_types::ChatType::Private)
    })
}

/// Matches messages from groups and supergroups.
pub fn group() -> Filter {
    message_filter("group", |message| {
        matches!(
            message.chat.chat_type,
            baleen_types::ChatType::Group | baleen_types::ChatType::Supergroup
        )
    })
}

/// Matches messages from channels.
pub fn channel() -> Filter {
    message_filter("channel", |message| {
        matches!(message.chat.chat_type, baleen_types::ChatType::Channel)
    })
}

// ─── Message content ──────────────────────────────────────────────────────────

/// Matches messages carrying plain text.
pub fn text() -> Filter {
    message_filter("text", |message| message.text.is_some())
}

/// Matches messages carrying a photo.
pub fn photo() -> Filter {
    message_filter("photo", |message| message.photo.is_some())
}

/// Matches messages carrying a video.
pub fn video() -> Filter {
    message_filter("video", |message| message.video.is_some())
}

/// Matches messages carrying an animation.
pub fn animation() -> Filter {
    message_filter("animation", |message| message.animation.is_some())
}

/// Matches messages carrying a document.
pub fn document() -> Filter {
    message_filter("document", |message| message.document.is_some())
}

/// Matches messages carrying an audio track.
pub fn audio() -> Filter {
    message_filter("audio", |message| message.audio.is_some())
}

/// Matches messages carrying a voice note.
pub fn voice() -> Filter {
    message_filter("voice", |message| message.voice.is_some())
}

/// Matches messages carrying a sticker.
pub fn sticker() -> Filter {
    message_filter("sticker", |message| message.sticker.is_some())
}

/// Matches messages carrying a location.
pub fn location() -> Filter {
    message_filter("location", |message| message.location.is_some())
}

/// Matches messages carrying a contact card.
pub fn contact() -> Filter {
    message_filter("contact", |message| message.contact.is_some())
}

/// Matches messages with a media caption.
pub fn caption() -> Filter {
    message_filter("caption", |message| message.caption.is_some())
}

/// Matches messages carrying any shareable media attachment.
pub fn media() -> Filter {
    message_filter("media", Message::has_media)
}

/// Matches messages that reply to another message.
pub fn reply() -> Filter {
    message_filter("reply", |message| message.reply_to_message.is_some())
}

/// Matches forwarded messages.
pub fn forward() -> Filter {
    message_filter("forward", Message::is_forwarded)
}

// ─── Service messages ─────────────────────────────────────────────────────────

/// Matches pin notifications.
pub fn pinned_message() -> Filter {
    message_filter("pinned_message", |message| message.pinned_message.is_some())
}

/// Matches member-joined notifications.
pub fn new_chat_members() -> Filter {
    message_filter("new_chat_members", |message| {
        message.new_chat_members.is_some()
    })
}

/// Matches member-left notifications.
pub fn left_chat_member() -> Filter {
    message_filter("left_chat_member", |message| {
        message.left_chat_member.is_some()
    })
}

/// Matches completed-payment notifications.
pub fn successful_payment() -> Filter {
    message_filter("successful_payment", |message| {
        message.successful_payment.is_some()
    })
}

// ─── Commands ─────────────────────────────────────────────────────────────────

fn command_matches(text: &str, name: &str, username: Option<&str>, exact: bool) -> bool {
    let text = text.trim();
    let bare = format!("/{name}");
    if text == bare || (!exact && text.starts_with(&format!("{bare} "))) {
        return true;
    }
    if let Some(username) = username {
        let tagged = format!("{bare}@{username}");
        if text == tagged || (!exact && text.starts_with(&format!("{tagged} "))) {
            return true;
        }
    }
    false
}

fn command_filter(name: String, username: Option<String>, exact: bool) -> Filter {
    let label = match (&username, exact) {
        (Some(username), false) => format!("command({name}@{username})"),
        (Some(username), true) => format!("command_exact({name}@{username})"),
        (None, false) => format!("command({name})"),
        (None, true) => format!("command_exact({name})"),
    };
    text_filter(label, move |text| {
        command_matches(text, &name, username.as_deref(), exact)
    })
}

/// Matches `/name` on its own or followed by arguments.
///
/// `"/started"` does not match `command("start")`.
pub fn command(name: impl Into<String>) -> Filter {
    command_filter(name.into(), None, false)
}

/// Matches exactly `/name` with no arguments.
pub fn command_exact(name: impl Into<String>) -> Filter {
    command_filter(name.into(), None, true)
}

/// Like [`command`], additionally accepting the `/name@username` form.
pub fn command_with_username(name: impl Into<String>, username: impl Into<String>) -> Filter {
    command_filter(name.into(), Some(username.into()), false)
}

/// Like [`command_exact`], additionally accepting `/name@username`.
pub fn command_with_username_exact(
    name: impl Into<String>,
    username: impl Into<String>,
) -> Filter {
    command_filter(name.into(), Some(username.into()), true)
}

/// Matches any command out of `names`.
///
/// Each name matches `/name` alone, `/name` followed by arguments, or
/// `/name@` directed at any bot.
pub fn multi_command(names: impl IntoIterator<Item = impl Into<String>>) -> Filter {
    let names: Vec<String> = names.into_iter().map(Into::into).collect();
    let label = format!("multi_command({})", names.join(","));
    text_filter(label, move |text| {
        let text = text.trim();
        names.iter().any(|name| {
            let bare = format!("/{name}");
            text == bare
                || text.starts_with(&format!("{bare} "))
                || text.starts_with(&format!("{bare}@"))
        })
    })
}

// ─── Text patterns ────────────────────────────────────────────────────────────

/// Compiles the pattern policy shared by [`pattern`] and the callback data
/// registration form.
fn pattern_matcher(pattern: &str) -> Box<dyn Fn(&str) -> bool + Send + Sync> {
    if let Some(name) = pattern.strip_prefix('/') {
        let name = name.to_string();
        return Box::new(move |text| command_matches(text, &name, None, false));
    }
    if pattern.contains('|') {
        let prefixes: Vec<String> = pattern
            .split('|')
            .map(|part| part.trim().to_string())
            .collect();
        return Box::new(move |text| prefixes.iter().any(|prefix| text.starts_with(prefix)));
    }
    let literal = pattern.to_string();
    Box::new(move |text| text.starts_with(&literal))
}

/// Matches message text against a lightweight pattern.
///
/// Three forms are recognised:
///
/// - `"/name"` is a shortcut for [`command`] of `name`;
/// - a pattern containing `|` matches when the text starts with any of the
///   `|`-separated literals (each trimmed);
/// - anything else is a literal prefix match.
pub fn pattern(pattern: impl Into<String>) -> Filter {
    let pattern = pattern.into();
    let matcher = pattern_matcher(&pattern);
    text_filter(format!("pattern({pattern})"), move |text| matcher(text))
}

/// Matches callback-query data against the same pattern forms as
/// [`pattern`].
pub(crate) fn callback_data_pattern(pattern: impl Into<String>) -> Filter {
    let pattern = pattern.into();
    let matcher = pattern_matcher(&pattern);
    Filter::leaf(format!("callback_data_pattern({pattern})"), move |ctx| {
        ctx.callback_query()
            .and_then(|query| query.data.as_deref())
            .is_some_and(|data| matcher(data))
    })
}

/// Matches when the text contains any of `words`, case-insensitively.
pub fn contains_keywords(words: impl IntoIterator<Item = impl Into<String>>) -> Filter {
    let words: Vec<String> = words
        .into_iter()
        .map(|word| word.into().to_lowercase())
        .collect();
    text_filter("contains_keywords", move |text| {
        let text = text.to_lowercase();
        words.iter().any(|word| text.contains(word))
    })
}

/// Matches text messages of at least `min_chars` characters.
pub fn long_message(min_chars: usize) -> Filter {
    text_filter(format!("long_message({min_chars})"), move |text| {
        text.chars().count() >= min_chars
    })
}

// ─── Stateful ─────────────────────────────────────────────────────────────────

/// Matches when the originating user's session state equals `label`.
///
/// The only filter that consults the session store; everything else is pure
/// over the update content.
pub fn state(label: impl Into<String>) -> Filter {
    let label = label.into();
    Filter::leaf(format!("state({label})"), move |ctx| {
        ctx.state().as_deref() == Some(label.as_str())
    })
}

/// Wraps an arbitrary predicate as a filter.
///
/// The predicate runs fail-closed like every leaf: a panic counts as "no
/// match".
pub fn custom(predicate: impl Fn(&Context) -> bool + Send + Sync + 'static) -> Filter {
    Filter::leaf("custom", predicate)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::session::{MemorySessionStore, SessionStore};
    use crate::test_support::{
        callback_update, context_from, context_with_store, message_context,
    };

    #[test]
    fn test_command_matching_set() {
        let plain = command("start");
        assert!(plain.evaluate(&message_context("/start")));
        assert!(plain.evaluate(&message_context("/start hello")));
        assert!(plain.evaluate(&message_context("  /start  ")));
        assert!(!plain.evaluate(&message_context("/started")));
        assert!(!plain.evaluate(&message_context("/start@mybot")));
        assert!(!plain.evaluate(&message_context("start")));

        let tagged = command_with_username("start", "mybot");
        assert!(tagged.evaluate(&message_context("/start")));
        assert!(tagged.evaluate(&message_context("/start@mybot")));
        assert!(tagged.evaluate(&message_context("/start@mybot go")));
        assert!(!tagged.evaluate(&message_context("/start@otherbot")));
    }

    #[test]
    fn test_exact_command_rejects_arguments() {
        let exact = command_exact("start");
        assert!(exact.evaluate(&message_context("/start")));
        assert!(!exact.evaluate(&message_context("/start hello")));

        let tagged = command_with_username_exact("start", "mybot");
        assert!(tagged.evaluate(&message_context("/start@mybot")));
        assert!(!tagged.evaluate(&message_context("/start@mybot go")));
    }

    #[test]
    fn test_multi_command_accepts_any_bot_suffix() {
        let filter = multi_command(["go", "halt"]);
        assert!(filter.evaluate(&message_context("/go")));
        assert!(filter.evaluate(&message_context("/halt now")));
        assert!(filter.evaluate(&message_context("/go@whoever")));
        assert!(!filter.evaluate(&message_context("/gone")));
        assert!(!filter.evaluate(&message_context("/stop")));
    }

    #[test]
    fn test_pattern_branches() {
        let shortcut = pattern("/help");
        assert!(shortcut.evaluate(&message_context("/help")));
        assert!(shortcut.evaluate(&message_context("/help me")));
        assert!(!shortcut.evaluate(&message_context("/helper")));

        let alternatives = pattern("yes | no");
        assert!(alternatives.evaluate(&message_context("yes please")));
        assert!(alternatives.evaluate(&message_context("no thanks")));
        assert!(!alternatives.evaluate(&message_context("maybe")));

        let prefix = pattern("order:");
        assert!(prefix.evaluate(&message_context("order: 42")));
        assert!(!prefix.evaluate(&message_context("my order: 42")));
    }

    #[test]
    fn test_chat_kind_filters() {
        let private_ctx = message_context("hi");
        assert!(private().evaluate(&private_ctx));
        assert!(!group().evaluate(&private_ctx));

        let group_ctx = context_from(json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "chat": { "id": -20, "type": "group", "title": "room" },
                "from": { "id": 99, "is_bot": false, "first_name": "u" },
                "text": "hi",
            },
        }));
        assert!(group().evaluate(&group_ctx));
        assert!(!private().evaluate(&group_ctx));
        assert!(!channel().evaluate(&group_ctx));
    }

    #[test]
    fn test_content_filters() {
        let photo_ctx = context_from(json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "chat": { "id": 10, "type": "private" },
                "photo": [{ "file_id": "p1", "width": 1, "height": 1 }],
                "caption": "look",
            },
        }));
        assert!(photo().evaluate(&photo_ctx));
        assert!(caption().evaluate(&photo_ctx));
        assert!(media().evaluate(&photo_ctx));
        assert!(!text().evaluate(&photo_ctx));
        assert!(!sticker().evaluate(&photo_ctx));

        let text_ctx = message_context("hello");
        assert!(text().evaluate(&text_ctx));
        assert!(!media().evaluate(&text_ctx));
    }

    #[test]
    fn test_keyword_and_length_filters() {
        let keywords = contains_keywords(["Order", "refund"]);
        assert!(keywords.evaluate(&message_context("my ORDER arrived")));
        assert!(keywords.evaluate(&message_context("refund please")));
        assert!(!keywords.evaluate(&message_context("hello there")));

        let long = long_message(5);
        assert!(long.evaluate(&message_context("12345")));
        assert!(!long.evaluate(&message_context("1234")));
    }

    #[test]
    fn test_callback_filters() {
        let ctx = context_from(callback_update("confirm:42"));
        assert!(callback_query().evaluate(&ctx));
        assert!(callback_query_data("confirm:42").evaluate(&ctx));
        assert!(!callback_query_data("confirm:41").evaluate(&ctx));
        assert!(callback_query_data_startswith("confirm:").evaluate(&ctx));
        assert!(!callback_query_data_startswith("cancel:").evaluate(&ctx));
        assert!(!any_message().evaluate(&ctx));

        let message_ctx = message_context("hi");
        assert!(!callback_query().evaluate(&message_ctx));
        assert!(any_message().evaluate(&message_ctx));
    }

    #[test]
    fn test_state_filter_reads_store() {
        let store: Arc<MemorySessionStore> = Arc::new(MemorySessionStore::new());
        store.set("testbot", 99, "awaiting_name");

        let sessions: Arc<dyn SessionStore> = store;
        let ctx = context_with_store(crate::test_support::message_update("hi"), sessions);
        assert!(state("awaiting_name").evaluate(&ctx));
        assert!(!state("confirming").evaluate(&ctx));
    }

    #[test]
    fn test_custom_filter_wraps_predicate() {
        let even_update = custom(|ctx| ctx.update().update_id % 2 == 0);
        assert!(!even_update.evaluate(&message_context("hi")));

        let has_user = custom(|ctx| ctx.from_user().is_some());
        assert!(has_user.evaluate(&message_context("hi")));
    }

    #[test]
    fn test_service_message_filters() {
        let joined_ctx = context_from(json!({
            "update_id": 1,
            "message": {
                "message_id": 1,
                "chat": { "id": -20, "type": "group", "title": "room" },
                "new_chat_members": [{ "id": 5, "is_bot": false, "first_name": "n" }],
            },
        }));
        assert!(new_chat_members().evaluate(&joined_ctx));
        assert!(!left_chat_member().evaluate(&joined_ctx));
        assert!(!pinned_message().evaluate(&joined_ctx));
        assert!(!successful_payment().evaluate(&joined_ctx));
    }
}
