//! # Baleen
//!
//! An async, type-safe bot framework for the Bale messenger Bot API.
//!
//! ## Overview
//!
//! Baleen talks to the Telegram-compatible Bot API served at
//! `https://tapi.bale.ai`. Updates arrive over long polling; handlers are
//! plain async functions whose parameters are extracted from the update,
//! selected by composable filters.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐  getUpdates  ┌────────┐     ┌────────────┐     ┌─────────────────────────┐
//! │ Bale API │─────────────▶│ Poller │────▶│ Dispatcher │────▶│ handler (own task)      │──▶ Bot
//! └──────────┘              │        │     │            │────▶│ handler (own task)      │──▶ Bot
//!                           └────────┘     └────────────┘────▶│ ...                     │──▶ Bot
//!                                                             └─────────────────────────┘
//! ```
//!
//! - **Runtime**: Owns the poll loop, configuration, and lifecycle
//! - **Poller**: Fetches update batches and tracks the offset cursor
//! - **Dispatcher**: Matches updates against filters, spawns one task per update
//! - **Handlers**: User-defined async functions with extractor parameters
//! - **Bot**: The typed API client shared with every handler
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use baleen::prelude::*;
//!
//! async fn start(message: Message) -> String {
//!     format!("Hello, chat {}!", message.chat.id)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut dispatcher = Dispatcher::new();
//!     dispatcher.on_message(
//!         MessageOptions::new().filter(filters::command("start")),
//!         start,
//!     )?;
//!
//!     let runtime = Runtime::builder()
//!         .dispatcher(dispatcher)
//!         .build()?;
//!
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `json-log`: JSON log output format

pub use baleen_client as client;
pub use baleen_core as core;
pub use baleen_runtime as runtime;
pub use baleen_types as types;

/// Prelude module for convenient imports.
///
/// This module provides all commonly used types for building bot applications:
///
/// ```rust,ignore
/// use baleen::prelude::*;
/// ```
pub mod prelude {
    // Runtime - main entry point
    pub use baleen_runtime::{BaleenConfig, Runtime, RuntimeBuilder};

    // Dispatch - registration and matching
    pub use baleen_core::{DispatchOutcome, Dispatcher, MessageOptions};

    // Filters - for selecting which updates a handler sees
    pub use baleen_core::{Filter, filters};

    // Handler building blocks
    pub use baleen_core::{Context, FromContext, HandlerOutcome};

    // Sessions - per-chat state shared between handlers
    pub use baleen_core::{MemorySessionStore, SessionStore};

    // The API client handed to every handler
    pub use baleen_client::Bot;

    // Wire types seen in handler signatures
    pub use baleen_types::{
        CallbackQuery, Chat, ChatId, InlineKeyboardButton, InlineKeyboardMarkup, Message,
        PreCheckoutQuery, ReplyMarkup, Update, User,
    };
}
