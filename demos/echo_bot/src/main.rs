//! Echo Bot Example
//!
//! A small demonstration of the baleen framework: command handlers picked
//! by filters, an inline keyboard resolved through a callback handler, and
//! a two-step conversation driven by session state.
//!
//! # Dispatch
//!
//! Registrations are scanned in order and the first matching one wins, so
//! the specific command handlers come before the catch-all echo at the end:
//!
//! ```text
//! /start          -> start        (greeting + vote keyboard)
//! /help           -> help         (command list)
//! /name           -> ask_name     (sets session state)
//! state awaiting  -> save_name    (reads the answer, clears state)
//! anything else   -> echo
//! vote:* button   -> on_vote
//! ```
//!
//! # Usage
//!
//! ```bash
//! BALEEN_BOT__TOKEN=<token> cargo run --package echo-bot
//! ```

use std::sync::Arc;

use anyhow::Result;
use baleen::client::ClientResult;
use baleen::prelude::*;
use baleen::types::SendMessageParams;
use tracing::info;

// ============================================================================
// Handler Functions
// ============================================================================

/// `/start` - greets the sender and offers a vote keyboard.
async fn start(ctx: Context, bot: Arc<Bot>) -> ClientResult<()> {
    let Some(chat_id) = ctx.chat_id() else {
        return Ok(());
    };
    let name = ctx
        .from_user()
        .map(|user| user.full_name())
        .unwrap_or_else(|| "there".to_string());

    let keyboard = InlineKeyboardMarkup::new().row(vec![
        InlineKeyboardButton::callback("Yes", "vote:yes"),
        InlineKeyboardButton::callback("No", "vote:no"),
    ]);
    let mut params =
        SendMessageParams::new(chat_id, format!("Hello {name}! Do you like this bot?"));
    params.reply_markup = Some(keyboard.into());
    bot.send_message(&params).await.map(|_| ())
}

/// `/help` - lists the available commands.
async fn help() -> String {
    "Commands:\n\
     /start - greeting and vote keyboard\n\
     /name - tell me your name\n\
     /help - this message\n\
     anything else is echoed back"
        .to_string()
}

/// `/name` - opens the rename conversation.
async fn ask_name(ctx: Context) -> ClientResult<()> {
    ctx.set_state("awaiting_name");
    ctx.reply("What should I call you?").await.map(|_| ())
}

/// Second step of `/name`: stores the answer and closes the conversation.
async fn save_name(ctx: Context, message: Message) -> ClientResult<()> {
    let name = message.text_or_caption().unwrap_or("friend").to_string();
    ctx.clear_state();
    ctx.reply(format!("Nice to meet you, {name}!"))
        .await
        .map(|_| ())
}

/// Resolves a press on the vote keyboard.
async fn on_vote(ctx: Context, query: CallbackQuery) -> ClientResult<()> {
    let choice = query
        .data
        .as_deref()
        .and_then(|data| data.strip_prefix("vote:"))
        .unwrap_or("?");
    info!(user_id = query.from.id, choice, "Vote received");

    ctx.answer_callback(Some("Thanks for voting!"), false).await?;
    ctx.reply(format!("You voted: {choice}")).await.map(|_| ())
}

/// Fallback: echoes any text message nothing above claimed.
async fn echo(message: Message) -> Option<String> {
    message.text_or_caption().map(str::to_string)
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let mut dispatcher = Dispatcher::new();

    dispatcher.on_message(MessageOptions::new().commands(["start"]), start)?;
    dispatcher.on_message(MessageOptions::new().commands(["help"]), help)?;
    dispatcher.on_message(MessageOptions::new().commands(["name"]), ask_name)?;
    dispatcher.on_message(MessageOptions::new().state("awaiting_name"), save_name)?;
    dispatcher.on_message(MessageOptions::new(), echo)?;
    dispatcher.on_callback_data("vote:", on_vote);

    // The token and everything else come from baleen.toml or BALEEN_*
    // environment variables.
    let runtime = Runtime::builder().dispatcher(dispatcher).build()?;
    runtime.run().await?;
    Ok(())
}
