//! # baleen-core
//!
//! The dispatch engine of the baleen bot framework.
//!
//! This crate turns decoded updates into handler invocations:
//! - **Filters**: composable match rules over updates ([`Filter`], the
//!   constructors in [`filters`])
//! - **Handlers**: async functions with typed parameter injection via
//!   [`FromContext`], returning anything that implements [`HandleResponse`]
//! - **Registries**: two append-only ordered lists (messages and callback
//!   interactions) scanned first-match-wins ([`Registry`])
//! - **Dispatch**: the [`Dispatcher`] glues the above together under a
//!   concurrency limiter, a retry policy and panic containment
//! - **Sessions**: per-user conversation state via [`SessionStore`]
//!
//! Transport lives in `baleen-client`, the poll loop and lifecycle in
//! `baleen-runtime`; this crate is purely the routing layer between them.
//!
//! ## Example
//!
//! ```rust,ignore
//! use baleen_core::{Context, Dispatcher, MessageOptions, filters};
//!
//! let mut dispatcher = Dispatcher::new();
//!
//! dispatcher.on_message(
//!     MessageOptions::new().commands(["start"]).state("fresh"),
//!     |ctx: Context| async move {
//!         ctx.set_state("greeted");
//!         String::from("welcome!")
//!     },
//! )?;
//!
//! dispatcher.on_callback([filters::callback_query_data_startswith("pick:")], handle_pick);
//! ```

pub mod context;
pub mod dispatcher;
pub mod error;
pub mod extract;
pub mod filter;
pub mod filters;
pub mod handler;
pub mod registry;
pub mod retry;
pub mod session;

#[cfg(test)]
pub(crate) mod test_support;

pub use context::Context;
pub use dispatcher::{DEFAULT_CONCURRENCY_LIMIT, DispatchOutcome, Dispatcher};
pub use error::{ExtractError, ExtractResult, RegistryError, RegistryResult};
pub use extract::FromContext;
pub use filter::{Filter, Predicate};
pub use handler::{BoxedHandler, HandleResponse, Handler, HandlerOutcome, into_handler};
pub use registry::{MessageOptions, Registry};
pub use retry::RetryPolicy;
pub use session::{MemorySessionStore, SessionStore};
