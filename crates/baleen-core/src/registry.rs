//! Ordered handler registries.
//!
//! Two registries exist side by side: one for message updates and one for
//! callback interactions (callback queries and pre-checkout queries share
//! it). Both are append-only; scanning walks entries in registration order
//! and the first filter that matches wins, so earlier registrations shadow
//! later ones.
//!
//! # Registration styles
//!
//! Message handlers register either with one prebuilt [`Filter`] or with
//! [`MessageOptions`], a small conjunction builder. Mixing the two in one
//! registration is rejected with [`RegistryError::FilterConflict`].
//!
//! ```rust,ignore
//! let mut registry = Registry::new();
//!
//! registry.on_message(
//!     MessageOptions::new().commands(["start"]),
//!     |ctx: Context| async move { ctx.reply("hi").await.map(|_| ()) },
//! )?;
//!
//! registry.on_callback_data("confirm", handle_confirm);
//! ```

use baleen_types::ContentType;

use crate::context::Context;
use crate::error::{RegistryError, RegistryResult};
use crate::filter::Filter;
use crate::filters;
use crate::handler::{BoxedHandler, Handler, into_handler};

/// Convenience match options for message registrations.
///
/// Every populated option contributes one conjunct to the effective filter;
/// an empty option set matches every message update. A prebuilt filter can
/// be attached with [`filter`](Self::filter), but then no other option may
/// be set.
#[derive(Default)]
pub struct MessageOptions {
    filter: Option<Filter>,
    commands: Vec<String>,
    pattern: Option<String>,
    content_types: Vec<ContentType>,
    state: Option<String>,
    custom: Option<Filter>,
}

impl MessageOptions {
    /// Creates an empty option set (matches every message).
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `filter` as the whole match rule.
    ///
    /// Exclusive with every other option.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Matches any of the given commands.
    pub fn commands(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.commands = names.into_iter().map(Into::into).collect();
        self
    }

    /// Matches text against a pattern (see [`filters::pattern`]).
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Requires each of the given content types to be present.
    pub fn content_types(mut self, types: impl IntoIterator<Item = ContentType>) -> Self {
        self.content_types = types.into_iter().collect();
        self
    }

    /// Requires the sender's session state to equal `label`.
    pub fn state(mut self, label: impl Into<String>) -> Self {
        self.state = Some(label.into());
        self
    }

    /// Adds an arbitrary predicate as one conjunct.
    pub fn custom(mut self, predicate: impl Fn(&Context) -> bool + Send + Sync + 'static) -> Self {
        self.custom = Some(filters::custom(predicate));
        self
    }

    fn has_options(&self) -> bool {
        !self.commands.is_empty()
            || self.pattern.is_some()
            || !self.content_types.is_empty()
            || self.state.is_some()
            || self.custom.is_some()
    }

    /// Resolves the option set into an effective filter.
    ///
    /// `Ok(None)` means "match every message".
    fn into_filter(mut self) -> RegistryResult<Option<Filter>> {
        if let Some(filter) = self.filter.take() {
            if self.has_options() {
                return Err(RegistryError::FilterConflict);
            }
            return Ok(Some(filter));
        }

        let mut conjuncts = Vec::new();
        if !self.commands.is_empty() {
            let any_command = self
                .commands
                .into_iter()
                .map(filters::command)
                .reduce(Filter::or);
            conjuncts.extend(any_command);
        }
        if let Some(pattern) = self.pattern {
            conjuncts.push(filters::pattern(pattern));
        }
        for content_type in self.content_types {
            conjuncts.push(Filter::leaf(
                format!("content_type({})", content_type.as_str()),
                move |ctx| {
                    ctx.message()
                        .is_some_and(|message| content_type.matches(message))
                },
            ));
        }
        if let Some(label) = self.state {
            conjuncts.push(filters::state(label));
        }
        if let Some(custom) = self.custom {
            conjuncts.push(custom);
        }
        Ok(Filter::all(conjuncts))
    }
}

struct Entry {
    /// `None` matches every update reaching this registry.
    filter: Option<Filter>,
    handler: BoxedHandler,
}

impl Entry {
    fn matches(&self, ctx: &Context) -> bool {
        match &self.filter {
            Some(filter) => filter.evaluate(ctx),
            None => true,
        }
    }

    fn label(&self) -> String {
        match &self.filter {
            Some(filter) => format!("{filter:?}"),
            None => "any".to_string(),
        }
    }
}

/// The pair of ordered handler registries.
#[derive(Default)]
pub struct Registry {
    message: Vec<Entry>,
    interaction: Vec<Entry>,
}

impl Registry {
    /// Creates an empty registry pair.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a message handler.
    ///
    /// Fails with [`RegistryError::FilterConflict`] when `options` carries
    /// both a prebuilt filter and convenience options. The handler itself is
    /// stored as given; registration never alters it.
    pub fn on_message<F, T>(&mut self, options: MessageOptions, handler: F) -> RegistryResult<()>
    where
        F: Handler<T>,
        T: 'static,
    {
        let filter = options.into_filter()?;
        self.message.push(Entry {
            filter,
            handler: into_handler(handler),
        });
        Ok(())
    }

    /// Registers a callback-interaction handler.
    ///
    /// `filters` are combined with AND; an empty sequence matches every
    /// interaction update.
    pub fn on_callback<F, T>(&mut self, filters: impl IntoIterator<Item = Filter>, handler: F)
    where
        F: Handler<T>,
        T: 'static,
    {
        self.interaction.push(Entry {
            filter: Filter::all(filters),
            handler: into_handler(handler),
        });
    }

    /// Registers a callback handler matched on interaction data.
    ///
    /// `pattern` follows the same policy as [`filters::pattern`], applied to
    /// the callback query's data.
    pub fn on_callback_data<F, T>(&mut self, pattern: impl Into<String>, handler: F)
    where
        F: Handler<T>,
        T: 'static,
    {
        self.interaction.push(Entry {
            filter: Some(filters::callback_data_pattern(pattern)),
            handler: into_handler(handler),
        });
    }

    /// Registers a pre-checkout handler.
    ///
    /// Joins the interaction registry with the pre-checkout filter combined
    /// into any supplied `filters`.
    pub fn on_pre_checkout<F, T>(&mut self, filters: impl IntoIterator<Item = Filter>, handler: F)
    where
        F: Handler<T>,
        T: 'static,
    {
        let filter = filters
            .into_iter()
            .fold(filters::pre_checkout_query(), Filter::and);
        self.interaction.push(Entry {
            filter: Some(filter),
            handler: into_handler(handler),
        });
    }

    /// Returns the number of message registrations.
    pub fn message_count(&self) -> usize {
        self.message.len()
    }

    /// Returns the number of interaction registrations.
    pub fn interaction_count(&self) -> usize {
        self.interaction.len()
    }

    /// Selects the first matching message handler.
    pub(crate) fn select_message(&self, ctx: &Context) -> Option<(String, BoxedHandler)> {
        Self::select(&self.message, ctx)
    }

    /// Selects the first matching interaction handler.
    pub(crate) fn select_interaction(&self, ctx: &Context) -> Option<(String, BoxedHandler)> {
        Self::select(&self.interaction, ctx)
    }

    fn select(entries: &[Entry], ctx: &Context) -> Option<(String, BoxedHandler)> {
        entries
            .iter()
            .find(|entry| entry.matches(ctx))
            .map(|entry| (entry.label(), entry.handler.clone()))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("message_count", &self.message.len())
            .field("interaction_count", &self.interaction.len())
            .finish()
    }
}
