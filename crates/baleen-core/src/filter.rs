//! Composable match rules for updates.
//!
//! A [`Filter`] decides whether a registered handler applies to an update.
//! Filters form a small expression tree: leaves carry a named predicate over
//! the [`Context`], inner nodes combine subtrees with `and` / `or` / `not`.
//! The tree shape keeps composition explicit and printable, which pays off
//! when a registration does not fire and you want to see why.
//!
//! # Example
//!
//! ```rust,ignore
//! use baleen_core::filters;
//!
//! let rule = filters::command("start").and(filters::private());
//! let fallback = filters::text().and(filters::command("start").not());
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::warn;

use crate::context::Context;

/// A type-erased filter predicate.
pub type Predicate = Arc<dyn Fn(&Context) -> bool + Send + Sync>;

/// A match rule over updates.
///
/// Build leaves with [`Filter::leaf`] or the named constructors in
/// [`filters`](crate::filters), then combine them. Combinators consume their
/// operands and build fresh nodes; clone a filter to reuse it in several
/// registrations.
#[derive(Clone)]
pub enum Filter {
    /// A named predicate.
    Leaf {
        /// Display name used in logs, e.g. `command(start)`.
        name: String,
        /// The predicate itself.
        predicate: Predicate,
    },
    /// Matches when both subtrees match.
    And(Box<Filter>, Box<Filter>),
    /// Matches when either subtree matches.
    Or(Box<Filter>, Box<Filter>),
    /// Matches when the subtree does not.
    Not(Box<Filter>),
}

impl Filter {
    /// Creates a leaf filter from a named predicate.
    pub fn leaf(
        name: impl Into<String>,
        predicate: impl Fn(&Context) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self::Leaf {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Combines two filters; the result matches when both do.
    pub fn and(self, other: Filter) -> Self {
        Self::And(Box::new(self), Box::new(other))
    }

    /// Combines two filters; the result matches when either does.
    pub fn or(self, other: Filter) -> Self {
        Self::Or(Box::new(self), Box::new(other))
    }

    /// Inverts a filter.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluates the filter against a context.
    ///
    /// Evaluation is total: a panicking leaf predicate counts as "no match"
    /// and is logged, it never unwinds into the dispatcher. `And` and `Or`
    /// short-circuit left to right.
    pub fn evaluate(&self, ctx: &Context) -> bool {
        match self {
            Self::Leaf { name, predicate } => {
                match catch_unwind(AssertUnwindSafe(|| predicate(ctx))) {
                    Ok(matched) => matched,
                    Err(_) => {
                        warn!(filter = %name, "Filter predicate panicked, treating as no match");
                        false
                    }
                }
            }
            Self::And(lhs, rhs) => lhs.evaluate(ctx) && rhs.evaluate(ctx),
            Self::Or(lhs, rhs) => lhs.evaluate(ctx) || rhs.evaluate(ctx),
            Self::Not(inner) => !inner.evaluate(ctx),
        }
    }

    /// Folds a sequence of filters into one conjunction.
    ///
    /// Returns `None` for an empty sequence.
    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Option<Self> {
        filters.into_iter().reduce(Filter::and)
    }
}

impl std::fmt::Debug for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Leaf { name, .. } => write!(f, "{name}"),
            Self::And(lhs, rhs) => write!(f, "({lhs:?} & {rhs:?})"),
            Self::Or(lhs, rhs) => write!(f, "({lhs:?} | {rhs:?})"),
            Self::Not(inner) => write!(f, "!{inner:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::message_context;

    fn always(value: bool) -> Filter {
        Filter::leaf(if value { "yes" } else { "no" }, move |_| value)
    }

    #[test]
    fn test_combinators_match_boolean_logic() {
        let ctx = message_context("hi");
        for lhs in [false, true] {
            for rhs in [false, true] {
                assert_eq!(always(lhs).and(always(rhs)).evaluate(&ctx), lhs && rhs);
                assert_eq!(always(lhs).or(always(rhs)).evaluate(&ctx), lhs || rhs);
            }
            assert_eq!(always(lhs).not().evaluate(&ctx), !lhs);
        }
    }

    #[test]
    fn test_combinators_do_not_mutate_operands() {
        let ctx = message_context("hi");
        let base = always(true);
        let _combined = base.clone().and(always(false));
        assert!(base.evaluate(&ctx));
    }

    #[test]
    fn test_panicking_predicate_is_no_match() {
        let ctx = message_context("hi");
        let exploding = Filter::leaf("boom", |_| panic!("predicate bug"));
        assert!(!exploding.evaluate(&ctx));
        assert!(exploding.clone().not().evaluate(&ctx));
        assert!(exploding.or(always(true)).evaluate(&ctx));
    }

    #[test]
    fn test_and_short_circuits() {
        let ctx = message_context("hi");
        let exploding = Filter::leaf("boom", |_| panic!("must not run"));
        // A panic in the right operand would flip the result to false.
        assert!(!always(false).and(exploding.clone()).evaluate(&ctx));
        assert!(always(true).or(exploding).evaluate(&ctx));
    }

    #[test]
    fn test_all_folds_to_conjunction() {
        let ctx = message_context("hi");
        assert!(Filter::all([]).is_none());
        assert!(
            Filter::all([always(true), always(true), always(true)])
                .is_some_and(|filter| filter.evaluate(&ctx))
        );
        assert!(
            !Filter::all([always(true), always(false)])
                .is_some_and(|filter| filter.evaluate(&ctx))
        );
    }

    #[test]
    fn test_debug_rendering() {
        let filter = always(true).and(always(false).not());
        assert_eq!(format!("{filter:?}"), "(yes & !no)");
    }
}
