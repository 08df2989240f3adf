//! Re-entrant access to a dispatcher.
//!
//! Handlers and lifecycle listeners receive a [`Scope`] so they can dispatch
//! further events or look up event namespaces without holding the dispatcher
//! itself.

use crate::{completion::Cascade, error::DispatchError, event::EventKey, params::Params};
use std::{collections::BTreeMap, fmt, sync::Arc};

/// Object-safe view of a dispatcher.
pub trait Scope<P: Params>: Send + Sync + 'static {
    /// Dispatch `event` with `params`.
    ///
    /// Fails synchronously with [`DispatchError::UnsupportedDispatchTarget`]
    /// for patterns and empty names.
    fn dispatch(&self, event: EventKey, params: P) -> Result<Cascade<P>, DispatchError>;

    /// Callable methods directly nested under `path`.
    fn lookup(&self, path: &str) -> Methods<P>;
}

/// Methods found by [`Scope::lookup`], keyed by method name.
pub type Methods<P> = BTreeMap<String, Method<P>>;

/// A dispatch bound to one fully qualified event name.
pub struct Method<P: Params> {
    event: String,
    scope: Arc<dyn Scope<P>>,
}

impl<P: Params> Method<P> {
    /// Bind `event` to `scope`.
    pub fn new(event: impl Into<String>, scope: Arc<dyn Scope<P>>) -> Self {
        Self {
            event: event.into(),
            scope,
        }
    }

    /// The event this method dispatches.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Dispatch the bound event with `params`.
    pub fn call(&self, params: P) -> Result<Cascade<P>, DispatchError> {
        self.scope
            .dispatch(EventKey::Name(self.event.clone()), params)
    }
}

impl<P: Params> Clone for Method<P> {
    fn clone(&self) -> Self {
        Self {
            event: self.event.clone(),
            scope: self.scope.clone(),
        }
    }
}

impl<P: Params> fmt::Debug for Method<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method").field("event", &self.event).finish()
    }
}
