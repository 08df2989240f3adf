//! # Handlers and Subscribers
//!
//! A [`Handler`] is the unit of work a subscriber contributes to a cascade.
//! It receives an [`Invocation`] (the processed params plus `next`,
//! `dispatch` and `lookup`) and a [`Done`] completion callback.
//!
//! # Completing
//!
//! - Return `Ok(Reply::Value(v))` to settle immediately and skip the rest of
//!   the chain.
//! - Return `Ok(Reply::Defer(invocation.next(p)))` to delegate to the rest of
//!   the chain, usually with replaced params.
//! - Return `Ok(Reply::Pending)` and call [`Done::resolve`] or
//!   [`Done::reject`] later.
//! - Return `Err(e)` to fail the dispatch.
//!
//! # Identity
//!
//! Handlers are shared through [`HandlerRef`]; two refs are the same handler
//! when they point at the same allocation. Subscribing the same
//! `(handler, config)` pair twice reuses the existing registry slot.

use crate::{
    completion::{Cascade, Done, Reply},
    error::{BoxError, DispatchError},
    event::EventKey,
    params::Params,
    processor::SubscriberConfig,
    scope::{Methods, Scope},
};
use std::{fmt, sync::Arc};

/// A cascade participant.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Handler` for params `{P}`",
    label = "missing `Handler<{P}>` implementation",
    note = "Handlers take `(Invocation<{P}>, Done<{P}>)` and return `Result<Reply<{P}>, BoxError>`."
)]
pub trait Handler<P: Params>: Send + Sync + 'static {
    /// Run this handler for one cascade step.
    fn call(&self, invocation: Invocation<P>, done: Done<P>) -> Result<Reply<P>, BoxError>;
}

// Blanket impl for closures
impl<P, F> Handler<P> for F
where
    P: Params,
    F: Fn(Invocation<P>, Done<P>) -> Result<Reply<P>, BoxError> + Send + Sync + 'static,
{
    fn call(&self, invocation: Invocation<P>, done: Done<P>) -> Result<Reply<P>, BoxError> {
        (self)(invocation, done)
    }
}

/// Continuation running the remainder of a cascade.
pub type Next<P> = Arc<dyn Fn(P) -> Cascade<P> + Send + Sync>;

/// Everything a handler can see and do during one cascade step.
pub struct Invocation<P: Params> {
    /// The params after processing.
    pub params: P,
    next: Next<P>,
    scope: Arc<dyn Scope<P>>,
}

impl<P: Params> Invocation<P> {
    /// Build an invocation for one step.
    pub fn new(params: P, next: Next<P>, scope: Arc<dyn Scope<P>>) -> Self {
        Self {
            params,
            next,
            scope,
        }
    }

    /// Run the rest of the chain with `params`.
    ///
    /// Each call is an independent cascade over the same remaining
    /// subscribers.
    pub fn next(&self, params: P) -> Cascade<P> {
        (self.next)(params)
    }

    /// Run the rest of the chain with the current params.
    pub fn forward(&self) -> Cascade<P> {
        self.next(self.params.clone())
    }

    /// Dispatch another event on the same dispatcher.
    pub fn dispatch(
        &self,
        event: impl Into<EventKey>,
        params: P,
    ) -> Result<Cascade<P>, DispatchError> {
        self.scope.dispatch(event.into(), params)
    }

    /// Look up methods nested under `path` on the same dispatcher.
    pub fn lookup(&self, path: &str) -> Methods<P> {
        self.scope.lookup(path)
    }

    /// The dispatcher this invocation belongs to.
    pub fn scope(&self) -> &Arc<dyn Scope<P>> {
        &self.scope
    }
}

/// A shared, identity-comparable handler.
pub struct HandlerRef<P: Params>(Arc<dyn Handler<P>>);

impl<P: Params> HandlerRef<P> {
    /// Wrap a handler.
    pub fn new<H: Handler<P>>(handler: H) -> Self {
        Self(Arc::new(handler))
    }

    /// Wrap a closure. Unlike [`HandlerRef::new`], closure argument types are
    /// inferred.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Invocation<P>, Done<P>) -> Result<Reply<P>, BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Wrap an already shared handler.
    pub fn from_arc(handler: Arc<dyn Handler<P>>) -> Self {
        Self(handler)
    }

    /// Run the handler.
    pub fn call(&self, invocation: Invocation<P>, done: Done<P>) -> Result<Reply<P>, BoxError> {
        self.0.call(invocation, done)
    }

    /// Returns `true` if both refs point at the same handler.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }

    /// Address of the shared handler, used as its identity.
    pub fn address(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }
}

impl<P: Params> Clone for HandlerRef<P> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<P: Params> fmt::Debug for HandlerRef<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerRef({:#x})", self.address())
    }
}

/// Identity of a `(handler, config)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberIdentity {
    handler: usize,
    config: Option<usize>,
}

/// A registered `(handler, config)` pair.
pub struct Subscriber<P: Params> {
    /// The handler run for this subscription.
    pub handler: HandlerRef<P>,
    /// Configuration for the param processor. `None` behaves like
    /// [`SubscriberConfig::default`].
    pub config: Option<Arc<SubscriberConfig<P>>>,
}

impl<P: Params> Subscriber<P> {
    /// Pair a handler with an optional configuration.
    pub fn new(handler: HandlerRef<P>, config: Option<Arc<SubscriberConfig<P>>>) -> Self {
        Self { handler, config }
    }

    /// The identity used for de-duplication.
    pub fn identity(&self) -> SubscriberIdentity {
        SubscriberIdentity {
            handler: self.handler.address(),
            config: self
                .config
                .as_ref()
                .map(|config| Arc::as_ptr(config) as usize),
        }
    }
}

impl<P: Params> Clone for Subscriber<P> {
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            config: self.config.clone(),
        }
    }
}

impl<P: Params> fmt::Debug for Subscriber<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("handler", &self.handler)
            .field("configured", &self.config.is_some())
            .finish()
    }
}
