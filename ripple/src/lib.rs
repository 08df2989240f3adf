//! # ripple - In-Process Event Dispatcher
//!
//! `ripple` lets independent subscribers register interest in named or
//! pattern-matched events. A dispatch drives the matching subscribers through
//! a sequential, abortable middleware chain (a *cascade*) that transforms a
//! shared params value and produces one asynchronous result.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ripple::prelude::*;
//!
//! let dispatcher = Dispatcher::<String>::new();
//!
//! // Subscribed first, runs last and settles.
//! dispatcher.subscribe("greet", HandlerRef::from_fn(|cx, _done| {
//!     Ok(Reply::Value(format!("Hello {}", cx.params)))
//! }))?;
//! // Subscribed last, runs first and delegates.
//! dispatcher.subscribe("greet", HandlerRef::from_fn(|cx, _done| {
//!     Ok(Reply::Defer(cx.next(format!("{}!", cx.params))))
//! }))?;
//!
//! assert_eq!(dispatcher.dispatch("greet", "World".into())?.await?, "Hello World!");
//! ```
//!
//! ## Ordering
//!
//! The most recently subscribed handler runs first. Pattern subscribers run
//! before exact-name subscribers of the same event.
//!
//! ## Completing a Step
//!
//! A handler returns [`Reply::Value`] to short-circuit, [`Reply::Defer`] to
//! settle with another cascade (usually `next`), or [`Reply::Pending`] to
//! settle later through its [`Done`] callback.
//!
//! ## Lifecycle
//!
//! `subscribed`, `unsubscribed`, `error`, `before:<event>` and
//! `after:<event>` notices are published through the dispatcher's emitter;
//! see [`Dispatcher::on`].

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod builder;
mod dispatcher;

pub use builder::DispatcherBuilder;
pub use dispatcher::{Dispatcher, Unsubscribe};

pub use ripple_core::{
    // Errors
    BoxError,
    // Completion
    Cascade,
    DispatchError,
    Done,
    // Lifecycle
    ERROR,
    Emitter,
    // Events
    EventKey,
    // Handlers
    Handler,
    HandlerRef,
    Invocation,
    // Scope
    Method,
    Methods,
    Notice,
    NoticeListener,
    // Params
    ParamProcessor,
    Params,
    Reply,
    SUBSCRIBED,
    Schema,
    Scope,
    SubscribeError,
    SubscriberConfig,
    UNSUBSCRIBED,
    ValidationError,
};

pub use ripple_std::{EventEmitter, StandardProcessor, map_params};

/// Standard hook implementations.
pub mod hooks {
    #![allow(clippy::wildcard_imports)]
    pub use ripple_std::hooks::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use ripple_std::testing::*;
}

/// Prelude module - common imports for Ripple.
///
/// # Usage
///
/// ```rust,ignore
/// use ripple::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        // Completion
        Cascade,
        DispatchError,
        // Dispatcher
        Dispatcher,
        Done,
        EventKey,
        // Handlers
        HandlerRef,
        Invocation,
        Notice,
        Reply,
        Scope,
        SubscribeError,
        SubscriberConfig,
        ValidationError,
    };
}
