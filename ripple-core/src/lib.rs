//! # ripple-core
//!
//! Core types for the Ripple event dispatcher.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! plugins that only need to write handlers, schemas or emitters, without
//! pulling in the standard registry and executor from `ripple-std`.
//!
//! # Building Blocks
//!
//! ## Params ([`Params`])
//!
//! The value dispatched to an event, handed from subscriber to subscriber and
//! finally returned as the dispatch result. The `serde_json` feature
//! implements it for `serde_json::Value`, merging object defaults key by key.
//!
//! ## Event keys ([`EventKey`])
//!
//! Literal names, delimiter-joined segments, or regular expressions.
//!
//! ## Handlers ([`Handler`], [`HandlerRef`], [`Subscriber`])
//!
//! The unit of work in a cascade. A handler sees an [`Invocation`] and a
//! [`Done`] callback and answers with a [`Reply`].
//!
//! ## Completion ([`Step`], [`Done`], [`Reply`])
//!
//! The single-settlement protocol unifying synchronous replies and deferred
//! completion.
//!
//! ## Param processing ([`ParamProcessor`], [`SubscriberConfig`], [`Schema`])
//!
//! Runs before each handler with the subscription's configuration.
//!
//! ## Lifecycle ([`Emitter`], [`Notice`])
//!
//! Observability channel for `subscribed`, `unsubscribed`, `error`,
//! `before:<event>` and `after:<event>`.
//!
//! ## Re-entrancy ([`Scope`], [`Method`])
//!
//! Object-safe access to `dispatch` and `lookup` from inside handlers and
//! listeners.
//!
//! # Error Types
//!
//! - [`SubscribeError`] - Registration errors
//! - [`DispatchError`] - Dispatch and cascade errors
//! - [`ValidationError`] - Param validation errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod completion;
mod emitter;
mod error;
mod event;
mod handler;
mod params;
mod processor;
mod scope;

// Re-exports
pub use completion::{Cascade, Done, ErrorSink, Reply, Step};
pub use emitter::{
    ERROR, Emitter, Notice, NoticeListener, SUBSCRIBED, UNSUBSCRIBED, after_event, before_event,
};
pub use error::{BoxError, DispatchError, SubscribeError, ValidationError};
pub use event::{DEFAULT_DELIMITER, EventKey, RESERVED_EVENTS, is_reserved};
pub use handler::{Handler, HandlerRef, Invocation, Next, Subscriber, SubscriberIdentity};
pub use params::Params;
pub use processor::{ParamProcessor, Schema, SubscriberConfig};
pub use scope::{Method, Methods, Scope};
