//! # ripple-std
//!
//! Standard implementations for the Ripple event dispatcher.
//!
//! This crate provides:
//! - **Subscription storage**: [`SubscriberRegistry`], [`EventIndex`],
//!   [`EventTree`] and the [`Store`] keeping them consistent
//! - **Execution**: the cascade [`Executor`] over a [`Chain`] snapshot
//! - **Lifecycle**: the default [`EventEmitter`]
//! - **Params**: the default [`StandardProcessor`]
//! - **Standard hooks**: Logging, Timeout
//! - **Testing helpers**: [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use ripple_core;

// Modules
pub mod cascade;
pub mod emitter;
pub mod hooks;
pub mod matcher;
pub mod processor;
pub mod registry;
pub mod store;
pub mod testing;
pub mod tree;

pub use cascade::{Chain, Executor, map_params};
pub use emitter::EventEmitter;
pub use matcher::EventIndex;
pub use processor::StandardProcessor;
pub use registry::{SubscriberId, SubscriberRegistry};
pub use store::Store;
pub use tree::EventTree;
