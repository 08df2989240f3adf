//! Error types for Ripple.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`SubscribeError`] - Raised synchronously while registering subscribers
//! - [`DispatchError`] - Raised by `dispatch` or carried by a failed cascade
//! - [`ValidationError`] - Raised by schemas and param processors

use std::time::Duration;
use thiserror::Error;

use crate::event::RESERVED_EVENTS;

/// A boxed error type for handler-supplied failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned while subscribing.
#[derive(Error, Debug)]
pub enum SubscribeError {
    /// The event key cannot name anything (empty name or empty segment list).
    #[error("can't handle event {0:?}: event names must not be empty")]
    UnsupportedEventType(String),

    /// The event name is reserved for lifecycle notifications.
    #[error("forbidden event: {0} ({reserved})", reserved = RESERVED_EVENTS.join(","))]
    ForbiddenEvent(String),

    /// A pattern source failed to compile.
    #[error("invalid event pattern")]
    InvalidPattern(#[from] regex::Error),
}

/// Errors produced while dispatching an event.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Only literal, non-empty event names can be dispatched.
    #[error("you can only dispatch literal event names (got {0})")]
    UnsupportedDispatchTarget(String),

    /// The param processor rejected the params of a subscriber.
    #[error("params rejected: {0}")]
    ParamValidation(#[from] ValidationError),

    /// A handler failed, either by returning an error or by rejecting its
    /// completion callback.
    #[error("handler error: {0}")]
    Handler(#[source] BoxError),

    /// A handler or the param processor panicked.
    #[error("handler panicked: {0}")]
    Panic(String),

    /// A cascade step was completed more than once.
    #[error("completion callback already called")]
    DoubleCompletion,

    /// The cascade did not settle in time.
    #[error("cascade timed out after {0:?}")]
    Timeout(Duration),
}

impl DispatchError {
    /// The error a handler failed with, if this is a handler failure.
    pub fn handler_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            DispatchError::Handler(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<BoxError> for DispatchError {
    fn from(err: BoxError) -> Self {
        DispatchError::Handler(err)
    }
}

/// A params value failed validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{message}", path_prefix(.path))]
pub struct ValidationError {
    message: String,
    path: Option<String>,
}

fn path_prefix(path: &Option<String>) -> String {
    path.as_deref().map(|p| format!("{p}: ")).unwrap_or_default()
}

impl ValidationError {
    /// Create a validation error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: None,
        }
    }

    /// Attach the offending field path.
    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the offending field path, if any.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }
}
