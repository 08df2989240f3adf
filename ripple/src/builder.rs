//! Dispatcher configuration.

use crate::dispatcher::{Dispatcher, Inner};
use parking_lot::Mutex;
use ripple_core::{DEFAULT_DELIMITER, Emitter, ParamProcessor, Params};
use ripple_std::{EventEmitter, StandardProcessor, Store, hooks::LoggingHook};
use std::sync::Arc;

type EmitterFactory<P> = Box<dyn FnOnce() -> Arc<dyn Emitter<P>>>;

/// Builder for constructing a [`Dispatcher`].
///
/// | Option           | Default                 |
/// |------------------|-------------------------|
/// | `delimiter`      | `"."`                   |
/// | `create_emitter` | [`EventEmitter::new`]   |
/// | `processor`      | [`StandardProcessor`]   |
/// | `log_lifecycle`  | off                     |
pub struct DispatcherBuilder<P: Params> {
    delimiter: String,
    create_emitter: Option<EmitterFactory<P>>,
    processor: Arc<dyn ParamProcessor<P>>,
    log_lifecycle: bool,
}

impl<P: Params> Default for DispatcherBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Params> DispatcherBuilder<P> {
    /// Create a builder with every option at its default.
    pub fn new() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_owned(),
            create_emitter: None,
            processor: Arc::new(StandardProcessor),
            log_lifecycle: false,
        }
    }

    /// Set the delimiter joining and splitting event name segments.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Use the emitter returned by `factory` for lifecycle notices.
    ///
    /// The factory runs once, in [`build`](Self::build).
    pub fn create_emitter<E, F>(mut self, factory: F) -> Self
    where
        E: Emitter<P>,
        F: FnOnce() -> E + 'static,
    {
        self.create_emitter = Some(Box::new(move || Arc::new(factory()) as Arc<dyn Emitter<P>>));
        self
    }

    /// Use `processor` to turn raw params into each subscriber's params.
    pub fn processor<T: ParamProcessor<P>>(mut self, processor: T) -> Self {
        self.processor = Arc::new(processor);
        self
    }

    /// Attach [`LoggingHook`] to the lifecycle channels.
    pub fn log_lifecycle(mut self) -> Self {
        self.log_lifecycle = true;
        self
    }

    /// Build the dispatcher.
    pub fn build(self) -> Dispatcher<P> {
        let emitter = match self.create_emitter {
            Some(factory) => factory(),
            None => Arc::new(EventEmitter::new()),
        };
        if self.log_lifecycle {
            LoggingHook::attach(emitter.as_ref());
        }

        Dispatcher::from_inner(Inner {
            store: Mutex::new(Store::new(self.delimiter)),
            emitter,
            processor: self.processor,
        })
    }
}
