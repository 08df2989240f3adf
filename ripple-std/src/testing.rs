//! Testing utilities for Ripple.
//!
//! This module provides helpers to observe cascades and lifecycle notices
//! from tests.
//!
//! # Features
//!
//! - [`CallLog`]: records the order in which handlers ran
//! - [`CountingHandler`]: a forwarding handler that counts invocations
//! - [`RecordingListener`]: a lifecycle listener that records what it saw

use parking_lot::Mutex;
use ripple_core::{
    BoxError, Done, Handler, HandlerRef, Invocation, Notice, NoticeListener, Params, Reply, Scope,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

// ============================================================================
// Call Log
// ============================================================================

/// A shared log of handler tags in call order.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// dispatcher.subscribe("greet", log.forwarding("first"))?;
/// dispatcher.subscribe("greet", log.forwarding("second"))?;
///
/// dispatcher.dispatch("greet", params)?.await?;
/// assert_eq!(log.entries(), ["second", "first"]);
/// ```
#[derive(Clone, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `tag`.
    pub fn record(&self, tag: impl Into<String>) {
        self.entries.lock().push(tag.into());
    }

    /// A handler that records `tag` and continues the cascade.
    pub fn forwarding<P: Params>(&self, tag: &str) -> HandlerRef<P> {
        let log = self.clone();
        let tag = tag.to_owned();
        HandlerRef::from_fn(move |invocation: Invocation<P>, _done| {
            log.record(tag.as_str());
            Ok(Reply::Defer(invocation.forward()))
        })
    }

    /// A handler that records `tag` and settles with `value`.
    pub fn replying<P: Params>(&self, tag: &str, value: P) -> HandlerRef<P> {
        let log = self.clone();
        let tag = tag.to_owned();
        HandlerRef::from_fn(move |_invocation: Invocation<P>, _done| {
            log.record(tag.as_str());
            Ok(Reply::Value(value.clone()))
        })
    }

    /// Snapshot of the recorded tags.
    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Forget every recorded tag.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

// ============================================================================
// Counting Handler
// ============================================================================

/// A handler that counts invocations and forwards the params unchanged.
///
/// Clones share the count. Each [`HandlerRef`] built from a clone is a
/// distinct subscriber.
#[derive(Clone, Default)]
pub struct CountingHandler {
    count: Arc<AtomicUsize>,
}

impl CountingHandler {
    /// Create a new counting handler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<P: Params> Handler<P> for CountingHandler {
    fn call(&self, invocation: Invocation<P>, _done: Done<P>) -> Result<Reply<P>, BoxError> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(Reply::Defer(invocation.forward()))
    }
}

// ============================================================================
// Recording Listener
// ============================================================================

/// Records lifecycle notices as short labels.
///
/// Labels are the notice kind (`subscribed`, `unsubscribed`, `error`,
/// `before`, `after`, `signal`) followed by the event name where the notice
/// carries one, e.g. `before:greet`. Error notices also keep their message,
/// available through [`errors`](Self::errors).
#[derive(Clone, Default)]
pub struct RecordingListener {
    labels: Arc<Mutex<Vec<String>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl RecordingListener {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// A listener feeding this recorder.
    pub fn listener<P: Params>(&self) -> NoticeListener<P> {
        let recorder = self.clone();
        Arc::new(move |notice: &Notice<'_, P>, _scope: &dyn Scope<P>| {
            recorder.record(notice);
        })
    }

    fn record<P: Params>(&self, notice: &Notice<'_, P>) {
        let label = match notice {
            Notice::Subscribed { event, .. } => format!("subscribed:{event}"),
            Notice::Unsubscribed { event, .. } => format!("unsubscribed:{event}"),
            Notice::Error(err) => {
                self.errors.lock().push(err.to_string());
                "error".to_owned()
            }
            Notice::Before { event, .. } => format!("before:{event}"),
            Notice::After { event, .. } => format!("after:{event}"),
            Notice::Signal(_) => "signal".to_owned(),
        };
        self.labels.lock().push(label);
    }

    /// Recorded labels in arrival order.
    pub fn labels(&self) -> Vec<String> {
        self.labels.lock().clone()
    }

    /// Messages of the recorded error notices.
    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().clone()
    }

    /// Number of recorded notices.
    pub fn count(&self) -> usize {
        self.labels.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cascade::{Chain, Executor},
        emitter::EventEmitter,
        processor::StandardProcessor,
    };
    use ripple_core::{Cascade, DispatchError, Emitter, EventKey, Methods, Subscriber, before_event};

    struct NoScope;

    impl Scope<u32> for NoScope {
        fn dispatch(&self, event: EventKey, _params: u32) -> Result<Cascade<u32>, DispatchError> {
            Err(DispatchError::UnsupportedDispatchTarget(event.to_string()))
        }

        fn lookup(&self, _path: &str) -> Methods<u32> {
            Methods::new()
        }
    }

    #[tokio::test]
    async fn call_log_and_counter_observe_a_cascade() {
        let log = CallLog::new();
        let counter = CountingHandler::new();
        let chain = Chain::new(vec![
            Subscriber::new(log.forwarding("outer"), None),
            Subscriber::new(HandlerRef::new(counter.clone()), None),
            Subscriber::new(log.replying("inner", 9), None),
        ]);
        let executor = Executor::<u32>::new(
            Arc::new(StandardProcessor),
            Arc::new(EventEmitter::new()),
            Arc::new(NoScope),
        );

        assert_eq!(executor.run(chain, 1).await.unwrap(), 9);
        assert_eq!(log.entries(), ["outer", "inner"]);
        assert_eq!(counter.count(), 1);

        log.clear();
        counter.reset();
        assert!(log.entries().is_empty());
        assert_eq!(counter.count(), 0);
    }

    #[test]
    fn recorder_labels_notices() {
        let emitter = EventEmitter::<u32>::new();
        let recorder = RecordingListener::new();
        emitter.on(&before_event("greet"), recorder.listener());
        emitter.on("error", recorder.listener());

        emitter.emit(
            &before_event("greet"),
            &Notice::Before {
                event: "greet",
                params: &1,
            },
            &NoScope,
        );
        let err = DispatchError::DoubleCompletion;
        emitter.emit("error", &Notice::Error(&err), &NoScope);

        assert_eq!(recorder.labels(), ["before:greet", "error"]);
        assert_eq!(recorder.errors(), ["completion callback already called"]);
        assert_eq!(recorder.count(), 2);
    }
}
