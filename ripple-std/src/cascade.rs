//! # Cascade Executor
//!
//! Drives a snapshot of subscribers front to back:
//!
//! 1. An empty chain resolves with the params unchanged.
//! 2. Otherwise the first subscriber's params go through the
//!    [`ParamProcessor`]; a rejection fails the cascade.
//! 3. The handler runs with an [`Invocation`] whose `next` cascades the rest
//!    of the chain, and a [`Done`](ripple_core::Done) callback.
//! 4. The step settles through the completion protocol in
//!    [`ripple_core::Step`].
//!
//! Handler errors, rejections and panics are reported on the `error`
//! lifecycle channel and fail the cascade.

use ripple_core::{
    Cascade, DispatchError, ERROR, Emitter, ErrorSink, HandlerRef, Invocation, Next, Notice,
    ParamProcessor, Params, Reply, Scope, Step, Subscriber, SubscriberConfig,
};
use futures::{FutureExt, future};
use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// An immutable snapshot of subscribers with a cursor.
pub struct Chain<P: Params> {
    subscribers: Arc<[Subscriber<P>]>,
    cursor: usize,
}

impl<P: Params> Chain<P> {
    /// Snapshot `subscribers`.
    pub fn new(subscribers: Vec<Subscriber<P>>) -> Self {
        Self {
            subscribers: subscribers.into(),
            cursor: 0,
        }
    }

    /// Number of subscribers left to run.
    pub fn remaining(&self) -> usize {
        self.subscribers.len().saturating_sub(self.cursor)
    }

    /// The next subscriber and the chain after it.
    fn split_first(&self) -> Option<(Subscriber<P>, Chain<P>)> {
        let subscriber = self.subscribers.get(self.cursor)?.clone();
        let rest = Chain {
            subscribers: self.subscribers.clone(),
            cursor: self.cursor + 1,
        };
        Some((subscriber, rest))
    }
}

impl<P: Params> Clone for Chain<P> {
    fn clone(&self) -> Self {
        Self {
            subscribers: self.subscribers.clone(),
            cursor: self.cursor,
        }
    }
}

/// Runs chains for one dispatcher.
pub struct Executor<P: Params> {
    processor: Arc<dyn ParamProcessor<P>>,
    emitter: Arc<dyn Emitter<P>>,
    scope: Arc<dyn Scope<P>>,
}

impl<P: Params> Executor<P> {
    /// Create an executor. `scope` is what handlers and listeners re-enter.
    pub fn new(
        processor: Arc<dyn ParamProcessor<P>>,
        emitter: Arc<dyn Emitter<P>>,
        scope: Arc<dyn Scope<P>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            processor,
            emitter,
            scope,
        })
    }

    /// Cascade `params` through `chain`.
    pub fn run(self: &Arc<Self>, chain: Chain<P>, params: P) -> Cascade<P> {
        let Some((subscriber, rest)) = chain.split_first() else {
            return future::ready(Ok(params)).boxed();
        };

        let (step, done, settled) = Step::open(self.error_sink());
        let reply = panic::catch_unwind(AssertUnwindSafe(|| {
            let params = match &subscriber.config {
                Some(config) => self.processor.process(params, config)?,
                None => self.processor.process(params, &SubscriberConfig::default())?,
            };

            let executor = Arc::clone(self);
            let next: Next<P> = Arc::new(move |params| executor.run(rest.clone(), params));
            let invocation = Invocation::new(params, next, self.scope.clone());
            subscriber
                .handler
                .call(invocation, done)
                .map_err(DispatchError::Handler)
        }))
        .unwrap_or_else(|payload| Err(DispatchError::Panic(panic_message(payload))));

        step.finish(reply);
        settled
    }

    fn error_sink(&self) -> ErrorSink {
        let emitter = self.emitter.clone();
        let scope = self.scope.clone();
        Arc::new(move |err: &DispatchError| {
            #[cfg(feature = "tracing")]
            {
                if matches!(err, DispatchError::DoubleCompletion) {
                    tracing::error!(error = %err, "handler completed a cascade step twice");
                } else {
                    tracing::debug!(error = %err, "cascade step failed");
                }
            }
            emitter.emit(ERROR, &Notice::Error(err), scope.as_ref());
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_owned())
}

/// Convenience for handlers that always delegate.
///
/// Wraps `f` so its returned params are passed on with `next`.
pub fn map_params<P, F>(f: F) -> HandlerRef<P>
where
    P: Params,
    F: Fn(P) -> P + Send + Sync + 'static,
{
    HandlerRef::from_fn(move |invocation: Invocation<P>, _done| {
        let params = f(invocation.params.clone());
        Ok(Reply::Defer(invocation.next(params)))
    })
}
