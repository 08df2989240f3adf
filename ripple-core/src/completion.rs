//! # Completion Protocol
//!
//! A cascade step settles exactly once. A handler settles its step either
//! synchronously, by returning a [`Reply`] other than [`Reply::Pending`], or
//! later, by consuming the [`Done`] callback it was given.
//!
//! # State Machine
//!
//! Each step owns one slot shared by the executor-side [`Step`] and the
//! handler-side [`Done`]:
//!
//! - **Calling**: the handler is running synchronously. A `Done` completion
//!   made now is *staged*; it only takes effect if the handler then returns
//!   `Reply::Pending`. A synchronous reply wins over a staged completion and
//!   the violation is reported as [`DispatchError::DoubleCompletion`].
//! - **Waiting**: the handler returned `Reply::Pending`; the next `Done`
//!   completion settles the step.
//! - **Settled**: further completions fail with `DoubleCompletion`.
//!
//! Errors settling a step (handler errors, rejections, validation failures)
//! are reported to the step's [`ErrorSink`] before the cascade fails.
//!
//! If the handler returns `Reply::Pending` and drops `Done` without
//! completing, the step never settles.

use crate::{
    error::{BoxError, DispatchError},
    params::Params,
};
use futures::{
    FutureExt,
    channel::oneshot,
    future::{self, BoxFuture},
};
use parking_lot::Mutex;
use std::{fmt, future::Future, sync::Arc};

/// The asynchronous result of a cascade (or of any part of one).
pub type Cascade<P> = BoxFuture<'static, Result<P, DispatchError>>;

/// Receives every error that settles a step, and protocol violations.
pub type ErrorSink = Arc<dyn Fn(&DispatchError) + Send + Sync>;

/// What a handler returns synchronously.
pub enum Reply<P> {
    /// Settle now with this value; later subscribers are skipped.
    Value(P),
    /// Settle with the eventual result of another cascade, usually
    /// [`Invocation::next`](crate::Invocation::next).
    Defer(Cascade<P>),
    /// The handler will settle through [`Done`].
    Pending,
}

impl<P: Params> Reply<P> {
    /// Settle with `value`.
    pub fn value(value: P) -> Self {
        Reply::Value(value)
    }

    /// Settle with the output of `future`.
    pub fn defer<F>(future: F) -> Self
    where
        F: Future<Output = Result<P, DispatchError>> + Send + 'static,
    {
        Reply::Defer(future.boxed())
    }

    /// Settle later through [`Done`].
    pub fn pending() -> Self {
        Reply::Pending
    }
}

impl<P> From<Cascade<P>> for Reply<P> {
    fn from(cascade: Cascade<P>) -> Self {
        Reply::Defer(cascade)
    }
}

impl<P> fmt::Debug for Reply<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Value(_) => f.write_str("Reply::Value(..)"),
            Reply::Defer(_) => f.write_str("Reply::Defer(..)"),
            Reply::Pending => f.write_str("Reply::Pending"),
        }
    }
}

struct Slot<P> {
    sender: Option<oneshot::Sender<Cascade<P>>>,
    calling: bool,
    settled: bool,
    staged: Option<Result<P, DispatchError>>,
}

/// Executor-side handle of a cascade step.
pub struct Step<P> {
    slot: Arc<Mutex<Slot<P>>>,
    sink: ErrorSink,
}

/// Completion callback handed to a handler.
///
/// Every completion method consumes the callback, so a handler can complete
/// through `Done` at most once. `Done` is `Send` and may be moved into a
/// spawned task.
pub struct Done<P> {
    slot: Arc<Mutex<Slot<P>>>,
    sink: ErrorSink,
}

impl<P: Params> Step<P> {
    /// Open a step in the *calling* state.
    ///
    /// Returns the executor handle, the callback for the handler, and the
    /// future that resolves once the step settles.
    pub fn open(sink: ErrorSink) -> (Step<P>, Done<P>, Cascade<P>) {
        let (sender, receiver) = oneshot::channel::<Cascade<P>>();
        let slot = Arc::new(Mutex::new(Slot {
            sender: Some(sender),
            calling: true,
            settled: false,
            staged: None,
        }));

        let settled = async move {
            match receiver.await {
                Ok(cascade) => cascade.await,
                Err(oneshot::Canceled) => future::pending().await,
            }
        }
        .boxed();

        let step = Step {
            slot: slot.clone(),
            sink: sink.clone(),
        };
        (step, Done { slot, sink }, settled)
    }

    /// Record how the handler returned and settle accordingly.
    pub fn finish(self, reply: Result<Reply<P>, DispatchError>) {
        let (sender, staged) = {
            let mut slot = self.slot.lock();
            slot.calling = false;
            let staged = slot.staged.take();
            if matches!(reply, Ok(Reply::Pending)) && staged.is_none() {
                return;
            }
            slot.settled = true;
            (slot.sender.take(), staged)
        };

        let cascade = match reply {
            Ok(Reply::Pending) => match staged {
                Some(outcome) => self.resolve_outcome(outcome),
                None => return,
            },
            Ok(Reply::Value(value)) => {
                if staged.is_some() {
                    (self.sink)(&DispatchError::DoubleCompletion);
                }
                future::ready(Ok(value)).boxed()
            }
            Ok(Reply::Defer(cascade)) => {
                if staged.is_some() {
                    (self.sink)(&DispatchError::DoubleCompletion);
                }
                cascade
            }
            Err(err) => self.resolve_outcome(Err(err)),
        };
        deliver(sender, cascade);
    }

    fn resolve_outcome(&self, outcome: Result<P, DispatchError>) -> Cascade<P> {
        if let Err(err) = &outcome {
            (self.sink)(err);
        }
        future::ready(outcome).boxed()
    }
}

impl<P: Params> Done<P> {
    /// Settle the step with `value`.
    pub fn resolve(self, value: P) -> Result<(), DispatchError> {
        self.complete(Ok(value))
    }

    /// Fail the step with `err`.
    pub fn reject(self, err: impl Into<BoxError>) -> Result<(), DispatchError> {
        self.complete(Err(err.into()))
    }

    /// Settle the step with `result`.
    ///
    /// Fails with [`DispatchError::DoubleCompletion`] if the handler already
    /// settled the step synchronously.
    pub fn complete(self, result: Result<P, BoxError>) -> Result<(), DispatchError> {
        let outcome = result.map_err(DispatchError::Handler);
        let sender = {
            let mut slot = self.slot.lock();
            if slot.settled {
                None
            } else if slot.calling {
                slot.staged = Some(outcome);
                return Ok(());
            } else {
                slot.settled = true;
                Some(slot.sender.take())
            }
        };

        match sender {
            Some(sender) => {
                if let Err(err) = &outcome {
                    (self.sink)(err);
                }
                deliver(sender, future::ready(outcome).boxed());
                Ok(())
            }
            None => {
                (self.sink)(&DispatchError::DoubleCompletion);
                Err(DispatchError::DoubleCompletion)
            }
        }
    }
}

impl<P> fmt::Debug for Done<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Done").finish_non_exhaustive()
    }
}

fn deliver<P>(sender: Option<oneshot::Sender<Cascade<P>>>, cascade: Cascade<P>) {
    if let Some(sender) = sender {
        // The receiver is gone when the dispatch future was dropped.
        let _ = sender.send(cascade);
    }
}
