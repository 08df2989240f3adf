//! Logging hook for lifecycle observation.

use ripple_core::{
    ERROR, Emitter, Notice, NoticeListener, Params, SUBSCRIBED, Scope, UNSUBSCRIBED,
};
use std::sync::Arc;

/// Logs registry changes and cascade errors through `tracing`.
///
/// Without the `tracing` feature the hook still attaches but logs nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHook;

impl LoggingHook {
    /// Register the hook's listener on the `subscribed`, `unsubscribed` and
    /// `error` channels of `emitter`.
    pub fn attach<P: Params>(emitter: &dyn Emitter<P>) {
        let listener = Self::listener::<P>();
        for name in [SUBSCRIBED, UNSUBSCRIBED, ERROR] {
            emitter.on(name, listener.clone());
        }
    }

    /// The listener on its own.
    pub fn listener<P: Params>() -> NoticeListener<P> {
        Arc::new(|notice: &Notice<'_, P>, _scope: &dyn Scope<P>| log(notice))
    }
}

fn log<P: Params>(notice: &Notice<'_, P>) {
    #[cfg(feature = "tracing")]
    {
        match notice {
            Notice::Subscribed { event, subscriber } => {
                tracing::debug!(
                    %event,
                    handler = subscriber.handler.address(),
                    configured = subscriber.config.is_some(),
                    "subscribed"
                );
            }
            Notice::Unsubscribed { event, handler } => {
                tracing::debug!(
                    %event,
                    handler = handler.map(|h| h.address()),
                    "unsubscribed"
                );
            }
            Notice::Error(err) => {
                tracing::error!(error = %err, "dispatch failed");
            }
            _ => {}
        }
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = notice; // Nothing to log to
    }
}
