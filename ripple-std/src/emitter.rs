//! Default lifecycle emitter.

use parking_lot::RwLock;
use ripple_core::{Emitter, Notice, NoticeListener, Params, Scope};
#[cfg(feature = "tracing")]
use ripple_core::ERROR;
use std::collections::HashMap;

/// In-memory publish/subscribe emitter.
///
/// Listeners run synchronously, in registration order, on the emitting
/// thread. The listener list is copied before the first call, so a listener
/// may register further listeners (or dispatch) without deadlocking.
pub struct EventEmitter<P: Params> {
    listeners: RwLock<HashMap<String, Vec<NoticeListener<P>>>>,
}

impl<P: Params> EventEmitter<P> {
    /// Create an emitter without listeners.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(HashMap::new()),
        }
    }

    /// Number of listeners registered for `name`.
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.read().get(name).map_or(0, Vec::len)
    }
}

impl<P: Params> Default for EventEmitter<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Params> Emitter<P> for EventEmitter<P> {
    fn on(&self, name: &str, listener: NoticeListener<P>) {
        self.listeners
            .write()
            .entry(name.to_owned())
            .or_default()
            .push(listener);
    }

    fn emit(&self, name: &str, notice: &Notice<'_, P>, scope: &dyn Scope<P>) -> bool {
        let listeners = self.listeners.read().get(name).cloned();
        let Some(listeners) = listeners.filter(|l| !l.is_empty()) else {
            #[cfg(feature = "tracing")]
            warn_unhandled(name, notice);
            return false;
        };

        for listener in listeners {
            listener(notice, scope);
        }
        true
    }
}

#[cfg(feature = "tracing")]
fn warn_unhandled<P: Params>(name: &str, notice: &Notice<'_, P>) {
    if name != ERROR {
        return;
    }
    if let Some(err) = notice.error() {
        tracing::warn!(error = %err, "unhandled dispatch error");
    }
}
