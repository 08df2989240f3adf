//! # Lifecycle Notifications
//!
//! The dispatcher reports what happens to it through a plain publish/subscribe
//! primitive, the [`Emitter`]. Notifications are not part of any cascade:
//! listeners observe, they cannot change params or results.
//!
//! | Name            | Notice                     |
//! |-----------------|----------------------------|
//! | `subscribed`    | [`Notice::Subscribed`]     |
//! | `unsubscribed`  | [`Notice::Unsubscribed`]   |
//! | `error`         | [`Notice::Error`]          |
//! | `before:<name>` | [`Notice::Before`]         |
//! | `after:<name>`  | [`Notice::After`]          |
//! | anything else   | [`Notice::Signal`]         |

use crate::{
    error::DispatchError,
    event::EventKey,
    handler::{HandlerRef, Subscriber},
    params::Params,
    scope::Scope,
};
use std::{fmt, sync::Arc};

/// Name of the notification emitted after a successful subscribe.
pub const SUBSCRIBED: &str = "subscribed";
/// Name of the notification emitted after every unsubscribe.
pub const UNSUBSCRIBED: &str = "unsubscribed";
/// Name of the notification carrying cascade failures.
pub const ERROR: &str = "error";

/// Name of the notification emitted before `event` cascades.
pub fn before_event(event: &str) -> String {
    format!("before:{event}")
}

/// Name of the notification emitted after `event` cascaded successfully.
pub fn after_event(event: &str) -> String {
    format!("after:{event}")
}

/// Payload of a lifecycle notification.
pub enum Notice<'a, P: Params> {
    /// A subscriber was registered.
    Subscribed {
        /// The normalized event key.
        event: &'a EventKey,
        /// The registered pair.
        subscriber: &'a Subscriber<P>,
    },
    /// An unsubscribe was requested.
    Unsubscribed {
        /// The normalized event key.
        event: &'a EventKey,
        /// The handler to remove, or `None` for the whole entry.
        handler: Option<&'a HandlerRef<P>>,
    },
    /// A cascade step failed.
    Error(&'a DispatchError),
    /// An event is about to cascade.
    Before {
        /// The dispatched event name.
        event: &'a str,
        /// The dispatched params.
        params: &'a P,
    },
    /// An event cascaded successfully.
    After {
        /// The dispatched event name.
        event: &'a str,
        /// The cascade result.
        result: &'a P,
    },
    /// A user emission.
    Signal(&'a P),
}

impl<P: Params> Notice<'_, P> {
    /// The params value carried by `Before`, `After` and `Signal` notices.
    pub fn params(&self) -> Option<&P> {
        match self {
            Notice::Before { params, .. } => Some(*params),
            Notice::After { result, .. } => Some(*result),
            Notice::Signal(params) => Some(*params),
            _ => None,
        }
    }

    /// The error carried by an `Error` notice.
    pub fn error(&self) -> Option<&DispatchError> {
        match self {
            Notice::Error(err) => Some(*err),
            _ => None,
        }
    }
}

impl<P: Params + fmt::Debug> fmt::Debug for Notice<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Subscribed { event, subscriber } => f
                .debug_struct("Subscribed")
                .field("event", &event.to_string())
                .field("subscriber", subscriber)
                .finish(),
            Notice::Unsubscribed { event, handler } => f
                .debug_struct("Unsubscribed")
                .field("event", &event.to_string())
                .field("handler", handler)
                .finish(),
            Notice::Error(err) => f.debug_tuple("Error").field(err).finish(),
            Notice::Before { event, params } => f
                .debug_struct("Before")
                .field("event", event)
                .field("params", params)
                .finish(),
            Notice::After { event, result } => f
                .debug_struct("After")
                .field("event", event)
                .field("result", result)
                .finish(),
            Notice::Signal(params) => f.debug_tuple("Signal").field(params).finish(),
        }
    }
}

/// A lifecycle listener. The scope allows re-entrant dispatch and lookup.
pub type NoticeListener<P> = Arc<dyn Fn(&Notice<'_, P>, &dyn Scope<P>) + Send + Sync>;

/// The publish/subscribe primitive used for lifecycle notifications.
pub trait Emitter<P: Params>: Send + Sync + 'static {
    /// Register `listener` for notifications named `name`.
    fn on(&self, name: &str, listener: NoticeListener<P>);

    /// Deliver `notice` to every listener of `name`, in registration order.
    ///
    /// Returns `true` if at least one listener was called.
    fn emit(&self, name: &str, notice: &Notice<'_, P>, scope: &dyn Scope<P>) -> bool;
}
