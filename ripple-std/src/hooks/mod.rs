//! Standard lifecycle hooks.
//!
//! - [`LoggingHook`]: traces subscriptions, unsubscriptions and errors.
//! - [`CascadeExt`]: bounds a cascade by a deadline (`timeout` feature).

mod logging;
#[cfg(feature = "timeout")]
mod timeout;

pub use logging::LoggingHook;
#[cfg(feature = "timeout")]
pub use timeout::CascadeExt;
