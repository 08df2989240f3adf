//! Deadline for cascades.

use futures::FutureExt;
use ripple_core::{Cascade, DispatchError, Params};
use std::time::Duration;
use tokio::time::timeout;

/// Extension bounding a [`Cascade`] by a deadline.
///
/// A cascade whose handler never completes never settles; wrapping it turns
/// the stall into [`DispatchError::Timeout`].
pub trait CascadeExt<P> {
    /// Fail with [`DispatchError::Timeout`] if not settled within `duration`.
    fn timeout(self, duration: Duration) -> Cascade<P>;
}

impl<P: Params> CascadeExt<P> for Cascade<P> {
    fn timeout(self, duration: Duration) -> Cascade<P> {
        async move {
            match timeout(duration, self).await {
                Ok(result) => result,
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    {
                        tracing::warn!(?duration, "cascade timed out");
                    }
                    Err(DispatchError::Timeout(duration))
                }
            }
        }
        .boxed()
    }
}
