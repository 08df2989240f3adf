//! Param processing.
//!
//! Every cascade step hands the incoming params and the subscription's
//! [`SubscriberConfig`] to a [`ParamProcessor`], which returns the params the
//! handler will see or a [`ValidationError`].

use crate::{error::ValidationError, params::Params};
use std::{fmt, sync::Arc};

/// Validates and optionally coerces a params value.
///
/// The schema language is up to the implementor. Closures of the form
/// `Fn(P) -> Result<P, ValidationError>` implement this trait.
pub trait Schema<P: Params>: Send + Sync + 'static {
    /// Validate `params`, returning the (possibly coerced) value.
    fn validate(&self, params: P) -> Result<P, ValidationError>;
}

impl<P, F> Schema<P> for F
where
    P: Params,
    F: Fn(P) -> Result<P, ValidationError> + Send + Sync + 'static,
{
    fn validate(&self, params: P) -> Result<P, ValidationError> {
        (self)(params)
    }
}

/// Per-subscription configuration passed to the param processor.
///
/// Both fields default to `None`, meaning params pass through untouched.
pub struct SubscriberConfig<P: Params> {
    /// Params merged under the supplied params.
    pub default_params: Option<P>,
    /// Schema the merged params are validated against.
    pub schema: Option<Arc<dyn Schema<P>>>,
}

impl<P: Params> SubscriberConfig<P> {
    /// An empty configuration.
    pub fn new() -> Self {
        Self {
            default_params: None,
            schema: None,
        }
    }

    /// Set the default params.
    pub fn with_defaults(mut self, defaults: P) -> Self {
        self.default_params = Some(defaults);
        self
    }

    /// Set the schema.
    pub fn with_schema<S: Schema<P>>(mut self, schema: S) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }
}

impl<P: Params> Default for SubscriberConfig<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Params> Clone for SubscriberConfig<P> {
    fn clone(&self) -> Self {
        Self {
            default_params: self.default_params.clone(),
            schema: self.schema.clone(),
        }
    }
}

impl<P: Params + fmt::Debug> fmt::Debug for SubscriberConfig<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberConfig")
            .field("default_params", &self.default_params)
            .field("schema", &self.schema.as_ref().map(|_| "<schema>"))
            .finish()
    }
}

/// The adapter invoked once per subscriber before its handler runs.
pub trait ParamProcessor<P: Params>: Send + Sync + 'static {
    /// Produce the params a subscriber's handler will see.
    fn process(&self, params: P, config: &SubscriberConfig<P>) -> Result<P, ValidationError>;
}

impl<P, F> ParamProcessor<P> for F
where
    P: Params,
    F: Fn(P, &SubscriberConfig<P>) -> Result<P, ValidationError> + Send + Sync + 'static,
{
    fn process(&self, params: P, config: &SubscriberConfig<P>) -> Result<P, ValidationError> {
        (self)(params, config)
    }
}
