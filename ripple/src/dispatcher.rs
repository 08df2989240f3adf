//! # Dispatcher
//!
//! The public face of Ripple. A [`Dispatcher`] owns one subscription store
//! and one lifecycle emitter, and wires them to the cascade executor:
//!
//! ```text
//! subscribe ──► Store (registry + index + tree) ──► `subscribed`
//! dispatch  ──► Store::resolve ──► `before:<event>` ──► Executor ──► `after:<event>`
//! lookup    ──► EventTree children ──► Method (dispatch-bound)
//! ```
//!
//! The store lock is only held while the tables change or a snapshot is
//! taken. Handlers and listeners always run without it, so they may
//! subscribe, unsubscribe and dispatch re-entrantly.

use crate::builder::DispatcherBuilder;
use futures::FutureExt;
use parking_lot::Mutex;
use ripple_core::{
    Cascade, DispatchError, Emitter, EventKey, HandlerRef, Method, Methods, Notice, ParamProcessor,
    Params, SUBSCRIBED, Scope, SubscribeError, Subscriber, SubscriberConfig, UNSUBSCRIBED,
    after_event, before_event,
};
use ripple_std::{Chain, Executor, Store};
use std::{collections::BTreeMap, fmt, sync::Arc};

pub(crate) struct Inner<P: Params> {
    pub(crate) store: Mutex<Store<P>>,
    pub(crate) emitter: Arc<dyn Emitter<P>>,
    pub(crate) processor: Arc<dyn ParamProcessor<P>>,
}

/// An in-process event dispatcher.
///
/// Cloning is cheap; clones share the same subscriptions and listeners.
///
/// # Example
///
/// ```rust,ignore
/// let dispatcher = Dispatcher::<String>::new();
/// dispatcher.subscribe(
///     "greet",
///     HandlerRef::from_fn(|cx, _done| Ok(Reply::Value(format!("Hello {}", cx.params)))),
/// )?;
/// dispatcher.subscribe(
///     "greet",
///     HandlerRef::from_fn(|cx, _done| Ok(Reply::Defer(cx.next(format!("{}!", cx.params))))),
/// )?;
///
/// let greeting = dispatcher.dispatch("greet", "World".into())?.await?;
/// assert_eq!(greeting, "Hello World!");
/// ```
pub struct Dispatcher<P: Params> {
    inner: Arc<Inner<P>>,
}

impl<P: Params> Dispatcher<P> {
    /// A dispatcher with the default delimiter, emitter and processor.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Start configuring a dispatcher.
    pub fn builder() -> DispatcherBuilder<P> {
        DispatcherBuilder::new()
    }

    pub(crate) fn from_inner(inner: Inner<P>) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// The segment delimiter.
    pub fn delimiter(&self) -> String {
        self.inner.store.lock().delimiter().to_owned()
    }

    // ------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------

    /// Subscribe `handler` to `event` without a config.
    pub fn subscribe(
        &self,
        event: impl Into<EventKey>,
        handler: HandlerRef<P>,
    ) -> Result<(), SubscribeError> {
        self.register(event.into(), Subscriber::new(handler, None))
    }

    /// Subscribe `handler` to `event` with `config`.
    ///
    /// The config is part of the subscriber's identity: subscribing the same
    /// handler with the same `Arc` again is a no-op, with another config it
    /// is a second subscription.
    pub fn subscribe_with(
        &self,
        event: impl Into<EventKey>,
        handler: HandlerRef<P>,
        config: Arc<SubscriberConfig<P>>,
    ) -> Result<(), SubscribeError> {
        self.register(event.into(), Subscriber::new(handler, Some(config)))
    }

    fn register(&self, event: EventKey, subscriber: Subscriber<P>) -> Result<(), SubscribeError> {
        let event = {
            let mut store = self.inner.store.lock();
            let event = store.normalize(event);
            store.subscribe(&event, subscriber.clone())?;
            event
        };

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(%event, handler = subscriber.handler.address(), "subscribed");
        }

        self.inner.emitter.emit(
            SUBSCRIBED,
            &Notice::Subscribed {
                event: &event,
                subscriber: &subscriber,
            },
            self,
        );
        Ok(())
    }

    /// Subscribe every `(method, handler)` pair under `prefix`.
    ///
    /// Each method is subscribed as `<prefix><delimiter><method>`, or as the
    /// bare method name when `prefix` is empty. Returns one [`Unsubscribe`]
    /// handle per method. Stops at the first failing entry; entries before it
    /// stay subscribed.
    pub fn subscribe_map<K>(
        &self,
        prefix: &str,
        entries: impl IntoIterator<Item = (K, HandlerRef<P>)>,
    ) -> Result<BTreeMap<String, Unsubscribe<P>>, SubscribeError>
    where
        K: Into<String>,
    {
        let mut handles = BTreeMap::new();
        for (method, handler) in entries {
            let method = method.into();
            let event = EventKey::Name(self.join(prefix, &method));
            self.subscribe(event.clone(), handler.clone())?;
            handles.insert(
                method,
                Unsubscribe {
                    dispatcher: self.clone(),
                    event,
                    handler,
                },
            );
        }
        Ok(handles)
    }

    /// Remove subscriptions from `event`.
    ///
    /// Without a handler every subscription of `event` goes; with one only
    /// that handler's subscriptions of `event` go. Unknown events and
    /// handlers are ignored. Always emits `unsubscribed`. Returns the number
    /// of removed subscriptions.
    pub fn unsubscribe(
        &self,
        event: impl Into<EventKey>,
        handler: Option<&HandlerRef<P>>,
    ) -> usize {
        let (event, removed) = {
            let mut store = self.inner.store.lock();
            let event = store.normalize(event.into());
            let removed = store.unsubscribe(&event, handler);
            (event, removed)
        };

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(%event, removed, "unsubscribed");
        }

        self.inner.emitter.emit(
            UNSUBSCRIBED,
            &Notice::Unsubscribed {
                event: &event,
                handler,
            },
            self,
        );
        removed
    }

    /// Number of distinct registered `(handler, config)` pairs.
    pub fn subscriber_count(&self) -> usize {
        self.inner.store.lock().subscriber_count()
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Cascade `params` through every subscriber matching `event`.
    ///
    /// Fails immediately with [`DispatchError::UnsupportedDispatchTarget`]
    /// for patterns and empty names. Otherwise emits `before:<event>`, runs
    /// the first subscriber right away and returns the rest of the cascade
    /// as a future, which emits `after:<event>` on success.
    pub fn dispatch(
        &self,
        event: impl Into<EventKey>,
        params: P,
    ) -> Result<Cascade<P>, DispatchError> {
        let (name, chain) = {
            let store = self.inner.store.lock();
            let name = match store.normalize(event.into()) {
                EventKey::Name(name) if !name.is_empty() => name,
                other => return Err(DispatchError::UnsupportedDispatchTarget(other.to_string())),
            };
            let chain = Chain::new(store.resolve(&name));
            (name, chain)
        };

        #[cfg(feature = "tracing")]
        {
            tracing::debug!(event = %name, subscribers = chain.remaining(), "dispatching");
        }

        self.inner.emitter.emit(
            &before_event(&name),
            &Notice::Before {
                event: &name,
                params: &params,
            },
            self,
        );

        let executor = Executor::new(
            self.inner.processor.clone(),
            self.inner.emitter.clone(),
            Arc::new(self.clone()),
        );
        let cascade = executor.run(chain, params);

        let dispatcher = self.clone();
        Ok(async move {
            let result = cascade.await?;
            dispatcher.inner.emitter.emit(
                &after_event(&name),
                &Notice::After {
                    event: &name,
                    result: &result,
                },
                &dispatcher,
            );
            Ok(result)
        }
        .boxed())
    }

    /// Dispatch-bound methods for the direct children of `path`.
    ///
    /// `lookup("a.b")` after subscribing `a.b.c` yields a method `c` that
    /// dispatches `a.b.c`. The empty path lists the top-level names.
    pub fn lookup(&self, path: &str) -> Methods<P> {
        let children: Vec<(String, String)> = {
            let store = self.inner.store.lock();
            store
                .children(path)
                .into_iter()
                .map(|child| {
                    let event = store.join(path, &child);
                    (child, event)
                })
                .collect()
        };
        let scope: Arc<dyn Scope<P>> = Arc::new(self.clone());
        children
            .into_iter()
            .map(|(child, event)| (child, Method::new(event, scope.clone())))
            .collect()
    }

    fn join(&self, prefix: &str, name: &str) -> String {
        self.inner.store.lock().join(prefix, name)
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Listen on lifecycle channel `name`.
    pub fn on<F>(&self, name: &str, listener: F)
    where
        F: Fn(&Notice<'_, P>, &dyn Scope<P>) + Send + Sync + 'static,
    {
        self.inner.emitter.on(name, Arc::new(listener));
    }

    /// Listen for `event` being dispatched, before its cascade runs.
    pub fn before<F>(&self, event: &str, listener: F)
    where
        F: Fn(&Notice<'_, P>, &dyn Scope<P>) + Send + Sync + 'static,
    {
        self.on(&before_event(event), listener);
    }

    /// Listen for `event`'s cascade succeeding.
    pub fn after<F>(&self, event: &str, listener: F)
    where
        F: Fn(&Notice<'_, P>, &dyn Scope<P>) + Send + Sync + 'static,
    {
        self.on(&after_event(event), listener);
    }

    /// Publish `params` on channel `name`. Returns `true` if anyone listened.
    pub fn emit(&self, name: &str, params: &P) -> bool {
        self.inner.emitter.emit(name, &Notice::Signal(params), self)
    }
}

impl<P: Params> Default for Dispatcher<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Params> Clone for Dispatcher<P> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<P: Params> fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("delimiter", &self.delimiter())
            .field("subscribers", &self.subscriber_count())
            .finish_non_exhaustive()
    }
}

impl<P: Params> Scope<P> for Dispatcher<P> {
    fn dispatch(&self, event: EventKey, params: P) -> Result<Cascade<P>, DispatchError> {
        Dispatcher::dispatch(self, event, params)
    }

    fn lookup(&self, path: &str) -> Methods<P> {
        Dispatcher::lookup(self, path)
    }
}

/// Handle removing one `subscribe_map` entry.
pub struct Unsubscribe<P: Params> {
    dispatcher: Dispatcher<P>,
    event: EventKey,
    handler: HandlerRef<P>,
}

impl<P: Params> Unsubscribe<P> {
    /// The event this handle unsubscribes from.
    pub fn event(&self) -> &EventKey {
        &self.event
    }

    /// Remove the subscription. Returns the number of removed entries.
    pub fn unsubscribe(&self) -> usize {
        self.dispatcher
            .unsubscribe(self.event.clone(), Some(&self.handler))
    }
}

impl<P: Params> fmt::Debug for Unsubscribe<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("event", &self.event.to_string())
            .finish_non_exhaustive()
    }
}
