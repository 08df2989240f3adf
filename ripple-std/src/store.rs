//! Subscription store.
//!
//! Ties the [`SubscriberRegistry`], the [`EventIndex`] and the [`EventTree`]
//! together and keeps them consistent:
//!
//! - every id in the index holds exactly one registry reference;
//! - every exact entry in the index has a leaf in the tree.

use crate::{
    matcher::EventIndex,
    registry::{SubscriberId, SubscriberRegistry},
    tree::{self, EventTree},
};
use ripple_core::{
    DEFAULT_DELIMITER, EventKey, HandlerRef, Params, SubscribeError, Subscriber, is_reserved,
};

/// Registry, matcher tables and event tree of one dispatcher.
pub struct Store<P: Params> {
    delimiter: String,
    subscribers: SubscriberRegistry<P>,
    index: EventIndex,
    tree: EventTree,
}

impl<P: Params> Store<P> {
    /// Create an empty store splitting names on `delimiter`.
    pub fn new(delimiter: impl Into<String>) -> Self {
        Self {
            delimiter: delimiter.into(),
            subscribers: SubscriberRegistry::new(),
            index: EventIndex::new(),
            tree: EventTree::new(),
        }
    }

    /// The segment delimiter.
    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    /// `<prefix><delimiter><name>`, or `name` alone when `prefix` is empty.
    pub fn join(&self, prefix: &str, name: &str) -> String {
        if prefix.is_empty() {
            name.to_owned()
        } else {
            format!("{prefix}{}{name}", self.delimiter)
        }
    }

    /// Join segment keys with the delimiter.
    pub fn normalize(&self, key: EventKey) -> EventKey {
        key.normalize(&self.delimiter)
    }

    /// Register `subscriber` for `key`.
    ///
    /// Subscribing an identical pair to the same key again changes nothing
    /// and returns the existing id.
    pub fn subscribe(
        &mut self,
        key: &EventKey,
        subscriber: Subscriber<P>,
    ) -> Result<SubscriberId, SubscribeError> {
        match key {
            EventKey::Segments(_) => {
                let key = self.normalize(key.clone());
                self.subscribe(&key, subscriber)
            }
            EventKey::Name(name) => {
                if name.is_empty() {
                    return Err(SubscribeError::UnsupportedEventType(name.clone()));
                }
                if is_reserved(name) {
                    return Err(SubscribeError::ForbiddenEvent(name.clone()));
                }

                let id = self.subscribers.add(subscriber);
                if self.index.insert_exact(name, id) {
                    self.tree.insert(tree::split(name, &self.delimiter));
                } else {
                    self.subscribers.release(id);
                }
                Ok(id)
            }
            EventKey::Pattern(regex) => {
                let id = self.subscribers.add(subscriber);
                if !self.index.insert_pattern(regex, id) {
                    self.subscribers.release(id);
                }
                Ok(id)
            }
        }
    }

    /// Remove subscriptions from `key`.
    ///
    /// Without a handler the whole entry goes; with one, only ids of `key`
    /// holding that handler go. Returns the number of removed subscriptions.
    pub fn unsubscribe(&mut self, key: &EventKey, handler: Option<&HandlerRef<P>>) -> usize {
        if let EventKey::Segments(_) = key {
            let key = self.normalize(key.clone());
            return self.unsubscribe(&key, handler);
        }

        let subscribers = &self.subscribers;
        let keep = |id: SubscriberId| match handler {
            Some(handler) => !subscribers.holds_handler(id, handler),
            None => false,
        };

        let removed = match key {
            EventKey::Segments(_) => Vec::new(),
            EventKey::Name(name) => {
                let removed = self.index.remove_exact(name, keep);
                if !self.index.contains_exact(name) {
                    self.tree.remove(&tree::split(name, &self.delimiter));
                }
                removed
            }
            EventKey::Pattern(regex) => self.index.remove_pattern(regex.as_str(), keep),
        };

        for id in &removed {
            self.subscribers.release(*id);
        }
        removed.len()
    }

    /// Snapshot of the subscribers to run for `name`, in dispatch order.
    pub fn resolve(&self, name: &str) -> Vec<Subscriber<P>> {
        self.index
            .resolve(name)
            .into_iter()
            .filter_map(|id| self.subscribers.get(id).cloned())
            .collect()
    }

    /// Direct children of `path` in the event tree.
    pub fn children(&self, path: &str) -> Vec<String> {
        self.tree.children(&tree::split(path, &self.delimiter))
    }

    /// Number of distinct registered `(handler, config)` pairs.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<P: Params> Default for Store<P> {
    fn default() -> Self {
        Self::new(DEFAULT_DELIMITER)
    }
}
