//! Subscriber registry.
//!
//! Stores every registered `(handler, config)` pair once. Tables refer to
//! subscribers by [`SubscriberId`]; ids are slot positions and are never
//! reused, so an id held by one table can't start pointing at another
//! subscriber after a removal elsewhere.

use ripple_core::{HandlerRef, Params, Subscriber, SubscriberIdentity};
use std::collections::HashMap;

/// Stable handle of a registry slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub(crate) usize);

impl SubscriberId {
    /// The slot position.
    pub fn index(self) -> usize {
        self.0
    }
}

struct Slot<P: Params> {
    subscriber: Subscriber<P>,
    refs: usize,
}

/// Reference-counted storage of subscribers.
pub struct SubscriberRegistry<P: Params> {
    slots: Vec<Option<Slot<P>>>,
    identities: HashMap<SubscriberIdentity, SubscriberId>,
}

impl<P: Params> SubscriberRegistry<P> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            identities: HashMap::new(),
        }
    }

    /// Register `subscriber`, or reuse the slot of an identical pair.
    ///
    /// Every call takes one reference on the returned slot.
    pub fn add(&mut self, subscriber: Subscriber<P>) -> SubscriberId {
        let identity = subscriber.identity();
        if let Some(&id) = self.identities.get(&identity) {
            if let Some(slot) = self.slots.get_mut(id.0).and_then(Option::as_mut) {
                slot.refs += 1;
                return id;
            }
        }

        let id = SubscriberId(self.slots.len());
        self.slots.push(Some(Slot {
            subscriber,
            refs: 1,
        }));
        self.identities.insert(identity, id);
        id
    }

    /// Drop one reference; the slot is freed when none remain.
    ///
    /// Returns `true` if the slot was freed.
    pub fn release(&mut self, id: SubscriberId) -> bool {
        let Some(entry) = self.slots.get_mut(id.0) else {
            return false;
        };
        let Some(slot) = entry.as_mut() else {
            return false;
        };

        slot.refs -= 1;
        if slot.refs > 0 {
            return false;
        }

        let identity = slot.subscriber.identity();
        *entry = None;
        self.identities.remove(&identity);
        true
    }

    /// The subscriber in slot `id`, if still registered.
    pub fn get(&self, id: SubscriberId) -> Option<&Subscriber<P>> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .map(|slot| &slot.subscriber)
    }

    /// Returns `true` if slot `id` holds `handler`.
    pub fn holds_handler(&self, id: SubscriberId, handler: &HandlerRef<P>) -> bool {
        self.get(id)
            .is_some_and(|subscriber| subscriber.handler.ptr_eq(handler))
    }

    /// Number of live subscribers.
    pub fn len(&self) -> usize {
        self.identities.len()
    }

    /// Returns `true` if no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

impl<P: Params> Default for SubscriberRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ripple_core::{Reply, SubscriberConfig};
    use std::sync::Arc;

    fn handler() -> HandlerRef<i32> {
        HandlerRef::from_fn(|_cx, _done| Ok(Reply::Pending))
    }

    #[test]
    fn identical_pairs_share_a_slot() {
        let mut registry = SubscriberRegistry::new();
        let h = handler();

        let first = registry.add(Subscriber::new(h.clone(), None));
        let second = registry.add(Subscriber::new(h.clone(), None));
        assert_eq!(first, second);
        assert_eq!(registry.len(), 1);

        let config = Arc::new(SubscriberConfig::new().with_defaults(1));
        let third = registry.add(Subscriber::new(h, Some(config)));
        assert_ne!(first, third);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn slots_are_freed_after_last_release() {
        let mut registry = SubscriberRegistry::new();
        let h = handler();
        let id = registry.add(Subscriber::new(h.clone(), None));
        registry.add(Subscriber::new(h.clone(), None));

        assert!(!registry.release(id));
        assert!(registry.holds_handler(id, &h));
        assert!(registry.release(id));
        assert!(registry.get(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn ids_are_not_reused() {
        let mut registry = SubscriberRegistry::new();
        let first = registry.add(Subscriber::new(handler(), None));
        registry.release(first);
        let second = registry.add(Subscriber::new(handler(), None));
        assert_ne!(first, second);
        assert_eq!(second.index(), 1);
    }
}
