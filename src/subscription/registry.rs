// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry mapping event kinds to consumer callbacks.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::event::EventKind;

use super::{Callback, ConsumerId};

/// Registry of consumer subscriptions.
///
/// Each (consumer, event kind) pair holds exactly one callback.
/// Subscribers of a kind are kept in subscription order; re-subscribing
/// replaces the callback without moving the consumer.
///
/// The registry is not synchronized on its own. The controller keeps it
/// behind the same lock as the device cache so that both are updated as a
/// unit within one dispatch.
///
/// # Examples
///
/// ```
/// use zwave_bridge::event::EventKind;
/// use zwave_bridge::subscription::{ConsumerId, SubscriptionRegistry, callback};
///
/// let mut registry = SubscriptionRegistry::new();
/// let id = ConsumerId::new("in-1");
///
/// registry.subscribe(id.clone(), EventKind::ValueChanged, callback(|_| Ok(())));
/// registry.subscribe(id.clone(), EventKind::NodeReady, callback(|_| Ok(())));
/// assert_eq!(registry.subscription_count(), 2);
///
/// assert_eq!(registry.unsubscribe(&id), 2);
/// assert!(registry.is_empty());
/// ```
#[derive(Default)]
pub struct SubscriptionRegistry {
    subscriptions: HashMap<EventKind, IndexMap<ConsumerId, Callback>>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback for a consumer and event kind.
    ///
    /// Returns `true` if an existing callback was replaced.
    pub fn subscribe(&mut self, consumer: ConsumerId, kind: EventKind, callback: Callback) -> bool {
        tracing::debug!(consumer = %consumer, kind = %kind, "Subscribing consumer");
        self.subscriptions
            .entry(kind)
            .or_default()
            .insert(consumer, callback)
            .is_some()
    }

    /// Removes a consumer from every event kind.
    ///
    /// Returns the number of subscriptions removed.
    pub fn unsubscribe(&mut self, consumer: &ConsumerId) -> usize {
        let mut removed = 0;
        for (kind, subscribers) in &mut self.subscriptions {
            if subscribers.shift_remove(consumer).is_some() {
                tracing::debug!(consumer = %consumer, kind = %kind, "Unsubscribed consumer");
                removed += 1;
            }
        }
        self.subscriptions.retain(|_, subscribers| !subscribers.is_empty());
        removed
    }

    /// Returns the subscribers of an event kind in subscription order.
    #[must_use]
    pub fn subscribers_for(&self, kind: EventKind) -> Vec<(ConsumerId, Callback)> {
        self.subscriptions
            .get(&kind)
            .map(|subscribers| {
                subscribers
                    .iter()
                    .map(|(id, callback)| (id.clone(), callback.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns the event kinds a consumer is subscribed to.
    #[must_use]
    pub fn kinds_for(&self, consumer: &ConsumerId) -> Vec<EventKind> {
        EventKind::ALL
            .into_iter()
            .filter(|kind| {
                self.subscriptions
                    .get(kind)
                    .is_some_and(|subscribers| subscribers.contains_key(consumer))
            })
            .collect()
    }

    /// Returns `true` if the consumer is subscribed to the event kind.
    #[must_use]
    pub fn is_subscribed(&self, consumer: &ConsumerId, kind: EventKind) -> bool {
        self.subscriptions
            .get(&kind)
            .is_some_and(|subscribers| subscribers.contains_key(consumer))
    }

    /// Returns the total number of (consumer, kind) subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.values().map(IndexMap::len).sum()
    }

    /// Returns `true` if there are no subscriptions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscription_count() == 0
    }

    /// Drops every subscription.
    pub fn clear(&mut self) {
        self.subscriptions.clear();
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("subscription_count", &self.subscription_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConsumerError;
    use crate::event::{EventPayload, Notification};
    use crate::subscription::callback;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn notification(kind: EventKind) -> Notification {
        Notification {
            kind,
            payload: EventPayload::Empty {},
            uid: None,
        }
    }

    fn counting(counter: &Arc<AtomicU32>) -> Callback {
        let counter = Arc::clone(counter);
        callback(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }

    fn deliver(registry: &SubscriptionRegistry, kind: EventKind) {
        let event = notification(kind);
        for (_, callback) in registry.subscribers_for(kind) {
            let _ = callback(&event);
        }
    }

    #[test]
    fn new_registry_is_empty() {
        let registry = SubscriptionRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.subscribers_for(EventKind::ValueChanged).is_empty());
    }

    #[test]
    fn resubscribe_replaces_callback() {
        let mut registry = SubscriptionRegistry::new();
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let id = ConsumerId::new("c");

        assert!(!registry.subscribe(id.clone(), EventKind::ValueChanged, counting(&first)));
        assert!(registry.subscribe(id.clone(), EventKind::ValueChanged, counting(&second)));

        deliver(&registry, EventKind::ValueChanged);

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        assert_eq!(registry.subscription_count(), 1);
    }

    #[test]
    fn subscribers_keep_insertion_order() {
        let mut registry = SubscriptionRegistry::new();
        for name in ["c", "a", "b"] {
            registry.subscribe(ConsumerId::new(name), EventKind::NodeReady, callback(|_| Ok(())));
        }
        // Replacing must not move "c" to the back.
        registry.subscribe(ConsumerId::new("c"), EventKind::NodeReady, callback(|_| Ok(())));

        let order: Vec<_> = registry
            .subscribers_for(EventKind::NodeReady)
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn unsubscribe_removes_every_kind() {
        let mut registry = SubscriptionRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        let id = ConsumerId::new("c");

        for kind in [EventKind::DriverReady, EventKind::NodeReady, EventKind::ValueChanged] {
            registry.subscribe(id.clone(), kind, counting(&counter));
        }
        registry.subscribe(ConsumerId::new("other"), EventKind::NodeReady, callback(|_| Ok(())));

        assert_eq!(registry.unsubscribe(&id), 3);
        assert!(registry.kinds_for(&id).is_empty());
        assert_eq!(registry.subscription_count(), 1);

        for kind in EventKind::ALL {
            deliver(&registry, kind);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn unsubscribe_unknown_consumer() {
        let mut registry = SubscriptionRegistry::new();
        assert_eq!(registry.unsubscribe(&ConsumerId::new("ghost")), 0);
    }

    #[test]
    fn kinds_for_lists_subscriptions() {
        let mut registry = SubscriptionRegistry::new();
        let id = ConsumerId::new("c");
        registry.subscribe(id.clone(), EventKind::ValueChanged, callback(|_| Ok(())));
        registry.subscribe(id.clone(), EventKind::DriverReady, callback(|_| Ok(())));

        assert_eq!(
            registry.kinds_for(&id),
            vec![EventKind::DriverReady, EventKind::ValueChanged]
        );
        assert!(registry.is_subscribed(&id, EventKind::DriverReady));
        assert!(!registry.is_subscribed(&id, EventKind::NodeAdded));
    }

    #[test]
    fn failing_callback_is_just_a_result() {
        let mut registry = SubscriptionRegistry::new();
        registry.subscribe(
            ConsumerId::new("bad"),
            EventKind::Notification,
            callback(|_| Err(ConsumerError::Rejected("boom".into()))),
        );

        let event = notification(EventKind::Notification);
        let results: Vec<_> = registry
            .subscribers_for(EventKind::Notification)
            .into_iter()
            .map(|(_, callback)| callback(&event))
            .collect();
        assert_eq!(results, vec![Err(ConsumerError::Rejected("boom".into()))]);
    }

    #[test]
    fn clear_drops_everything() {
        let mut registry = SubscriptionRegistry::new();
        registry.subscribe(ConsumerId::new("a"), EventKind::NodeAdded, callback(|_| Ok(())));
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn registry_debug() {
        let registry = SubscriptionRegistry::new();
        let debug = format!("{registry:?}");
        assert!(debug.contains("SubscriptionRegistry"));
        assert!(debug.contains("subscription_count"));
    }
}
