// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turns driver events into cache updates and notifications.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::cache::DeviceCache;
use crate::error::ConsumerError;
use crate::event::{
    DriverEvent, EventKind, EventPayload, IdentityToken, InstallationToken, Notification,
    controller_state_text, notification_text,
};
use crate::readiness::{DriverState, ReadinessGate};
use crate::subscription::{Callback, ConsumerId, SubscriptionRegistry};
use crate::types::{CommandClass, HomeId, NodeId, ValueId};

use super::{Delivery, DispatchReport, Skip};

/// The prepared dispatch of one driver event.
///
/// Produced by [`Dispatcher::apply`] while the dispatcher is locked; holds
/// a snapshot of the matching subscribers so that callbacks can run after
/// the lock is released.
pub struct Dispatch {
    kind: EventKind,
    notification: Option<Notification>,
    skip: Option<Skip>,
    targets: Vec<(ConsumerId, Callback)>,
    polls: Vec<(NodeId, CommandClass)>,
    state: Option<DriverState>,
}

impl Dispatch {
    fn skipped(kind: EventKind, skip: Skip) -> Self {
        Self {
            kind,
            notification: None,
            skip: Some(skip),
            targets: Vec::new(),
            polls: Vec::new(),
            state: None,
        }
    }

    /// Returns the event kind.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns the notification to deliver, unless the event was skipped.
    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Returns the subscribers the notification will reach.
    pub fn targets(&self) -> impl Iterator<Item = &ConsumerId> {
        self.targets.iter().map(|(id, _)| id)
    }

    /// Returns the polls to enable after delivery.
    #[must_use]
    pub fn polls(&self) -> &[(NodeId, CommandClass)] {
        &self.polls
    }

    /// Returns the new driver state, if the event changed it.
    #[must_use]
    pub fn state_change(&self) -> Option<DriverState> {
        self.state
    }

    /// Returns `true` if the event ends the session.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.kind == EventKind::DriverFailed
    }

    /// Invokes every target callback in subscription order.
    ///
    /// A failing or panicking callback is logged and recorded; the remaining
    /// subscribers are still invoked.
    #[must_use]
    pub fn deliver(&self) -> DispatchReport {
        let Some(notification) = &self.notification else {
            return DispatchReport::skipped(self.kind, self.skip.unwrap_or(Skip::AfterFailure));
        };

        let deliveries = self
            .targets
            .iter()
            .map(|(consumer, callback)| {
                let result = panic::catch_unwind(AssertUnwindSafe(|| callback(notification)))
                    .unwrap_or_else(|payload| {
                        Err(ConsumerError::Panicked(panic_message(&*payload)))
                    });
                match &result {
                    Ok(()) => {
                        tracing::trace!(consumer = %consumer, kind = %self.kind, "Delivered");
                    }
                    Err(e) => {
                        tracing::warn!(
                            consumer = %consumer,
                            kind = %self.kind,
                            error = %e,
                            "Consumer callback failed"
                        );
                    }
                }
                Delivery {
                    consumer: consumer.clone(),
                    result,
                }
            })
            .collect();

        DispatchReport::delivered(notification.clone(), deliveries)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

impl fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("kind", &self.kind)
            .field("skip", &self.skip)
            .field("target_count", &self.targets.len())
            .field("polls", &self.polls)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Owns the device cache, the subscription registry and the readiness gate.
///
/// The three are updated together within one dispatch, so they live in one
/// struct that the controller keeps behind a single lock.
///
/// # Examples
///
/// ```
/// use zwave_bridge::cache::Value;
/// use zwave_bridge::dispatch::Dispatcher;
/// use zwave_bridge::event::{DriverEvent, EventKind};
/// use zwave_bridge::subscription::{ConsumerId, callback};
/// use zwave_bridge::types::{CommandClass, NodeId, ValueId};
///
/// let mut dispatcher = Dispatcher::new(false, CommandClass::DEFAULT_POLL.to_vec());
/// dispatcher.subscribe(ConsumerId::new("c"), EventKind::ValueChanged, callback(|_| Ok(())));
///
/// let node = NodeId::new(5);
/// let id = ValueId::new(CommandClass::SWITCH_BINARY, 1, 0);
/// dispatcher.apply(DriverEvent::NodeAdded { node_id: node });
/// dispatcher.apply(DriverEvent::ValueAdded { node_id: node, value: Value::new(id, false) });
///
/// // The device is not ready yet, so the change is cached but not delivered.
/// let dispatch = dispatcher.apply(DriverEvent::ValueChanged { node_id: node, value: Value::new(id, true) });
/// assert!(dispatch.deliver().was_gated());
/// assert_eq!(dispatcher.cache().value(node, &id).unwrap().value.as_bool(), Some(true));
/// ```
pub struct Dispatcher {
    cache: DeviceCache,
    registry: SubscriptionRegistry,
    gate: ReadinessGate,
    home_id: Option<HomeId>,
    token: InstallationToken,
    poll_classes: Vec<CommandClass>,
}

impl Dispatcher {
    /// Creates a dispatcher with a fresh installation token.
    #[must_use]
    pub fn new(allow_unready_updates: bool, poll_classes: Vec<CommandClass>) -> Self {
        Self::with_token(InstallationToken::new(), allow_unready_updates, poll_classes)
    }

    /// Creates a dispatcher with the given installation token.
    #[must_use]
    pub fn with_token(
        token: InstallationToken,
        allow_unready_updates: bool,
        poll_classes: Vec<CommandClass>,
    ) -> Self {
        Self {
            cache: DeviceCache::new(),
            registry: SubscriptionRegistry::new(),
            gate: ReadinessGate::new(allow_unready_updates),
            home_id: None,
            token,
            poll_classes,
        }
    }

    /// Returns the device cache.
    #[must_use]
    pub fn cache(&self) -> &DeviceCache {
        &self.cache
    }

    /// Returns the subscription registry.
    #[must_use]
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Returns the readiness gate.
    #[must_use]
    pub fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    pub(crate) fn gate_mut(&mut self) -> &mut ReadinessGate {
        &mut self.gate
    }

    /// Returns the home id, once the driver is ready.
    #[must_use]
    pub fn home_id(&self) -> Option<HomeId> {
        self.home_id
    }

    /// Returns the installation token.
    #[must_use]
    pub fn token(&self) -> InstallationToken {
        self.token
    }

    /// Returns the identity token of a node in the current session.
    #[must_use]
    pub fn identity(&self, node_id: NodeId) -> IdentityToken {
        self.token.identity(self.home_id, node_id)
    }

    /// Returns the command classes polled on ready nodes.
    #[must_use]
    pub fn poll_classes(&self) -> &[CommandClass] {
        &self.poll_classes
    }

    /// Registers or replaces a subscription.
    ///
    /// Returns `true` if an existing callback was replaced.
    pub fn subscribe(&mut self, consumer: ConsumerId, kind: EventKind, callback: Callback) -> bool {
        self.registry.subscribe(consumer, kind, callback)
    }

    /// Removes a consumer from every event kind.
    pub fn unsubscribe(&mut self, consumer: &ConsumerId) -> usize {
        self.registry.unsubscribe(consumer)
    }

    /// Applies a driver event to the cache and prepares its delivery.
    pub fn apply(&mut self, event: DriverEvent) -> Dispatch {
        let kind = event.kind();
        if self.gate.state().is_failed() && kind != EventKind::DriverFailed {
            tracing::debug!(kind = %kind, "Dropping event after driver failure");
            return Dispatch::skipped(kind, Skip::AfterFailure);
        }

        let mut polls = Vec::new();
        let mut state = None;

        let payload = match event {
            DriverEvent::DriverReady { home_id } => {
                if !self.gate.mark_ready() {
                    return Dispatch::skipped(kind, Skip::AfterFailure);
                }
                self.home_id = Some(home_id);
                state = Some(DriverState::Ready);
                tracing::info!(home = %home_id.hex(), "Driver ready, scanning network");
                EventPayload::Driver {
                    home_id,
                    home_hex: home_id.hex(),
                }
            }
            DriverEvent::DriverFailed => {
                self.gate.mark_failed();
                state = Some(DriverState::Failed);
                tracing::error!("Driver failed, no controller reachable");
                EventPayload::Empty {}
            }
            DriverEvent::NodeAdded { node_id } => {
                self.cache.upsert_device(node_id);
                EventPayload::Node { node_id }
            }
            DriverEvent::NodeRemoved { node_id } => {
                self.cache.remove_device(node_id);
                EventPayload::Node { node_id }
            }
            DriverEvent::NodeReady { node_id, info } => {
                if let Err(e) = self.cache.merge_device_info(node_id, info.clone()) {
                    tracing::warn!(node = %node_id, error = %e, "Dropping node ready");
                    return Dispatch::skipped(kind, Skip::UnknownNode(node_id));
                }
                if let Some(device) = self.cache.device(node_id) {
                    tracing::info!(
                        node = %node_id,
                        name = %device.display_name(),
                        values = device.value_count(),
                        "Node ready"
                    );
                    polls = self
                        .poll_classes
                        .iter()
                        .copied()
                        .filter(|class| device.has_class(*class))
                        .map(|class| (node_id, class))
                        .collect();
                }
                EventPayload::NodeReady { node_id, info }
            }
            DriverEvent::ValueAdded { node_id, value } => {
                let id = value.id;
                let current = value.value.clone();
                if let Err(e) = self.cache.upsert_value(node_id, value) {
                    tracing::warn!(node = %node_id, value = %id, error = %e, "Dropping value added");
                    return Dispatch::skipped(kind, Skip::UnknownNode(node_id));
                }
                EventPayload::ValueAdded {
                    node_id,
                    class_id: id.class_id,
                    instance: id.instance,
                    index: id.index,
                    value: current,
                }
            }
            DriverEvent::ValueChanged { node_id, value } => {
                let id = value.id;
                let change = match self.cache.change_value(node_id, value) {
                    Ok(change) => change,
                    Err(e) => {
                        tracing::warn!(node = %node_id, value = %id, error = %e, "Dropping value changed");
                        return Dispatch::skipped(kind, Skip::UnknownNode(node_id));
                    }
                };
                if !self.gate.should_forward_change(change.device_ready) {
                    tracing::debug!(node = %node_id, value = %id, "Holding back change of unready node");
                    return Dispatch::skipped(kind, Skip::Gated);
                }
                EventPayload::ValueChanged {
                    node_id,
                    class_id: id.class_id,
                    instance: id.instance,
                    index: id.index,
                    old_value: change.old,
                    new_value: change.new,
                }
            }
            DriverEvent::ValueRemoved {
                node_id,
                class_id,
                instance,
                index,
            } => {
                let id = ValueId::new(class_id, instance, index);
                if self.cache.remove_value(node_id, &id).is_none() {
                    tracing::debug!(node = %node_id, value = %id, "Ignoring removal of unknown value");
                    return Dispatch::skipped(kind, Skip::MissingValue);
                }
                EventPayload::ValueRemoved {
                    node_id,
                    class_id,
                    instance,
                    index,
                }
            }
            DriverEvent::Notification { node_id, code } => EventPayload::Notice {
                node_id,
                code,
                human_text: notification_text(code),
            },
            DriverEvent::ControllerCommand { node_id, code } => EventPayload::Notice {
                node_id,
                code,
                human_text: controller_state_text(code),
            },
            DriverEvent::SceneEvent { node_id, scene_id } => EventPayload::Notice {
                node_id,
                code: scene_id,
                human_text: format!("scene {scene_id}"),
            },
            DriverEvent::ScanComplete => {
                tracing::info!(nodes = self.cache.len(), "Network scan complete");
                EventPayload::Empty {}
            }
        };

        let uid = payload.node_id().map(|node_id| self.identity(node_id));
        let targets = self.registry.subscribers_for(kind);
        tracing::debug!(kind = %kind, subscribers = targets.len(), "Dispatching");

        Dispatch {
            kind,
            notification: Some(Notification { kind, payload, uid }),
            skip: None,
            targets,
            polls,
            state,
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("state", &self.gate.state())
            .field("home_id", &self.home_id)
            .field("devices", &self.cache.len())
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{NodeInfo, Value};
    use crate::subscription::callback;
    use crate::types::ZValue;
    use parking_lot::Mutex;
    use std::sync::Arc;

    const NODE: NodeId = NodeId::new(5);

    fn switch() -> ValueId {
        ValueId::new(CommandClass::SWITCH_BINARY, 1, 0)
    }

    fn dispatcher(allow_unready_updates: bool) -> Dispatcher {
        Dispatcher::new(allow_unready_updates, CommandClass::DEFAULT_POLL.to_vec())
    }

    fn recording(
        dispatcher: &mut Dispatcher,
        name: &str,
        kind: EventKind,
    ) -> Arc<Mutex<Vec<Notification>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        dispatcher.subscribe(
            ConsumerId::new(name),
            kind,
            callback(move |n| {
                sink.lock().push(n.clone());
                Ok(())
            }),
        );
        seen
    }

    fn run(dispatcher: &mut Dispatcher, event: DriverEvent) -> DispatchReport {
        dispatcher.apply(event).deliver()
    }

    fn announce(dispatcher: &mut Dispatcher) {
        run(dispatcher, DriverEvent::NodeAdded { node_id: NODE });
        run(
            dispatcher,
            DriverEvent::ValueAdded {
                node_id: NODE,
                value: Value::new(switch(), false),
            },
        );
    }

    fn node_ready() -> DriverEvent {
        DriverEvent::NodeReady {
            node_id: NODE,
            info: NodeInfo {
                product: "Smart Switch".to_string(),
                ..NodeInfo::default()
            },
        }
    }

    fn changed(value: bool) -> DriverEvent {
        DriverEvent::ValueChanged {
            node_id: NODE,
            value: Value::new(switch(), value),
        }
    }

    #[test]
    fn ready_node_change_carries_old_and_new() {
        let mut d = dispatcher(false);
        let ready = recording(&mut d, "r", EventKind::NodeReady);
        let changes = recording(&mut d, "c", EventKind::ValueChanged);

        announce(&mut d);
        run(&mut d, node_ready());
        let report = run(&mut d, changed(true));

        assert_eq!(ready.lock().len(), 1);
        assert!(d.cache().device(NODE).unwrap().is_ready());
        assert_eq!(report.delivered_count(), 1);

        let seen = changes.lock();
        assert_eq!(seen.len(), 1);
        match &seen[0].payload {
            EventPayload::ValueChanged {
                old_value,
                new_value,
                ..
            } => {
                assert_eq!(old_value, &Some(ZValue::Bool(false)));
                assert_eq!(new_value, &ZValue::Bool(true));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn unready_change_is_cached_but_gated() {
        let mut d = dispatcher(false);
        let changes = recording(&mut d, "c", EventKind::ValueChanged);

        announce(&mut d);
        let report = run(&mut d, changed(true));

        assert!(report.was_gated());
        assert!(changes.lock().is_empty());
        assert_eq!(
            d.cache().value(NODE, &switch()).unwrap().value,
            ZValue::Bool(true)
        );

        run(&mut d, node_ready());
        run(&mut d, changed(false));
        assert_eq!(changes.lock().len(), 1);
    }

    #[test]
    fn override_forwards_unready_change() {
        let mut d = dispatcher(true);
        let changes = recording(&mut d, "c", EventKind::ValueChanged);

        announce(&mut d);
        run(&mut d, changed(true));

        assert_eq!(changes.lock().len(), 1);
    }

    #[test]
    fn removing_unknown_value_is_noop() {
        let mut d = dispatcher(false);
        let removed = recording(&mut d, "c", EventKind::ValueRemoved);
        announce(&mut d);
        let before = d.cache().value_count();

        let report = run(
            &mut d,
            DriverEvent::value_removed(NODE, ValueId::new(CommandClass::METER, 1, 0)),
        );

        assert_eq!(report.skip(), Some(Skip::MissingValue));
        assert!(removed.lock().is_empty());
        assert_eq!(d.cache().value_count(), before);
    }

    #[test]
    fn removing_known_value_is_delivered() {
        let mut d = dispatcher(false);
        let removed = recording(&mut d, "c", EventKind::ValueRemoved);
        announce(&mut d);

        run(&mut d, DriverEvent::value_removed(NODE, switch()));

        assert_eq!(removed.lock().len(), 1);
        assert_eq!(d.cache().value_count(), 0);
    }

    #[test]
    fn events_for_unknown_node_are_dropped() {
        let mut d = dispatcher(true);
        let added = recording(&mut d, "c", EventKind::ValueAdded);

        let report = run(
            &mut d,
            DriverEvent::ValueAdded {
                node_id: NodeId::new(42),
                value: Value::new(switch(), true),
            },
        );

        assert_eq!(report.skip(), Some(Skip::UnknownNode(NodeId::new(42))));
        assert!(added.lock().is_empty());
        assert!(d.cache().is_empty());
    }

    #[test]
    fn node_ready_polls_configured_classes_present_on_device() {
        let mut d = dispatcher(false);
        announce(&mut d);
        run(
            &mut d,
            DriverEvent::ValueAdded {
                node_id: NODE,
                value: Value::new(ValueId::new(CommandClass::BATTERY, 1, 0), 90),
            },
        );

        let dispatch = d.apply(node_ready());
        assert_eq!(dispatch.polls(), &[(NODE, CommandClass::SWITCH_BINARY)]);
    }

    #[test]
    fn node_removed_resets_to_placeholder() {
        let mut d = dispatcher(false);
        announce(&mut d);
        run(&mut d, node_ready());

        run(&mut d, DriverEvent::NodeRemoved { node_id: NODE });

        let device = d.cache().device(NODE).unwrap();
        assert!(!device.is_ready());
        assert_eq!(device.value_count(), 0);
    }

    #[test]
    fn driver_ready_records_home_and_uid() {
        let mut d = dispatcher(false);
        let token = d.token();
        let added = recording(&mut d, "c", EventKind::NodeAdded);

        let dispatch = d.apply(DriverEvent::DriverReady {
            home_id: HomeId::new(0xc0ffee),
        });
        assert_eq!(dispatch.state_change(), Some(DriverState::Ready));
        assert_eq!(
            dispatch.notification().unwrap().payload,
            EventPayload::Driver {
                home_id: HomeId::new(0xc0ffee),
                home_hex: "0xc0ffee".to_string(),
            }
        );
        assert!(dispatch.notification().unwrap().uid.is_none());

        run(&mut d, DriverEvent::NodeAdded { node_id: NODE });
        let uid = added.lock()[0].uid.clone().unwrap();
        assert_eq!(
            uid.as_str(),
            format!("{}-00c0ffee-5", token.as_uuid().simple())
        );
    }

    #[test]
    fn notices_are_rendered() {
        let mut d = dispatcher(false);
        let notices = recording(&mut d, "n", EventKind::Notification);
        let scenes = recording(&mut d, "s", EventKind::SceneEvent);
        let controller = recording(&mut d, "k", EventKind::ControllerCommand);

        run(&mut d, DriverEvent::Notification { node_id: NODE, code: 3 });
        run(&mut d, DriverEvent::SceneEvent { node_id: NODE, scene_id: 4 });
        run(&mut d, DriverEvent::ControllerCommand { node_id: NODE, code: 7 });

        let text = |n: &Notification| match &n.payload {
            EventPayload::Notice { human_text, .. } => human_text.clone(),
            other => panic!("unexpected payload {other:?}"),
        };
        assert_eq!(text(&notices.lock()[0]), "node awake");
        assert_eq!(text(&scenes.lock()[0]), "scene 4");
        assert_eq!(text(&controller.lock()[0]), "completed");
    }

    #[test]
    fn failing_subscriber_does_not_stop_others() {
        let mut d = dispatcher(false);
        let first = recording(&mut d, "first", EventKind::NodeAdded);
        d.subscribe(
            ConsumerId::new("broken"),
            EventKind::NodeAdded,
            callback(|_| Err(ConsumerError::Rejected("boom".into()))),
        );
        let last = recording(&mut d, "last", EventKind::NodeAdded);

        let report = run(&mut d, DriverEvent::NodeAdded { node_id: NODE });

        assert_eq!(report.delivered_count(), 3);
        assert_eq!(report.failures().count(), 1);
        assert_eq!(first.lock().len(), 1);
        assert_eq!(last.lock().len(), 1);
    }

    #[test]
    fn panicking_subscriber_is_recorded_as_failure() {
        let mut d = dispatcher(false);
        d.subscribe(
            ConsumerId::new("broken"),
            EventKind::NodeAdded,
            callback(|_| panic!("consumer bug")),
        );
        let after = recording(&mut d, "after", EventKind::NodeAdded);

        let report = run(&mut d, DriverEvent::NodeAdded { node_id: NODE });

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].result,
            Err(ConsumerError::Panicked("consumer bug".to_string()))
        );
        assert_eq!(after.lock().len(), 1);
    }

    #[test]
    fn driver_failed_is_fatal_and_terminal() {
        let mut d = dispatcher(false);
        let failed = recording(&mut d, "c", EventKind::DriverFailed);

        let dispatch = d.apply(DriverEvent::DriverFailed);
        assert!(dispatch.is_fatal());
        assert_eq!(dispatch.state_change(), Some(DriverState::Failed));
        let _ = dispatch.deliver();
        assert_eq!(failed.lock().len(), 1);

        let report = run(&mut d, DriverEvent::NodeAdded { node_id: NODE });
        assert_eq!(report.skip(), Some(Skip::AfterFailure));
        assert!(d.cache().is_empty());
    }
}
