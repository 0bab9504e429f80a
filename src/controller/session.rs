// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The driver session context.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use crate::cache::{Device, Value};
use crate::command::Command;
use crate::dispatch::{DispatchReport, Dispatcher};
use crate::driver::NetworkDriver;
use crate::error::{CommandError, Error, Result};
use crate::event::{DriverEvent, EventKind, IdentityToken, InstallationToken, Message};
use crate::readiness::{ConnectDecision, DriverState};
use crate::status::{ConsumerHost, Status, StatusBoard, TracingHost};
use crate::subscription::{Callback, ConsumerId};
use crate::types::{HomeId, NodeId, ValueId};

use super::{ControllerConfig, ProcessExit, ShutdownHook};

/// One driver session and everything derived from it.
///
/// The controller owns the driver, the device cache, the subscription
/// registry and the readiness gate. Cache, registry and gate share one lock
/// that is held only while an event is applied; subscriber callbacks run
/// after it is released.
///
/// Callbacks must not call back into [`handle_event`](Self::handle_event).
///
/// # Examples
///
/// ```ignore
/// use std::sync::Arc;
/// use zwave_bridge::controller::{Controller, ControllerConfig};
/// use zwave_bridge::event::EventKind;
/// use zwave_bridge::subscription::{ConsumerId, callback};
///
/// let controller = Arc::new(Controller::new(driver, ControllerConfig::new("/dev/ttyACM0"))?);
/// controller.subscribe(ConsumerId::new("log"), EventKind::ValueChanged, callback(|n| {
///     println!("{:?}", n.payload);
///     Ok(())
/// }));
/// controller.connect().await?;
/// ```
pub struct Controller<D: NetworkDriver> {
    driver: D,
    config: ControllerConfig,
    dispatcher: Mutex<Dispatcher>,
    status: StatusBoard,
    shutdown: Arc<dyn ShutdownHook>,
    state_tx: watch::Sender<DriverState>,
    events: Mutex<Option<mpsc::Receiver<DriverEvent>>>,
}

impl<D: NetworkDriver> Controller<D> {
    /// Creates a controller for a driver.
    ///
    /// Takes the driver's event receiver; events are processed once
    /// [`connect`](Self::connect) is called. Statuses are logged and a driver
    /// failure exits the process until a host or hook is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid.
    pub fn new(mut driver: D, config: ControllerConfig) -> Result<Self> {
        config.validate()?;

        let events = driver.take_event_receiver();
        if events.is_none() {
            tracing::warn!("Driver event receiver already taken, events will not be dispatched");
        }
        let (state_tx, _) = watch::channel(DriverState::Disconnected);

        Ok(Self {
            dispatcher: Mutex::new(Dispatcher::new(
                config.allow_unready_updates,
                config.poll_classes.clone(),
            )),
            status: StatusBoard::new(Arc::new(TracingHost), config.status_revert_delay),
            shutdown: Arc::new(ProcessExit),
            state_tx,
            events: Mutex::new(events),
            driver,
            config,
        })
    }

    /// Sets the host receiving status updates.
    #[must_use]
    pub fn with_host(mut self, host: Arc<dyn ConsumerHost>) -> Self {
        self.status = StatusBoard::new(host, self.config.status_revert_delay);
        self
    }

    /// Sets the hook run after a driver failure.
    #[must_use]
    pub fn with_shutdown_hook(mut self, hook: Arc<dyn ShutdownHook>) -> Self {
        self.shutdown = hook;
        self
    }

    /// Uses a fixed installation token instead of a random one.
    #[must_use]
    pub fn with_installation_token(mut self, token: InstallationToken) -> Self {
        self.dispatcher = Mutex::new(Dispatcher::with_token(
            token,
            self.config.allow_unready_updates,
            self.config.poll_classes.clone(),
        ));
        self
    }

    /// Opens the driver session.
    ///
    /// Only the first call connects. Later calls while the session is
    /// connecting or ready return immediately; after an orderly
    /// [`shutdown`](Self::shutdown) the session may be opened again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DriverFailed`] if the session has failed, or
    /// [`Error::Driver`] if the driver could not open the port.
    pub async fn connect(self: &Arc<Self>) -> Result<()> {
        let decision = self.dispatcher.lock().gate_mut().begin_connect();
        match decision {
            ConnectDecision::Reuse => {
                tracing::debug!(port = %self.config.port, "Reusing driver session");
                return Ok(());
            }
            ConnectDecision::Refuse => {
                return Err(Error::DriverFailed {
                    port: self.config.port.clone(),
                });
            }
            ConnectDecision::Open => {}
        }

        self.publish_state(DriverState::Connecting);
        let events = self.events.lock().take();
        if let Some(rx) = events {
            self.spawn_event_loop(rx);
        }

        tracing::info!(port = %self.config.port, "Connecting to Z-Wave controller");
        if let Err(e) = self.driver.connect(&self.config.port, &self.config.driver).await {
            tracing::error!(port = %self.config.port, error = %e, "Failed to open driver session");
            self.dispatcher.lock().gate_mut().mark_disconnected();
            self.publish_state(DriverState::Disconnected);
            return Err(e.into());
        }
        Ok(())
    }

    fn spawn_event_loop(self: &Arc<Self>, mut rx: mpsc::Receiver<DriverEvent>) {
        let controller: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            tracing::debug!("Starting driver event loop");
            while let Some(event) = rx.recv().await {
                let Some(controller) = controller.upgrade() else {
                    break;
                };
                let _ = controller.handle_event(event).await;
            }
            tracing::debug!("Driver event loop stopped");
        });
    }

    /// Dispatches one driver event.
    ///
    /// Updates the cache, delivers the notification to every subscriber of
    /// its kind, updates their statuses and enables polling on ready nodes.
    /// A driver failure is delivered first; then the driver is disconnected
    /// and the shutdown hook runs.
    pub async fn handle_event(&self, event: DriverEvent) -> DispatchReport {
        let dispatch = self.dispatcher.lock().apply(event);

        if let Some(state) = dispatch.state_change() {
            self.publish_state(state);
        }

        let report = dispatch.deliver();
        self.update_statuses(&report);

        for &(node, class) in dispatch.polls() {
            match self.driver.enable_poll(node, class).await {
                Ok(()) => tracing::debug!(node = %node, class = %class, "Polling enabled"),
                Err(e) => {
                    tracing::warn!(node = %node, class = %class, error = %e, "Failed to enable polling");
                }
            }
        }

        if dispatch.is_fatal() {
            self.fail().await;
        }
        report
    }

    fn update_statuses(&self, report: &DispatchReport) {
        let Some(notification) = report.notification() else {
            return;
        };
        let update = Status::for_notification(notification);

        for delivery in report.deliveries() {
            if delivery.is_ok() {
                if let Some(update) = &update {
                    self.status.apply(&delivery.consumer, update);
                }
            } else {
                self.status
                    .set_transient(&delivery.consumer, &Status::error("error"));
            }
        }
    }

    async fn fail(&self) {
        if let Err(e) = self.driver.disconnect().await {
            tracing::warn!(error = %e, "Failed to disconnect driver");
        }
        self.shutdown.shutdown(&Error::DriverFailed {
            port: self.config.port.clone(),
        });
    }

    fn publish_state(&self, state: DriverState) {
        let home_hex = self.home_id().map(|home| home.hex());
        tracing::debug!(state = %state, "Driver state changed");
        self.state_tx.send_replace(state);
        self.status
            .set_steady(Status::for_driver_state(state, home_hex.as_deref()));
    }

    /// Registers or replaces a subscription.
    ///
    /// The consumer is attached to the status board on its first
    /// subscription. Returns `true` if an existing callback was replaced.
    pub fn subscribe(&self, consumer: ConsumerId, kind: EventKind, callback: Callback) -> bool {
        self.status.attach(&consumer);
        self.dispatcher.lock().subscribe(consumer, kind, callback)
    }

    /// Removes a consumer from every event kind and detaches it.
    ///
    /// Returns the number of subscriptions removed.
    pub fn unsubscribe(&self, consumer: &ConsumerId) -> usize {
        let removed = self.dispatcher.lock().unsubscribe(consumer);
        self.status.detach(consumer);
        removed
    }

    /// Attaches a consumer that receives statuses without subscribing.
    pub fn attach(&self, consumer: &ConsumerId) {
        self.status.attach(consumer);
    }

    /// Returns the event kinds a consumer is subscribed to.
    #[must_use]
    pub fn subscriptions_of(&self, consumer: &ConsumerId) -> Vec<EventKind> {
        self.dispatcher.lock().registry().kinds_for(consumer)
    }

    /// Returns the total number of subscriptions.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.dispatcher.lock().registry().subscription_count()
    }

    /// Sends a parsed command to the driver.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] unless the driver is ready, or the
    /// driver's error if it rejected the call.
    pub async fn execute(&self, command: Command) -> Result<()> {
        let (state, home_id, known) = {
            let dispatcher = self.dispatcher.lock();
            let known = command
                .node_id()
                .map(|node| dispatcher.cache().device(node).is_some());
            (dispatcher.gate().state(), dispatcher.home_id(), known)
        };

        if !state.is_ready() {
            tracing::warn!(command = command.name(), state = %state, "Driver not ready, dropping command");
            return Err(Error::NotReady);
        }
        if let (Some(node), Some(false)) = (command.node_id(), known) {
            tracing::warn!(node = %node, command = command.name(), "Command targets an unknown node");
        }

        let call = command.into_call(home_id)?;
        call.send(&self.driver).await?;
        Ok(())
    }

    /// Parses a consumer message and sends the resulting command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Command`] if the message cannot be parsed, otherwise
    /// as [`execute`](Self::execute).
    pub async fn route_message(&self, message: &Message) -> Result<()> {
        let command = Command::parse(message).inspect_err(|e| match e {
            CommandError::UnknownOperation(op) => {
                tracing::warn!(operation = %op, "Dropping command for unknown driver operation");
            }
            other => tracing::warn!(topic = %message.topic, error = %other, "Dropping command"),
        })?;
        tracing::debug!(topic = %message.topic, command = command.name(), "Routing command");
        self.execute(command).await
    }

    /// Shows a failed command on the consumer's status.
    pub fn report_error(&self, consumer: &ConsumerId, error: &Error) {
        let text = match error {
            Error::NotReady => "not ready",
            Error::Command(CommandError::UnknownOperation(_)) => "unknown operation",
            Error::Command(_) => "invalid command",
            Error::Driver(_) => "driver error",
            _ => "error",
        };
        self.status.set_transient(consumer, &Status::error(text));
    }

    /// Asks the driver to write the network layout.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] unless the driver is ready.
    pub async fn write_config(&self) -> Result<()> {
        if !self.state().is_ready() {
            return Err(Error::NotReady);
        }
        self.driver.write_config().await?;
        Ok(())
    }

    /// Closes the driver session.
    ///
    /// A failed session stays failed.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if it could not disconnect.
    pub async fn shutdown(&self) -> Result<()> {
        let state = {
            let mut dispatcher = self.dispatcher.lock();
            dispatcher.gate_mut().mark_disconnected();
            dispatcher.gate().state()
        };
        self.publish_state(state);
        tracing::info!(port = %self.config.port, "Closing driver session");
        self.driver.disconnect().await?;
        Ok(())
    }

    /// Returns the current driver state.
    #[must_use]
    pub fn state(&self) -> DriverState {
        *self.state_tx.borrow()
    }

    /// Creates a watch receiver for driver state changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<DriverState> {
        self.state_tx.subscribe()
    }

    /// Returns the home id, once the driver is ready.
    #[must_use]
    pub fn home_id(&self) -> Option<HomeId> {
        self.dispatcher.lock().home_id()
    }

    /// Returns the identity token of a node.
    #[must_use]
    pub fn identity(&self, node: NodeId) -> IdentityToken {
        self.dispatcher.lock().identity(node)
    }

    /// Returns a snapshot of a cached device.
    #[must_use]
    pub fn device(&self, node: NodeId) -> Option<Device> {
        self.dispatcher.lock().cache().device(node).cloned()
    }

    /// Returns a snapshot of a cached value.
    #[must_use]
    pub fn value(&self, node: NodeId, id: &ValueId) -> Option<Value> {
        self.dispatcher.lock().cache().value(node, id).cloned()
    }

    /// Returns the ids of every cached device.
    #[must_use]
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.dispatcher.lock().cache().node_ids()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Returns the driver.
    #[must_use]
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: NetworkDriver> std::fmt::Debug for Controller<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("port", &self.config.port)
            .field("state", &self.state())
            .field("dispatcher", &*self.dispatcher.lock())
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
