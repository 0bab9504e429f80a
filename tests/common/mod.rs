// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Shared fixtures: an in-memory driver, a recording host and a recording
//! shutdown hook.

#![allow(dead_code)]

use std::future::{Future, ready};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;

use zwave_bridge::cache::{NodeInfo, Value};
use zwave_bridge::controller::{Controller, ControllerConfig, ShutdownHook};
use zwave_bridge::driver::{DriverOperation, DriverOptions, NetworkDriver};
use zwave_bridge::error::{DriverError, Error};
use zwave_bridge::event::DriverEvent;
use zwave_bridge::status::{ConsumerHost, Status};
use zwave_bridge::subscription::ConsumerId;
use zwave_bridge::types::{CommandClass, HomeId, NodeId, ValueId, ZValue};

pub const HOME: HomeId = HomeId::new(0x00c0_ffee);
pub const NODE: NodeId = NodeId::new(5);

/// A call received by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect(String),
    Disconnect,
    SetValue(NodeId, ValueId, ZValue),
    EnablePoll(NodeId, CommandClass),
    WriteConfig,
    Invoke(DriverOperation, Vec<serde_json::Value>),
}

/// Test side of the recording driver.
#[derive(Clone, Default)]
pub struct DriverHandle {
    calls: Arc<Mutex<Vec<Call>>>,
    sender: Arc<Mutex<Option<mpsc::Sender<DriverEvent>>>>,
    created: Arc<AtomicUsize>,
}

impl DriverHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a driver recording into this handle.
    pub fn driver(&self) -> RecordingDriver {
        let (tx, rx) = mpsc::channel(64);
        *self.sender.lock() = Some(tx);
        self.created.fetch_add(1, Ordering::SeqCst);
        RecordingDriver {
            calls: Arc::clone(&self.calls),
            events: Some(rx),
        }
    }

    /// Pushes an event into the driver's event channel.
    pub async fn emit(&self, event: DriverEvent) {
        let sender = self.sender.lock().clone().expect("no driver created");
        sender.send(event).await.expect("event loop stopped");
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().iter().filter(|call| predicate(call)).count()
    }

    pub fn drivers_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

/// In-memory driver recording every call.
pub struct RecordingDriver {
    calls: Arc<Mutex<Vec<Call>>>,
    events: Option<mpsc::Receiver<DriverEvent>>,
}

impl RecordingDriver {
    fn record(&self, call: Call) -> impl Future<Output = Result<(), DriverError>> + Send {
        self.calls.lock().push(call);
        ready(Ok(()))
    }
}

impl NetworkDriver for RecordingDriver {
    fn connect(
        &self,
        port: &str,
        _options: &DriverOptions,
    ) -> impl Future<Output = Result<(), DriverError>> + Send {
        self.record(Call::Connect(port.to_string()))
    }

    fn disconnect(&self) -> impl Future<Output = Result<(), DriverError>> + Send {
        self.record(Call::Disconnect)
    }

    fn set_value(
        &self,
        node: NodeId,
        id: ValueId,
        value: ZValue,
    ) -> impl Future<Output = Result<(), DriverError>> + Send {
        self.record(Call::SetValue(node, id, value))
    }

    fn enable_poll(
        &self,
        node: NodeId,
        class: CommandClass,
    ) -> impl Future<Output = Result<(), DriverError>> + Send {
        self.record(Call::EnablePoll(node, class))
    }

    fn write_config(&self) -> impl Future<Output = Result<(), DriverError>> + Send {
        self.record(Call::WriteConfig)
    }

    fn invoke(
        &self,
        operation: DriverOperation,
        args: Vec<serde_json::Value>,
    ) -> impl Future<Output = Result<(), DriverError>> + Send {
        self.record(Call::Invoke(operation, args))
    }

    fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<DriverEvent>> {
        self.events.take()
    }
}

/// Host recording every status change.
#[derive(Default)]
pub struct RecordingHost {
    seen: Mutex<Vec<(ConsumerId, Status)>>,
}

impl RecordingHost {
    pub fn last(&self, consumer: &str) -> Option<Status> {
        self.seen
            .lock()
            .iter()
            .rev()
            .find(|(id, _)| id.as_str() == consumer)
            .map(|(_, status)| status.clone())
    }

    pub fn history(&self, consumer: &str) -> Vec<Status> {
        self.seen
            .lock()
            .iter()
            .filter(|(id, _)| id.as_str() == consumer)
            .map(|(_, status)| status.clone())
            .collect()
    }
}

impl ConsumerHost for RecordingHost {
    fn set_status(&self, consumer: &ConsumerId, status: &Status) {
        self.seen.lock().push((consumer.clone(), status.clone()));
    }
}

/// Shutdown hook recording the errors it was called with.
#[derive(Default)]
pub struct RecordingShutdown {
    pub errors: Mutex<Vec<String>>,
}

impl ShutdownHook for RecordingShutdown {
    fn shutdown(&self, error: &Error) {
        self.errors.lock().push(error.to_string());
    }
}

/// Everything a test needs around one controller.
pub struct Harness {
    pub controller: Arc<Controller<RecordingDriver>>,
    pub driver: DriverHandle,
    pub host: Arc<RecordingHost>,
    pub shutdown: Arc<RecordingShutdown>,
}

impl Harness {
    pub fn new(config: ControllerConfig) -> Self {
        let driver = DriverHandle::new();
        let host = Arc::new(RecordingHost::default());
        let shutdown = Arc::new(RecordingShutdown::default());

        let controller = Controller::new(driver.driver(), config)
            .expect("valid config")
            .with_host(Arc::clone(&host) as Arc<dyn ConsumerHost>)
            .with_shutdown_hook(Arc::clone(&shutdown) as Arc<dyn ShutdownHook>);

        Self {
            controller: Arc::new(controller),
            driver,
            host,
            shutdown,
        }
    }

    pub fn default_config() -> ControllerConfig {
        ControllerConfig::new("/dev/ttyUSB0")
    }

    /// Connects and reports the driver ready.
    pub async fn ready(config: ControllerConfig) -> Self {
        let harness = Self::new(config);
        harness.controller.connect().await.expect("connect");
        harness
            .controller
            .handle_event(DriverEvent::DriverReady { home_id: HOME })
            .await;
        harness
    }

    /// Announces node 5 with a binary switch that is off.
    pub async fn announce_switch(&self) {
        self.controller
            .handle_event(DriverEvent::NodeAdded { node_id: NODE })
            .await;
        self.controller
            .handle_event(DriverEvent::ValueAdded {
                node_id: NODE,
                value: Value::new(switch(), false).with_label("Switch"),
            })
            .await;
    }
}

pub fn switch() -> ValueId {
    ValueId::new(CommandClass::SWITCH_BINARY, 1, 0)
}

pub fn node_ready() -> DriverEvent {
    DriverEvent::NodeReady {
        node_id: NODE,
        info: NodeInfo {
            manufacturer: "Acme".to_string(),
            product: "Smart Switch".to_string(),
            name: "Lamp".to_string(),
            ..NodeInfo::default()
        },
    }
}

pub fn switch_changed(on: bool) -> DriverEvent {
    DriverEvent::ValueChanged {
        node_id: NODE,
        value: Value::new(switch(), on).with_label("Switch"),
    }
}
