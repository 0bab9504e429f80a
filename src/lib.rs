// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `zwave_bridge` - Fan-out of Z-Wave controller notifications to
//! independent consumers.
//!
//! The bridge sits between a Z-Wave network driver and any number of
//! consumers. It keeps a cached view of every discovered device and its
//! values, forwards driver events to the consumers that subscribed to them
//! and routes consumer commands back to the driver.
//!
//! # Features
//!
//! - **Device cache**: devices, their attributes and values, with the
//!   previous state of every changed value
//! - **Subscriptions**: per event kind, in subscription order, with
//!   per-consumer failure isolation
//! - **Readiness gating**: value changes of devices still being interviewed
//!   are cached but not forwarded
//! - **Command routing**: `switchOn`, `switchOff`, `setLevel`, `setValue` and
//!   validated passthrough of named driver operations
//! - **Status indicators**: per-consumer status derived from the driver
//!   state and the last delivered event
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use serde_json::json;
//! use zwave_bridge::{Bridge, ControllerConfig, InboundConsumer, Message, OutboundConsumer};
//!
//! #[tokio::main]
//! async fn main() -> zwave_bridge::Result<()> {
//!     // One driver session for the whole process
//!     let bridge = Bridge::new(|| MyDriver::open());
//!     let controller = bridge.controller(ControllerConfig::new("/dev/ttyACM0")).await?;
//!
//!     // Forward driver ready, node ready, value changed and notifications
//!     let (_inbound, mut messages) = InboundConsumer::builder("zwave-in")
//!         .with_controller(Arc::clone(&controller))
//!         .build()?;
//!
//!     // Send commands
//!     let outbound = OutboundConsumer::builder("zwave-out")
//!         .with_controller(controller)
//!         .build()?;
//!
//!     while let Some(msg) = messages.recv().await {
//!         if msg.topic == "zwave: node ready" {
//!             outbound.input(Message::new("switchOn", json!({"nodeid": 2}))).await?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! The crate logs through [`tracing`]. Install a subscriber in the
//! application to see the output.

pub mod cache;
pub mod command;
pub mod consumer;
pub mod controller;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod event;
pub mod readiness;
pub mod status;
pub mod subscription;
pub mod types;

pub use cache::{Device, DeviceCache, NodeInfo, Value};
pub use command::{Command, OutboundCall};
pub use consumer::{InboundConsumer, OutboundConsumer};
pub use controller::{Bridge, Controller, ControllerConfig, ProcessExit, ShutdownHook};
pub use dispatch::{DispatchReport, Dispatcher};
pub use driver::{DriverOperation, DriverOptions, NetworkDriver};
pub use error::{CacheError, CommandError, ConfigError, ConsumerError, DriverError, Error, Result};
pub use event::{DriverEvent, EventKind, EventPayload, Message, Notification};
pub use readiness::DriverState;
pub use status::{ConsumerHost, Status};
pub use subscription::{Callback, ConsumerId, callback};
pub use types::{CommandClass, HomeId, NodeId, ValueId, ZValue};
