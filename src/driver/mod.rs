// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Boundary to the Z-Wave network driver.
//!
//! The bridge never talks to the radio itself. A [`NetworkDriver`]
//! implementation owns the serial connection, reports what happens on the
//! network as [`DriverEvent`]s and accepts outbound calls.
//!
//! # Implementing a driver
//!
//! ```
//! use std::future::Future;
//! use tokio::sync::mpsc;
//! use zwave_bridge::driver::{DriverOperation, DriverOptions, NetworkDriver};
//! use zwave_bridge::error::DriverError;
//! use zwave_bridge::event::DriverEvent;
//! use zwave_bridge::types::{CommandClass, NodeId, ValueId, ZValue};
//!
//! struct NullDriver {
//!     events: Option<mpsc::Receiver<DriverEvent>>,
//! }
//!
//! impl NetworkDriver for NullDriver {
//!     fn connect(
//!         &self,
//!         _port: &str,
//!         _options: &DriverOptions,
//!     ) -> impl Future<Output = Result<(), DriverError>> + Send {
//!         async { Ok(()) }
//!     }
//!
//!     fn disconnect(&self) -> impl Future<Output = Result<(), DriverError>> + Send {
//!         async { Ok(()) }
//!     }
//!
//!     fn set_value(
//!         &self,
//!         _node: NodeId,
//!         _id: ValueId,
//!         _value: ZValue,
//!     ) -> impl Future<Output = Result<(), DriverError>> + Send {
//!         async { Ok(()) }
//!     }
//!
//!     fn enable_poll(
//!         &self,
//!         _node: NodeId,
//!         _class: CommandClass,
//!     ) -> impl Future<Output = Result<(), DriverError>> + Send {
//!         async { Ok(()) }
//!     }
//!
//!     fn write_config(&self) -> impl Future<Output = Result<(), DriverError>> + Send {
//!         async { Ok(()) }
//!     }
//!
//!     fn invoke(
//!         &self,
//!         _operation: DriverOperation,
//!         _args: Vec<serde_json::Value>,
//!     ) -> impl Future<Output = Result<(), DriverError>> + Send {
//!         async { Ok(()) }
//!     }
//!
//!     fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<DriverEvent>> {
//!         self.events.take()
//!     }
//! }
//! ```

mod operation;
mod options;

pub use operation::DriverOperation;
pub use options::{DEFAULT_DRIVER_ATTEMPTS, DEFAULT_POLL_INTERVAL, DriverOptions};

use std::future::Future;

use tokio::sync::mpsc;

use crate::error::DriverError;
use crate::event::DriverEvent;
use crate::types::{CommandClass, NodeId, ValueId, ZValue};

/// Trait for Z-Wave network driver implementations.
///
/// All calls are async boundaries. The returned futures must be `Send` so
/// the controller can run its event loop on any runtime worker.
pub trait NetworkDriver: Send + Sync + 'static {
    /// Opens the session on the given serial port.
    ///
    /// The driver retries up to [`DriverOptions::driver_attempts`] times.
    /// When no controller answers it emits [`DriverEvent::DriverFailed`];
    /// on success it emits [`DriverEvent::DriverReady`].
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::ConnectionFailed`] if the port cannot be opened.
    fn connect(
        &self,
        port: &str,
        options: &DriverOptions,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Closes the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver could not shut down cleanly.
    fn disconnect(&self) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Sets a value on a node.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver rejected the value.
    fn set_value(
        &self,
        node: NodeId,
        id: ValueId,
        value: ZValue,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Enables polling of a command class on a node.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver rejected the request.
    fn enable_poll(
        &self,
        node: NodeId,
        class: CommandClass,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Writes the network layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the layout could not be written.
    fn write_config(&self) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Invokes a named driver operation with positional arguments.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::InvalidArguments`] if the arguments do not fit
    /// the operation, or another error if the driver rejected the call.
    fn invoke(
        &self,
        operation: DriverOperation,
        args: Vec<serde_json::Value>,
    ) -> impl Future<Output = Result<(), DriverError>> + Send;

    /// Hands out the receiving half of the driver's event channel.
    ///
    /// Returns `None` once taken.
    fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<DriverEvent>>;
}

/// Serde helper storing a [`Duration`](std::time::Duration) as milliseconds.
pub(crate) mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
