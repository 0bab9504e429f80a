// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! The hierarchy separates cache lookups, command parsing, driver calls,
//! consumer delivery and configuration. Only [`Error::DriverFailed`] is
//! fatal; everything else is logged and dropped by the component that
//! encounters it.

use thiserror::Error;

use crate::driver::DriverOperation;
use crate::types::NodeId;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A device cache operation failed.
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    /// A consumer command could not be parsed or routed.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// A call into the network driver failed.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Delivery to a consumer failed.
    #[error("consumer error: {0}")]
    Consumer(#[from] ConsumerError),

    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The driver session is not ready to accept commands.
    #[error("driver is not ready")]
    NotReady,

    /// No controller is reachable on the configured port.
    ///
    /// This is the only fatal error: the session cannot recover from it.
    #[error("driver failed on port {port}")]
    DriverFailed {
        /// The serial port the driver was bound to.
        port: String,
    },
}

/// Errors raised by the device cache.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The node has not been announced by a "node added" event.
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

/// Errors raised while parsing or routing a consumer command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The payload text is not valid JSON.
    #[error("malformed payload: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    /// The payload is valid JSON but does not match the command shape.
    #[error("invalid payload: {0}")]
    InvalidPayload(#[source] serde_json::Error),

    /// The payload is not a JSON object.
    #[error("payload must be an object")]
    NotAnObject,

    /// A field required by the command is missing.
    #[error("missing field in payload: {0}")]
    MissingField(&'static str),

    /// The topic names an operation the driver does not expose.
    #[error("unknown driver operation: {0}")]
    UnknownOperation(String),
}

/// Errors raised by network driver implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// Connecting to the controller failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The driver is not connected.
    #[error("driver is not connected")]
    NotConnected,

    /// The driver rejected an operation.
    #[error("{operation} rejected: {message}")]
    Rejected {
        /// The operation that was rejected.
        operation: DriverOperation,
        /// The driver's reason.
        message: String,
    },

    /// The driver rejected the arguments of a passthrough call.
    #[error("invalid arguments for {operation}: {message}")]
    InvalidArguments {
        /// The operation that was invoked.
        operation: DriverOperation,
        /// Description of the problem.
        message: String,
    },
}

/// Errors returned by consumer callbacks.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsumerError {
    /// The consumer's inbound queue is full.
    #[error("consumer queue is full")]
    QueueFull,

    /// The consumer's inbound queue was closed.
    #[error("consumer queue is closed")]
    QueueClosed,

    /// The event could not be turned into a message.
    #[error("failed to encode message: {0}")]
    Encode(String),

    /// The consumer rejected the event.
    #[error("rejected: {0}")]
    Rejected(String),

    /// The consumer's callback panicked.
    #[error("callback panicked: {0}")]
    Panicked(String),
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A consumer was built without a controller reference.
    #[error("no controller bound to consumer {consumer}")]
    MissingController {
        /// The consumer's name.
        consumer: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_error_display() {
        let err = CacheError::UnknownNode(NodeId::new(9));
        assert_eq!(err.to_string(), "unknown node 9");
    }

    #[test]
    fn error_from_command_error() {
        let err: Error = CommandError::UnknownOperation("frobnicate".to_string()).into();
        assert!(matches!(
            err,
            Error::Command(CommandError::UnknownOperation(ref op)) if op == "frobnicate"
        ));
    }

    #[test]
    fn driver_error_display() {
        let err = DriverError::Rejected {
            operation: DriverOperation::SetValue,
            message: "node asleep".to_string(),
        };
        assert_eq!(err.to_string(), "setValue rejected: node asleep");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::MissingController {
            consumer: "zwave-in".to_string(),
        };
        assert_eq!(err.to_string(), "no controller bound to consumer zwave-in");
    }

    #[test]
    fn driver_failed_display() {
        let err = Error::DriverFailed {
            port: "/dev/ttyUSB0".to_string(),
        };
        assert_eq!(err.to_string(), "driver failed on port /dev/ttyUSB0");
    }
}
