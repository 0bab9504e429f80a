// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw notifications emitted by the network driver.

use crate::cache::{NodeInfo, Value};
use crate::types::{CommandClass, HomeId, NodeId, ValueId};

use super::EventKind;

/// A notification from the network driver.
///
/// Drivers push these into the channel returned by
/// [`NetworkDriver::take_event_receiver`](crate::driver::NetworkDriver::take_event_receiver).
/// Each variant carries exactly the arguments the driver reports for that
/// notification.
///
/// # Examples
///
/// ```
/// use zwave_bridge::event::{DriverEvent, EventKind};
/// use zwave_bridge::types::NodeId;
///
/// let event = DriverEvent::NodeAdded { node_id: NodeId::new(5) };
/// assert_eq!(event.kind(), EventKind::NodeAdded);
/// assert_eq!(event.node_id(), Some(NodeId::new(5)));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    /// The driver connected to the controller of the given network.
    DriverReady {
        /// The network's home id.
        home_id: HomeId,
    },

    /// The driver could not reach a controller.
    DriverFailed,

    /// A node was discovered.
    NodeAdded {
        /// The new node.
        node_id: NodeId,
    },

    /// A node left the network.
    NodeRemoved {
        /// The removed node.
        node_id: NodeId,
    },

    /// A node finished its interview and reported its attributes.
    NodeReady {
        /// The ready node.
        node_id: NodeId,
        /// Attributes reported by the node.
        info: NodeInfo,
    },

    /// A value was discovered on a node.
    ValueAdded {
        /// The owning node.
        node_id: NodeId,
        /// The discovered value.
        value: Value,
    },

    /// A value changed on a node.
    ValueChanged {
        /// The owning node.
        node_id: NodeId,
        /// The value with its new state.
        value: Value,
    },

    /// A value disappeared from a node.
    ValueRemoved {
        /// The owning node.
        node_id: NodeId,
        /// The command class of the removed value.
        class_id: CommandClass,
        /// The instance of the removed value.
        instance: u8,
        /// The index of the removed value.
        index: u8,
    },

    /// A node-level notification.
    Notification {
        /// The node concerned.
        node_id: NodeId,
        /// The notification code.
        code: u8,
    },

    /// Progress report of a controller command (inclusion, healing, ...).
    ControllerCommand {
        /// The node concerned.
        node_id: NodeId,
        /// The controller state code.
        code: u8,
    },

    /// A scene was activated on a node.
    SceneEvent {
        /// The node concerned.
        node_id: NodeId,
        /// The scene id.
        scene_id: u8,
    },

    /// The initial network scan finished.
    ScanComplete,
}

impl DriverEvent {
    /// Returns the kind of this event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::DriverReady { .. } => EventKind::DriverReady,
            Self::DriverFailed => EventKind::DriverFailed,
            Self::NodeAdded { .. } => EventKind::NodeAdded,
            Self::NodeRemoved { .. } => EventKind::NodeRemoved,
            Self::NodeReady { .. } => EventKind::NodeReady,
            Self::ValueAdded { .. } => EventKind::ValueAdded,
            Self::ValueChanged { .. } => EventKind::ValueChanged,
            Self::ValueRemoved { .. } => EventKind::ValueRemoved,
            Self::Notification { .. } => EventKind::Notification,
            Self::ControllerCommand { .. } => EventKind::ControllerCommand,
            Self::SceneEvent { .. } => EventKind::SceneEvent,
            Self::ScanComplete => EventKind::ScanComplete,
        }
    }

    /// Returns the node this event concerns, if any.
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::NodeAdded { node_id }
            | Self::NodeRemoved { node_id }
            | Self::NodeReady { node_id, .. }
            | Self::ValueAdded { node_id, .. }
            | Self::ValueChanged { node_id, .. }
            | Self::ValueRemoved { node_id, .. }
            | Self::Notification { node_id, .. }
            | Self::ControllerCommand { node_id, .. }
            | Self::SceneEvent { node_id, .. } => Some(*node_id),
            Self::DriverReady { .. } | Self::DriverFailed | Self::ScanComplete => None,
        }
    }

    /// Creates a value-removed event for a value address.
    #[must_use]
    pub fn value_removed(node_id: NodeId, id: ValueId) -> Self {
        Self::ValueRemoved {
            node_id,
            class_id: id.class_id,
            instance: id.instance,
            index: id.index,
        }
    }
}

/// Returns the text for a node notification code.
#[must_use]
pub fn notification_text(code: u8) -> String {
    match code {
        0 => "message complete".to_string(),
        1 => "timeout".to_string(),
        2 => "nop".to_string(),
        3 => "node awake".to_string(),
        4 => "node asleep".to_string(),
        5 => "node dead".to_string(),
        6 => "node alive".to_string(),
        other => format!("unknown notification: {other}"),
    }
}

/// Returns the text for a controller state code.
#[must_use]
pub fn controller_state_text(code: u8) -> String {
    match code {
        0 => "normal".to_string(),
        1 => "starting".to_string(),
        2 => "cancel".to_string(),
        3 => "error".to_string(),
        4 => "waiting".to_string(),
        5 => "sleeping".to_string(),
        6 => "in progress".to_string(),
        7 => "completed".to_string(),
        8 => "failed".to_string(),
        9 => "node ok".to_string(),
        10 => "node failed".to_string(),
        other => format!("unknown controller state: {other}"),
    }
}
