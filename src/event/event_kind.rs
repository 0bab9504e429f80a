// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed set of event kinds consumers can subscribe to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of a driver notification.
///
/// Consumers subscribe per kind. The string form (`"value changed"`) is the
/// one used in message topics.
///
/// # Examples
///
/// ```
/// use zwave_bridge::event::EventKind;
///
/// assert_eq!(EventKind::ValueChanged.as_str(), "value changed");
/// assert_eq!("node ready".parse::<EventKind>(), Ok(EventKind::NodeReady));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The driver connected to the controller.
    DriverReady,
    /// No controller could be reached.
    DriverFailed,
    /// A node was discovered.
    NodeAdded,
    /// A node left the network.
    NodeRemoved,
    /// A node finished its interview.
    NodeReady,
    /// A value was discovered.
    ValueAdded,
    /// A value changed.
    ValueChanged,
    /// A value disappeared.
    ValueRemoved,
    /// A node-level notification (timeout, awake, dead, ...).
    Notification,
    /// Progress of a controller command.
    ControllerCommand,
    /// A scene was activated on a node.
    SceneEvent,
    /// The initial network scan finished.
    ScanComplete,
}

impl EventKind {
    /// Every event kind, in driver lifecycle order.
    pub const ALL: [Self; 12] = [
        Self::DriverReady,
        Self::DriverFailed,
        Self::NodeAdded,
        Self::NodeRemoved,
        Self::NodeReady,
        Self::ValueAdded,
        Self::ValueChanged,
        Self::ValueRemoved,
        Self::Notification,
        Self::ControllerCommand,
        Self::SceneEvent,
        Self::ScanComplete,
    ];

    /// Returns the name used in message topics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DriverReady => "driver ready",
            Self::DriverFailed => "driver failed",
            Self::NodeAdded => "node added",
            Self::NodeRemoved => "node removed",
            Self::NodeReady => "node ready",
            Self::ValueAdded => "value added",
            Self::ValueChanged => "value changed",
            Self::ValueRemoved => "value removed",
            Self::Notification => "notification",
            Self::ControllerCommand => "controller command",
            Self::SceneEvent => "scene event",
            Self::ScanComplete => "scan complete",
        }
    }

    /// Returns `true` for informational events whose status indication is
    /// transient (notifications, controller commands, scene events).
    #[must_use]
    pub const fn is_notification_class(&self) -> bool {
        matches!(
            self,
            Self::Notification | Self::ControllerCommand | Self::SceneEvent
        )
    }

    /// Returns `true` for events that concern the driver session itself.
    #[must_use]
    pub const fn is_driver_lifecycle(&self) -> bool {
        matches!(self, Self::DriverReady | Self::DriverFailed)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown event kind: {s}"))
    }
}
