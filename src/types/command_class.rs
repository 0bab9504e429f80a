// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Command classes and value addressing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A functional category of device capability.
///
/// Command classes are identified by a single byte. Well-known classes are
/// available as associated constants.
///
/// # Examples
///
/// ```
/// use zwave_bridge::types::CommandClass;
///
/// assert_eq!(CommandClass::SWITCH_BINARY.value(), 37);
/// assert_eq!(CommandClass::SWITCH_MULTILEVEL.name(), Some("SWITCH_MULTILEVEL"));
/// assert_eq!(CommandClass::new(0xEF).name(), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandClass(u8);

impl CommandClass {
    /// `COMMAND_CLASS_BASIC`
    pub const BASIC: Self = Self(0x20);
    /// `COMMAND_CLASS_SWITCH_BINARY`
    pub const SWITCH_BINARY: Self = Self(0x25);
    /// `COMMAND_CLASS_SWITCH_MULTILEVEL`
    pub const SWITCH_MULTILEVEL: Self = Self(0x26);
    /// `COMMAND_CLASS_SENSOR_BINARY`
    pub const SENSOR_BINARY: Self = Self(0x30);
    /// `COMMAND_CLASS_SENSOR_MULTILEVEL`
    pub const SENSOR_MULTILEVEL: Self = Self(0x31);
    /// `COMMAND_CLASS_METER`
    pub const METER: Self = Self(0x32);
    /// `COMMAND_CLASS_MULTI_INSTANCE`
    pub const MULTI_INSTANCE: Self = Self(0x60);
    /// `COMMAND_CLASS_CONFIGURATION`
    pub const CONFIGURATION: Self = Self(0x70);
    /// `COMMAND_CLASS_BATTERY`
    pub const BATTERY: Self = Self(0x80);

    /// Classes polled on ready nodes unless configured otherwise.
    pub const DEFAULT_POLL: [Self; 5] = [
        Self::SWITCH_BINARY,
        Self::SWITCH_MULTILEVEL,
        Self::SENSOR_BINARY,
        Self::SENSOR_MULTILEVEL,
        Self::MULTI_INSTANCE,
    ];

    /// Creates a command class from its numeric id.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Returns the numeric id.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the symbolic name for well-known classes.
    #[must_use]
    pub const fn name(&self) -> Option<&'static str> {
        match self.0 {
            0x20 => Some("BASIC"),
            0x25 => Some("SWITCH_BINARY"),
            0x26 => Some("SWITCH_MULTILEVEL"),
            0x30 => Some("SENSOR_BINARY"),
            0x31 => Some("SENSOR_MULTILEVEL"),
            0x32 => Some("METER"),
            0x60 => Some("MULTI_INSTANCE"),
            0x70 => Some("CONFIGURATION"),
            0x80 => Some("BATTERY"),
            _ => None,
        }
    }
}

impl fmt::Display for CommandClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{:#04x} ({name})", self.0),
            None => write!(f, "{:#04x}", self.0),
        }
    }
}

impl From<u8> for CommandClass {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

/// Address of a value within one device.
///
/// A value is identified by its command class, the instance of that class
/// (for devices exposing several identical sub-units) and the index of the
/// property within the instance.
///
/// # Examples
///
/// ```
/// use zwave_bridge::types::{CommandClass, ValueId};
///
/// let id = ValueId::new(CommandClass::SWITCH_BINARY, 1, 0);
/// assert_eq!(id.to_string(), "37:1:0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueId {
    /// The command class the value belongs to.
    pub class_id: CommandClass,
    /// The instance of the command class (1-based).
    pub instance: u8,
    /// The index of the value within the instance.
    pub index: u8,
}

impl ValueId {
    /// Creates a value address.
    #[must_use]
    pub const fn new(class_id: CommandClass, instance: u8, index: u8) -> Self {
        Self {
            class_id,
            instance,
            index,
        }
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.class_id.value(),
            self.instance,
            self.index
        )
    }
}
