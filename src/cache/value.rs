// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached device values.

use serde::{Deserialize, Serialize};

use crate::types::{ValueId, ZValue};

/// A value reported by a device.
///
/// Besides the current state, a value carries the descriptive metadata the
/// driver reports when the value is first added.
///
/// # Examples
///
/// ```
/// use zwave_bridge::cache::Value;
/// use zwave_bridge::types::{CommandClass, ValueId};
///
/// let value = Value::new(ValueId::new(CommandClass::SWITCH_MULTILEVEL, 1, 0), 0)
///     .with_label("Level")
///     .with_range(0, 99);
///
/// assert_eq!(value.label, "Level");
/// assert_eq!(value.max, Some(99));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    /// Address of the value within its device.
    #[serde(flatten)]
    pub id: ValueId,
    /// Current state.
    pub value: ZValue,
    /// Human readable label.
    #[serde(default)]
    pub label: String,
    /// Unit of measurement, empty when unit-less.
    #[serde(default)]
    pub units: String,
    /// Whether the value can only be read.
    #[serde(default)]
    pub read_only: bool,
    /// Whether the value can only be written.
    #[serde(default)]
    pub write_only: bool,
    /// Lower bound for numeric values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Upper bound for numeric values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Help text reported by the device configuration database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Value {
    /// Creates a value with empty metadata.
    #[must_use]
    pub fn new(id: ValueId, value: impl Into<ZValue>) -> Self {
        Self {
            id,
            value: value.into(),
            label: String::new(),
            units: String::new(),
            read_only: false,
            write_only: false,
            min: None,
            max: None,
            help: None,
        }
    }

    /// Sets the label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the unit of measurement.
    #[must_use]
    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Marks the value as read-only.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Marks the value as write-only.
    #[must_use]
    pub fn write_only(mut self) -> Self {
        self.write_only = true;
        self
    }

    /// Sets the numeric range.
    #[must_use]
    pub fn with_range(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Returns a copy carrying a new state, keeping the metadata.
    #[must_use]
    pub fn with_value(&self, value: impl Into<ZValue>) -> Self {
        Self {
            value: value.into(),
            ..self.clone()
        }
    }
}
