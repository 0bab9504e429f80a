// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed value payload carried by device values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The current state of a device value.
///
/// The bridge does not interpret values; it only stores, compares and
/// forwards them. The variants mirror the JSON shapes a value can take so
/// that payloads round-trip unchanged between drivers and consumers.
///
/// # Examples
///
/// ```
/// use zwave_bridge::types::ZValue;
///
/// assert_eq!(ZValue::from(true), ZValue::Bool(true));
/// assert_eq!(ZValue::from(77), ZValue::Int(77));
///
/// let parsed: ZValue = serde_json::from_str("\"Heat\"").unwrap();
/// assert_eq!(parsed, ZValue::Text("Heat".to_string()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ZValue {
    /// Boolean value (binary switches and sensors).
    Bool(bool),
    /// Integer value (levels, configuration parameters).
    Int(i64),
    /// Decimal value (sensor readings).
    Decimal(f64),
    /// Text value (lists, strings).
    Text(String),
}

impl ZValue {
    /// Converts a JSON value into a typed value.
    ///
    /// Returns `None` for `null`, arrays and objects.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Decimal)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for ZValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Decimal(d) => write!(f, "{d}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ZValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ZValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ZValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u8> for ZValue {
    fn from(value: u8) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ZValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for ZValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ZValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
