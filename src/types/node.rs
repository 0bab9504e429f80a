// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Node and home network identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a device (node) on the mesh network.
///
/// Node ids are assigned by the controller and are unique within one home
/// network. Z-Wave uses ids 1-232; the type accepts the full byte range so
/// that values reported by the driver are never rejected.
///
/// # Examples
///
/// ```
/// use zwave_bridge::types::NodeId;
///
/// let node = NodeId::new(5);
/// assert_eq!(node.value(), 5);
/// assert_eq!(node.to_string(), "5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(u8);

impl NodeId {
    /// Creates a node identifier.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Returns the raw node number.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u8> for NodeId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

/// Identifier of one controller's mesh network.
///
/// The home id is reported once the driver is ready. It is rendered in two
/// ways: [`hex`](Self::hex) (`0x` prefixed, as shown to users) and
/// [`token`](Self::token) (fixed-width, used inside identity tokens).
///
/// # Examples
///
/// ```
/// use zwave_bridge::types::HomeId;
///
/// let home = HomeId::new(0x00c0_ffee);
/// assert_eq!(home.hex(), "0xc0ffee");
/// assert_eq!(home.token(), "00c0ffee");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HomeId(u32);

impl HomeId {
    /// Creates a home identifier.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw home id.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Returns the `0x` prefixed lowercase hex rendering.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("{:#x}", self.0)
    }

    /// Returns the 8-digit lowercase hex token.
    #[must_use]
    pub fn token(&self) -> String {
        format!("{:08x}", self.0)
    }
}

impl fmt::Display for HomeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<u32> for HomeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId::new(12).to_string(), "12");
    }

    #[test]
    fn node_id_ordering() {
        assert!(NodeId::new(2) < NodeId::new(10));
    }

    #[test]
    fn node_id_deserializes_from_number() {
        let id: NodeId = serde_json::from_str("7").unwrap();
        assert_eq!(id, NodeId::new(7));
    }

    #[test]
    fn home_id_renderings() {
        let home = HomeId::new(0x0163_4f2a);
        assert_eq!(home.hex(), "0x1634f2a");
        assert_eq!(home.token(), "01634f2a");
        assert_eq!(home.to_string(), "0x1634f2a");
    }

    #[test]
    fn home_id_zero_token_is_fixed_width() {
        assert_eq!(HomeId::new(0).token(), "00000000");
    }
}
