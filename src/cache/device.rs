// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Cached device (node) state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{CommandClass, NodeId, ValueId};

use super::Value;

/// Values of one command class, keyed by instance then index.
pub(crate) type ClassValues = BTreeMap<u8, BTreeMap<u8, Value>>;

/// Descriptive attributes reported when a node becomes ready.
///
/// # Examples
///
/// ```
/// use zwave_bridge::cache::NodeInfo;
///
/// let info: NodeInfo = serde_json::from_str(
///     r#"{"manufacturer": "Aeotec", "product": "Smart Switch 6", "loc": "Kitchen"}"#,
/// )
/// .unwrap();
///
/// assert_eq!(info.location, "Kitchen");
/// assert!(info.name.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeInfo {
    /// Manufacturer name.
    pub manufacturer: String,
    /// Manufacturer id (hex string as reported by the driver).
    #[serde(alias = "manufacturerid")]
    pub manufacturer_id: String,
    /// Product name.
    pub product: String,
    /// Product type id.
    #[serde(alias = "producttype")]
    pub product_type: String,
    /// Product id.
    #[serde(alias = "productid")]
    pub product_id: String,
    /// Generic device type (e.g. "Binary Power Switch").
    #[serde(rename = "type")]
    pub device_type: String,
    /// User assigned name.
    pub name: String,
    /// User assigned location.
    #[serde(alias = "loc")]
    pub location: String,
}

/// A device known to the cache.
///
/// A device starts as an empty placeholder when the driver announces it and
/// is enriched once the driver reports it ready. Values are grouped by
/// command class, instance and index.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    node_id: NodeId,
    #[serde(flatten)]
    info: NodeInfo,
    ready: bool,
    classes: BTreeMap<CommandClass, ClassValues>,
}

impl Device {
    /// Creates an empty, not-ready placeholder.
    #[must_use]
    pub fn placeholder(node_id: NodeId) -> Self {
        Self {
            node_id,
            info: NodeInfo::default(),
            ready: false,
            classes: BTreeMap::new(),
        }
    }

    /// Returns the node id.
    #[must_use]
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// Returns the descriptive attributes.
    #[must_use]
    pub fn info(&self) -> &NodeInfo {
        &self.info
    }

    /// Returns `true` once the node-ready notification has been received.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Returns the user assigned name, or `node <id>` when unnamed.
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.info.name.is_empty() {
            format!("node {}", self.node_id)
        } else {
            self.info.name.clone()
        }
    }

    /// Returns a cached value.
    #[must_use]
    pub fn value(&self, id: &ValueId) -> Option<&Value> {
        self.classes
            .get(&id.class_id)?
            .get(&id.instance)?
            .get(&id.index)
    }

    /// Iterates over all cached values in address order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.classes
            .values()
            .flat_map(BTreeMap::values)
            .flat_map(BTreeMap::values)
    }

    /// Returns the number of cached values.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.values().count()
    }

    /// Iterates over the command classes that have at least one value.
    pub fn command_classes(&self) -> impl Iterator<Item = CommandClass> + '_ {
        self.classes.keys().copied()
    }

    /// Returns `true` if the device has values of the given class.
    #[must_use]
    pub fn has_class(&self, class_id: CommandClass) -> bool {
        self.classes.contains_key(&class_id)
    }

    pub(crate) fn merge_info(&mut self, info: NodeInfo) {
        self.info = info;
        self.ready = true;
    }

    /// Stores a value, creating the class and instance maps on demand.
    ///
    /// Returns the value previously stored at the same address.
    pub(crate) fn store_value(&mut self, value: Value) -> Option<Value> {
        let id = value.id;
        self.classes
            .entry(id.class_id)
            .or_default()
            .entry(id.instance)
            .or_default()
            .insert(id.index, value)
    }

    /// Removes a value and prunes containers left empty.
    pub(crate) fn take_value(&mut self, id: &ValueId) -> Option<Value> {
        let instances = self.classes.get_mut(&id.class_id)?;
        let indexes = instances.get_mut(&id.instance)?;
        let removed = indexes.remove(&id.index)?;

        if indexes.is_empty() {
            instances.remove(&id.instance);
        }
        if instances.is_empty() {
            self.classes.remove(&id.class_id);
        }

        Some(removed)
    }
}
