// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device and value cache.

use std::collections::HashMap;

use crate::error::CacheError;
use crate::types::{NodeId, ValueId, ZValue};

use super::{Device, NodeInfo, Value};

/// Old and new state of a changed value.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChange {
    /// State cached before the change, `None` if the value was unknown.
    pub old: Option<ZValue>,
    /// State cached after the change.
    pub new: ZValue,
    /// Whether the owning device was ready when the change was recorded.
    pub device_ready: bool,
}

/// Cache of every discovered device and its values.
///
/// The cache is the single source of truth for current and previous value
/// state. It is owned by the dispatcher; consumers only ever see clones.
///
/// # Examples
///
/// ```
/// use zwave_bridge::cache::{DeviceCache, Value};
/// use zwave_bridge::types::{CommandClass, NodeId, ValueId, ZValue};
///
/// let mut cache = DeviceCache::new();
/// let node = NodeId::new(5);
/// let id = ValueId::new(CommandClass::SWITCH_BINARY, 1, 0);
///
/// cache.upsert_device(node);
/// cache.upsert_value(node, Value::new(id, false)).unwrap();
///
/// let change = cache.change_value(node, Value::new(id, true)).unwrap();
/// assert_eq!(change.old, Some(ZValue::Bool(false)));
/// assert_eq!(change.new, ZValue::Bool(true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct DeviceCache {
    devices: HashMap<NodeId, Device>,
}

impl DeviceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a placeholder device.
    ///
    /// Calling this for a known node resets it to an empty, not-ready
    /// placeholder; its values are discarded.
    pub fn upsert_device(&mut self, node_id: NodeId) {
        if self
            .devices
            .insert(node_id, Device::placeholder(node_id))
            .is_some()
        {
            tracing::debug!(node = %node_id, "Reinitialized cached device");
        }
    }

    /// Resets a device to an empty placeholder.
    ///
    /// The entry is kept so that late value events for the node still find
    /// a device.
    pub fn remove_device(&mut self, node_id: NodeId) {
        self.upsert_device(node_id);
    }

    /// Merges node attributes into a device and marks it ready.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::UnknownNode`] if the node was never added.
    pub fn merge_device_info(&mut self, node_id: NodeId, info: NodeInfo) -> Result<(), CacheError> {
        let device = self.device_mut(node_id)?;
        device.merge_info(info);
        Ok(())
    }

    /// Stores a newly discovered value.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::UnknownNode`] if the node was never added.
    pub fn upsert_value(&mut self, node_id: NodeId, value: Value) -> Result<(), CacheError> {
        let device = self.device_mut(node_id)?;
        device.store_value(value);
        Ok(())
    }

    /// Records a value change.
    ///
    /// The previous state is read before the entry is overwritten. The change
    /// is always recorded, whether or not the device is ready; forwarding is
    /// decided by the caller using [`ValueChange::device_ready`].
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::UnknownNode`] if the node was never added.
    pub fn change_value(&mut self, node_id: NodeId, value: Value) -> Result<ValueChange, CacheError> {
        let device = self.device_mut(node_id)?;
        let new = value.value.clone();
        let old = device.store_value(value).map(|previous| previous.value);

        Ok(ValueChange {
            old,
            new,
            device_ready: device.is_ready(),
        })
    }

    /// Removes a value.
    ///
    /// Returns the removed value, or `None` if the node or value is unknown.
    /// Removing an unknown value is not an error.
    pub fn remove_value(&mut self, node_id: NodeId, id: &ValueId) -> Option<Value> {
        self.devices.get_mut(&node_id)?.take_value(id)
    }

    /// Returns a cached device.
    #[must_use]
    pub fn device(&self, node_id: NodeId) -> Option<&Device> {
        self.devices.get(&node_id)
    }

    /// Returns a cached value.
    #[must_use]
    pub fn value(&self, node_id: NodeId, id: &ValueId) -> Option<&Value> {
        self.devices.get(&node_id)?.value(id)
    }

    /// Returns all known node ids in ascending order.
    #[must_use]
    pub fn node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<_> = self.devices.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of cached devices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    /// Returns `true` if no device is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Returns the total number of cached values across all devices.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.devices.values().map(Device::value_count).sum()
    }

    /// Drops every cached device.
    pub fn clear(&mut self) {
        self.devices.clear();
    }

    fn device_mut(&mut self, node_id: NodeId) -> Result<&mut Device, CacheError> {
        self.devices
            .get_mut(&node_id)
            .ok_or(CacheError::UnknownNode(node_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommandClass;

    const NODE: NodeId = NodeId::new(5);

    fn switch_id() -> ValueId {
        ValueId::new(CommandClass::SWITCH_BINARY, 1, 0)
    }

    fn cache_with_switch() -> DeviceCache {
        let mut cache = DeviceCache::new();
        cache.upsert_device(NODE);
        cache
            .upsert_value(NODE, Value::new(switch_id(), false))
            .unwrap();
        cache
    }

    #[test]
    fn upsert_device_creates_placeholder() {
        let mut cache = DeviceCache::new();
        cache.upsert_device(NODE);

        let device = cache.device(NODE).unwrap();
        assert!(!device.is_ready());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn upsert_device_twice_reinitializes() {
        let mut cache = cache_with_switch();
        cache.merge_device_info(NODE, NodeInfo::default()).unwrap();

        cache.upsert_device(NODE);

        let device = cache.device(NODE).unwrap();
        assert!(!device.is_ready());
        assert_eq!(device.value_count(), 0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn remove_device_keeps_placeholder() {
        let mut cache = cache_with_switch();
        cache.remove_device(NODE);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.device(NODE).unwrap().value_count(), 0);
    }

    #[test]
    fn merge_unknown_node_fails() {
        let mut cache = DeviceCache::new();
        let err = cache
            .merge_device_info(NODE, NodeInfo::default())
            .unwrap_err();
        assert_eq!(err, CacheError::UnknownNode(NODE));
    }

    #[test]
    fn upsert_value_unknown_node_fails() {
        let mut cache = DeviceCache::new();
        assert!(cache.upsert_value(NODE, Value::new(switch_id(), true)).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn change_value_reads_old_before_overwrite() {
        let mut cache = cache_with_switch();

        let change = cache.change_value(NODE, Value::new(switch_id(), true)).unwrap();

        assert_eq!(change.old, Some(ZValue::Bool(false)));
        assert_eq!(change.new, ZValue::Bool(true));
        assert_eq!(
            cache.value(NODE, &switch_id()).unwrap().value,
            ZValue::Bool(true)
        );
    }

    #[test]
    fn change_value_records_readiness() {
        let mut cache = cache_with_switch();
        let change = cache.change_value(NODE, Value::new(switch_id(), true)).unwrap();
        assert!(!change.device_ready);

        cache.merge_device_info(NODE, NodeInfo::default()).unwrap();
        let change = cache.change_value(NODE, Value::new(switch_id(), false)).unwrap();
        assert!(change.device_ready);
    }

    #[test]
    fn change_value_of_unknown_value_has_no_old_state() {
        let mut cache = DeviceCache::new();
        cache.upsert_device(NODE);

        let change = cache.change_value(NODE, Value::new(switch_id(), true)).unwrap();
        assert_eq!(change.old, None);
    }

    #[test]
    fn remove_missing_value_is_noop() {
        let mut cache = cache_with_switch();
        let other = ValueId::new(CommandClass::SWITCH_MULTILEVEL, 1, 0);

        assert!(cache.remove_value(NODE, &other).is_none());
        assert!(cache.remove_value(NodeId::new(99), &switch_id()).is_none());
        assert_eq!(cache.value_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn remove_existing_value() {
        let mut cache = cache_with_switch();
        let removed = cache.remove_value(NODE, &switch_id()).unwrap();

        assert_eq!(removed.value, ZValue::Bool(false));
        assert_eq!(cache.value_count(), 0);
    }

    #[test]
    fn node_ids_are_sorted() {
        let mut cache = DeviceCache::new();
        for id in [9, 2, 5] {
            cache.upsert_device(NodeId::new(id));
        }
        assert_eq!(
            cache.node_ids(),
            vec![NodeId::new(2), NodeId::new(5), NodeId::new(9)]
        );
    }
}
