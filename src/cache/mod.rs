// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device and value cache.
//!
//! The [`DeviceCache`] holds every device the driver has announced, together
//! with its [`NodeInfo`] attributes and its [`Value`]s addressed by
//! (command class, instance, index).
//!
//! # Lifecycle
//!
//! - `node added` creates an empty placeholder [`Device`]
//! - `value added` / `value changed` / `value removed` mutate its values
//! - `node ready` merges the attribute bag and marks the device ready
//! - `node removed` resets the device to a placeholder
//!
//! # Examples
//!
//! ```
//! use zwave_bridge::cache::{DeviceCache, NodeInfo};
//! use zwave_bridge::types::NodeId;
//!
//! let mut cache = DeviceCache::new();
//! let node = NodeId::new(3);
//!
//! cache.upsert_device(node);
//! assert!(!cache.device(node).unwrap().is_ready());
//!
//! cache.merge_device_info(node, NodeInfo::default()).unwrap();
//! assert!(cache.device(node).unwrap().is_ready());
//! ```

mod device;
mod device_cache;
mod value;

pub use device::{Device, NodeInfo};
pub use device_cache::{DeviceCache, ValueChange};
pub use value::Value;
