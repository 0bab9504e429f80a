// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identifier and value types shared across the bridge.
//!
//! # Types
//!
//! - [`NodeId`] - Device (node) identifier within one home network
//! - [`HomeId`] - Identifier of a controller's mesh network
//! - [`CommandClass`] - Functional category of a device capability
//! - [`ValueId`] - (command class, instance, index) address of a value
//! - [`ZValue`] - Opaque typed value payload

mod command_class;
mod node;
mod zvalue;

pub use command_class::{CommandClass, ValueId};
pub use node::{HomeId, NodeId};
pub use zvalue::ZValue;
