// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver events and the notifications derived from them.
//!
//! The driver emits raw [`DriverEvent`]s. The dispatcher turns each one into
//! an enriched [`Notification`] (typed [`EventPayload`] plus an
//! [`IdentityToken`]) and fans it out to the subscribers of its
//! [`EventKind`]. Consumers exchange [`Message`]s with the host.
//!
//! # Examples
//!
//! ```
//! use zwave_bridge::event::{EventKind, EventPayload, InstallationToken, Notification};
//! use zwave_bridge::types::{HomeId, NodeId};
//!
//! let token = InstallationToken::new();
//! let node = NodeId::new(5);
//!
//! let notification = Notification {
//!     kind: EventKind::NodeAdded,
//!     payload: EventPayload::Node { node_id: node },
//!     uid: Some(token.identity(Some(HomeId::new(0xc0ffee)), node)),
//! };
//!
//! let msg = notification.to_message("zwave").unwrap();
//! assert_eq!(msg.topic, "zwave: node added");
//! ```

mod driver_event;
mod event_kind;
mod identity;
mod notification;

pub use driver_event::{DriverEvent, controller_state_text, notification_text};
pub use event_kind::EventKind;
pub use identity::{IdentityToken, InstallationToken};
pub use notification::{EventPayload, Message, Notification};
