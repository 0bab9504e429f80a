// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription registry for driver notifications.
//!
//! # Overview
//!
//! - [`ConsumerId`] - Identity of a consumer, used to unsubscribe
//! - [`Callback`] - Function invoked for each matching notification
//! - [`SubscriptionRegistry`] - Maps each [`EventKind`](crate::event::EventKind)
//!   to its subscribers in subscription order
//!
//! Unsubscribing is the only cancellation primitive: it removes the
//! consumer from every event kind at once.
//!
//! # Usage
//!
//! Subscriptions are normally made through a
//! [`Controller`](crate::controller::Controller):
//!
//! ```ignore
//! use zwave_bridge::event::EventKind;
//! use zwave_bridge::subscription::{ConsumerId, callback};
//!
//! let id = ConsumerId::new("dashboard");
//! controller.subscribe(id.clone(), EventKind::ValueChanged, callback(|n| {
//!     println!("{:?}", n.payload);
//!     Ok(())
//! }));
//!
//! // Later
//! controller.unsubscribe(&id);
//! ```

mod callback;
mod registry;

pub use callback::{Callback, ConsumerId, callback};
pub use registry::SubscriptionRegistry;
