// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ready-made consumers.
//!
//! - [`InboundConsumer`] - Forwards driver events to the host as messages
//! - [`OutboundConsumer`] - Sends host messages to the driver as commands
//!
//! Both must be bound to a [`Controller`](crate::controller::Controller);
//! building one without a controller fails with
//! [`ConfigError::MissingController`](crate::error::ConfigError::MissingController).

mod inbound;
mod outbound;

pub use inbound::{
    DEFAULT_INBOUND_CAPACITY, DEFAULT_INBOUND_KINDS, InboundConsumer, InboundConsumerBuilder,
};
pub use outbound::{OutboundConsumer, OutboundConsumerBuilder};
