// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumer sending commands to the driver.

use std::fmt;
use std::sync::Arc;

use crate::controller::Controller;
use crate::driver::NetworkDriver;
use crate::error::{ConfigError, Result};
use crate::event::Message;
use crate::subscription::ConsumerId;

/// Builder for [`OutboundConsumer`].
pub struct OutboundConsumerBuilder<D: NetworkDriver> {
    id: ConsumerId,
    controller: Option<Arc<Controller<D>>>,
}

impl<D: NetworkDriver> OutboundConsumerBuilder<D> {
    /// Binds the consumer to a controller.
    #[must_use]
    pub fn with_controller(mut self, controller: Arc<Controller<D>>) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Attaches the consumer to the controller's status board.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingController`] if no controller was set.
    pub fn build(self) -> Result<OutboundConsumer<D>> {
        let controller = self.controller.ok_or_else(|| ConfigError::MissingController {
            consumer: self.id.to_string(),
        })?;
        controller.attach(&self.id);
        Ok(OutboundConsumer {
            id: self.id,
            controller,
        })
    }
}

/// Turns host messages into driver commands.
///
/// Failures are logged and shown on the consumer's status; they never
/// affect other consumers.
///
/// # Examples
///
/// ```ignore
/// use serde_json::json;
/// use zwave_bridge::consumer::OutboundConsumer;
/// use zwave_bridge::event::Message;
///
/// let consumer = OutboundConsumer::builder("zwave-out")
///     .with_controller(controller)
///     .build()?;
///
/// consumer.input(Message::new("switchOn", json!({"nodeid": 2}))).await?;
/// ```
pub struct OutboundConsumer<D: NetworkDriver> {
    id: ConsumerId,
    controller: Arc<Controller<D>>,
}

impl<D: NetworkDriver> OutboundConsumer<D> {
    /// Starts building a consumer with the given id.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> OutboundConsumerBuilder<D> {
        OutboundConsumerBuilder {
            id: ConsumerId::new(id),
            controller: None,
        }
    }

    /// Returns the consumer id.
    #[must_use]
    pub fn id(&self) -> &ConsumerId {
        &self.id
    }

    /// Handles one message from the host.
    ///
    /// # Errors
    ///
    /// Returns the routing error after logging it and showing it on the
    /// consumer's status.
    pub async fn input(&self, message: Message) -> Result<()> {
        tracing::debug!(consumer = %self.id, topic = %message.topic, "Outbound input");
        let result = self.controller.route_message(&message).await;
        if let Err(e) = &result {
            tracing::warn!(consumer = %self.id, topic = %message.topic, error = %e, "Command failed");
            self.controller.report_error(&self.id, e);
        }
        result
    }

    /// Detaches from the status board.
    pub fn close(&self) {
        self.controller.unsubscribe(&self.id);
    }
}

impl<D: NetworkDriver> Drop for OutboundConsumer<D> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<D: NetworkDriver> fmt::Debug for OutboundConsumerBuilder<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundConsumerBuilder")
            .field("id", &self.id)
            .field("bound", &self.controller.is_some())
            .finish()
    }
}

impl<D: NetworkDriver> fmt::Debug for OutboundConsumer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundConsumer")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}
