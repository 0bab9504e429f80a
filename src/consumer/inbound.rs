// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumer forwarding driver events as messages.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::controller::Controller;
use crate::driver::NetworkDriver;
use crate::error::{ConfigError, ConsumerError, Result};
use crate::event::{EventKind, Message};
use crate::subscription::{ConsumerId, callback};

/// Event kinds forwarded unless configured otherwise.
pub const DEFAULT_INBOUND_KINDS: [EventKind; 4] = [
    EventKind::DriverReady,
    EventKind::NodeReady,
    EventKind::ValueChanged,
    EventKind::Notification,
];

/// Default capacity of the outgoing message queue.
pub const DEFAULT_INBOUND_CAPACITY: usize = 64;

/// Builder for [`InboundConsumer`].
pub struct InboundConsumerBuilder<D: NetworkDriver> {
    id: ConsumerId,
    controller: Option<Arc<Controller<D>>>,
    kinds: Vec<EventKind>,
    capacity: usize,
}

impl<D: NetworkDriver> InboundConsumerBuilder<D> {
    /// Binds the consumer to a controller.
    #[must_use]
    pub fn with_controller(mut self, controller: Arc<Controller<D>>) -> Self {
        self.controller = Some(controller);
        self
    }

    /// Replaces the forwarded event kinds.
    #[must_use]
    pub fn with_kinds(mut self, kinds: impl IntoIterator<Item = EventKind>) -> Self {
        self.kinds = kinds.into_iter().collect();
        self
    }

    /// Sets the capacity of the message queue.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Subscribes the consumer and returns it with its message receiver.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingController`] if no controller was set.
    pub fn build(self) -> Result<(InboundConsumer<D>, mpsc::Receiver<Message>)> {
        let controller = self.controller.ok_or_else(|| ConfigError::MissingController {
            consumer: self.id.to_string(),
        })?;

        let (tx, rx) = mpsc::channel(self.capacity);
        let source = controller.config().source.clone();

        for kind in &self.kinds {
            let tx = tx.clone();
            let source = source.clone();
            let id = self.id.clone();
            controller.subscribe(
                self.id.clone(),
                *kind,
                callback(move |notification| {
                    let message = notification
                        .to_message(&source)
                        .map_err(|e| ConsumerError::Encode(e.to_string()))?;
                    tracing::debug!(consumer = %id, topic = %message.topic, "Injecting message");
                    tx.try_send(message).map_err(|e| match e {
                        mpsc::error::TrySendError::Full(_) => ConsumerError::QueueFull,
                        mpsc::error::TrySendError::Closed(_) => ConsumerError::QueueClosed,
                    })
                }),
            );
        }

        tracing::debug!(consumer = %self.id, kinds = self.kinds.len(), "Inbound consumer subscribed");
        Ok((
            InboundConsumer {
                id: self.id,
                controller,
                kinds: self.kinds,
            },
            rx,
        ))
    }
}

/// Forwards driver events to the host as [`Message`]s.
///
/// Each notification of a subscribed kind becomes a message with topic
/// `"<source>: <event kind>"`. Messages are queued on a bounded channel; a
/// full queue counts as a failed delivery for this consumer only.
///
/// The consumer unsubscribes when closed or dropped.
///
/// # Examples
///
/// ```ignore
/// use zwave_bridge::consumer::InboundConsumer;
///
/// let (consumer, mut messages) = InboundConsumer::builder("zwave-in")
///     .with_controller(controller)
///     .build()?;
///
/// while let Some(msg) = messages.recv().await {
///     println!("{} {}", msg.topic, msg.payload);
/// }
/// ```
pub struct InboundConsumer<D: NetworkDriver> {
    id: ConsumerId,
    controller: Arc<Controller<D>>,
    kinds: Vec<EventKind>,
}

impl<D: NetworkDriver> InboundConsumer<D> {
    /// Starts building a consumer with the given id.
    #[must_use]
    pub fn builder(id: impl Into<String>) -> InboundConsumerBuilder<D> {
        InboundConsumerBuilder {
            id: ConsumerId::new(id),
            controller: None,
            kinds: DEFAULT_INBOUND_KINDS.to_vec(),
            capacity: DEFAULT_INBOUND_CAPACITY,
        }
    }

    /// Returns the consumer id.
    #[must_use]
    pub fn id(&self) -> &ConsumerId {
        &self.id
    }

    /// Returns the forwarded event kinds.
    #[must_use]
    pub fn kinds(&self) -> &[EventKind] {
        &self.kinds
    }

    /// Unsubscribes from every event kind.
    pub fn close(&self) {
        let removed = self.controller.unsubscribe(&self.id);
        if removed > 0 {
            tracing::debug!(consumer = %self.id, removed, "Inbound consumer closed");
        }
    }
}

impl<D: NetworkDriver> Drop for InboundConsumer<D> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<D: NetworkDriver> fmt::Debug for InboundConsumerBuilder<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundConsumerBuilder")
            .field("id", &self.id)
            .field("kinds", &self.kinds)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

impl<D: NetworkDriver> fmt::Debug for InboundConsumer<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundConsumer")
            .field("id", &self.id)
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}
