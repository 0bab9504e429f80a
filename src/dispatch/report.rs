// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-subscriber results of one dispatch.

use std::fmt;

use crate::error::ConsumerError;
use crate::event::{EventKind, Notification};
use crate::subscription::ConsumerId;
use crate::types::NodeId;

/// Why a dispatch delivered nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// A value changed on a device that is not ready yet.
    Gated,
    /// The event referenced a node missing from the cache.
    UnknownNode(NodeId),
    /// A removed value was never cached.
    MissingValue,
    /// The session has already failed.
    AfterFailure,
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gated => f.write_str("device not ready"),
            Self::UnknownNode(node) => write!(f, "unknown node {node}"),
            Self::MissingValue => f.write_str("value not cached"),
            Self::AfterFailure => f.write_str("driver failed"),
        }
    }
}

/// Result of delivering a notification to one subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// The subscriber.
    pub consumer: ConsumerId,
    /// What its callback returned.
    pub result: Result<(), ConsumerError>,
}

impl Delivery {
    /// Returns `true` if the callback succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Outcome of dispatching one driver event.
///
/// Lists every subscriber the notification was delivered to, in delivery
/// order, with the result of its callback.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport {
    kind: EventKind,
    notification: Option<Notification>,
    deliveries: Vec<Delivery>,
    skipped: Option<Skip>,
}

impl DispatchReport {
    pub(crate) fn delivered(notification: Notification, deliveries: Vec<Delivery>) -> Self {
        Self {
            kind: notification.kind,
            notification: Some(notification),
            deliveries,
            skipped: None,
        }
    }

    pub(crate) fn skipped(kind: EventKind, skip: Skip) -> Self {
        Self {
            kind,
            notification: None,
            deliveries: Vec::new(),
            skipped: Some(skip),
        }
    }

    /// Returns the kind of the dispatched event.
    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Returns the notification, unless the event was skipped.
    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    /// Returns the reason nothing was delivered, if any.
    #[must_use]
    pub fn skip(&self) -> Option<Skip> {
        self.skipped
    }

    /// Returns `true` if a value change was held back by the readiness gate.
    #[must_use]
    pub fn was_gated(&self) -> bool {
        self.skipped == Some(Skip::Gated)
    }

    /// Returns every delivery in order.
    #[must_use]
    pub fn deliveries(&self) -> &[Delivery] {
        &self.deliveries
    }

    /// Returns the number of subscribers the notification reached.
    #[must_use]
    pub fn delivered_count(&self) -> usize {
        self.deliveries.len()
    }

    /// Returns the deliveries whose callback failed.
    pub fn failures(&self) -> impl Iterator<Item = &Delivery> {
        self.deliveries.iter().filter(|delivery| !delivery.is_ok())
    }

    /// Returns `true` if every callback succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.deliveries.iter().all(Delivery::is_ok)
    }

    /// Returns `true` if the consumer received the notification.
    #[must_use]
    pub fn reached(&self, consumer: &ConsumerId) -> bool {
        self.deliveries
            .iter()
            .any(|delivery| &delivery.consumer == consumer)
    }
}
