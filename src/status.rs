// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumer status indicators.
//!
//! Every consumer shows a small status indicator in its host: a fill color,
//! a shape and a short text. The [`StatusBoard`] keeps one steady status
//! derived from the driver state and applies short-lived statuses after
//! dispatches. Transient statuses revert to the steady one after a fixed
//! delay unless a newer status replaced them first.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;

use crate::event::{EventKind, EventPayload, Notification};
use crate::readiness::DriverState;
use crate::subscription::ConsumerId;

/// Fill color of a status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fill {
    /// Error or disconnected.
    Red,
    /// Connected and healthy.
    Green,
    /// Activity or pending.
    Yellow,
}

/// Shape of a status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Hollow indicator.
    Ring,
    /// Solid indicator.
    Dot,
}

/// A status indicator shown by the consumer host.
///
/// # Examples
///
/// ```
/// use zwave_bridge::status::{Fill, Shape, Status};
///
/// let status = Status::connected("0xc0ffee");
/// assert_eq!(status.fill, Fill::Green);
/// assert_eq!(status.shape, Shape::Dot);
/// assert_eq!(status.text, "0xc0ffee");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Fill color.
    pub fill: Fill,
    /// Indicator shape.
    pub shape: Shape,
    /// Short text.
    pub text: String,
}

impl Status {
    /// Creates a status.
    #[must_use]
    pub fn new(fill: Fill, shape: Shape, text: impl Into<String>) -> Self {
        Self {
            fill,
            shape,
            text: text.into(),
        }
    }

    /// Red ring "disconnected".
    #[must_use]
    pub fn disconnected() -> Self {
        Self::new(Fill::Red, Shape::Ring, "disconnected")
    }

    /// Yellow ring "connecting".
    #[must_use]
    pub fn connecting() -> Self {
        Self::new(Fill::Yellow, Shape::Ring, "connecting")
    }

    /// Green dot showing the network's home id.
    #[must_use]
    pub fn connected(home_hex: impl Into<String>) -> Self {
        Self::new(Fill::Green, Shape::Dot, home_hex)
    }

    /// Red ring "driver failed".
    #[must_use]
    pub fn failed() -> Self {
        Self::new(Fill::Red, Shape::Ring, "driver failed")
    }

    /// Red ring with an error text.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(Fill::Red, Shape::Ring, text)
    }

    /// Returns the steady status for a driver state.
    ///
    /// `home_hex` is shown once the driver is ready.
    #[must_use]
    pub fn for_driver_state(state: DriverState, home_hex: Option<&str>) -> Self {
        match state {
            DriverState::Disconnected => Self::disconnected(),
            DriverState::Connecting => Self::connecting(),
            DriverState::Ready => Self::connected(home_hex.unwrap_or("ready")),
            DriverState::Failed => Self::failed(),
        }
    }

    /// Returns the status shown by subscribers that received a notification.
    ///
    /// Driver lifecycle events return `None`; they change the steady status
    /// of every consumer instead.
    #[must_use]
    pub fn for_notification(notification: &Notification) -> Option<StatusUpdate> {
        let node = notification
            .node_id()
            .map_or_else(String::new, |node| format!("node {node} "));

        let update = match notification.kind {
            EventKind::DriverReady | EventKind::DriverFailed => return None,
            EventKind::NodeAdded | EventKind::NodeRemoved => StatusUpdate::steady(Self::new(
                Fill::Yellow,
                Shape::Ring,
                format!("{node}{}", notification.kind.as_str().trim_start_matches("node ")),
            )),
            EventKind::NodeReady => {
                StatusUpdate::steady(Self::new(Fill::Green, Shape::Dot, format!("{node}ready")))
            }
            EventKind::ValueAdded | EventKind::ValueChanged | EventKind::ValueRemoved => {
                StatusUpdate::steady(Self::new(
                    Fill::Green,
                    Shape::Dot,
                    format!("{node}{}", notification.kind),
                ))
            }
            EventKind::Notification | EventKind::ControllerCommand | EventKind::SceneEvent => {
                let text = match &notification.payload {
                    EventPayload::Notice { human_text, .. } => format!("{node}{human_text}"),
                    _ => notification.kind.to_string(),
                };
                StatusUpdate::transient(Self::new(Fill::Yellow, Shape::Dot, text))
            }
            EventKind::ScanComplete => {
                StatusUpdate::steady(Self::new(Fill::Green, Shape::Dot, "scan complete"))
            }
        };
        Some(update)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}: {}", self.fill, self.shape, self.text)
    }
}

/// A status together with its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    /// The status to show.
    pub status: Status,
    /// Whether the status reverts to the steady one after the revert delay.
    pub transient: bool,
}

impl StatusUpdate {
    /// A status that stays until replaced.
    #[must_use]
    pub fn steady(status: Status) -> Self {
        Self {
            status,
            transient: false,
        }
    }

    /// A status that reverts after the revert delay.
    #[must_use]
    pub fn transient(status: Status) -> Self {
        Self {
            status,
            transient: true,
        }
    }
}

/// The runtime hosting consumers.
///
/// The bridge only calls back into the host to update status indicators;
/// messages reach consumers through their subscription callbacks.
pub trait ConsumerHost: Send + Sync {
    /// Shows a status on the consumer's indicator.
    fn set_status(&self, consumer: &ConsumerId, status: &Status);
}

/// A host that only logs status changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHost;

impl ConsumerHost for TracingHost {
    fn set_status(&self, consumer: &ConsumerId, status: &Status) {
        tracing::debug!(consumer = %consumer, status = %status, "Consumer status");
    }
}

#[derive(Debug, Default)]
struct BoardState {
    steady: Option<Status>,
    generations: HashMap<ConsumerId, u64>,
}

impl BoardState {
    fn steady(&self) -> Status {
        self.steady.clone().unwrap_or_else(Status::disconnected)
    }

    fn bump(&mut self, consumer: &ConsumerId) -> u64 {
        let generation = self.generations.entry(consumer.clone()).or_insert(0);
        *generation += 1;
        *generation
    }
}

/// Tracks the status of every attached consumer.
///
/// Each status change bumps the consumer's generation. A pending revert
/// only applies if the generation is still the one it was scheduled for.
pub struct StatusBoard {
    host: Arc<dyn ConsumerHost>,
    revert_delay: Duration,
    state: Arc<Mutex<BoardState>>,
}

impl StatusBoard {
    /// Creates a board reporting to `host`.
    #[must_use]
    pub fn new(host: Arc<dyn ConsumerHost>, revert_delay: Duration) -> Self {
        Self {
            host,
            revert_delay,
            state: Arc::new(Mutex::new(BoardState::default())),
        }
    }

    /// Returns the delay after which transient statuses revert.
    #[must_use]
    pub fn revert_delay(&self) -> Duration {
        self.revert_delay
    }

    /// Attaches a consumer and shows the steady status.
    ///
    /// Attaching an already attached consumer does nothing.
    pub fn attach(&self, consumer: &ConsumerId) {
        let status = {
            let mut state = self.state.lock();
            if state.generations.contains_key(consumer) {
                return;
            }
            state.bump(consumer);
            state.steady()
        };
        self.host.set_status(consumer, &status);
    }

    /// Detaches a consumer and shows "disconnected" one last time.
    pub fn detach(&self, consumer: &ConsumerId) {
        if self.state.lock().generations.remove(consumer).is_some() {
            self.host.set_status(consumer, &Status::disconnected());
        }
    }

    /// Returns `true` if the consumer is attached.
    #[must_use]
    pub fn is_attached(&self, consumer: &ConsumerId) -> bool {
        self.state.lock().generations.contains_key(consumer)
    }

    /// Returns the current steady status.
    #[must_use]
    pub fn steady(&self) -> Status {
        self.state.lock().steady()
    }

    /// Replaces the steady status and shows it on every attached consumer.
    ///
    /// Pending reverts are superseded.
    pub fn set_steady(&self, status: Status) {
        let consumers: Vec<ConsumerId> = {
            let mut state = self.state.lock();
            state.steady = Some(status.clone());
            let consumers: Vec<_> = state.generations.keys().cloned().collect();
            for consumer in &consumers {
                state.bump(consumer);
            }
            consumers
        };
        for consumer in &consumers {
            self.host.set_status(consumer, &status);
        }
    }

    /// Shows a status that stays until replaced.
    pub fn set(&self, consumer: &ConsumerId, status: &Status) {
        self.state.lock().bump(consumer);
        self.host.set_status(consumer, status);
    }

    /// Shows a status and schedules the revert to the steady status.
    ///
    /// Outside a tokio runtime nothing can be scheduled and the steady status
    /// is restored immediately.
    pub fn set_transient(&self, consumer: &ConsumerId, status: &Status) {
        let generation = self.state.lock().bump(consumer);
        self.host.set_status(consumer, status);

        let host = Arc::clone(&self.host);
        let state = Arc::clone(&self.state);
        let consumer = consumer.clone();
        let revert = move || {
            let steady = {
                let state = state.lock();
                if state.generations.get(&consumer) != Some(&generation) {
                    return;
                }
                state.steady()
            };
            tracing::trace!(consumer = %consumer, "Reverting transient status");
            host.set_status(&consumer, &steady);
        };

        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("No runtime to schedule status revert, reverting now");
            revert();
            return;
        };
        let delay = self.revert_delay;
        runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            revert();
        });
    }

    /// Applies a status update.
    pub fn apply(&self, consumer: &ConsumerId, update: &StatusUpdate) {
        if update.transient {
            self.set_transient(consumer, &update.status);
        } else {
            self.set(consumer, &update.status);
        }
    }
}

impl fmt::Debug for StatusBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("StatusBoard")
            .field("revert_delay", &self.revert_delay)
            .field("steady", &state.steady)
            .field("consumers", &state.generations.len())
            .finish_non_exhaustive()
    }
}
