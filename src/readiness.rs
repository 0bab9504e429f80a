// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver readiness state machine and value-change gating.
//!
//! ```text
//! Disconnected ──connect──▶ Connecting ──driver ready──▶ Ready
//!       ▲                        │                         │
//!       └────────shutdown────────┴─────────────────────────┤
//!                                │                         │
//!                                └──driver failed──▶ Failed (terminal)
//! ```

use std::fmt;

/// Connection state of the driver session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// No connection has been attempted, or the session was shut down.
    Disconnected,
    /// A connection attempt is in progress.
    Connecting,
    /// The driver reported ready.
    Ready,
    /// No controller is reachable. Terminal.
    Failed,
}

impl DriverState {
    /// Returns `true` if the driver is ready.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Returns `true` if the session has failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns `true` while a session is connecting or connected.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Connecting | Self::Ready)
    }
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::Failed => "failed",
        })
    }
}

/// Outcome of a connection request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectDecision {
    /// No session exists; the caller must open one.
    Open,
    /// A session is connecting or connected; reuse it.
    Reuse,
    /// The session failed; no new connection may be opened.
    Refuse,
}

/// Tracks the driver state and decides whether value changes are forwarded.
///
/// # Examples
///
/// ```
/// use zwave_bridge::readiness::{ConnectDecision, DriverState, ReadinessGate};
///
/// let mut gate = ReadinessGate::new(false);
/// assert_eq!(gate.begin_connect(), ConnectDecision::Open);
/// assert_eq!(gate.begin_connect(), ConnectDecision::Reuse);
///
/// gate.mark_ready();
/// assert_eq!(gate.state(), DriverState::Ready);
///
/// assert!(gate.should_forward_change(true));
/// assert!(!gate.should_forward_change(false));
/// ```
#[derive(Debug, Clone)]
pub struct ReadinessGate {
    state: DriverState,
    allow_unready_updates: bool,
}

impl ReadinessGate {
    /// Creates a gate in the `Disconnected` state.
    ///
    /// With `allow_unready_updates` set, value changes of devices that are
    /// not yet ready are forwarded as well.
    #[must_use]
    pub fn new(allow_unready_updates: bool) -> Self {
        Self {
            state: DriverState::Disconnected,
            allow_unready_updates,
        }
    }

    /// Returns the current driver state.
    #[must_use]
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Returns `true` if changes of unready devices are forwarded.
    #[must_use]
    pub fn allows_unready_updates(&self) -> bool {
        self.allow_unready_updates
    }

    /// Requests a connection.
    ///
    /// Moves `Disconnected` to `Connecting` and returns
    /// [`ConnectDecision::Open`]; any other state leaves the gate unchanged.
    pub fn begin_connect(&mut self) -> ConnectDecision {
        match self.state {
            DriverState::Disconnected => {
                self.state = DriverState::Connecting;
                ConnectDecision::Open
            }
            DriverState::Connecting | DriverState::Ready => ConnectDecision::Reuse,
            DriverState::Failed => ConnectDecision::Refuse,
        }
    }

    /// Records that the driver reported ready.
    ///
    /// Returns `false` (and keeps the state) if the session already failed.
    pub fn mark_ready(&mut self) -> bool {
        if self.state.is_failed() {
            tracing::warn!("Ignoring driver ready after failure");
            return false;
        }
        self.state = DriverState::Ready;
        true
    }

    /// Records that the driver failed. The state becomes terminal.
    pub fn mark_failed(&mut self) {
        self.state = DriverState::Failed;
    }

    /// Records an orderly shutdown.
    ///
    /// A failed session stays failed.
    pub fn mark_disconnected(&mut self) {
        if !self.state.is_failed() {
            self.state = DriverState::Disconnected;
        }
    }

    /// Decides whether a value change should be forwarded to subscribers.
    #[must_use]
    pub fn should_forward_change(&self, device_ready: bool) -> bool {
        device_ready || self.allow_unready_updates
    }
}
