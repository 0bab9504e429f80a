// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver session management.
//!
//! - [`Controller`] - One driver session: driver handle, device cache,
//!   subscriptions and readiness state
//! - [`Bridge`] - Guarantees a single controller per bridge
//! - [`ControllerConfig`] - Port, driver options and dispatch settings
//! - [`ShutdownHook`] - What to do once the driver has failed
//!
//! # Lifecycle
//!
//! ```text
//! Bridge::controller ──▶ Controller::new ──▶ connect ──▶ event loop
//!                                                          │
//!                       driver events ─▶ handle_event ◀────┘
//!                                          │
//!                        driver failed ─▶ notify ─▶ disconnect ─▶ ShutdownHook
//! ```

mod bridge;
mod config;
mod session;
mod shutdown;

pub use bridge::Bridge;
pub use config::{ControllerConfig, DEFAULT_SOURCE, DEFAULT_STATUS_REVERT_DELAY};
pub use session::Controller;
pub use shutdown::{LogOnly, ProcessExit, ShutdownHook};
