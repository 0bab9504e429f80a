// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fan-out of driver events to subscribers.
//!
//! Dispatching happens in two steps:
//!
//! 1. [`Dispatcher::apply`] updates the cache, consults the readiness gate
//!    and snapshots the matching subscribers.
//! 2. [`Dispatch::deliver`] runs the callbacks and collects their results
//!    into a [`DispatchReport`].
//!
//! The controller holds its lock only for the first step.

mod dispatcher;
mod report;

pub use dispatcher::{Dispatch, Dispatcher};
pub use report::{Delivery, DispatchReport, Skip};
