// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! What happens when the driver fails.

use crate::error::Error;

/// Decides what to do once the driver session has failed.
///
/// Called after every subscriber has been notified of the failure and the
/// driver has been disconnected.
pub trait ShutdownHook: Send + Sync {
    /// Handles the terminal failure.
    fn shutdown(&self, error: &Error);
}

/// Exits the process with status 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExit;

impl ShutdownHook for ProcessExit {
    fn shutdown(&self, error: &Error) {
        tracing::error!(error = %error, "Exiting");
        std::process::exit(1);
    }
}

/// Only logs the failure and leaves the process running.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnly;

impl ShutdownHook for LogOnly {
    fn shutdown(&self, error: &Error) {
        tracing::error!(error = %error, "Driver session ended");
    }
}

impl<F> ShutdownHook for F
where
    F: Fn(&Error) + Send + Sync,
{
    fn shutdown(&self, error: &Error) {
        self(error);
    }
}
