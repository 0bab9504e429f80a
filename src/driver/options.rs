// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Options passed to the network driver when connecting.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::duration_millis;

/// Default number of connection attempts before the driver gives up.
pub const DEFAULT_DRIVER_ATTEMPTS: u32 = 3;

/// Default interval between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Options for a driver session.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use zwave_bridge::driver::DriverOptions;
///
/// let options = DriverOptions::default()
///     .with_driver_attempts(5)
///     .with_poll_interval(Duration::from_secs(1));
///
/// assert_eq!(options.driver_attempts, 5);
/// assert!(options.suppress_refresh);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DriverOptions {
    /// Write the driver's own log file.
    pub logging: bool,
    /// Copy the driver's log to the console.
    pub console_output: bool,
    /// Write the network layout when it changes.
    pub save_config: bool,
    /// Do not report value updates that did not change anything.
    pub suppress_refresh: bool,
    /// Connection attempts before the driver reports failure.
    pub driver_attempts: u32,
    /// Interval between polls of polled values.
    #[serde(with = "duration_millis")]
    pub poll_interval: Duration,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            logging: false,
            console_output: false,
            save_config: true,
            suppress_refresh: true,
            driver_attempts: DEFAULT_DRIVER_ATTEMPTS,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl DriverOptions {
    /// Sets the number of connection attempts.
    #[must_use]
    pub fn with_driver_attempts(mut self, attempts: u32) -> Self {
        self.driver_attempts = attempts;
        self
    }

    /// Sets the poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Enables the driver's own log file.
    #[must_use]
    pub fn with_logging(mut self, logging: bool) -> Self {
        self.logging = logging;
        self
    }

    /// Enables copying the driver's log to the console.
    #[must_use]
    pub fn with_console_output(mut self, console_output: bool) -> Self {
        self.console_output = console_output;
        self
    }
}
