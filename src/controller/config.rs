// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Controller configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::driver::{DriverOptions, duration_millis};
use crate::error::ConfigError;
use crate::types::CommandClass;

/// Default message topic prefix.
pub const DEFAULT_SOURCE: &str = "zwave";

/// Default delay before a transient status reverts.
pub const DEFAULT_STATUS_REVERT_DELAY: Duration = Duration::from_secs(2);

/// Configuration of a [`Controller`](super::Controller).
///
/// Can be built in code or deserialized from any serde format; missing
/// fields take their defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use zwave_bridge::controller::ControllerConfig;
///
/// let config = ControllerConfig::new("/dev/ttyACM0")
///     .with_allow_unready_updates(true)
///     .with_status_revert_delay(Duration::from_secs(5));
///
/// assert_eq!(config.port, "/dev/ttyACM0");
/// assert_eq!(config.source, "zwave");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerConfig {
    /// Serial port of the Z-Wave controller.
    pub port: String,
    /// Prefix of inbound message topics.
    pub source: String,
    /// Options passed to the driver on connect.
    pub driver: DriverOptions,
    /// Forward value changes of devices that are not ready yet.
    pub allow_unready_updates: bool,
    /// Command classes polled on ready nodes.
    pub poll_classes: Vec<CommandClass>,
    /// Delay before a transient status reverts.
    #[serde(with = "duration_millis")]
    pub status_revert_delay: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            source: DEFAULT_SOURCE.to_string(),
            driver: DriverOptions::default(),
            allow_unready_updates: false,
            poll_classes: CommandClass::DEFAULT_POLL.to_vec(),
            status_revert_delay: DEFAULT_STATUS_REVERT_DELAY,
        }
    }
}

impl ControllerConfig {
    /// Creates a configuration for a serial port.
    #[must_use]
    pub fn new(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    /// Sets the inbound topic prefix.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Sets the driver options.
    #[must_use]
    pub fn with_driver_options(mut self, options: DriverOptions) -> Self {
        self.driver = options;
        self
    }

    /// Forwards value changes of devices that are not ready yet.
    #[must_use]
    pub fn with_allow_unready_updates(mut self, allow: bool) -> Self {
        self.allow_unready_updates = allow;
        self
    }

    /// Sets the command classes polled on ready nodes.
    #[must_use]
    pub fn with_poll_classes(mut self, classes: impl IntoIterator<Item = CommandClass>) -> Self {
        self.poll_classes = classes.into_iter().collect();
        self
    }

    /// Sets the delay before a transient status reverts.
    #[must_use]
    pub fn with_status_revert_delay(mut self, delay: Duration) -> Self {
        self.status_revert_delay = delay;
        self
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the port or source is empty or
    /// the driver is allowed no connection attempts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port.trim().is_empty() {
            return Err(ConfigError::Invalid("port must not be empty".to_string()));
        }
        if self.source.trim().is_empty() {
            return Err(ConfigError::Invalid("source must not be empty".to_string()));
        }
        if self.driver.driver_attempts == 0 {
            return Err(ConfigError::Invalid(
                "driver attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
