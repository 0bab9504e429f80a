// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! At most one driver session per bridge.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::driver::NetworkDriver;
use crate::error::Result;
use crate::status::{ConsumerHost, TracingHost};

use super::{Controller, ControllerConfig, ProcessExit, ShutdownHook};

type DriverFactory<D> = Box<dyn Fn() -> D + Send + Sync>;

/// Hands out the single [`Controller`] of a process.
///
/// The first call to [`controller`](Self::controller) creates the driver,
/// builds the controller and connects it. Every later call returns the same
/// controller without opening a second session, so hosts that recreate
/// their consumers (for example on redeploy) keep the running session.
///
/// # Examples
///
/// ```ignore
/// use zwave_bridge::controller::{Bridge, ControllerConfig};
///
/// let bridge = Bridge::new(|| MyDriver::new());
/// let first = bridge.controller(ControllerConfig::new("/dev/ttyACM0")).await?;
/// let second = bridge.controller(ControllerConfig::new("/dev/ttyACM0")).await?;
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
/// ```
pub struct Bridge<D: NetworkDriver> {
    factory: DriverFactory<D>,
    host: Arc<dyn ConsumerHost>,
    shutdown: Arc<dyn ShutdownHook>,
    controller: Mutex<Option<Arc<Controller<D>>>>,
}

impl<D: NetworkDriver> Bridge<D> {
    /// Creates a bridge that builds its driver with `factory`.
    #[must_use]
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> D + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            host: Arc::new(TracingHost),
            shutdown: Arc::new(ProcessExit),
            controller: Mutex::new(None),
        }
    }

    /// Sets the host receiving status updates.
    #[must_use]
    pub fn with_host(mut self, host: Arc<dyn ConsumerHost>) -> Self {
        self.host = host;
        self
    }

    /// Sets the hook run after a driver failure.
    #[must_use]
    pub fn with_shutdown_hook(mut self, hook: Arc<dyn ShutdownHook>) -> Self {
        self.shutdown = hook;
        self
    }

    /// Returns the controller, creating and connecting it on first use.
    ///
    /// The configuration is only used the first time; later calls log a
    /// warning if they ask for a different port.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the configuration
    /// is invalid, [`Error::DriverFailed`](crate::Error::DriverFailed) if the
    /// session has failed, or the driver's error if connecting failed.
    pub async fn controller(&self, config: ControllerConfig) -> Result<Arc<Controller<D>>> {
        let mut slot = self.controller.lock().await;

        let controller = if let Some(existing) = slot.as_ref() {
            if existing.config().port != config.port {
                tracing::warn!(
                    port = %existing.config().port,
                    requested = %config.port,
                    "Driver session already open, ignoring requested port"
                );
            }
            Arc::clone(existing)
        } else {
            tracing::info!(port = %config.port, "Initializing Z-Wave controller");
            let controller = Controller::new((self.factory)(), config)?
                .with_host(Arc::clone(&self.host))
                .with_shutdown_hook(Arc::clone(&self.shutdown));
            let controller = Arc::new(controller);
            *slot = Some(Arc::clone(&controller));
            controller
        };

        controller.connect().await?;
        Ok(controller)
    }

    /// Returns the controller if one was created.
    pub async fn current(&self) -> Option<Arc<Controller<D>>> {
        self.controller.lock().await.clone()
    }
}

impl<D: NetworkDriver> std::fmt::Debug for Bridge<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge").finish_non_exhaustive()
    }
}
