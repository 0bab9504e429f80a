// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumer identities and subscription callbacks.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

use crate::error::ConsumerError;
use crate::event::Notification;

/// Identity of a consumer registered with the bridge.
///
/// The host chooses the id (typically its own node id); [`ConsumerId::generate`]
/// creates a random one for hosts that do not have ids of their own.
///
/// # Examples
///
/// ```
/// use zwave_bridge::subscription::ConsumerId;
///
/// let id = ConsumerId::new("a1b2.c3d4");
/// assert_eq!(id.as_str(), "a1b2.c3d4");
/// assert_ne!(ConsumerId::generate(), ConsumerId::generate());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConsumerId(String);

impl ConsumerId {
    /// Creates a consumer id from host-provided text.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a random consumer id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Returns the id text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConsumerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Callback invoked for each notification of a subscribed kind.
///
/// A callback reports failure through its return value; the dispatcher
/// records the failure and carries on with the remaining subscribers.
pub type Callback = Arc<dyn Fn(&Notification) -> Result<(), ConsumerError> + Send + Sync>;

/// Wraps a closure into a [`Callback`].
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(&Notification) -> Result<(), ConsumerError> + Send + Sync + 'static,
{
    Arc::new(f)
}
