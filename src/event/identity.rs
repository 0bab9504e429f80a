// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity tokens that disambiguate devices across sessions.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{HomeId, NodeId};

/// Home token used before the driver has reported a home id.
const UNKNOWN_HOME_TOKEN: &str = "00000000";

/// Identifier of one bridge installation.
///
/// A token is generated once per controller and never changes for its
/// lifetime. It is the first segment of every [`IdentityToken`].
///
/// # Examples
///
/// ```
/// use zwave_bridge::event::InstallationToken;
///
/// let token = InstallationToken::new();
/// assert_eq!(token.to_string().len(), 32);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstallationToken(Uuid);

impl InstallationToken {
    /// Creates a new random installation token.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a token from an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Builds the identity token of a node on the given network.
    #[must_use]
    pub fn identity(&self, home_id: Option<HomeId>, node_id: NodeId) -> IdentityToken {
        let home = home_id.map_or_else(|| UNKNOWN_HOME_TOKEN.to_string(), |h| h.token());
        IdentityToken(format!("{self}-{home}-{node_id}"))
    }
}

impl Default for InstallationToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let simple = self.0.simple().to_string();
        write!(f, "InstallationToken({}...)", &simple[..8])
    }
}

impl fmt::Display for InstallationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Globally unique device tag: `<installation>-<home>-<node>`.
///
/// Attached as `uid` to every payload carrying a node id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityToken(String);

impl IdentityToken {
    /// Returns the token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_token() -> InstallationToken {
        InstallationToken::from_uuid(Uuid::parse_str("a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8").unwrap())
    }

    #[test]
    fn new_creates_unique_tokens() {
        assert_ne!(InstallationToken::new(), InstallationToken::new());
    }

    #[test]
    fn identity_format() {
        let uid = fixed_token().identity(Some(HomeId::new(0x0163_4f2a)), NodeId::new(5));
        assert_eq!(uid.as_str(), "a1a2a3a4b1b2c1c2d1d2d3d4d5d6d7d8-01634f2a-5");
    }

    #[test]
    fn identity_before_driver_ready() {
        let uid = fixed_token().identity(None, NodeId::new(12));
        assert!(uid.as_str().ends_with("-00000000-12"));
    }

    #[test]
    fn identity_is_stable_for_same_inputs() {
        let token = fixed_token();
        let home = Some(HomeId::new(7));
        assert_eq!(
            token.identity(home, NodeId::new(1)),
            token.identity(home, NodeId::new(1))
        );
        assert_ne!(
            token.identity(home, NodeId::new(1)),
            token.identity(home, NodeId::new(2))
        );
    }

    #[test]
    fn debug_format() {
        let debug = format!("{:?}", fixed_token());
        assert_eq!(debug, "InstallationToken(a1a2a3a4...)");
    }
}
