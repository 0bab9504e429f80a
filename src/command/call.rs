// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Normalized driver calls.

use std::fmt;

use crate::driver::{DriverOperation, NetworkDriver};
use crate::error::DriverError;
use crate::types::{NodeId, ValueId, ZValue};

/// A single call into the network driver.
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundCall {
    /// Set a value on a node.
    SetValue {
        /// The target node.
        node_id: NodeId,
        /// The value address.
        id: ValueId,
        /// The new state.
        value: ZValue,
    },
    /// Invoke a named operation.
    Invoke {
        /// The operation.
        operation: DriverOperation,
        /// Positional arguments.
        args: Vec<serde_json::Value>,
    },
}

impl OutboundCall {
    /// Returns the driver operation this call maps to.
    #[must_use]
    pub fn operation(&self) -> DriverOperation {
        match self {
            Self::SetValue { .. } => DriverOperation::SetValue,
            Self::Invoke { operation, .. } => *operation,
        }
    }

    /// Sends the call to the driver.
    ///
    /// # Errors
    ///
    /// Returns the driver's error if it rejected the call.
    pub async fn send<D: NetworkDriver>(self, driver: &D) -> Result<(), DriverError> {
        tracing::debug!(call = %self, "Sending driver call");
        match self {
            Self::SetValue { node_id, id, value } => driver.set_value(node_id, id, value).await,
            Self::Invoke { operation, args } => driver.invoke(operation, args).await,
        }
    }
}

impl fmt::Display for OutboundCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetValue { node_id, id, value } => {
                write!(f, "setValue({node_id}, {id}, {value})")
            }
            Self::Invoke { operation, args } => {
                write!(f, "{operation}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}
