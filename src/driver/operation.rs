// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Closed set of driver operations reachable through passthrough commands.

use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

macro_rules! driver_operations {
    ($( $(#[$doc:meta])* $variant:ident => $name:literal, )+) => {
        /// An operation exposed by the network driver.
        ///
        /// Passthrough commands name their operation by its camelCase
        /// string. Only the names listed here are ever invoked; anything
        /// else is rejected with [`CommandError::UnknownOperation`].
        ///
        /// # Examples
        ///
        /// ```
        /// use zwave_bridge::driver::DriverOperation;
        ///
        /// let op: DriverOperation = "healNetworkNode".parse().unwrap();
        /// assert_eq!(op, DriverOperation::HealNetworkNode);
        /// assert_eq!(op.as_str(), "healNetworkNode");
        ///
        /// assert!("unknownOp".parse::<DriverOperation>().is_err());
        /// ```
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum DriverOperation {
            $( $(#[$doc])* $variant, )+
        }

        impl DriverOperation {
            /// Every operation, in declaration order.
            pub const ALL: &'static [Self] = &[ $( Self::$variant, )+ ];

            /// Returns the camelCase operation name.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $name, )+
                }
            }
        }

        impl FromStr for DriverOperation {
            type Err = CommandError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(Self::$variant), )+
                    other => Err(CommandError::UnknownOperation(other.to_string())),
                }
            }
        }
    };
}

driver_operations! {
    /// Sets a value on a node.
    SetValue => "setValue",
    /// Switches a binary switch on.
    SetNodeOn => "setNodeOn",
    /// Switches a binary switch off.
    SetNodeOff => "setNodeOff",
    /// Sets the level of a multilevel switch.
    SetNodeLevel => "setNodeLevel",
    /// Enables polling of a command class.
    EnablePoll => "enablePoll",
    /// Disables polling of a command class.
    DisablePoll => "disablePoll",
    /// Sets the global poll interval.
    SetPollInterval => "setPollInterval",
    /// Asks a node to report a value again.
    RefreshValue => "refreshValue",
    /// Re-runs the interview of a node.
    RefreshNodeInfo => "refreshNodeInfo",
    /// Requests the dynamic state of a node.
    RequestNodeState => "requestNodeState",
    /// Sets the name of a node.
    SetNodeName => "setNodeName",
    /// Sets the location of a node.
    SetNodeLocation => "setNodeLocation",
    /// Writes a configuration parameter.
    SetConfigParam => "setConfigParam",
    /// Reads a configuration parameter.
    RequestConfigParam => "requestConfigParam",
    /// Reads every configuration parameter.
    RequestAllConfigParams => "requestAllConfigParams",
    /// Adds a node to an association group.
    AddAssociation => "addAssociation",
    /// Removes a node from an association group.
    RemoveAssociation => "removeAssociation",
    /// Heals every route of the network.
    HealNetwork => "healNetwork",
    /// Heals the routes of one node.
    HealNetworkNode => "healNetworkNode",
    /// Resets the controller without losing the network.
    SoftReset => "softReset",
    /// Resets the controller to factory defaults.
    HardReset => "hardReset",
    /// Starts inclusion.
    AddNode => "addNode",
    /// Starts exclusion.
    RemoveNode => "removeNode",
    /// Removes a node marked as failed.
    RemoveFailedNode => "removeFailedNode",
    /// Checks whether a node has failed.
    HasNodeFailed => "hasNodeFailed",
    /// Requests a network update from the primary controller.
    RequestNetworkUpdate => "requestNetworkUpdate",
    /// Cancels the running controller command.
    CancelControllerCommand => "cancelControllerCommand",
    /// Writes the network layout to disk.
    WriteConfig => "writeConfig",
    /// Activates a scene.
    ActivateScene => "activateScene",
    /// Creates a scene.
    CreateScene => "createScene",
    /// Removes a scene.
    RemoveScene => "removeScene",
}

impl fmt::Display for DriverOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
