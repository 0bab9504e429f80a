// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Consumer commands and their outbound driver calls.
//!
//! A consumer message is parsed into a [`Command`] at the boundary. The
//! topic selects the command by substring, checked in this order:
//!
//! | Topic contains | Command | Driver call |
//! |----------------|---------|-------------|
//! | `switchOn` | [`Command::SwitchOn`] | `set_value(node, 37, 1, 0, true)` |
//! | `switchOff` | [`Command::SwitchOff`] | `set_value(node, 37, 1, 0, false)` |
//! | `setLevel` | [`Command::SetLevel`] | `set_value(node, 38, 1, 0, value)` |
//! | `setValue` | [`Command::SetValue`] | `set_value(node, classId, instance, index, value)` |
//! | anything else | [`Command::Passthrough`] | `invoke(topic, args)` |
//!
//! `setValue` falls back to class 37, instance 1 and index 0 for fields
//! that are missing, null or zero. The last `/` separated segment of a
//! passthrough topic must name a [`DriverOperation`], so both
//! `healNetwork` and `livingroom/healNetwork` route.
//!
//! # Examples
//!
//! ```
//! use serde_json::json;
//! use zwave_bridge::command::{Command, OutboundCall};
//! use zwave_bridge::event::Message;
//! use zwave_bridge::types::{CommandClass, NodeId, ValueId, ZValue};
//!
//! let msg = Message::new("setLevel", json!({"nodeid": 5, "value": 77}));
//! let command = Command::parse(&msg).unwrap();
//!
//! assert_eq!(
//!     command.into_call(None).unwrap(),
//!     OutboundCall::SetValue {
//!         node_id: NodeId::new(5),
//!         id: ValueId::new(CommandClass::SWITCH_MULTILEVEL, 1, 0),
//!         value: ZValue::Int(77),
//!     }
//! );
//! ```

mod call;
mod payload;

pub use call::OutboundCall;

use crate::driver::DriverOperation;
use crate::error::{CommandError, Error};
use crate::event::Message;
use crate::types::{CommandClass, HomeId, NodeId, ValueId, ZValue};

use payload::CommandPayload;

/// A parsed consumer command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch a binary switch on.
    SwitchOn {
        /// The target node.
        node_id: NodeId,
    },
    /// Switch a binary switch off.
    SwitchOff {
        /// The target node.
        node_id: NodeId,
    },
    /// Set the level of a multilevel switch.
    SetLevel {
        /// The target node.
        node_id: NodeId,
        /// The new level.
        value: ZValue,
    },
    /// Set any value.
    SetValue {
        /// The target node.
        node_id: NodeId,
        /// The value address, with defaults applied.
        id: ValueId,
        /// The new state.
        value: ZValue,
    },
    /// Invoke a named driver operation.
    Passthrough {
        /// The operation.
        operation: DriverOperation,
        /// Positional arguments.
        args: Vec<serde_json::Value>,
        /// Whether to put the home id in front of the arguments.
        prepend_home_id: bool,
    },
}

impl Command {
    /// Parses a consumer message.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::MalformedPayload`] for unparsable JSON text,
    /// [`CommandError::NotAnObject`] or [`CommandError::InvalidPayload`] for
    /// payloads of the wrong shape, [`CommandError::MissingField`] when the
    /// command lacks its node or value, and
    /// [`CommandError::UnknownOperation`] when a passthrough topic names no
    /// driver operation.
    pub fn parse(message: &Message) -> Result<Self, CommandError> {
        let payload = CommandPayload::from_json(&message.payload)?;
        let topic = message.topic.as_str();

        if topic.contains("switchOn") {
            return Ok(Self::SwitchOn {
                node_id: NodeId::new(payload.require_node()?),
            });
        }
        if topic.contains("switchOff") {
            return Ok(Self::SwitchOff {
                node_id: NodeId::new(payload.require_node()?),
            });
        }
        if topic.contains("setLevel") {
            return Ok(Self::SetLevel {
                node_id: NodeId::new(payload.require_node()?),
                value: payload.require_value()?,
            });
        }
        if topic.contains("setValue") {
            let class_id = nonzero_or(payload.class_id, CommandClass::SWITCH_BINARY.value());
            return Ok(Self::SetValue {
                node_id: NodeId::new(payload.require_node()?),
                id: ValueId::new(
                    CommandClass::new(class_id),
                    nonzero_or(payload.instance, 1),
                    payload.index.unwrap_or(0),
                ),
                value: payload.require_value()?,
            });
        }

        Ok(Self::Passthrough {
            operation: operation_name(topic).parse()?,
            args: payload.args,
            prepend_home_id: payload.prepend_home_id,
        })
    }

    /// Returns the node the command targets, if it targets one.
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::SwitchOn { node_id }
            | Self::SwitchOff { node_id }
            | Self::SetLevel { node_id, .. }
            | Self::SetValue { node_id, .. } => Some(*node_id),
            Self::Passthrough { .. } => None,
        }
    }

    /// Returns the name of the command.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SwitchOn { .. } => "switchOn",
            Self::SwitchOff { .. } => "switchOff",
            Self::SetLevel { .. } => "setLevel",
            Self::SetValue { .. } => "setValue",
            Self::Passthrough { operation, .. } => operation.as_str(),
        }
    }

    /// Normalizes the command into a single driver call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotReady`] if the command asks for the home id to be
    /// prepended before the driver reported one.
    pub fn into_call(self, home_id: Option<HomeId>) -> Result<OutboundCall, Error> {
        let switch = |node_id, on: bool| OutboundCall::SetValue {
            node_id,
            id: ValueId::new(CommandClass::SWITCH_BINARY, 1, 0),
            value: ZValue::Bool(on),
        };

        Ok(match self {
            Self::SwitchOn { node_id } => switch(node_id, true),
            Self::SwitchOff { node_id } => switch(node_id, false),
            Self::SetLevel { node_id, value } => OutboundCall::SetValue {
                node_id,
                id: ValueId::new(CommandClass::SWITCH_MULTILEVEL, 1, 0),
                value,
            },
            Self::SetValue { node_id, id, value } => OutboundCall::SetValue { node_id, id, value },
            Self::Passthrough {
                operation,
                mut args,
                prepend_home_id,
            } => {
                if prepend_home_id {
                    let home_id = home_id.ok_or(Error::NotReady)?;
                    args.insert(0, serde_json::Value::from(home_id.value()));
                }
                OutboundCall::Invoke { operation, args }
            }
        })
    }
}

fn nonzero_or(field: Option<u8>, default: u8) -> u8 {
    field.filter(|v| *v != 0).unwrap_or(default)
}

fn operation_name(topic: &str) -> &str {
    topic.rsplit('/').next().unwrap_or(topic).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(topic: &str, payload: serde_json::Value) -> Result<Command, CommandError> {
        Command::parse(&Message::new(topic, payload))
    }

    #[test]
    fn switch_commands() {
        assert_eq!(
            parse("switchOn", json!({"nodeid": 2})).unwrap(),
            Command::SwitchOn {
                node_id: NodeId::new(2)
            }
        );
        assert_eq!(
            parse("livingroom/switchOff", json!({"nodeid": 2})).unwrap(),
            Command::SwitchOff {
                node_id: NodeId::new(2)
            }
        );
    }

    #[test]
    fn switch_on_call() {
        let call = parse("switchOn", json!({"nodeid": 2}))
            .unwrap()
            .into_call(None)
            .unwrap();
        assert_eq!(
            call,
            OutboundCall::SetValue {
                node_id: NodeId::new(2),
                id: ValueId::new(CommandClass::SWITCH_BINARY, 1, 0),
                value: ZValue::Bool(true),
            }
        );
    }

    #[test]
    fn set_level_call() {
        let call = parse("setLevel", json!({"nodeid": 5, "value": 77}))
            .unwrap()
            .into_call(None)
            .unwrap();
        assert_eq!(
            call,
            OutboundCall::SetValue {
                node_id: NodeId::new(5),
                id: ValueId::new(CommandClass::SWITCH_MULTILEVEL, 1, 0),
                value: ZValue::Int(77),
            }
        );
    }

    #[test]
    fn set_value_defaults() {
        let command = parse("setValue", json!({"nodeid": 7, "value": true})).unwrap();
        assert_eq!(
            command,
            Command::SetValue {
                node_id: NodeId::new(7),
                id: ValueId::new(CommandClass::SWITCH_BINARY, 1, 0),
                value: ZValue::Bool(true),
            }
        );
    }

    #[test]
    fn set_value_zero_fields_fall_back() {
        let command = parse(
            "setValue",
            json!({"nodeid": 7, "classId": 0, "instance": 0, "index": 0, "value": 1}),
        )
        .unwrap();
        assert_eq!(
            command,
            Command::SetValue {
                node_id: NodeId::new(7),
                id: ValueId::new(CommandClass::SWITCH_BINARY, 1, 0),
                value: ZValue::Int(1),
            }
        );
    }

    #[test]
    fn set_value_explicit_address() {
        let command = parse(
            "setValue",
            json!({"nodeid": 7, "cmdclass": 112, "instance": 2, "cmdidx": 3, "value": 10}),
        )
        .unwrap();
        assert_eq!(
            command,
            Command::SetValue {
                node_id: NodeId::new(7),
                id: ValueId::new(CommandClass::CONFIGURATION, 2, 3),
                value: ZValue::Int(10),
            }
        );
    }

    #[test]
    fn topic_order_prefers_switch_on() {
        let command = parse("switchOn-setValue", json!({"nodeid": 1, "value": 3})).unwrap();
        assert!(matches!(command, Command::SwitchOn { .. }));
    }

    #[test]
    fn missing_fields() {
        assert!(matches!(
            parse("switchOn", json!({})).unwrap_err(),
            CommandError::MissingField("nodeid")
        ));
        assert!(matches!(
            parse("setLevel", json!({"nodeid": 5})).unwrap_err(),
            CommandError::MissingField("value")
        ));
    }

    #[test]
    fn passthrough_known_operation() {
        let command = parse("healNetworkNode", json!({"args": [5, true]})).unwrap();
        assert_eq!(command.name(), "healNetworkNode");
        assert_eq!(command.node_id(), None);
        assert_eq!(
            command.into_call(None).unwrap(),
            OutboundCall::Invoke {
                operation: DriverOperation::HealNetworkNode,
                args: vec![json!(5), json!(true)],
            }
        );
    }

    #[test]
    fn passthrough_unknown_operation() {
        let err = parse("unknownOp", json!({"args": [1, 2]})).unwrap_err();
        assert!(matches!(err, CommandError::UnknownOperation(ref op) if op == "unknownOp"));
    }

    #[test]
    fn passthrough_uses_last_topic_segment() {
        let command = parse("livingroom/healNetwork", json!({})).unwrap();
        assert_eq!(command.name(), "healNetwork");

        let err = parse("healNetwork/extra", json!({})).unwrap_err();
        assert!(matches!(err, CommandError::UnknownOperation(ref op) if op == "extra"));
    }

    #[test]
    fn passthrough_prepends_home_id() {
        let command = parse("softReset", json!({"prependHomeId": true})).unwrap();
        assert_eq!(
            command.clone().into_call(Some(HomeId::new(0xc0ffee))).unwrap(),
            OutboundCall::Invoke {
                operation: DriverOperation::SoftReset,
                args: vec![json!(0x00c0_ffee)],
            }
        );
        assert!(matches!(command.into_call(None), Err(Error::NotReady)));
    }

    #[test]
    fn malformed_text_payload() {
        let err = Command::parse(&Message::with_text("switchOn", "{oops")).unwrap_err();
        assert!(matches!(err, CommandError::MalformedPayload(_)));
    }
}
