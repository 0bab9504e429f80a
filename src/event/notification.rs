// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Enriched notifications delivered to consumers.

use serde::{Deserialize, Serialize};

use crate::cache::NodeInfo;
use crate::types::{CommandClass, HomeId, NodeId, ZValue};

use super::{EventKind, IdentityToken};

/// Event-specific payload of a [`Notification`].
///
/// Payloads serialize to flat camelCase JSON objects, e.g.
/// `{"nodeId": 5, "classId": 37, "instance": 1, "index": 0, "oldValue": false, "newValue": true}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum EventPayload {
    /// Driver ready: the network identity.
    Driver {
        /// The home id.
        home_id: HomeId,
        /// The home id as `0x` prefixed hex.
        home_hex: String,
    },

    /// Node added or removed.
    Node {
        /// The node concerned.
        node_id: NodeId,
    },

    /// Node ready with its attributes.
    NodeReady {
        /// The node concerned.
        node_id: NodeId,
        /// The merged attributes.
        info: NodeInfo,
    },

    /// A value was discovered.
    ValueAdded {
        /// The owning node.
        node_id: NodeId,
        /// Command class of the value.
        class_id: CommandClass,
        /// Instance of the value.
        instance: u8,
        /// Index of the value.
        index: u8,
        /// The discovered state.
        value: ZValue,
    },

    /// A value changed.
    ValueChanged {
        /// The owning node.
        node_id: NodeId,
        /// Command class of the value.
        class_id: CommandClass,
        /// Instance of the value.
        instance: u8,
        /// Index of the value.
        index: u8,
        /// State cached before the change.
        old_value: Option<ZValue>,
        /// State cached after the change.
        new_value: ZValue,
    },

    /// A value was removed.
    ValueRemoved {
        /// The owning node.
        node_id: NodeId,
        /// Command class of the value.
        class_id: CommandClass,
        /// Instance of the value.
        instance: u8,
        /// Index of the value.
        index: u8,
    },

    /// Notification, controller command or scene event.
    Notice {
        /// The node concerned.
        node_id: NodeId,
        /// The raw code.
        code: u8,
        /// Human readable rendering of the code.
        human_text: String,
    },

    /// Driver failed or scan complete: no arguments.
    Empty {},
}

impl EventPayload {
    /// Returns the node this payload concerns, if any.
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            Self::Node { node_id }
            | Self::NodeReady { node_id, .. }
            | Self::ValueAdded { node_id, .. }
            | Self::ValueChanged { node_id, .. }
            | Self::ValueRemoved { node_id, .. }
            | Self::Notice { node_id, .. } => Some(*node_id),
            Self::Driver { .. } | Self::Empty {} => None,
        }
    }
}

/// A dispatched event as seen by subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// The event kind.
    pub kind: EventKind,
    /// The event payload.
    pub payload: EventPayload,
    /// Identity token, present when the payload carries a node id.
    pub uid: Option<IdentityToken>,
}

impl Notification {
    /// Returns the node this notification concerns, if any.
    #[must_use]
    pub fn node_id(&self) -> Option<NodeId> {
        self.payload.node_id()
    }

    /// Converts the notification into a consumer message.
    ///
    /// The topic is `"<source>: <event kind>"`; the payload is the serialized
    /// [`EventPayload`] with the `uid` field added.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be serialized.
    pub fn to_message(&self, source: &str) -> Result<Message, serde_json::Error> {
        let mut payload = serde_json::to_value(&self.payload)?;
        if let (Some(uid), Some(object)) = (&self.uid, payload.as_object_mut()) {
            object.insert("uid".to_string(), serde_json::Value::String(uid.to_string()));
        }
        Ok(Message {
            topic: format!("{source}: {}", self.kind),
            payload,
        })
    }
}

/// Message envelope exchanged with consumers.
///
/// Inbound (to consumers) the topic names the event; outbound (from
/// consumers) it names the command. An outbound payload may be a JSON
/// object or a JSON string containing an object.
///
/// # Examples
///
/// ```
/// use zwave_bridge::event::Message;
/// use serde_json::json;
///
/// let msg = Message::new("setLevel", json!({"nodeid": 5, "value": 77}));
/// assert_eq!(msg.topic, "setLevel");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The message topic.
    pub topic: String,
    /// The message payload.
    pub payload: serde_json::Value,
}

impl Message {
    /// Creates a message.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            topic: topic.into(),
            payload,
        }
    }

    /// Creates a message whose payload is serialized JSON text.
    #[must_use]
    pub fn with_text(topic: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: serde_json::Value::String(text.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::InstallationToken;
    use serde_json::json;

    #[test]
    fn value_changed_payload_shape() {
        let payload = EventPayload::ValueChanged {
            node_id: NodeId::new(5),
            class_id: CommandClass::SWITCH_BINARY,
            instance: 1,
            index: 0,
            old_value: Some(ZValue::Bool(false)),
            new_value: ZValue::Bool(true),
        };

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "nodeId": 5,
                "classId": 37,
                "instance": 1,
                "index": 0,
                "oldValue": false,
                "newValue": true,
            })
        );
    }

    #[test]
    fn driver_payload_shape() {
        let payload = EventPayload::Driver {
            home_id: HomeId::new(0xc0ffee),
            home_hex: "0xc0ffee".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"homeId": 0x00c0_ffee, "homeHex": "0xc0ffee"})
        );
    }

    #[test]
    fn empty_payload_is_empty_object() {
        assert_eq!(serde_json::to_value(EventPayload::Empty {}).unwrap(), json!({}));
    }

    #[test]
    fn to_message_adds_topic_and_uid() {
        let token = InstallationToken::new();
        let uid = token.identity(Some(HomeId::new(1)), NodeId::new(5));
        let notification = Notification {
            kind: EventKind::NodeAdded,
            payload: EventPayload::Node {
                node_id: NodeId::new(5),
            },
            uid: Some(uid.clone()),
        };

        let msg = notification.to_message("zwave").unwrap();
        assert_eq!(msg.topic, "zwave: node added");
        assert_eq!(msg.payload["nodeId"], json!(5));
        assert_eq!(msg.payload["uid"], json!(uid.as_str()));
    }

    #[test]
    fn to_message_without_uid() {
        let notification = Notification {
            kind: EventKind::ScanComplete,
            payload: EventPayload::Empty {},
            uid: None,
        };

        let msg = notification.to_message("zwave").unwrap();
        assert_eq!(msg.topic, "zwave: scan complete");
        assert_eq!(msg.payload, json!({}));
    }

    #[test]
    fn message_with_text_payload() {
        let msg = Message::with_text("switchOn", r#"{"nodeid": 2}"#);
        assert_eq!(msg.payload, json!(r#"{"nodeid": 2}"#));
    }
}
