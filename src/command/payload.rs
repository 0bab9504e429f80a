// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw command payload as sent by consumers.

use serde::Deserialize;

use crate::error::CommandError;
use crate::types::ZValue;

/// Fields a consumer may put in a command payload.
///
/// Every field is optional at this stage; the command kind decides which
/// ones are required.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct CommandPayload {
    #[serde(alias = "nodeId")]
    pub nodeid: Option<u8>,
    #[serde(rename = "classId", alias = "cmdclass")]
    pub class_id: Option<u8>,
    pub instance: Option<u8>,
    #[serde(alias = "cmdidx")]
    pub index: Option<u8>,
    pub value: Option<ZValue>,
    pub args: Vec<serde_json::Value>,
    #[serde(rename = "prependHomeId")]
    pub prepend_home_id: bool,
}

impl CommandPayload {
    /// Reads a payload given either as a JSON object or as JSON text.
    pub fn from_json(payload: &serde_json::Value) -> Result<Self, CommandError> {
        let parsed;
        let object = match payload {
            serde_json::Value::String(text) => {
                parsed = serde_json::from_str::<serde_json::Value>(text)
                    .map_err(CommandError::MalformedPayload)?;
                &parsed
            }
            other => other,
        };

        if !object.is_object() {
            return Err(CommandError::NotAnObject);
        }
        Self::deserialize(object).map_err(CommandError::InvalidPayload)
    }

    pub fn require_node(&self) -> Result<u8, CommandError> {
        self.nodeid.ok_or(CommandError::MissingField("nodeid"))
    }

    pub fn require_value(&self) -> Result<ZValue, CommandError> {
        self.value.clone().ok_or(CommandError::MissingField("value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_payload() {
        let payload =
            CommandPayload::from_json(&json!({"nodeid": 5, "classId": 38, "value": 77})).unwrap();
        assert_eq!(payload.nodeid, Some(5));
        assert_eq!(payload.class_id, Some(38));
        assert_eq!(payload.value, Some(ZValue::Int(77)));
        assert!(!payload.prepend_home_id);
    }

    #[test]
    fn text_payload() {
        let payload = CommandPayload::from_json(&json!(r#"{"nodeId": 2, "cmdidx": 1}"#)).unwrap();
        assert_eq!(payload.nodeid, Some(2));
        assert_eq!(payload.index, Some(1));
    }

    #[test]
    fn legacy_aliases() {
        let payload =
            CommandPayload::from_json(&json!({"nodeid": 3, "cmdclass": 49, "cmdidx": 2})).unwrap();
        assert_eq!(payload.class_id, Some(49));
        assert_eq!(payload.index, Some(2));
    }

    #[test]
    fn malformed_text() {
        let err = CommandPayload::from_json(&json!("{nodeid: 5")).unwrap_err();
        assert!(matches!(err, CommandError::MalformedPayload(_)));
    }

    #[test]
    fn non_object_payload() {
        assert!(matches!(
            CommandPayload::from_json(&json!(42)).unwrap_err(),
            CommandError::NotAnObject
        ));
        assert!(matches!(
            CommandPayload::from_json(&json!("[1, 2]")).unwrap_err(),
            CommandError::NotAnObject
        ));
    }

    #[test]
    fn wrong_field_type() {
        let err = CommandPayload::from_json(&json!({"nodeid": "five"})).unwrap_err();
        assert!(matches!(err, CommandError::InvalidPayload(_)));
    }

    #[test]
    fn null_value_is_missing() {
        let payload = CommandPayload::from_json(&json!({"nodeid": 1, "value": null})).unwrap();
        assert!(matches!(
            payload.require_value().unwrap_err(),
            CommandError::MissingField("value")
        ));
    }

    #[test]
    fn passthrough_fields() {
        let payload =
            CommandPayload::from_json(&json!({"args": [1, "x"], "prependHomeId": true})).unwrap();
        assert_eq!(payload.args, vec![json!(1), json!("x")]);
        assert!(payload.prepend_home_id);
        assert!(payload.require_node().is_err());
    }
}
