//! Wire envelopes exchanged with the host page.
//!
//! ```text
//! Call:     { name, params?, callId, namespace, transient, persistent }
//! Response: { callId, namespace, success: boolean, data }
//! ```
//!
//! Calls travel widget → host, responses host → widget. Anything else on the
//! channel is foreign traffic.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::CallId;
use crate::codec::JsonCodec;
use crate::error::Result;

/// Serializable part of a method call, as posted to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallEnvelope {
    /// Fully qualified method name (`<prefix>.<method>`).
    pub name: String,
    /// Method-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
    /// Correlation id assigned by the transport.
    pub call_id: CallId,
    /// Routing tag of the sending transport.
    pub namespace: String,
    /// No response expected.
    #[serde(default)]
    pub transient: bool,
    /// More than one response may arrive.
    #[serde(default)]
    pub persistent: bool,
}

impl CallEnvelope {
    /// Encode to JSON text.
    pub fn encode(&self) -> Result<String> {
        JsonCodec::encode(self)
    }
}

/// Response posted by the host for a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub call_id: CallId,
    pub namespace: String,
    pub success: bool,
    #[serde(default)]
    pub data: Value,
}

impl ResponseEnvelope {
    /// Successful response carrying `data`.
    pub fn success(call_id: CallId, namespace: impl Into<String>, data: Value) -> Self {
        Self {
            call_id,
            namespace: namespace.into(),
            success: true,
            data,
        }
    }

    /// Error response carrying `data`.
    pub fn failure(call_id: CallId, namespace: impl Into<String>, data: Value) -> Self {
        Self {
            call_id,
            namespace: namespace.into(),
            success: false,
            data,
        }
    }

    /// Encode to JSON text.
    pub fn encode(&self) -> Result<String> {
        JsonCodec::encode(self)
    }

    /// Extract a response from a decoded JSON object.
    ///
    /// Returns `None` unless `namespace` is a string, `success` is a boolean
    /// and `callId` is a non-negative integer. A missing `data` reads as null.
    pub fn from_object(object: &Map<String, Value>) -> Option<Self> {
        let namespace = object.get("namespace")?.as_str()?;
        let success = object.get("success")?.as_bool()?;
        let call_id = call_id_of(object.get("callId")?)?;
        let data = object.get("data").cloned().unwrap_or(Value::Null);

        Some(Self {
            call_id,
            namespace: namespace.to_string(),
            success,
            data,
        })
    }
}

/// Hosts written in JavaScript send numbers, which may arrive as `1.0`.
fn call_id_of(value: &Value) -> Option<CallId> {
    if let Some(id) = value.as_u64() {
        return Some(id);
    }
    let float = value.as_f64()?;
    if float >= 0.0 && float.fract() == 0.0 && float < u64::MAX as f64 {
        Some(float as CallId)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_call_envelope_field_names() {
        let envelope = CallEnvelope {
            name: "app.getAccount".to_string(),
            params: None,
            call_id: 7,
            namespace: "app".to_string(),
            transient: false,
            persistent: true,
        };

        let parsed: Value = serde_json::from_str(&envelope.encode().unwrap()).unwrap();
        assert_eq!(
            parsed,
            json!({
                "name": "app.getAccount",
                "callId": 7,
                "namespace": "app",
                "transient": false,
                "persistent": true
            })
        );
    }

    #[test]
    fn test_call_envelope_keeps_params() {
        let envelope = CallEnvelope {
            name: "a.b".to_string(),
            params: Some(json!({ "k": [1, 2] })),
            call_id: 1,
            namespace: "a".to_string(),
            transient: true,
            persistent: false,
        };
        let parsed: Value = serde_json::from_str(&envelope.encode().unwrap()).unwrap();
        assert_eq!(parsed["params"], json!({ "k": [1, 2] }));
    }

    #[test]
    fn test_call_envelope_flags_default_when_absent() {
        let envelope: CallEnvelope =
            serde_json::from_str(r#"{"name":"a.b","callId":3,"namespace":"a"}"#).unwrap();
        assert!(!envelope.transient);
        assert!(!envelope.persistent);
    }

    #[test]
    fn test_from_object_valid() {
        let response = ResponseEnvelope::from_object(&object(json!({
            "callId": 1,
            "namespace": "app",
            "success": true,
            "data": { "id": "x" }
        })))
        .unwrap();

        assert_eq!(response, ResponseEnvelope::success(1, "app", json!({ "id": "x" })));
    }

    #[test]
    fn test_from_object_missing_data_is_null() {
        let response = ResponseEnvelope::from_object(&object(json!({
            "callId": 2, "namespace": "app", "success": false
        })))
        .unwrap();
        assert_eq!(response.data, Value::Null);
        assert!(!response.success);
    }

    #[test]
    fn test_from_object_accepts_integral_float_id() {
        let response = ResponseEnvelope::from_object(&object(json!({
            "callId": 4.0, "namespace": "app", "success": true
        })))
        .unwrap();
        assert_eq!(response.call_id, 4);
    }

    #[test]
    fn test_from_object_rejects_malformed() {
        let cases = [
            json!({ "callId": 1, "namespace": "app" }),
            json!({ "callId": 1, "namespace": "app", "success": "yes" }),
            json!({ "callId": 1, "namespace": 5, "success": true }),
            json!({ "namespace": "app", "success": true }),
            json!({ "callId": -1, "namespace": "app", "success": true }),
            json!({ "callId": 1.5, "namespace": "app", "success": true }),
            json!({ "callId": "1", "namespace": "app", "success": true }),
            json!({ "callId": 18446744073709551616.0, "namespace": "app", "success": true }),
            json!({ "callId": 1e30, "namespace": "app", "success": true }),
        ];

        for case in cases {
            assert!(
                ResponseEnvelope::from_object(&object(case.clone())).is_none(),
                "accepted {case}"
            );
        }
    }
}
