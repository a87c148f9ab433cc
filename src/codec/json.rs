//! JSON codec using `serde_json`.
//!
//! The message channel is shared with every other script on the page, so
//! decoding never fails loudly: anything that is not a JSON object comes back
//! as [`Decoded::Invalid`] and callers drop it as foreign traffic.
//!
//! # Example
//!
//! ```
//! use postwire_client::codec::{Decoded, JsonCodec};
//!
//! assert!(matches!(JsonCodec::decode(r#"{"callId":1}"#), Decoded::Object(_)));
//! assert!(matches!(JsonCodec::decode("null"), Decoded::Invalid));
//! assert!(matches!(JsonCodec::decode("not json"), Decoded::Invalid));
//! ```

use serde_json::{Map, Value};

use crate::error::Result;

/// Outcome of probing an inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// The text was a JSON object.
    Object(Map<String, Value>),
    /// Not JSON, or JSON that is not an object.
    Invalid,
}

impl Decoded {
    /// The decoded object, if any.
    pub fn into_object(self) -> Option<Map<String, Value>> {
        match self {
            Decoded::Object(map) => Some(map),
            Decoded::Invalid => None,
        }
    }
}

/// JSON codec for envelopes and payloads.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value to JSON text.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized (e.g. a map with
    /// non-string keys).
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// Parse text and keep it only if it is a JSON object.
    pub fn decode(text: &str) -> Decoded {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Decoded::Object(map),
            _ => Decoded::Invalid,
        }
    }

    /// Decode JSON text into a typed value.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid JSON for type T.
    #[inline]
    pub fn decode_as<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
        Ok(serde_json::from_str(text)?)
    }
}
