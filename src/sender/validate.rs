//! Argument shape checks run by namespace methods before building a payload.

use serde_json::Value;

use crate::error::{PostwireError, Result};

/// Expected kind of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Number,
    Boolean,
    /// Any JSON object; arrays count as objects.
    Object,
    /// A closure argument (see [`Arg::Function`]).
    Function,
    Array,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Number => "number",
            Kind::Boolean => "boolean",
            Kind::Object => "object",
            Kind::Function => "function",
            Kind::Array => "array",
        }
    }
}

/// An argument as seen by [`Sender::validate`](super::Sender::validate).
///
/// Closures never travel as JSON, so façades pass [`Arg::Function`] for a
/// supplied closure and [`Arg::Missing`] for an absent one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Arg<'a> {
    Json(&'a Value),
    Function,
    Missing,
}

impl<'a> From<&'a Value> for Arg<'a> {
    fn from(value: &'a Value) -> Self {
        Arg::Json(value)
    }
}

impl<'a> From<Option<&'a Value>> for Arg<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        value.map_or(Arg::Missing, Arg::Json)
    }
}

impl Arg<'_> {
    /// Whether the argument is present, non-null and of the given kind.
    pub fn is(&self, kind: Kind) -> bool {
        match (self, kind) {
            (Arg::Missing, _) | (Arg::Json(Value::Null), _) => false,
            (Arg::Function, kind) => kind == Kind::Function,
            (Arg::Json(value), Kind::String) => value.is_string(),
            (Arg::Json(value), Kind::Number) => value.is_number(),
            (Arg::Json(value), Kind::Boolean) => value.is_boolean(),
            (Arg::Json(value), Kind::Object) => value.is_object() || value.is_array(),
            (Arg::Json(value), Kind::Array) => value.is_array(),
            (Arg::Json(_), Kind::Function) => false,
        }
    }
}

/// Fail with `message` unless `value` is of the expected kind.
pub(crate) fn check(value: Arg<'_>, expected: Kind, message: &str) -> Result<()> {
    if value.is(expected) {
        Ok(())
    } else {
        Err(PostwireError::Validation(message.to_string()))
    }
}
