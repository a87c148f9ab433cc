//! Codec module - JSON text encoding for the message channel.
//!
//! - [`JsonCodec`] - serializes envelopes with `serde_json`
//! - [`Decoded`] - tagged result of probing inbound text
//!
//! # Design
//!
//! Like the envelopes it carries, the codec is a marker struct with static
//! methods. Decoding is a probe rather than a fallible parse: the channel is
//! shared, so malformed input is expected and is not an error.

mod json;

pub use json::{Decoded, JsonCodec};
