//! Protocol module - method calls and wire envelopes.
//!
//! - [`MethodCall`] - a call as built by a sender (name, payload, mode, callbacks)
//! - [`CallEnvelope`] / [`ResponseEnvelope`] - the JSON shapes on the wire
//! - [`Handlers`] - optional callbacks accepted by namespace methods

mod call;
mod envelope;

pub use call::{CallId, Callback, Handlers, MethodCall};
pub use envelope::{CallEnvelope, ResponseEnvelope};

pub(crate) use call::Callbacks;
