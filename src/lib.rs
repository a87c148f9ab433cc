//! # postwire-client
//!
//! Call correlation for widgets that talk to their host page over
//! `postMessage`.
//!
//! A widget runs sandboxed in a frame. The only way to reach the host page is
//! the browser's cross-window messaging, which is untyped, shared with every
//! other script and carries no request/response pairing. This crate adds
//! that pairing.
//!
//! ## Architecture
//!
//! - **Codec**: JSON envelopes; inbound text that is not a JSON object is noise
//! - **Channel**: the messaging primitive (`window.parent` or in-memory)
//! - **Transport**: call ids, pending-call table, response dispatch
//! - **Sender**: namespace prefix + argument validation over a transport
//! - **Adapter**: optional futures for every call, settled via a scheduler
//!
//! ## Example
//!
//! ```
//! use std::rc::Rc;
//! use postwire_client::channel::MemoryChannel;
//! use postwire_client::protocol::{MethodCall, ResponseEnvelope};
//! use postwire_client::Sender;
//! use serde_json::json;
//!
//! let channel = Rc::new(MemoryChannel::new());
//! let sender = Sender::connect("app", channel.clone()).unwrap();
//!
//! let id = sender
//!     .method(MethodCall::new("getAccount").on_success(|account| println!("{account}")))
//!     .unwrap();
//!
//! // The host answers with the same call id and namespace.
//! channel
//!     .respond(&ResponseEnvelope::success(id, "app", json!({ "id": "x" })))
//!     .unwrap();
//! ```

pub mod adapter;
pub mod api;
pub mod channel;
pub mod codec;
pub mod error;
pub mod protocol;
pub mod sender;

mod transport;

pub use error::{PostwireError, Result};
pub use sender::Sender;
pub use transport::{Transport, TransportBuilder, TransportConfig};
