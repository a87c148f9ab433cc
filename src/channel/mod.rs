//! Channel module - the cross-window messaging primitive.
//!
//! Provides abstraction over:
//! - [`MemoryChannel`] - in-process loopback (native hosts, tests)
//! - [`WindowChannel`] - `window.parent.postMessage` in the browser (`web` feature)
//!
//! A channel is shared by every transport of a widget and by unrelated
//! scripts, so listeners see all inbound traffic and filter it themselves.

mod memory;
#[cfg(feature = "web")]
mod window;

pub use memory::{MemoryChannel, PostedMessage};
#[cfg(feature = "web")]
pub use window::WindowChannel;

use std::rc::Rc;

use crate::error::Result;

/// Target origin that matches any receiver.
pub const ANY_ORIGIN: &str = "*";

/// Payload of an inbound message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageData {
    /// A string payload (the only kind this protocol sends).
    Text(String),
    /// Structured-clone data or anything else that is not a string.
    Other,
}

/// An inbound message event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub data: MessageData,
    /// Origin of the sending window.
    pub origin: String,
}

impl InboundMessage {
    /// Text message from the given origin.
    pub fn text(data: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            data: MessageData::Text(data.into()),
            origin: origin.into(),
        }
    }

    /// The text payload, if this is a text message.
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            MessageData::Text(text) => Some(text),
            MessageData::Other => None,
        }
    }
}

/// Handler registered for inbound messages.
pub type MessageListener = Rc<dyn Fn(&InboundMessage)>;

/// Identifier returned by [`HostChannel::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// The messaging primitive between the widget and its host page.
pub trait HostChannel {
    /// Post a text message to the host.
    ///
    /// # Errors
    ///
    /// Returns [`PostwireError::Transmit`](crate::PostwireError::Transmit) if
    /// the underlying post operation fails.
    fn post_message(&self, message: &str, target_origin: &str) -> Result<()>;

    /// Register a handler for every inbound message.
    fn add_listener(&self, listener: MessageListener) -> ListenerId;

    /// Deregister a handler. Returns `false` if it was not registered.
    fn remove_listener(&self, id: ListenerId) -> bool;
}
