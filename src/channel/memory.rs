//! In-process loopback channel.
//!
//! Plays the host page's side of the conversation: it records every message
//! the widget posts and lets the embedder deliver inbound messages to the
//! registered listeners.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use postwire_client::channel::{HostChannel, MemoryChannel};
//!
//! let channel = Rc::new(MemoryChannel::new());
//! channel.post_message(r#"{"name":"app.ping"}"#, "*").unwrap();
//! assert_eq!(channel.posted().len(), 1);
//! ```

use std::cell::{Cell, RefCell};

use super::{HostChannel, InboundMessage, ListenerId, MessageListener};
use crate::codec::JsonCodec;
use crate::error::{PostwireError, Result};
use crate::protocol::{CallEnvelope, ResponseEnvelope};

/// Origin stamped on delivered messages unless configured otherwise.
pub const DEFAULT_HOST_ORIGIN: &str = "http://localhost";

/// A message posted by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub message: String,
    pub target_origin: String,
}

impl PostedMessage {
    /// Parse the message as a call envelope.
    pub fn call(&self) -> Result<CallEnvelope> {
        JsonCodec::decode_as(&self.message)
    }
}

/// Loopback implementation of [`HostChannel`].
pub struct MemoryChannel {
    origin: String,
    posted: RefCell<Vec<PostedMessage>>,
    listeners: RefCell<Vec<(ListenerId, MessageListener)>>,
    next_listener_id: Cell<u64>,
    failing_posts: Cell<usize>,
}

impl MemoryChannel {
    /// Create a channel whose inbound messages come from [`DEFAULT_HOST_ORIGIN`].
    pub fn new() -> Self {
        Self::with_origin(DEFAULT_HOST_ORIGIN)
    }

    /// Create a channel whose inbound messages come from `origin`.
    pub fn with_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            posted: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            next_listener_id: Cell::new(1),
            failing_posts: Cell::new(0),
        }
    }

    /// Origin stamped on delivered messages.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Make the next `count` posts fail with a transmit error.
    pub fn fail_next_posts(&self, count: usize) {
        self.failing_posts.set(count);
    }

    /// Messages posted so far, oldest first.
    pub fn posted(&self) -> Vec<PostedMessage> {
        self.posted.borrow().clone()
    }

    /// Drain the posted messages.
    pub fn take_posted(&self) -> Vec<PostedMessage> {
        std::mem::take(&mut *self.posted.borrow_mut())
    }

    /// The most recent posted call, parsed.
    pub fn last_call(&self) -> Option<CallEnvelope> {
        self.posted.borrow().last().and_then(|p| p.call().ok())
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Deliver a text message from the host origin.
    ///
    /// Returns the number of listeners that saw it.
    pub fn deliver(&self, text: &str) -> usize {
        self.deliver_message(&InboundMessage::text(text, self.origin.as_str()))
    }

    /// Deliver an arbitrary inbound message.
    pub fn deliver_message(&self, message: &InboundMessage) -> usize {
        // Listeners may add or remove listeners while running.
        let listeners: Vec<MessageListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();

        for listener in &listeners {
            listener(message);
        }
        listeners.len()
    }

    /// Encode and deliver a response envelope.
    pub fn respond(&self, response: &ResponseEnvelope) -> Result<usize> {
        let text = response.encode()?;
        Ok(self.deliver(&text))
    }
}

impl Default for MemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl HostChannel for MemoryChannel {
    fn post_message(&self, message: &str, target_origin: &str) -> Result<()> {
        let failing = self.failing_posts.get();
        if failing > 0 {
            self.failing_posts.set(failing - 1);
            return Err(PostwireError::Transmit("host window unavailable".to_string()));
        }

        self.posted.borrow_mut().push(PostedMessage {
            message: message.to_string(),
            target_origin: target_origin.to_string(),
        });
        Ok(())
    }

    fn add_listener(&self, listener: MessageListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id.get());
        self.next_listener_id.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}
