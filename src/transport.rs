//! Call correlation over a shared host channel.
//!
//! A [`Transport`] owns one namespace on the channel. Its lifecycle per call:
//! 1. Assign the next call id (1, 2, 3, ...)
//! 2. Register the call in the pending table unless it is transient
//! 3. Encode and post the call envelope to the host
//! 4. Match inbound responses by call id and run the success or error callback
//!
//! Non-persistent calls leave the pending table on their first response;
//! persistent calls stay until released or until the transport is dropped.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use postwire_client::channel::MemoryChannel;
//! use postwire_client::protocol::{MethodCall, ResponseEnvelope};
//! use postwire_client::Transport;
//! use serde_json::json;
//!
//! let channel = Rc::new(MemoryChannel::new());
//! let transport = Transport::builder("app").build(channel.clone()).unwrap();
//!
//! let id = transport
//!     .send(MethodCall::new("app.getAccount").on_success(|data| println!("{data}")))
//!     .unwrap();
//! assert_eq!(id, 1);
//!
//! channel
//!     .respond(&ResponseEnvelope::success(id, "app", json!({ "id": "x" })))
//!     .unwrap();
//! assert_eq!(transport.pending_count(), 0);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::channel::{HostChannel, InboundMessage, ListenerId, ANY_ORIGIN};
use crate::codec::JsonCodec;
use crate::error::{PostwireError, Result};
use crate::protocol::{CallEnvelope, CallId, Callbacks, MethodCall, ResponseEnvelope};

/// Configuration for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// Routing tag stamped on every call and required on every response.
    pub namespace: String,
    /// Origin passed to `postMessage`; when not `"*"`, inbound messages
    /// from any other origin are ignored.
    pub target_origin: String,
}

impl TransportConfig {
    /// Config for `namespace` targeting any origin.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            target_origin: ANY_ORIGIN.to_string(),
        }
    }
}

/// Builder for [`Transport`].
#[derive(Debug, Clone)]
pub struct TransportBuilder {
    config: TransportConfig,
}

impl TransportBuilder {
    /// Start a builder for the given namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            config: TransportConfig::new(namespace),
        }
    }

    /// Restrict posting (and accepted responses) to a single origin.
    ///
    /// Default: `"*"`
    pub fn target_origin(mut self, origin: impl Into<String>) -> Self {
        self.config.target_origin = origin.into();
        self
    }

    /// Build the transport and register its listener on `channel`.
    pub fn build(self, channel: Rc<dyn HostChannel>) -> Result<Transport> {
        Transport::new(self.config, channel)
    }
}

/// Entry of the pending-call table.
struct PendingCall {
    name: String,
    persistent: bool,
    callbacks: Rc<RefCell<Callbacks>>,
}

struct Inner {
    namespace: String,
    target_origin: String,
    channel: Rc<dyn HostChannel>,
    last_call_id: Cell<CallId>,
    pending: RefCell<HashMap<CallId, PendingCall>>,
    listener: Cell<Option<ListenerId>>,
}

impl Inner {
    fn send(&self, call: MethodCall) -> Result<CallId> {
        if call.name().is_empty() {
            return Err(PostwireError::Configuration(
                "method call requires a name".to_string(),
            ));
        }

        let call_id = self.last_call_id.get() + 1;
        self.last_call_id.set(call_id);

        let (name, params, mode, callbacks) = call.into_parts();
        let envelope = CallEnvelope {
            name,
            params,
            call_id,
            namespace: self.namespace.clone(),
            transient: mode.transient,
            persistent: mode.persistent,
        };

        // Registered before posting so no response can arrive unmatched.
        if !mode.transient {
            self.pending.borrow_mut().insert(
                call_id,
                PendingCall {
                    name: envelope.name.clone(),
                    persistent: mode.persistent,
                    callbacks: Rc::new(RefCell::new(callbacks)),
                },
            );
        }

        self.transmit(&envelope);
        Ok(call_id)
    }

    /// Post a call; failures are logged, never returned.
    fn transmit(&self, envelope: &CallEnvelope) {
        let text = match envelope.encode() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Failed to encode call {} ({}): {}", envelope.call_id, envelope.name, e);
                return;
            }
        };

        tracing::trace!("Posting call {} ({})", envelope.call_id, envelope.name);
        if let Err(e) = self.channel.post_message(&text, &self.target_origin) {
            tracing::warn!("Failed to post call {} ({}): {}", envelope.call_id, envelope.name, e);
        }
    }

    fn receive(&self, message: &InboundMessage) -> bool {
        if self.target_origin != ANY_ORIGIN && message.origin != self.target_origin {
            tracing::trace!("Ignoring message from origin {}", message.origin);
            return false;
        }

        let Some(object) = message.as_text().and_then(|text| JsonCodec::decode(text).into_object())
        else {
            return false;
        };
        let Some(response) = ResponseEnvelope::from_object(&object) else {
            return false;
        };
        if response.namespace != self.namespace {
            return false;
        }

        let callbacks = {
            let mut pending = self.pending.borrow_mut();
            let persistent = match pending.get(&response.call_id) {
                Some(entry) => entry.persistent,
                None => {
                    tracing::trace!(
                        "Dropping response for unknown call {} in namespace {}",
                        response.call_id,
                        self.namespace
                    );
                    return false;
                }
            };

            // Non-persistent calls leave the table before their callback runs.
            if persistent {
                pending.get(&response.call_id).map(|entry| entry.callbacks.clone())
            } else {
                pending.remove(&response.call_id).map(|entry| {
                    tracing::trace!("Resolved call {} ({})", response.call_id, entry.name);
                    entry.callbacks
                })
            }
        };
        let Some(callbacks) = callbacks else {
            return false;
        };

        let handled = match callbacks.try_borrow_mut() {
            Ok(mut callbacks) => {
                callbacks.invoke(response.success, response.data);
                true
            }
            Err(_) => {
                tracing::warn!(
                    "Callback for call {} is still running, dropping nested response",
                    response.call_id
                );
                false
            }
        };
        handled
    }

    fn release(&self, call_id: CallId) -> bool {
        match self.pending.borrow_mut().remove(&call_id) {
            Some(entry) => {
                tracing::trace!("Released call {} ({})", call_id, entry.name);
                true
            }
            None => false,
        }
    }

    fn cleanup(&self) {
        if let Some(id) = self.listener.take() {
            self.channel.remove_listener(id);
            tracing::debug!("Transport {} stopped listening", self.namespace);
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Correlates calls posted to the host with the responses it sends back.
///
/// Cloning is cheap and yields a handle to the same transport. The listener
/// is removed by [`cleanup`](Transport::cleanup) or when the last handle is
/// dropped; dropping also discards every pending call.
#[derive(Clone)]
pub struct Transport {
    inner: Rc<Inner>,
}

impl Transport {
    /// Create a transport builder.
    pub fn builder(namespace: impl Into<String>) -> TransportBuilder {
        TransportBuilder::new(namespace)
    }

    /// Create a transport and register its inbound listener on `channel`.
    pub fn new(config: TransportConfig, channel: Rc<dyn HostChannel>) -> Result<Self> {
        if config.namespace.is_empty() {
            return Err(PostwireError::Configuration(
                "transport requires a namespace".to_string(),
            ));
        }

        let inner = Rc::new(Inner {
            namespace: config.namespace,
            target_origin: config.target_origin,
            channel: channel.clone(),
            last_call_id: Cell::new(0),
            pending: RefCell::new(HashMap::new()),
            listener: Cell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let id = channel.add_listener(Rc::new(move |message: &InboundMessage| {
            if let Some(inner) = weak.upgrade() {
                inner.receive(message);
            }
        }));
        inner.listener.set(Some(id));

        Ok(Self { inner })
    }

    /// Send a call and return its id.
    ///
    /// Posting failures are logged and swallowed: the id is returned and the
    /// call stays registered.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the call has no name.
    pub fn send(&self, call: MethodCall) -> Result<CallId> {
        self.inner.send(call)
    }

    /// Handle an inbound message.
    ///
    /// Returns `true` only if the message was a response for a pending call
    /// of this transport and its callback ran. Foreign or malformed messages
    /// return `false` without side effects.
    pub fn receive(&self, message: &InboundMessage) -> bool {
        self.inner.receive(message)
    }

    /// Stop listening for responses. Pending calls are left as they are.
    pub fn cleanup(&self) {
        self.inner.cleanup();
    }

    /// Remove a call from the pending table without running its callbacks.
    ///
    /// Mainly for persistent calls, which otherwise stay registered for the
    /// life of the transport. Returns `false` if `call_id` was not pending.
    pub fn release(&self, call_id: CallId) -> bool {
        self.inner.release(call_id)
    }

    pub fn namespace(&self) -> &str {
        &self.inner.namespace
    }

    pub fn target_origin(&self) -> &str {
        &self.inner.target_origin
    }

    /// The channel this transport posts to.
    pub fn channel(&self) -> &Rc<dyn HostChannel> {
        &self.inner.channel
    }

    /// Number of calls waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.inner.pending.borrow().len()
    }

    /// Whether `call_id` is in the pending table.
    pub fn is_pending(&self, call_id: CallId) -> bool {
        self.inner.pending.borrow().contains_key(&call_id)
    }

    /// Last assigned call id (0 before the first send).
    pub fn last_call_id(&self) -> CallId {
        self.inner.last_call_id.get()
    }

    /// Whether the inbound listener is registered.
    pub fn is_listening(&self) -> bool {
        self.inner.listener.get().is_some()
    }
}
