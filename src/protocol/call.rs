//! Method calls as built by senders and owned by the transport.
//!
//! A [`MethodCall`] carries everything the transport needs: the method name,
//! an optional JSON payload, the delivery mode and the callbacks that receive
//! the host's answer. Only the serializable part ever reaches the wire (see
//! [`CallEnvelope`](super::CallEnvelope)).
//!
//! # Example
//!
//! ```
//! use postwire_client::protocol::MethodCall;
//! use serde_json::json;
//!
//! let call = MethodCall::new("getUser")
//!     .params(json!({ "id": "u-1" }))
//!     .on_success(|data| println!("user: {data}"));
//!
//! assert_eq!(call.name(), "getUser");
//! assert!(!call.is_transient());
//! ```

use std::fmt;

use serde_json::Value;

/// Identifier correlating a call with its response(s).
pub type CallId = u64;

/// Callback receiving a response payload.
pub type Callback = Box<dyn FnMut(Value)>;

/// A method invocation on the host page.
pub struct MethodCall {
    name: String,
    params: Option<Value>,
    transient: bool,
    persistent: bool,
    on_success: Option<Callback>,
    on_error: Option<Callback>,
}

impl MethodCall {
    /// Create a call for the given method name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: None,
            transient: false,
            persistent: false,
            on_success: None,
            on_error: None,
        }
    }

    /// Attach a JSON payload.
    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Mark the call fire-and-forget: it is never tracked for a response.
    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    /// Keep the call registered after each response.
    pub fn persistent(mut self) -> Self {
        self.persistent = true;
        self
    }

    /// Set the callback invoked with the payload of a successful response.
    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Value) + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Set the callback invoked with the payload of an error response.
    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Value) + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Method name (fully qualified once a sender has prefixed it).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the method name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// JSON payload, if any.
    #[inline]
    pub fn params_ref(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    #[inline]
    pub fn is_transient(&self) -> bool {
        self.transient
    }

    #[inline]
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn set_transient(&mut self, transient: bool) {
        self.transient = transient;
    }

    pub fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
    }

    /// Detach the success callback, leaving none in place.
    pub fn take_on_success(&mut self) -> Option<Callback> {
        self.on_success.take()
    }

    /// Detach the error callback, leaving none in place.
    pub fn take_on_error(&mut self) -> Option<Callback> {
        self.on_error.take()
    }

    pub fn set_on_success(&mut self, callback: Option<Callback>) {
        self.on_success = callback;
    }

    pub fn set_on_error(&mut self, callback: Option<Callback>) {
        self.on_error = callback;
    }

    /// Split into the serializable parts and the callbacks.
    pub(crate) fn into_parts(self) -> (String, Option<Value>, CallMode, Callbacks) {
        let mode = CallMode {
            transient: self.transient,
            persistent: self.persistent,
        };
        let callbacks = Callbacks {
            on_success: self.on_success,
            on_error: self.on_error,
        };
        (self.name, self.params, mode, callbacks)
    }
}

impl fmt::Debug for MethodCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodCall")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("transient", &self.transient)
            .field("persistent", &self.persistent)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Delivery flags of a call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct CallMode {
    pub transient: bool,
    pub persistent: bool,
}

/// Callback pair held by the pending-call table.
#[derive(Default)]
pub(crate) struct Callbacks {
    pub on_success: Option<Callback>,
    pub on_error: Option<Callback>,
}

impl Callbacks {
    /// Run exactly one callback for a response. Absent callbacks are no-ops.
    pub fn invoke(&mut self, success: bool, data: Value) {
        let slot = if success {
            &mut self.on_success
        } else {
            &mut self.on_error
        };
        if let Some(callback) = slot.as_mut() {
            callback(data);
        }
    }
}

/// Optional success/error callbacks passed to namespace methods.
///
/// ```
/// use postwire_client::protocol::Handlers;
///
/// let handlers = Handlers::new()
///     .on_success(|data| println!("ok: {data}"))
///     .on_error(|err| eprintln!("failed: {err}"));
/// # let _ = handlers;
/// ```
#[derive(Default)]
pub struct Handlers {
    on_success: Option<Callback>,
    on_error: Option<Callback>,
}

impl Handlers {
    /// No callbacks: responses are ignored.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Value) + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: FnMut(Value) + 'static,
    {
        self.on_error = Some(Box::new(callback));
        self
    }

    /// Move these callbacks onto a call.
    pub fn apply(self, mut call: MethodCall) -> MethodCall {
        call.on_success = self.on_success;
        call.on_error = self.on_error;
        call
    }
}
