//! Sender module - namespace-prefixed façade over a transport.
//!
//! Provides:
//! - [`Sender`] - prefixes method names, validates arguments, dispatches calls
//! - [`Dispatch`] - the overridable send function
//! - [`Kind`] / [`Arg`] - argument shapes for [`Sender::validate`]
//!
//! Namespace APIs hold a `Sender` and build every method on three
//! operations: [`Sender::validate`], [`Sender::method`] and
//! [`Sender::cleanup`].
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use postwire_client::channel::MemoryChannel;
//! use postwire_client::protocol::MethodCall;
//! use postwire_client::sender::{Kind, Sender};
//! use serde_json::json;
//!
//! let channel = Rc::new(MemoryChannel::new());
//! let sender = Sender::connect("app", channel.clone()).unwrap();
//!
//! let user_id = json!("u-1");
//! sender.validate(&user_id, Kind::String, "user id must be a string").unwrap();
//! sender.method(MethodCall::new("getUser").params(user_id)).unwrap();
//!
//! assert_eq!(channel.last_call().unwrap().name, "app.getUser");
//! ```

mod dispatch;
mod validate;

pub use dispatch::{DirectDispatch, Dispatch};
pub use validate::{Arg, Kind};

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde_json::Value;

use crate::channel::HostChannel;
use crate::error::{PostwireError, Result};
use crate::protocol::{CallId, MethodCall};
use crate::transport::Transport;

/// Keys of untyped options that would hold callbacks.
const CALLBACK_KEYS: [&str; 2] = ["successCallback", "errorCallback"];

/// Namespace-prefixed sender.
pub struct Sender {
    prefix: String,
    transport: Transport,
    novalidate: Cell<bool>,
    dispatcher: RefCell<Rc<dyn Dispatch>>,
}

impl Sender {
    /// Create a sender over an existing transport.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `prefix` is empty.
    pub fn new(prefix: impl Into<String>, transport: Transport) -> Result<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() {
            return Err(PostwireError::Configuration(
                "sender requires a prefix".to_string(),
            ));
        }

        Ok(Self {
            prefix,
            transport,
            novalidate: Cell::new(false),
            dispatcher: RefCell::new(Rc::new(DirectDispatch)),
        })
    }

    /// Create a sender with its own transport whose namespace is `prefix`.
    pub fn connect(prefix: impl Into<String>, channel: Rc<dyn HostChannel>) -> Result<Self> {
        let prefix = prefix.into();
        let transport = Transport::builder(prefix.clone()).build(channel)?;
        Self::new(prefix, transport)
    }

    /// Send `<prefix>.<name>` and return the call id.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the call has no name.
    pub fn method(&self, mut call: MethodCall) -> Result<CallId> {
        if call.name().is_empty() {
            return Err(PostwireError::Configuration(
                "method call requires a name".to_string(),
            ));
        }

        let name = format!("{}.{}", self.prefix, call.name());
        call.set_name(name);

        let dispatcher = self.dispatcher.borrow().clone();
        dispatcher.dispatch(&self.transport, call)
    }

    /// Send a call described by untyped JSON options.
    ///
    /// Reads `name`, `params`, `transient` and `persistent`. JSON cannot
    /// carry callbacks, so `successCallback`/`errorCallback` keys must be
    /// absent or null.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `options` is not an object, has no
    /// string `name`, or carries non-null callback keys.
    pub fn method_value(&self, options: Value) -> Result<CallId> {
        let Value::Object(mut options) = options else {
            return Err(PostwireError::Configuration(
                "method options must be an object".to_string(),
            ));
        };

        for key in CALLBACK_KEYS {
            if options.get(key).is_some_and(|v| !v.is_null()) {
                return Err(PostwireError::Configuration(format!("{key} must be a function")));
            }
        }

        let name = match options.remove("name") {
            Some(Value::String(name)) => name,
            _ => {
                return Err(PostwireError::Configuration(
                    "method call requires a name".to_string(),
                ))
            }
        };

        let mut call = MethodCall::new(name);
        if let Some(params) = options.remove("params") {
            call = call.params(params);
        }
        call.set_transient(flag(options.get("transient")));
        call.set_persistent(flag(options.get("persistent")));

        self.method(call)
    }

    /// Check an argument's kind before building a payload.
    ///
    /// A no-op while [`novalidate`](Self::novalidate) is set.
    ///
    /// # Errors
    ///
    /// Returns a validation error carrying `message` if the argument is
    /// missing, null, or of another kind.
    pub fn validate<'a>(&self, value: impl Into<Arg<'a>>, expected: Kind, message: &str) -> Result<()> {
        if self.novalidate.get() {
            return Ok(());
        }
        validate::check(value.into(), expected, message)
    }

    /// Skip all argument validation.
    pub fn set_novalidate(&self, novalidate: bool) {
        self.novalidate.set(novalidate);
    }

    pub fn novalidate(&self) -> bool {
        self.novalidate.get()
    }

    /// Replace the send function, returning the previous one.
    pub fn intercept(&self, dispatcher: Rc<dyn Dispatch>) -> Rc<dyn Dispatch> {
        self.dispatcher.replace(dispatcher)
    }

    /// The current send function.
    pub fn dispatcher(&self) -> Rc<dyn Dispatch> {
        self.dispatcher.borrow().clone()
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// The owned transport, for low-level access.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// Stop listening for responses.
    pub fn cleanup(&self) {
        self.transport.cleanup();
    }
}

/// Flags are true only when explicitly `true`.
fn flag(value: Option<&Value>) -> bool {
    value.and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::MemoryChannel;
    use crate::protocol::ResponseEnvelope;
    use serde_json::json;

    fn setup(prefix: &str) -> (Rc<MemoryChannel>, Sender) {
        let channel = Rc::new(MemoryChannel::new());
        let sender = Sender::connect(prefix, channel.clone()).unwrap();
        (channel, sender)
    }

    #[test]
    fn test_empty_prefix_rejected() {
        let channel = Rc::new(MemoryChannel::new());
        let transport = Transport::builder("app").build(channel).unwrap();
        assert!(matches!(
            Sender::new("", transport),
            Err(PostwireError::Configuration(_))
        ));
    }

    #[test]
    fn test_method_prefixes_name() {
        let (channel, sender) = setup("app");
        let id = sender.method(MethodCall::new("getAccount")).unwrap();

        let call = channel.last_call().unwrap();
        assert_eq!(id, 1);
        assert_eq!(call.name, "app.getAccount");
        assert_eq!(call.namespace, "app");
    }

    #[test]
    fn test_method_without_name_rejected() {
        let (channel, sender) = setup("app");
        assert!(matches!(
            sender.method(MethodCall::new("")),
            Err(PostwireError::Configuration(_))
        ));
        assert!(channel.posted().is_empty());
    }

    #[test]
    fn test_method_value_non_object_rejected() {
        let (_channel, sender) = setup("app");
        for options in [json!("x"), json!(null), json!([{"name": "a"}]), json!(3)] {
            assert!(matches!(
                sender.method_value(options),
                Err(PostwireError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_method_value_requires_name() {
        let (_channel, sender) = setup("app");
        for options in [json!({}), json!({ "name": 5 }), json!({ "name": "" })] {
            assert!(matches!(
                sender.method_value(options),
                Err(PostwireError::Configuration(_))
            ));
        }
    }

    #[test]
    fn test_method_value_rejects_callback_values() {
        let (_channel, sender) = setup("app");
        let err = sender
            .method_value(json!({ "name": "x", "successCallback": "f" }))
            .unwrap_err();
        assert!(matches!(err, PostwireError::Configuration(m) if m.contains("successCallback")));

        assert!(sender
            .method_value(json!({ "name": "x", "errorCallback": null }))
            .is_ok());
    }

    #[test]
    fn test_method_value_reads_options() {
        let (channel, sender) = setup("app");
        let id = sender
            .method_value(json!({
                "name": "track",
                "params": { "event": "open" },
                "transient": true,
                "persistent": "yes"
            }))
            .unwrap();

        let call = channel.last_call().unwrap();
        assert_eq!(call.name, "app.track");
        assert_eq!(call.params, Some(json!({ "event": "open" })));
        assert!(call.transient);
        assert!(!call.persistent);
        assert!(!sender.transport().is_pending(id));
    }

    #[test]
    fn test_validate() {
        let (_channel, sender) = setup("app");
        assert!(matches!(
            sender.validate(&Value::Null, Kind::Object, "need object"),
            Err(PostwireError::Validation(m)) if m == "need object"
        ));
        assert!(sender.validate(&json!(""), Kind::String, "m").is_ok());
        assert!(sender.validate(&json!(false), Kind::Boolean, "m").is_ok());
        assert!(sender.validate(&json!({}), Kind::Array, "m").is_err());
        assert!(sender.validate(Arg::Function, Kind::Function, "m").is_ok());
        assert!(sender.validate(Arg::Missing, Kind::Function, "m").is_err());
    }

    #[test]
    fn test_novalidate_bypasses_checks() {
        let (_channel, sender) = setup("app");
        sender.set_novalidate(true);
        assert!(sender.novalidate());
        assert!(sender.validate(&Value::Null, Kind::Object, "m").is_ok());
        assert!(sender.validate(Arg::Missing, Kind::String, "m").is_ok());
        assert!(sender.validate(&json!(1), Kind::Array, "m").is_ok());
    }

    #[test]
    fn test_intercept_replaces_send_function() {
        struct Recording(RefCell<Vec<String>>);

        impl Dispatch for Recording {
            fn dispatch(&self, transport: &Transport, call: MethodCall) -> Result<CallId> {
                self.0.borrow_mut().push(call.name().to_string());
                transport.send(call)
            }
        }

        let (channel, sender) = setup("app");
        let recording = Rc::new(Recording(RefCell::new(Vec::new())));
        let previous = sender.intercept(recording.clone());

        sender.method(MethodCall::new("a")).unwrap();
        assert_eq!(*recording.0.borrow(), vec!["app.a".to_string()]);
        assert_eq!(channel.posted().len(), 1);

        sender.intercept(previous);
        sender.method(MethodCall::new("b")).unwrap();
        assert_eq!(recording.0.borrow().len(), 1);
    }

    #[test]
    fn test_cleanup_delegates() {
        let (channel, sender) = setup("app");
        let received = Rc::new(Cell::new(false));
        let flag = received.clone();
        let id = sender
            .method(MethodCall::new("get").on_success(move |_| flag.set(true)))
            .unwrap();

        sender.cleanup();
        assert!(!sender.transport().is_listening());
        channel
            .respond(&ResponseEnvelope::success(id, "app", json!(1)))
            .unwrap();
        assert!(!received.get());
    }
}
