//! Account operations of the host page.

use std::rc::Rc;

use serde_json::{json, Value};

use crate::channel::HostChannel;
use crate::error::Result;
use crate::protocol::{CallId, Handlers, MethodCall};
use crate::sender::{Kind, Sender};

/// Prefix and namespace of account calls.
pub const PREFIX: &str = "account";

/// `account.*` methods.
pub struct AccountApi {
    sender: Sender,
}

impl AccountApi {
    pub fn new(sender: Sender) -> Self {
        Self { sender }
    }

    /// Account API with its own transport on `channel`.
    pub fn connect(channel: Rc<dyn HostChannel>) -> Result<Self> {
        Ok(Self::new(Sender::connect(PREFIX, channel)?))
    }

    /// Fetch the account the widget is installed in.
    pub fn get_account(&self, handlers: Handlers) -> Result<CallId> {
        self.sender.method(handlers.apply(MethodCall::new("getAccount")))
    }

    /// Fetch a user of the account by id.
    pub fn get_user(&self, user_id: Value, handlers: Handlers) -> Result<CallId> {
        self.sender
            .validate(&user_id, Kind::String, "getUser: user id must be a string")?;
        let call = MethodCall::new("getUser").params(json!({ "userId": user_id }));
        self.sender.method(handlers.apply(call))
    }

    /// Update the widget's settings for the current user.
    pub fn update_settings(&self, settings: Value, handlers: Handlers) -> Result<CallId> {
        self.sender.validate(
            &settings,
            Kind::Object,
            "updateSettings: settings must be an object",
        )?;
        let call = MethodCall::new("updateSettings").params(settings);
        self.sender.method(handlers.apply(call))
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn cleanup(&self) {
        self.sender.cleanup();
    }
}
