//! Social feed operations.

use std::rc::Rc;

use serde_json::{json, Value};

use crate::channel::HostChannel;
use crate::error::Result;
use crate::protocol::{CallId, Handlers, MethodCall};
use crate::sender::{Kind, Sender};

/// Prefix and namespace of social calls.
pub const PREFIX: &str = "social";

/// `social.*` methods.
pub struct SocialApi {
    sender: Sender,
}

impl SocialApi {
    pub fn new(sender: Sender) -> Self {
        Self { sender }
    }

    /// Social API with its own transport on `channel`.
    pub fn connect(channel: Rc<dyn HostChannel>) -> Result<Self> {
        Ok(Self::new(Sender::connect(PREFIX, channel)?))
    }

    /// Publish a post to the account's feed.
    pub fn share(&self, post: Value, handlers: Handlers) -> Result<CallId> {
        self.sender
            .validate(&post, Kind::Object, "share: post must be an object")?;
        self.sender
            .method(handlers.apply(MethodCall::new("share").params(post)))
    }

    /// Query the feed.
    pub fn get_feed(&self, query: Value, handlers: Handlers) -> Result<CallId> {
        self.sender
            .validate(&query, Kind::Object, "getFeed: query must be an object")?;
        self.sender
            .method(handlers.apply(MethodCall::new("getFeed").params(query)))
    }

    pub fn like(&self, post_id: Value, handlers: Handlers) -> Result<CallId> {
        self.sender
            .validate(&post_id, Kind::String, "like: post id must be a string")?;
        let call = MethodCall::new("like").params(json!({ "postId": post_id }));
        self.sender.method(handlers.apply(call))
    }

    /// Receive every event the host publishes on `topic`.
    pub fn subscribe<F>(&self, topic: Value, on_event: F) -> Result<CallId>
    where
        F: FnMut(Value) + 'static,
    {
        self.sender
            .validate(&topic, Kind::String, "subscribe: topic must be a string")?;
        let call = MethodCall::new("subscribe")
            .params(json!({ "topic": topic }))
            .persistent()
            .on_success(on_event);
        self.sender.method(call)
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn cleanup(&self) {
        self.sender.cleanup();
    }
}
