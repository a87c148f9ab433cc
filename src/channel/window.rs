//! Browser implementation over `window.parent.postMessage`.
//!
//! Outbound messages go to the parent window (the host page). Inbound
//! messages arrive as `message` events on the widget's own window.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{MessageEvent, Window};

use super::{HostChannel, InboundMessage, ListenerId, MessageData, MessageListener};
use crate::error::{PostwireError, Result};

/// [`HostChannel`] backed by the browser's cross-window messaging.
pub struct WindowChannel {
    window: Window,
    host: Window,
    closures: RefCell<HashMap<ListenerId, Closure<dyn FnMut(MessageEvent)>>>,
    next_listener_id: Cell<u64>,
}

impl WindowChannel {
    /// Channel from the current window to its parent.
    ///
    /// A top-level page is its own parent, which keeps same-page setups working.
    pub fn parent() -> Result<Self> {
        let window = web_sys::window()
            .ok_or_else(|| PostwireError::Configuration("no global window".to_string()))?;
        let host = window
            .parent()
            .map_err(|e| PostwireError::Configuration(format!("parent window: {:?}", e)))?
            .ok_or_else(|| PostwireError::Configuration("no parent window".to_string()))?;
        Ok(Self::new(window, host))
    }

    /// Channel listening on `window` and posting to `host`.
    pub fn new(window: Window, host: Window) -> Self {
        Self {
            window,
            host,
            closures: RefCell::new(HashMap::new()),
            next_listener_id: Cell::new(1),
        }
    }
}

impl HostChannel for WindowChannel {
    fn post_message(&self, message: &str, target_origin: &str) -> Result<()> {
        self.host
            .post_message(&JsValue::from_str(message), target_origin)
            .map_err(|e| PostwireError::Transmit(format!("{:?}", e)))
    }

    fn add_listener(&self, listener: MessageListener) -> ListenerId {
        let id = ListenerId(self.next_listener_id.get());
        self.next_listener_id.set(id.0 + 1);

        let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
            let data = match event.data().as_string() {
                Some(text) => MessageData::Text(text),
                None => MessageData::Other,
            };
            listener(&InboundMessage {
                data,
                origin: event.origin(),
            });
        }) as Box<dyn FnMut(MessageEvent)>);

        if let Err(e) = self
            .window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            tracing::warn!("Failed to register message listener: {:?}", e);
        }

        self.closures.borrow_mut().insert(id, closure);
        id
    }

    fn remove_listener(&self, id: ListenerId) -> bool {
        let Some(closure) = self.closures.borrow_mut().remove(&id) else {
            return false;
        };
        if let Err(e) = self
            .window
            .remove_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
        {
            tracing::warn!("Failed to remove message listener: {:?}", e);
        }
        true
    }
}

impl Drop for WindowChannel {
    fn drop(&mut self) {
        for (_, closure) in self.closures.borrow_mut().drain() {
            let _ = self
                .window
                .remove_event_listener_with_callback("message", closure.as_ref().unchecked_ref());
        }
    }
}
