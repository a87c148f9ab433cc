//! The effective send function of a sender.

use crate::error::Result;
use crate::protocol::{CallId, MethodCall};
use crate::transport::Transport;

/// Hands a prefixed call to a transport.
///
/// A sender starts with [`DirectDispatch`]; decorators such as the
/// [`PromiseAdapter`](crate::adapter::PromiseAdapter) wrap the previous
/// dispatcher through [`Sender::intercept`](super::Sender::intercept).
pub trait Dispatch {
    fn dispatch(&self, transport: &Transport, call: MethodCall) -> Result<CallId>;
}

/// Sends straight through [`Transport::send`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectDispatch;

impl Dispatch for DirectDispatch {
    fn dispatch(&self, transport: &Transport, call: MethodCall) -> Result<CallId> {
        transport.send(call)
    }
}
