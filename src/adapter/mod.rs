//! Adapter module - futures for callback-based calls.
//!
//! [`PromiseAdapter`] decorates a sender's send function. Every tracked call
//! still runs its own callbacks exactly as before; in addition the first
//! response settles a [`CallFuture`], through a [`Scheduler`] so that the
//! resolution lands in the host framework's update cycle.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use postwire_client::adapter::{PromiseAdapter, TaskQueue};
//! use postwire_client::channel::MemoryChannel;
//! use postwire_client::protocol::{MethodCall, ResponseEnvelope};
//! use postwire_client::Sender;
//! use serde_json::json;
//!
//! let channel = Rc::new(MemoryChannel::new());
//! let sender = Sender::connect("app", channel.clone()).unwrap();
//! let queue = Rc::new(TaskQueue::new());
//! let adapter = PromiseAdapter::install(&sender, queue.clone());
//!
//! let (id, mut outcome) = adapter.call(&sender, MethodCall::new("getAccount")).unwrap();
//! channel.respond(&ResponseEnvelope::success(id, "app", json!({ "id": "x" }))).unwrap();
//!
//! assert!(outcome.try_outcome().is_none());
//! queue.run_pending();
//! assert_eq!(outcome.try_outcome().unwrap().unwrap(), json!({ "id": "x" }));
//! ```

mod scheduler;

pub use scheduler::{Immediate, LocalSpawn, Scheduler, Task, TaskQueue};

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::{PostwireError, Result};
use crate::protocol::{CallId, Callback, MethodCall};
use crate::sender::{Dispatch, Sender};
use crate::transport::Transport;

type Outcome = Result<Value>;

type Outcomes = Rc<RefCell<HashMap<CallId, CallFuture>>>;

/// Resolver shared by the success and error wrappers; first response wins.
struct Deferred {
    tx: Option<oneshot::Sender<Outcome>>,
    /// Id of the call, known once the inner dispatcher returned it.
    call_id: Option<CallId>,
}

/// Future of a call's first response.
///
/// Resolves to `Ok(data)` for a success response, `Err(Remote(data))` for an
/// error response and `Err(Abandoned)` if the call is dropped unanswered.
#[derive(Debug)]
pub struct CallFuture {
    rx: oneshot::Receiver<Outcome>,
}

impl CallFuture {
    /// Non-blocking check for hosts without an executor.
    pub fn try_outcome(&mut self) -> Option<Outcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(PostwireError::Abandoned)),
        }
    }
}

impl Future for CallFuture {
    type Output = Outcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(PostwireError::Abandoned)),
            Poll::Pending => Poll::Pending,
        }
    }
}

/// Decorator that pairs every tracked call with a [`CallFuture`].
///
/// A future must be claimed with [`outcome`](PromiseAdapter::outcome) before
/// the call's first response arrives. One still unclaimed at that point is
/// dropped, so calls made without ever asking for their future do not
/// accumulate.
pub struct PromiseAdapter {
    inner: Rc<dyn Dispatch>,
    scheduler: Rc<dyn Scheduler>,
    outcomes: Outcomes,
}

impl PromiseAdapter {
    /// Wrap `sender`'s current send function.
    pub fn install(sender: &Sender, scheduler: Rc<dyn Scheduler>) -> Rc<Self> {
        let adapter = Rc::new(Self {
            inner: sender.dispatcher(),
            scheduler,
            outcomes: Rc::new(RefCell::new(HashMap::new())),
        });
        sender.intercept(adapter.clone());
        adapter
    }

    /// Take the future of a call sent through this adapter.
    ///
    /// Transient calls have none; each future can be taken once.
    pub fn outcome(&self, call_id: CallId) -> Option<CallFuture> {
        self.outcomes.borrow_mut().remove(&call_id)
    }

    /// Drop the future of a call nobody is going to await.
    pub fn discard(&self, call_id: CallId) -> bool {
        self.outcomes.borrow_mut().remove(&call_id).is_some()
    }

    /// Number of futures not yet taken whose call is still unanswered.
    pub fn unclaimed(&self) -> usize {
        self.outcomes.borrow().len()
    }

    /// Send through `sender` and return the call id with its future.
    ///
    /// # Errors
    ///
    /// Propagates the sender's errors; returns a configuration error if the
    /// call is transient or the adapter is not installed on `sender`.
    pub fn call(&self, sender: &Sender, call: MethodCall) -> Result<(CallId, CallFuture)> {
        let call_id = sender.method(call)?;
        let future = self.outcome(call_id).ok_or_else(|| {
            PostwireError::Configuration(format!(
                "call {} has no future (transient call or adapter not installed)",
                call_id
            ))
        })?;
        Ok((call_id, future))
    }
}

impl Dispatch for PromiseAdapter {
    fn dispatch(&self, transport: &Transport, mut call: MethodCall) -> Result<CallId> {
        if call.is_transient() {
            return self.inner.dispatch(transport, call);
        }

        let (tx, rx) = oneshot::channel();
        let deferred = Rc::new(RefCell::new(Deferred {
            tx: Some(tx),
            call_id: None,
        }));

        let on_success = self.wrap(call.take_on_success(), &deferred, Ok);
        let on_error = self.wrap(call.take_on_error(), &deferred, |data| {
            Err(PostwireError::Remote(data))
        });
        call.set_on_success(Some(on_success));
        call.set_on_error(Some(on_error));

        let call_id = self.inner.dispatch(transport, call)?;
        deferred.borrow_mut().call_id = Some(call_id);
        self.outcomes.borrow_mut().insert(call_id, CallFuture { rx });
        Ok(call_id)
    }
}

impl PromiseAdapter {
    /// Run the caller's callback unchanged, then settle the deferred once.
    fn wrap(
        &self,
        mut original: Option<Callback>,
        deferred: &Rc<RefCell<Deferred>>,
        settle: fn(Value) -> Outcome,
    ) -> Callback {
        let deferred = deferred.clone();
        let scheduler = self.scheduler.clone();
        let outcomes = Rc::downgrade(&self.outcomes);

        Box::new(move |data: Value| {
            let copy = deferred.borrow().tx.is_some().then(|| data.clone());

            if let Some(callback) = original.as_mut() {
                callback(data);
            }

            let Some(copy) = copy else {
                return;
            };
            let (tx, call_id) = {
                let mut deferred = deferred.borrow_mut();
                (deferred.tx.take(), deferred.call_id)
            };
            let Some(tx) = tx else {
                return;
            };

            if let (Some(outcomes), Some(call_id)) = (outcomes.upgrade(), call_id) {
                let unclaimed = outcomes.borrow_mut().remove(&call_id).is_some();
                if unclaimed {
                    tracing::trace!("Dropping unclaimed outcome of call {}", call_id);
                    return;
                }
            }

            scheduler.schedule(Box::new(move || {
                let _ = tx.send(settle(copy));
            }));
        })
    }
}
