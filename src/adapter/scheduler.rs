//! Where the promise adapter runs its resolutions.
//!
//! Callbacks fire inside the channel's message handler. UI frameworks want
//! state changes to land inside their own update cycle instead, so the
//! adapter never settles a future directly: it hands a task to a
//! [`Scheduler`].

use std::cell::RefCell;
use std::collections::VecDeque;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Runs tasks handed over by the adapter.
pub trait Scheduler {
    fn schedule(&self, task: Task);
}

/// Runs each task on the spot.
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

impl Scheduler for Immediate {
    fn schedule(&self, task: Task) {
        task();
    }
}

/// Queues tasks until the host drains them from its update cycle.
///
/// # Example
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use postwire_client::adapter::{Scheduler, TaskQueue};
///
/// let queue = TaskQueue::new();
/// let ran = Rc::new(Cell::new(false));
/// let flag = ran.clone();
/// queue.schedule(Box::new(move || flag.set(true)));
///
/// assert!(!ran.get());
/// assert_eq!(queue.run_pending(), 1);
/// assert!(ran.get());
/// ```
#[derive(Default)]
pub struct TaskQueue {
    tasks: RefCell<VecDeque<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run queued tasks in order, including tasks queued while running.
    ///
    /// Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self.tasks.borrow_mut().pop_front();
            let Some(task) = next else {
                return ran;
            };
            task();
            ran += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }
}

impl Scheduler for TaskQueue {
    fn schedule(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

/// Spawns each task on the current `tokio::task::LocalSet`.
///
/// # Panics
///
/// Scheduling panics when called outside a `LocalSet` context.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSpawn;

impl Scheduler for LocalSpawn {
    fn schedule(&self, task: Task) {
        tokio::task::spawn_local(async move { task() });
    }
}
