//! The pluggable optimization-method protocol.
//!
//! A [`Method`] drives the search: it owns the iteration logic and streams
//! [`Task`]s to the driver, which evaluates them on the worker pool and
//! returns them completed. Two methods ship with the crate — [`Bfgs`] for
//! problems with gradients and [`NelderMead`] for derivative-free problems —
//! and [`minimize`](crate::minimize) picks between them when no method is
//! given.
//!
//! # The run-loop contract
//!
//! [`Method::run`] executes on its own blocking thread. It reads the initial
//! state from `tasks[0]` (whose `op` encodes which quantities are already
//! valid; `NoOperation` means only the point itself), sends tasks on
//! `operations`, and reads completions from `results`. The driver terminates
//! the run by delivering a task with [`Operation::PostIteration`] on
//! `results`. After seeing it, the method must keep draining `results` until
//! the channel closes and must not request further evaluations, but it may
//! still send [`Operation::MajorIteration`] to commit a best-known point.
//! Dropping `operations` — normally by returning from `run` — must happen
//! only after `results` has been observed closed.
//!
//! A method that converges on its own criteria sends
//! [`Operation::MethodDone`] and reports the terminal status through
//! [`Method::status`].

use tokio::sync::mpsc;

use crate::error::Result;
use crate::location::Location;
use crate::types::{Operation, Status};

mod bfgs;
mod nelder_mead;

pub use bfgs::Bfgs;
pub use nelder_mead::NelderMead;

/// The quantities a method requires the problem to provide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Needs {
    /// The method evaluates gradients.
    pub gradient: bool,
    /// The method evaluates Hessians.
    pub hessian: bool,
}

/// The unit of communication between a method and the driver.
///
/// A task moves across channels whole; whoever holds it owns its location
/// and has the exclusive right to mutate it. The `id` belongs to the method
/// and is never touched by the driver.
#[derive(Debug)]
pub struct Task {
    /// Method-owned identifier, preserved by the driver.
    pub id: usize,
    /// What should happen (or has happened) to the location.
    pub op: Operation,
    /// The point this task is about.
    pub location: Location,
}

/// Sending half of the `operations` channel handed to [`Method::run`].
///
/// Dropping the sender closes the channel, which is how a method signals
/// that it has finished.
pub struct TaskSender {
    tx: mpsc::Sender<Task>,
}

impl TaskSender {
    pub(crate) fn new(tx: mpsc::Sender<Task>) -> Self {
        Self { tx }
    }

    /// Send a task to the driver, blocking while the channel is full.
    ///
    /// # Panics
    ///
    /// Panics if the driver has gone away, which only happens after a driver
    /// bug; the channel outlives every correct run.
    pub fn send(&self, task: Task) {
        self.tx
            .blocking_send(task)
            .expect("descent: driver dropped the operations channel mid-run");
    }
}

/// Receiving half of the `results` channel handed to [`Method::run`].
pub struct TaskReceiver {
    rx: mpsc::Receiver<Task>,
}

impl TaskReceiver {
    pub(crate) fn new(rx: mpsc::Receiver<Task>) -> Self {
        Self { rx }
    }

    /// Receive the next completed task, blocking while the channel is empty.
    /// Returns `None` once the driver has closed the channel.
    pub fn recv(&mut self) -> Option<Task> {
        self.rx.blocking_recv()
    }
}

/// A strategy that searches for an optimum of an objective function.
pub trait Method: Send {
    /// Which quantities the problem must provide for this method.
    fn needs(&self) -> Needs;

    /// Prepare for a `dim`-dimensional run with up to `tasks` concurrent
    /// evaluations on offer, returning how many the method will actually
    /// use. The return value must be between 1 and `tasks`.
    fn init(&mut self, dim: usize, tasks: usize) -> usize;

    /// The producer loop; see the [module docs](self) for the contract.
    ///
    /// `tasks` has length equal to the return of [`init`](Method::init);
    /// `tasks[0]` describes the initial state and the remaining entries are
    /// blank locations for fan-out.
    fn run(&mut self, operations: TaskSender, results: TaskReceiver, tasks: Vec<Task>);

    /// Terminal status of a method that sent [`Operation::MethodDone`].
    ///
    /// `None` declares that the method never sends `MethodDone`. A method
    /// that does send it must return `Some` with a status other than
    /// [`Status::NotTerminated`]; `Err` maps to a failed run with the given
    /// error.
    fn status(&self) -> Option<Result<Status>> {
        None
    }
}

/// One-task-in-flight helper for serial methods.
///
/// Wraps the channel pair and tracks the PostIteration handshake: `exchange`
/// sends a task and waits for it to come back, remembering whether the
/// driver announced termination along the way; `finish` drains `results` to
/// exhaustion and optionally commits one final best point before closing
/// `operations`.
pub(crate) struct SerialLink {
    operations: TaskSender,
    results: TaskReceiver,
    stopping: bool,
}

impl SerialLink {
    pub(crate) fn new(operations: TaskSender, results: TaskReceiver) -> Self {
        Self {
            operations,
            results,
            stopping: false,
        }
    }

    /// Whether the driver has delivered PostIteration.
    pub(crate) fn stopping(&self) -> bool {
        self.stopping
    }

    pub(crate) fn send(&self, task: Task) {
        self.operations.send(task);
    }

    /// Send `task` and wait for its completion. Returns `None` if the driver
    /// closed `results` before the task came back (it was discarded during
    /// shutdown).
    pub(crate) fn exchange(&mut self, task: Task) -> Option<Task> {
        self.operations.send(task);
        loop {
            match self.results.recv() {
                None => return None,
                Some(task) if task.op == Operation::PostIteration => self.stopping = true,
                Some(task) => return Some(task),
            }
        }
    }

    /// Drain `results`, optionally commit `location` as a final major
    /// iteration, and close `operations` by dropping the sender.
    pub(crate) fn finish(mut self, commit: Option<Location>) {
        while self.results.recv().is_some() {}
        if let Some(location) = commit {
            self.operations.send(Task {
                id: 0,
                op: Operation::MajorIteration,
                location,
            });
        }
    }
}
