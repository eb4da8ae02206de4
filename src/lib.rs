//! Concurrent minimization of scalar functions of many variables.
//!
//! This crate provides the *driver* of a numerical optimization: given an
//! objective (and optionally its gradient and Hessian), it runs a pluggable
//! [`Method`] to completion, evaluating the objective on a pool of blocking
//! workers, enforcing termination policy, and producing a [`Solution`].
//!
//! The participants — method, distributor, worker pool, and stats monitor —
//! communicate only through bounded channels of [`Task`]s, so methods stay
//! single-threaded and sequential while evaluations fan out across workers.
//!
//! # Quick start
//!
//! ```
//! use descent::{minimize, Problem, Status};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! // f(x) = sum(x_i^2), minimized from (3, -4).
//! let problem = Problem::new(|x| x.iter().map(|v| v * v).sum())
//!     .with_grad(|g, x| {
//!         for (gi, xi) in g.iter_mut().zip(x) {
//!             *gi = 2.0 * xi;
//!         }
//!     });
//!
//! let solution = minimize(problem, &[3.0, -4.0], None, None).await.unwrap();
//! assert_eq!(solution.status, Status::GradientThreshold);
//! assert!(solution.location.x.iter().all(|v| v.abs() < 1e-6));
//! # }
//! ```
//!
//! # Choosing a method
//!
//! When no method is passed, [`minimize`] picks [`Bfgs`] for problems with a
//! gradient and [`NelderMead`] otherwise. Any type implementing [`Method`]
//! can be plugged in instead:
//!
//! ```
//! use descent::{minimize, NelderMead, Problem};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let problem = Problem::new(|x| (x[0] - 1.0).powi(2) + x[1].powi(2));
//! let solution = minimize(problem, &[5.0, 5.0], None, Some(Box::new(NelderMead::default())))
//!     .await
//!     .unwrap();
//! assert!((solution.location.x[0] - 1.0).abs() < 1e-3);
//! # }
//! ```
//!
//! # Budgets and termination
//!
//! [`Settings`] carries the run policy: evaluation and iteration budgets,
//! convergence thresholds, wall-clock limit, and the number of concurrent
//! evaluations. Every limit is checked by the driver, not the method, so
//! they hold for any method.
//!
//! # Feature flags
//!
//! - `serde`: `Serialize`/`Deserialize` for the value-like types.
//! - `journal`: the JSONL [`JournalRecorder`] (implies `serde`).
//! - `tracing`: structured logging of run lifecycle events.

#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

mod error;
mod location;
mod method;
mod minimize;
mod problem;
mod recorder;
mod settings;
mod stats;
mod types;

pub use error::{Error, Result};
pub use location::{Location, SymmetricMatrix};
pub use method::{Bfgs, Method, Needs, NelderMead, Task, TaskReceiver, TaskSender};
pub use minimize::{minimize, Solution};
pub use problem::Problem;
#[cfg(feature = "journal")]
pub use recorder::JournalRecorder;
pub use recorder::{Printer, Recorder};
pub use settings::{FunctionConverge, Settings};
pub use stats::Stats;
pub use types::{Eval, Operation, Status};
