//! Run policy: thresholds, budgets, concurrency, and observers.

use std::time::Duration;

use crate::location::Location;
use crate::recorder::Recorder;
use crate::types::Status;

/// Settings controlling a single [`minimize`](crate::minimize) run.
///
/// All limit counters treat `0` as "unlimited". The `Default` value is the
/// local-optimization profile: terminate on a gradient infinity-norm below
/// `1e-12`, or when the objective stagnates for 100 consecutive major
/// iterations.
///
/// Every setting is honored for every method, but *when* a setting is
/// checked depends on the task stream: evaluation budgets are checked after
/// each completed evaluation, convergence thresholds and iteration budgets
/// only at major iterations. A method that never evaluates gradients will
/// therefore never trip `gradient_threshold`.
pub struct Settings {
    /// Maximum number of evaluations in flight. `0` behaves as `1`.
    ///
    /// During concurrent evaluation there is no guarantee that every
    /// evaluation started before a termination condition fired also finishes
    /// before the run returns its result — in-flight work is drained, not
    /// cancelled.
    pub concurrent: usize,
    /// Observer invoked on the initial snapshot, every accepted task, and
    /// the final snapshot.
    pub recorder: Option<Box<dyn Recorder + Send>>,
    /// Known quantities at the initial point (`f`, gradient, Hessian).
    ///
    /// The point itself must be passed as `init_x`; a non-empty
    /// `init_values.x` panics.
    pub init_values: Option<Location>,
    /// Terminate with [`Status::GradientThreshold`] when the gradient
    /// infinity-norm at a major iteration is strictly below this value.
    pub gradient_threshold: f64,
    /// Terminate with [`Status::FunctionThreshold`] when the objective value
    /// at a major iteration is strictly below this value.
    pub function_threshold: f64,
    /// Stagnation monitor consulted at every major iteration.
    pub function_converge: Option<FunctionConverge>,
    /// Terminate after this many function evaluations.
    pub func_evaluations: usize,
    /// Terminate after this many gradient evaluations.
    pub grad_evaluations: usize,
    /// Terminate after this many Hessian evaluations.
    pub hess_evaluations: usize,
    /// Terminate after this many major iterations.
    pub major_iterations: usize,
    /// Terminate once the run has lasted at least this long, checked at
    /// major iterations.
    pub runtime: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrent: 0,
            recorder: None,
            init_values: None,
            gradient_threshold: 1e-12,
            function_threshold: f64::NEG_INFINITY,
            function_converge: Some(FunctionConverge::default()),
            func_evaluations: 0,
            grad_evaluations: 0,
            hess_evaluations: 0,
            major_iterations: 0,
            runtime: None,
        }
    }
}

/// Terminates a run when the best objective value stops improving.
///
/// The monitor tracks the best value seen at major iterations. When
/// `iterations` consecutive major iterations fail to improve it by at least
/// `max(absolute, relative * |best|)`, the run stops with
/// [`Status::FunctionConvergence`].
#[derive(Clone, Debug)]
pub struct FunctionConverge {
    /// Minimum absolute improvement that resets the stagnation counter.
    pub absolute: f64,
    /// Minimum improvement relative to the best value seen.
    pub relative: f64,
    /// Consecutive non-improving major iterations tolerated.
    pub iterations: usize,

    best: f64,
    stale: usize,
    seen_first: bool,
}

impl FunctionConverge {
    /// Create a monitor with the given margins and stagnation window.
    #[must_use]
    pub fn new(absolute: f64, relative: f64, iterations: usize) -> Self {
        Self {
            absolute,
            relative,
            iterations,
            ..Self::default()
        }
    }

    /// Reset the internal state; called by the driver before each run.
    pub(crate) fn init(&mut self) {
        self.best = f64::INFINITY;
        self.stale = 0;
        self.seen_first = false;
    }

    /// Fold in the objective value of a major iteration and report whether
    /// the run has stagnated.
    pub(crate) fn converged(&mut self, f: f64) -> Status {
        if !self.seen_first {
            self.seen_first = true;
            self.best = f;
            return Status::NotTerminated;
        }
        let margin = self.absolute.max(self.relative * self.best.abs());
        if f < self.best - margin {
            self.best = f;
            self.stale = 0;
            return Status::NotTerminated;
        }
        self.stale += 1;
        if self.iterations > 0 && self.stale >= self.iterations {
            return Status::FunctionConvergence;
        }
        Status::NotTerminated
    }
}

impl Default for FunctionConverge {
    fn default() -> Self {
        Self {
            absolute: 1e-10,
            relative: 0.0,
            iterations: 100,
            best: f64::INFINITY,
            stale: 0,
            seen_first: false,
        }
    }
}
