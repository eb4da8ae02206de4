//! Core operation and status vocabulary shared across the driver.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bitmask naming the quantities a single evaluation computes.
///
/// Evaluations compose by bitwise OR, so one round trip through the worker
/// pool can fill in the function value, the gradient, and the Hessian at
/// once:
///
/// ```
/// use descent::Eval;
///
/// let op = Eval::FUNC | Eval::GRAD;
/// assert!(op.contains(Eval::FUNC));
/// assert!(!op.contains(Eval::HESS));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Eval(u8);

impl Eval {
    /// Evaluate the objective function value.
    pub const FUNC: Self = Self(1);
    /// Evaluate the gradient.
    pub const GRAD: Self = Self(1 << 1);
    /// Evaluate the Hessian.
    pub const HESS: Self = Self(1 << 2);

    /// The empty mask.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns `true` if no bits are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// The bits of `self` that are not set in `other`.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }
}

impl BitOr for Eval {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Eval {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Eval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut sep = "";
        for (bit, name) in [(Self::FUNC, "func"), (Self::GRAD, "grad"), (Self::HESS, "hess")] {
            if self.contains(bit) {
                write!(f, "{sep}{name}")?;
                sep = "|";
            }
        }
        Ok(())
    }
}

/// The intent a [`Task`](crate::Task) carries through the driver.
///
/// `Evaluate` requests travel to the worker pool; the remaining variants are
/// iteration events consumed by the stats monitor. `InitIteration` and
/// `PostIteration` originate from the driver and must never be sent by a
/// [`Method`](crate::Method).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operation {
    /// No action; the task is passed through and returned untouched.
    NoOperation,
    /// Evaluate the quantities named by the mask at the task's location.
    Evaluate(Eval),
    /// Snapshot of the initial state, recorded before the run starts.
    InitIteration,
    /// The method commits the task's location as its current best point.
    MajorIteration,
    /// Driver-originated notice that the run is terminating.
    PostIteration,
    /// The method has converged on its own terms.
    MethodDone,
}

impl Operation {
    /// Returns the evaluation mask if this is a non-empty evaluation request.
    #[must_use]
    pub fn evaluation(self) -> Option<Eval> {
        match self {
            Self::Evaluate(mask) if !mask.is_empty() => Some(mask),
            _ => None,
        }
    }

    /// Returns `true` if this operation requests at least one evaluation.
    #[must_use]
    pub fn is_evaluation(self) -> bool {
        self.evaluation().is_some()
    }
}

/// Why an optimization run stopped, or that it has not.
///
/// Statuses other than `NotTerminated` are terminal. Caller-defined terminal
/// conditions reported by `Problem::with_status` use the `Custom` variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    /// The run is still in progress.
    NotTerminated,
    /// The method reported convergence on its own criteria.
    MethodConverge,
    /// The objective value dropped below `Settings::function_threshold`.
    FunctionThreshold,
    /// The objective value stagnated; see [`FunctionConverge`](crate::FunctionConverge).
    FunctionConvergence,
    /// The gradient infinity-norm dropped below `Settings::gradient_threshold`.
    GradientThreshold,
    /// The objective value reached negative infinity.
    FunctionNegativeInfinity,
    /// The step size collapsed without finding further decrease.
    StepConvergence,
    /// The function-evaluation budget was exhausted.
    FunctionEvaluationLimit,
    /// The gradient-evaluation budget was exhausted.
    GradientEvaluationLimit,
    /// The Hessian-evaluation budget was exhausted.
    HessianEvaluationLimit,
    /// The major-iteration budget was exhausted.
    IterationLimit,
    /// The wall-clock budget was exhausted.
    RuntimeLimit,
    /// A collaborator reported an error; details travel in the run's `Err`.
    Failure,
    /// A caller-defined terminal condition.
    Custom(&'static str),
}

impl Status {
    /// Returns `true` for every status other than `NotTerminated`.
    #[must_use]
    pub fn terminated(self) -> bool {
        self != Self::NotTerminated
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotTerminated => write!(f, "not terminated"),
            Self::MethodConverge => write!(f, "method converged"),
            Self::FunctionThreshold => write!(f, "function value below threshold"),
            Self::FunctionConvergence => write!(f, "function value stagnated"),
            Self::GradientThreshold => write!(f, "gradient norm below threshold"),
            Self::FunctionNegativeInfinity => write!(f, "function value is negative infinity"),
            Self::StepConvergence => write!(f, "step size converged"),
            Self::FunctionEvaluationLimit => write!(f, "function evaluation limit reached"),
            Self::GradientEvaluationLimit => write!(f, "gradient evaluation limit reached"),
            Self::HessianEvaluationLimit => write!(f, "Hessian evaluation limit reached"),
            Self::IterationLimit => write!(f, "major iteration limit reached"),
            Self::RuntimeLimit => write!(f, "runtime limit reached"),
            Self::Failure => write!(f, "failure"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}
