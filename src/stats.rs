//! Counters accumulated over a run.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::types::Eval;

/// Evaluation and iteration counters, owned exclusively by the stats monitor
/// during a run and returned in the [`Solution`](crate::Solution).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Stats {
    /// Completed objective-function evaluations.
    pub func_evaluations: usize,
    /// Completed gradient evaluations.
    pub grad_evaluations: usize,
    /// Completed Hessian evaluations.
    pub hess_evaluations: usize,
    /// Major iterations committed by the method.
    pub major_iterations: usize,
    /// Wall-clock time since the run started.
    pub runtime: Duration,
}

impl Stats {
    /// Fold one completed evaluation into the counters, one increment per
    /// bit set in the mask.
    pub(crate) fn count_evaluation(&mut self, mask: Eval) {
        if mask.contains(Eval::FUNC) {
            self.func_evaluations += 1;
        }
        if mask.contains(Eval::GRAD) {
            self.grad_evaluations += 1;
        }
        if mask.contains(Eval::HESS) {
            self.hess_evaluations += 1;
        }
    }
}
