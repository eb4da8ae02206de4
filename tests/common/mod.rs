//! Objective functions and recorders shared across the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;

use descent::{Location, Operation, Problem, Recorder, Stats};

/// f(x) = sum(x_i^2), with gradient 2x. Minimum 0 at the origin.
pub fn sphere() -> Problem {
    Problem::new(|x: &[f64]| x.iter().map(|v| v * v).sum()).with_grad(|g, x| {
        for (gi, xi) in g.iter_mut().zip(x) {
            *gi = 2.0 * xi;
        }
    })
}

/// The sphere objective without a gradient routine.
pub fn sphere_no_grad() -> Problem {
    Problem::new(|x: &[f64]| x.iter().map(|v| v * v).sum())
}

/// The 2-d Rosenbrock function, with gradient. Minimum 0 at (1, 1).
pub fn rosenbrock() -> Problem {
    Problem::new(|x: &[f64]| {
        100.0 * (x[1] - x[0] * x[0]).powi(2) + (1.0 - x[0]).powi(2)
    })
    .with_grad(|g, x| {
        g[0] = -400.0 * x[0] * (x[1] - x[0] * x[0]) - 2.0 * (1.0 - x[0]);
        g[1] = 200.0 * (x[1] - x[0] * x[0]);
    })
}

/// Records the operation of every snapshot it sees.
#[derive(Clone, Default)]
pub struct TapeRecorder {
    ops: Arc<Mutex<Vec<Operation>>>,
}

impl TapeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The operations recorded so far, in order.
    pub fn ops(&self) -> Vec<Operation> {
        self.ops.lock().clone()
    }
}

impl Recorder for TapeRecorder {
    fn init(&mut self) -> descent::Result<()> {
        Ok(())
    }

    fn record(&mut self, _location: &Location, op: Operation, _stats: &Stats) -> descent::Result<()> {
        self.ops.lock().push(op);
        Ok(())
    }
}
