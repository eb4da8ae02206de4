//! Quasi-Newton method with the BFGS inverse-Hessian update.

use nalgebra::{DMatrix, DVector};

use super::{Method, Needs, SerialLink, Task, TaskReceiver, TaskSender};
use crate::error::Result;
use crate::types::{Eval, Operation, Status};

/// BFGS with a backtracking line search.
///
/// Maintains a dense approximation of the inverse Hessian, updated from
/// gradient differences, and steps along the quasi-Newton direction scaled
/// back until the sufficient-decrease condition holds. Evaluations run one
/// at a time; the driver's convergence checks (typically the gradient
/// threshold) terminate the run.
///
/// This is the default method for problems that provide a gradient.
#[derive(Clone, Debug)]
pub struct Bfgs {
    /// Sufficient-decrease constant for the line search.
    pub decrease: f64,
    /// Factor applied to the step after a rejected probe.
    pub contraction: f64,
    /// Smallest step attempted before the search gives up.
    pub min_step: f64,

    dim: usize,
    terminal: Status,
}

impl Default for Bfgs {
    fn default() -> Self {
        Self {
            decrease: 1e-4,
            contraction: 0.5,
            min_step: 1e-20,
            dim: 0,
            terminal: Status::NotTerminated,
        }
    }
}

impl Method for Bfgs {
    fn needs(&self) -> Needs {
        Needs {
            gradient: true,
            hessian: false,
        }
    }

    fn init(&mut self, dim: usize, _tasks: usize) -> usize {
        self.dim = dim;
        self.terminal = Status::NotTerminated;
        1
    }

    fn run(&mut self, operations: TaskSender, results: TaskReceiver, mut tasks: Vec<Task>) {
        let mut link = SerialLink::new(operations, results);
        let dim = self.dim;
        let mut task = tasks.swap_remove(0);

        // Fill in whatever the initial state does not already provide.
        let have = match task.op {
            Operation::Evaluate(mask) => mask,
            _ => Eval::empty(),
        };
        let missing = (Eval::FUNC | Eval::GRAD).without(have);
        if !missing.is_empty() {
            task.op = Operation::Evaluate(missing);
            task = match link.exchange(task) {
                Some(task) => task,
                None => return link.finish(None),
            };
        }

        let mut x = DVector::from_column_slice(&task.location.x);
        let mut f = task.location.f;
        let mut g = DVector::from_column_slice(
            task.location
                .gradient
                .as_deref()
                .expect("bfgs: location is missing its gradient slot"),
        );
        let mut h_inv = DMatrix::<f64>::identity(dim, dim);

        // Commit the starting point.
        task.op = Operation::MajorIteration;
        task = match link.exchange(task) {
            Some(task) => task,
            None => return link.finish(None),
        };

        while !link.stopping() {
            // Quasi-Newton direction, falling back to steepest descent if
            // the approximation has lost descent.
            let mut d = -(&h_inv * &g);
            if d.dot(&g) >= 0.0 {
                h_inv = DMatrix::identity(dim, dim);
                d = -g.clone();
            }
            let slope = g.dot(&d);

            // Backtracking line search on the sufficient-decrease condition.
            let mut step = 1.0;
            let accepted = loop {
                for i in 0..dim {
                    task.location.x[i] = x[i] + step * d[i];
                }
                task.op = Operation::Evaluate(Eval::FUNC | Eval::GRAD);
                task = match link.exchange(task) {
                    Some(task) => task,
                    None => return link.finish(None),
                };
                if link.stopping() {
                    break false;
                }
                if task.location.f <= f + self.decrease * step * slope {
                    break true;
                }
                step *= self.contraction;
                if step < self.min_step {
                    // No decrease at the smallest step we are willing to try.
                    self.terminal = Status::StepConvergence;
                    task.op = Operation::MethodDone;
                    link.send(task);
                    return link.finish(None);
                }
            };
            if !accepted {
                // Terminated mid-search; commit the probe if it improved.
                let best = (task.location.f < f).then_some(task.location);
                return link.finish(best);
            }

            let x_new = DVector::from_column_slice(&task.location.x);
            let g_new = DVector::from_column_slice(
                task.location
                    .gradient
                    .as_deref()
                    .expect("bfgs: location is missing its gradient slot"),
            );
            let f_new = task.location.f;

            // BFGS update of the inverse Hessian approximation:
            //   H <- (I - r s y^T) H (I - r y s^T) + r s s^T,  r = 1 / y.s
            let s = &x_new - &x;
            let y = &g_new - &g;
            let sy = s.dot(&y);
            if sy > f64::EPSILON * s.norm() * y.norm() {
                let rho = 1.0 / sy;
                let identity = DMatrix::<f64>::identity(dim, dim);
                let left = &identity - rho * (&s * y.transpose());
                let right = &identity - rho * (&y * s.transpose());
                h_inv = &left * &h_inv * &right + rho * (&s * s.transpose());
            }

            x = x_new;
            f = f_new;
            g = g_new;

            // Commit the accepted point.
            task.op = Operation::MajorIteration;
            task = match link.exchange(task) {
                Some(task) => task,
                None => return link.finish(None),
            };
        }
        link.finish(None);
    }

    fn status(&self) -> Option<Result<Status>> {
        self.terminal.terminated().then(|| Ok(self.terminal))
    }
}
