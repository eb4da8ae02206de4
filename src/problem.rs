//! The objective being minimized.

use core::fmt;

use crate::error::{Error, Result};
use crate::location::SymmetricMatrix;
use crate::method::Needs;
use crate::types::Status;

type Func = dyn Fn(&[f64]) -> f64 + Send + Sync;
type Grad = dyn Fn(&mut [f64], &[f64]) + Send + Sync;
type Hess = dyn Fn(&mut SymmetricMatrix, &[f64]) + Send + Sync;
type StatusFn = dyn Fn() -> Result<Status> + Send + Sync;

/// The objective function together with its optional derivative routines
/// and an optional external termination check.
///
/// A `Problem` is read-only during a run and is shared across the worker
/// pool, so all callbacks must be `Send + Sync`. Every callback receives a
/// defensive copy of the point, never the driver's own buffer.
///
/// Maximization problems are expressed by negating the objective.
///
/// # Examples
///
/// ```
/// use descent::Problem;
///
/// // f(x) = sum(x_i^2), grad f = 2x
/// let problem = Problem::new(|x| x.iter().map(|v| v * v).sum())
///     .with_grad(|g, x| {
///         for (gi, xi) in g.iter_mut().zip(x) {
///             *gi = 2.0 * xi;
///         }
///     });
/// ```
pub struct Problem {
    func: Box<Func>,
    grad: Option<Box<Grad>>,
    hess: Option<Box<Hess>>,
    status: Option<Box<StatusFn>>,
}

impl Problem {
    /// Create a problem from its objective function.
    pub fn new(func: impl Fn(&[f64]) -> f64 + Send + Sync + 'static) -> Self {
        Self {
            func: Box::new(func),
            grad: None,
            hess: None,
            status: None,
        }
    }

    /// Attach a gradient routine. It receives the output slice first and the
    /// point second, and must fill the whole slice.
    #[must_use]
    pub fn with_grad(mut self, grad: impl Fn(&mut [f64], &[f64]) + Send + Sync + 'static) -> Self {
        self.grad = Some(Box::new(grad));
        self
    }

    /// Attach a Hessian routine. It receives the output matrix first and the
    /// point second.
    #[must_use]
    pub fn with_hess(
        mut self,
        hess: impl Fn(&mut SymmetricMatrix, &[f64]) + Send + Sync + 'static,
    ) -> Self {
        self.hess = Some(Box::new(hess));
        self
    }

    /// Attach an external termination check, polled before every evaluation.
    ///
    /// Returning `Ok` with a terminal [`Status`] stops the run with that
    /// status; returning `Err` stops the run with the error.
    #[must_use]
    pub fn with_status(
        mut self,
        status: impl Fn() -> Result<Status> + Send + Sync + 'static,
    ) -> Self {
        self.status = Some(Box::new(status));
        self
    }

    /// Returns `true` if a gradient routine is attached.
    #[must_use]
    pub fn has_grad(&self) -> bool {
        self.grad.is_some()
    }

    /// Returns `true` if a Hessian routine is attached.
    #[must_use]
    pub fn has_hess(&self) -> bool {
        self.hess.is_some()
    }

    /// Check that the problem provides everything the method needs.
    pub(crate) fn satisfies(&self, needs: Needs) -> Result<()> {
        if needs.gradient && self.grad.is_none() {
            return Err(Error::MissingGradient);
        }
        if needs.hessian && self.hess.is_none() {
            return Err(Error::MissingHessian);
        }
        Ok(())
    }

    pub(crate) fn func(&self, x: &[f64]) -> f64 {
        (self.func)(x)
    }

    /// Panics if no gradient routine is attached; the driver only requests
    /// gradient evaluations after `satisfies` has passed.
    pub(crate) fn grad(&self, out: &mut [f64], x: &[f64]) {
        let grad = self
            .grad
            .as_ref()
            .expect("descent: gradient evaluation requested without a gradient routine");
        grad(out, x);
    }

    pub(crate) fn hess(&self, out: &mut SymmetricMatrix, x: &[f64]) {
        let hess = self
            .hess
            .as_ref()
            .expect("descent: Hessian evaluation requested without a Hessian routine");
        hess(out, x);
    }

    /// Poll the external termination check, if one is attached.
    pub(crate) fn poll_status(&self) -> Option<Result<Status>> {
        self.status.as_ref().map(|status| status())
    }
}

impl fmt::Debug for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Problem")
            .field("has_grad", &self.grad.is_some())
            .field("has_hess", &self.hess.is_some())
            .field("has_status", &self.status.is_some())
            .finish()
    }
}
