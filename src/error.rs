use crate::types::Status;

/// Conditions reported by [`minimize`](crate::minimize) and its collaborators.
///
/// These are the *reported* failures: problem- and recorder-supplied errors
/// and unsatisfied method requirements. Structural contract violations (zero
/// dimension, a method requesting more tasks than offered, a driver-reserved
/// operation sent by a method) are bugs in the calling code and panic
/// instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The method requires a gradient but `Problem::with_grad` was not called.
    #[error("method requires a gradient but the problem does not provide one")]
    MissingGradient,

    /// The method requires a Hessian but `Problem::with_hess` was not called.
    #[error("method requires a Hessian but the problem does not provide one")]
    MissingHessian,

    /// The problem reported a terminal status before the run started.
    #[error("problem reported terminal status before the run started: {0}")]
    ProblemTerminated(Status),

    /// The objective function (or gradient/Hessian routine) panicked while
    /// being evaluated on a worker.
    #[error("the objective panicked during evaluation")]
    ObjectivePanicked,

    /// A recorder operation failed.
    #[error("recorder: {0}")]
    Recorder(String),

    /// A failure reported by a user callback.
    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status() {
        let err = Error::ProblemTerminated(Status::Custom("user requested"));
        assert!(err.to_string().contains("user requested"));
    }
}
