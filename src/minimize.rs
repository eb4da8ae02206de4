//! The concurrent optimization driver.
//!
//! Four participants communicate through bounded channels of [`Task`]s: the
//! method produces tasks, the distributor routes them, the worker pool
//! evaluates them, and the stats monitor (this module's main loop) folds the
//! completions into statistics, checks termination policy, and returns
//! finished tasks to the method.
//!
//! Shutting down is the delicate part. The monitor latches the first
//! terminal status or error, pushes a `PostIteration` task to the method,
//! and fires the one-shot `done` signal. The distributor then stops feeding
//! the workers and drains the method's remaining tasks, honoring only final
//! major iterations. As the workers finish their in-flight evaluations they
//! report exits; once all have exited the monitor closes `results`, which
//! permits the method to commit a last best point and close `operations`.
//! Only then does the stats channel close and the monitor's loop end. Every
//! channel closure is expressed by dropping the corresponding half.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::location::Location;
use crate::method::{Bfgs, Method, Needs, NelderMead, Task, TaskReceiver, TaskSender};
use crate::problem::Problem;
use crate::recorder::Recorder;
use crate::settings::Settings;
use crate::stats::Stats;
use crate::types::{Eval, Operation, Status};

/// The outcome of a [`minimize`] run.
#[derive(Clone, Debug)]
pub struct Solution {
    /// The optimum: a copy of the location committed by the last accepted
    /// major iteration. If no major iteration was accepted the value is the
    /// initial allocation with `f = +inf`.
    pub location: Location,
    /// Counters accumulated over the run.
    pub stats: Stats,
    /// Why the run stopped.
    pub status: Status,
}

/// Message consumed by the stats monitor.
enum StatsMsg {
    /// A task routed or completed on behalf of the method.
    Task(Task),
    /// An evaluation whose problem callback panicked.
    EvalPanicked(Task),
    /// A worker exited after the evaluation channel closed.
    WorkerExit,
}

/// Search for a minimum of `problem` starting from `init_x`.
///
/// `settings` defaults to the local-optimization profile
/// ([`Settings::default`]); `method` defaults to [`Bfgs`] when the problem
/// has a gradient and [`NelderMead`] otherwise. Evaluations run on
/// `settings.concurrent` blocking workers (at least one), so expensive
/// objectives never stall the async runtime.
///
/// Every setting is honored for every method; a maximization problem is
/// expressed by negating the objective.
///
/// # Errors
///
/// Returns the first reported error: an unsatisfied method requirement, a
/// terminal report from `Problem::with_status`, a recorder failure, or a
/// panicking objective. Terminal *statuses* are not errors — they come back
/// in [`Solution::status`].
///
/// # Panics
///
/// Panics on structural misuse: an empty `init_x`, initial values with
/// mismatched dimensions, a method requesting more tasks than offered, or a
/// method violating the run-loop protocol.
///
/// # Examples
///
/// ```
/// use descent::{minimize, Problem, Status};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let problem = Problem::new(|x| x.iter().map(|v| v * v).sum())
///     .with_grad(|g, x| {
///         for (gi, xi) in g.iter_mut().zip(x) {
///             *gi = 2.0 * xi;
///         }
///     });
///
/// let solution = minimize(problem, &[3.0, -4.0], None, None).await.unwrap();
/// assert_eq!(solution.status, Status::GradientThreshold);
/// assert!(solution.location.f < 1e-12);
/// # }
/// ```
pub async fn minimize(
    problem: Problem,
    init_x: &[f64],
    settings: Option<Settings>,
    method: Option<Box<dyn Method>>,
) -> Result<Solution> {
    let start = Instant::now();
    let mut settings = settings.unwrap_or_default();
    let method = method.unwrap_or_else(|| default_method(&problem));
    let needs = method.needs();
    let dim = init_x.len();
    let mut stats = Stats::default();

    let mut recorder = settings.recorder.take();
    check_optimization(&problem, dim, needs, recorder.as_deref_mut())?;

    let mut opt_loc = Location::sized(dim, needs);
    opt_loc.f = f64::INFINITY;

    if let Some(fc) = settings.function_converge.as_mut() {
        fc.init();
    }

    let (init_op, init_loc) = initial_task(dim, Some(init_x), settings.init_values.as_ref(), needs);

    stats.runtime = start.elapsed();
    if let Some(rec) = recorder.as_mut() {
        rec.record(&opt_loc, Operation::InitIteration, &stats)?;
    }

    let problem = Arc::new(problem);
    let (status, error) = drive(
        &problem,
        method,
        &mut settings,
        &mut recorder,
        &mut stats,
        init_op,
        init_loc,
        &mut opt_loc,
        start,
    )
    .await;

    if error.is_none() {
        if let Some(rec) = recorder.as_mut() {
            stats.runtime = start.elapsed();
            rec.record(&opt_loc, Operation::PostIteration, &stats)?;
        }
    }
    stats.runtime = start.elapsed();
    if let Some(error) = error {
        return Err(error);
    }
    Ok(Solution {
        location: opt_loc,
        stats,
        status,
    })
}

fn default_method(problem: &Problem) -> Box<dyn Method> {
    if problem.has_grad() {
        Box::new(Bfgs::default())
    } else {
        Box::new(NelderMead::default())
    }
}

/// Validate the run before any task is dispatched.
fn check_optimization(
    problem: &Problem,
    dim: usize,
    needs: Needs,
    recorder: Option<&mut (dyn Recorder + Send + 'static)>,
) -> Result<()> {
    assert!(dim > 0, "descent: non-positive problem dimension");
    problem.satisfies(needs)?;
    if let Some(polled) = problem.poll_status() {
        let status = polled?;
        if status.terminated() {
            return Err(Error::ProblemTerminated(status));
        }
    }
    if let Some(rec) = recorder {
        rec.init()?;
    }
    Ok(())
}

/// Build the initial task from the caller's starting point and any known
/// values at it. The returned operation encodes which location fields are
/// already valid; `NoOperation` means only the point itself.
fn initial_task(
    dim: usize,
    init_x: Option<&[f64]>,
    init_values: Option<&Location>,
    needs: Needs,
) -> (Operation, Location) {
    let mut loc = Location::sized(dim, needs);
    let Some(init_x) = init_x else {
        assert!(
            init_values.is_none(),
            "descent: initial values supplied without an initial point"
        );
        return (Operation::NoOperation, loc);
    };
    assert_eq!(
        init_x.len(),
        dim,
        "descent: initial point does not match the problem dimension"
    );
    loc.x.copy_from_slice(init_x);
    let Some(values) = init_values else {
        return (Operation::NoOperation, loc);
    };
    assert!(
        values.x.is_empty(),
        "descent: pass the initial point as init_x, not through init_values"
    );
    loc.f = values.f;
    let mut op = Eval::FUNC;
    if let Some(gradient) = &values.gradient {
        assert_eq!(
            gradient.len(),
            dim,
            "descent: initial gradient does not match the problem dimension"
        );
        if needs.gradient {
            loc.gradient
                .as_mut()
                .expect("descent: gradient slot must exist when the method needs it")
                .copy_from_slice(gradient);
            op |= Eval::GRAD;
        }
    }
    if let Some(hessian) = &values.hessian {
        assert_eq!(
            hessian.dim(),
            dim,
            "descent: initial Hessian does not match the problem dimension"
        );
        if needs.hessian {
            loc.hessian
                .as_mut()
                .expect("descent: Hessian slot must exist when the method needs it")
                .copy_from(hessian);
            op |= Eval::HESS;
        }
    }
    (Operation::Evaluate(op), loc)
}

/// Run the task-dispatch state machine to completion and return the latched
/// terminal status and error.
#[allow(clippy::too_many_arguments, clippy::too_many_lines)]
async fn drive(
    problem: &Arc<Problem>,
    mut method: Box<dyn Method>,
    settings: &mut Settings,
    recorder: &mut Option<Box<dyn Recorder + Send>>,
    stats: &mut Stats,
    init_op: Operation,
    init_loc: Location,
    opt_loc: &mut Location,
    start: Instant,
) -> (Status, Option<Error>) {
    let dim = opt_loc.x.len();
    let needs = method.needs();

    let offered = settings.concurrent.max(1);
    let n_tasks = method.init(dim, offered);
    assert!(
        (1..=offered).contains(&n_tasks),
        "descent: method requested {n_tasks} tasks but between 1 and {offered} are available"
    );

    trace_info!(dim, n_tasks, "starting optimization");

    let (op_tx, mut op_rx) = mpsc::channel::<Task>(n_tasks);
    let (res_tx, res_rx) = mpsc::channel::<Task>(n_tasks);

    let mut tasks = Vec::with_capacity(n_tasks);
    tasks.push(Task {
        id: 0,
        op: init_op,
        location: init_loc,
    });
    for id in 1..n_tasks {
        tasks.push(Task {
            id,
            op: Operation::NoOperation,
            location: Location::sized(dim, needs),
        });
    }

    let method_handle = tokio::task::spawn_blocking(move || {
        method.run(TaskSender::new(op_tx), TaskReceiver::new(res_rx), tasks);
        method
    });

    let (worker_tx, worker_rx) = mpsc::channel::<Task>(1);
    let (stats_tx, mut stats_rx) = mpsc::channel::<StatsMsg>(1);
    let (done_tx, done_rx) = oneshot::channel::<()>();

    // Distributor: route method tasks to the workers or the monitor, and on
    // the done signal stop new evaluations and drain what remains.
    let distributor = {
        let stats_tx = stats_tx.clone();
        tokio::spawn(async move {
            let mut done_rx = done_rx;
            let worker_tx = worker_tx;
            loop {
                tokio::select! {
                    task = op_rx.recv() => {
                        let Some(task) = task else {
                            panic!("descent: method closed operations before the driver signalled termination");
                        };
                        match task.op {
                            Operation::InitIteration | Operation::PostIteration => {
                                panic!("descent: method sent a driver-reserved operation: {:?}", task.op);
                            }
                            Operation::NoOperation
                            | Operation::MajorIteration
                            | Operation::MethodDone => {
                                stats_tx
                                    .send(StatsMsg::Task(task))
                                    .await
                                    .expect("descent: stats channel closed");
                            }
                            Operation::Evaluate(mask) => {
                                assert!(
                                    !mask.is_empty(),
                                    "descent: method sent an empty evaluation mask"
                                );
                                worker_tx
                                    .send(task)
                                    .await
                                    .expect("descent: worker channel closed");
                            }
                        }
                    }
                    _ = &mut done_rx => {
                        // Close the worker channel so no further evaluations
                        // start, then drain the method's remaining tasks,
                        // honoring only its final major iterations.
                        drop(worker_tx);
                        while let Some(task) = op_rx.recv().await {
                            if task.op == Operation::MajorIteration {
                                stats_tx
                                    .send(StatsMsg::Task(task))
                                    .await
                                    .expect("descent: stats channel closed");
                            }
                        }
                        return;
                    }
                }
            }
        })
    };

    // Worker pool: each worker pulls evaluation tasks from the shared
    // channel, runs the problem callbacks against its own scratch buffer,
    // and forwards the completed task to the monitor.
    let worker_rx = Arc::new(Mutex::new(worker_rx));
    for _ in 0..n_tasks {
        let problem = Arc::clone(problem);
        let rx = Arc::clone(&worker_rx);
        let tx = stats_tx.clone();
        tokio::task::spawn_blocking(move || {
            let mut x = vec![0.0; dim];
            loop {
                let task = rx.lock().blocking_recv();
                let Some(mut task) = task else { break };
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    evaluate(&problem, &mut task.location, task.op, &mut x);
                }));
                let msg = match outcome {
                    Ok(()) => StatsMsg::Task(task),
                    Err(_) => StatsMsg::EvalPanicked(task),
                };
                tx.blocking_send(msg).expect("descent: stats channel closed");
            }
            tx.blocking_send(StatsMsg::WorkerExit)
                .expect("descent: stats channel closed");
        });
    }
    drop(worker_rx);
    drop(stats_tx);

    // Stats monitor: the main thread of control.
    let mut workers_done = 0;
    let mut method_done = false;
    let mut terminated = false;
    let mut final_status = Status::NotTerminated;
    let mut final_error: Option<Error> = None;
    let mut done_tx = Some(done_tx);
    let mut res_tx = Some(res_tx);

    while let Some(msg) = stats_rx.recv().await {
        let mut status = Status::NotTerminated;
        let mut error: Option<Error> = None;
        let task = match msg {
            StatsMsg::WorkerExit => {
                workers_done += 1;
                if workers_done == n_tasks {
                    // All in-flight evaluations have been drained.
                    res_tx = None;
                }
                continue;
            }
            StatsMsg::EvalPanicked(task) => {
                status = Status::Failure;
                error = Some(Error::ObjectivePanicked);
                task
            }
            StatsMsg::Task(task) => {
                match task.op {
                    Operation::Evaluate(mask) => {
                        stats.count_evaluation(mask);
                        (status, error) = check_evaluation_limits(problem, stats, settings);
                    }
                    Operation::NoOperation => {}
                    Operation::MajorIteration => {
                        status =
                            perform_major_iteration(opt_loc, &task.location, stats, start, settings);
                    }
                    Operation::MethodDone => {
                        method_done = true;
                        status = Status::MethodConverge;
                    }
                    Operation::InitIteration | Operation::PostIteration => {
                        panic!("descent: unexpected operation at the stats monitor: {:?}", task.op);
                    }
                }
                task
            }
        };

        if status == Status::NotTerminated && error.is_none() {
            if let Some(rec) = recorder.as_mut() {
                stats.runtime = start.elapsed();
                if let Err(e) = rec.record(&task.location, task.op, stats) {
                    status = Status::Failure;
                    error = Some(e);
                }
            }
        }

        // First termination latch: the first task carrying a terminal
        // status or an error concludes the run; later candidates are
        // ignored.
        if (status.terminated() || error.is_some()) && !terminated {
            terminated = true;
            final_status = status;
            final_error = error;
            trace_info!(status = %final_status, "termination latched");
            if let Some(tx) = &res_tx {
                tx.send(Task {
                    id: 0,
                    op: Operation::PostIteration,
                    location: Location::default(),
                })
                .await
                .expect("descent: method dropped the results channel mid-run");
            }
            if let Some(done) = done_tx.take() {
                let _ = done.send(());
            }
        }

        // Return the completed task while the method can still act on it.
        if workers_done != n_tasks && task.op != Operation::MethodDone {
            if let Some(tx) = &res_tx {
                tx.send(task)
                    .await
                    .expect("descent: method dropped the results channel mid-run");
            }
        }
    }

    distributor.await.expect("descent: distributor task panicked");
    let method = method_handle.await.expect("descent: method task panicked");

    // Deferred until here so the method's run loop has returned and its
    // final state is visible.
    if method_done {
        match method.status() {
            None => panic!("descent: method sent MethodDone but does not report a status"),
            Some(Ok(Status::NotTerminated)) => {
                panic!("descent: method reported NotTerminated after MethodDone")
            }
            Some(Ok(status)) => {
                final_status = status;
                final_error = None;
            }
            Some(Err(e)) => {
                final_status = Status::Failure;
                final_error = Some(e);
            }
        }
    }

    trace_debug!(
        func_evaluations = stats.func_evaluations,
        major_iterations = stats.major_iterations,
        "run finished"
    );
    (final_status, final_error)
}

/// Run the problem callbacks named by `op` against `location`.
///
/// The point is copied into the worker's scratch buffer first so callbacks
/// never see (or alias) the location's own storage. The evaluation order is
/// fixed: function, then gradient, then Hessian.
fn evaluate(problem: &Problem, location: &mut Location, op: Operation, x: &mut [f64]) {
    let Some(mask) = op.evaluation() else {
        panic!("descent: invalid evaluation operation: {op:?}");
    };
    x.copy_from_slice(&location.x);
    if mask.contains(Eval::FUNC) {
        location.f = problem.func(x);
    }
    if mask.contains(Eval::GRAD) {
        let gradient = location
            .gradient
            .as_mut()
            .expect("descent: location is missing its gradient slot");
        problem.grad(gradient, x);
    }
    if mask.contains(Eval::HESS) {
        let hessian = location
            .hessian
            .as_mut()
            .expect("descent: location is missing its Hessian slot");
        problem.hess(hessian, x);
    }
}

/// Check the per-evaluation termination policy: the problem's own status
/// report first, then the evaluation budgets.
fn check_evaluation_limits(
    problem: &Problem,
    stats: &Stats,
    settings: &Settings,
) -> (Status, Option<Error>) {
    if let Some(polled) = problem.poll_status() {
        match polled {
            Ok(status) if status.terminated() => return (status, None),
            Ok(_) => {}
            Err(e) => return (Status::Failure, Some(e)),
        }
    }
    if settings.func_evaluations > 0 && stats.func_evaluations >= settings.func_evaluations {
        return (Status::FunctionEvaluationLimit, None);
    }
    if settings.grad_evaluations > 0 && stats.grad_evaluations >= settings.grad_evaluations {
        return (Status::GradientEvaluationLimit, None);
    }
    if settings.hess_evaluations > 0 && stats.hess_evaluations >= settings.hess_evaluations {
        return (Status::HessianEvaluationLimit, None);
    }
    (Status::NotTerminated, None)
}

/// Convergence checks applied only at major iterations.
fn check_location_convergence(location: &Location, settings: &mut Settings) -> Status {
    if location.f == f64::NEG_INFINITY {
        return Status::FunctionNegativeInfinity;
    }
    if let Some(norm) = location.gradient_inf_norm() {
        if norm < settings.gradient_threshold {
            return Status::GradientThreshold;
        }
    }
    if location.f < settings.function_threshold {
        return Status::FunctionThreshold;
    }
    if let Some(fc) = settings.function_converge.as_mut() {
        return fc.converged(location.f);
    }
    Status::NotTerminated
}

/// Budget checks applied only at major iterations.
fn check_iteration_limits(stats: &Stats, settings: &Settings) -> Status {
    if settings.major_iterations > 0 && stats.major_iterations >= settings.major_iterations {
        return Status::IterationLimit;
    }
    if let Some(runtime) = settings.runtime {
        if stats.runtime >= runtime {
            return Status::RuntimeLimit;
        }
    }
    Status::NotTerminated
}

/// Commit `location` as the new optimum and run the major-iteration
/// termination policy.
fn perform_major_iteration(
    opt_loc: &mut Location,
    location: &Location,
    stats: &mut Stats,
    start: Instant,
    settings: &mut Settings,
) -> Status {
    opt_loc.copy_from(location);
    stats.major_iterations += 1;
    stats.runtime = start.elapsed();
    let status = check_location_convergence(opt_loc, settings);
    if status.terminated() {
        return status;
    }
    check_iteration_limits(stats, settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRAD_NEEDS: Needs = Needs {
        gradient: true,
        hessian: false,
    };

    fn quadratic() -> Problem {
        Problem::new(|x: &[f64]| x.iter().map(|v| v * v).sum()).with_grad(|g, x| {
            for (gi, xi) in g.iter_mut().zip(x) {
                *gi = 2.0 * xi;
            }
        })
    }

    #[test]
    fn initial_task_without_point_or_values() {
        let (op, loc) = initial_task(2, None, None, Needs::default());
        assert_eq!(op, Operation::NoOperation);
        assert_eq!(loc.x, vec![0.0, 0.0]);
        assert_eq!(loc.f, 0.0);
    }

    #[test]
    #[should_panic(expected = "initial values supplied without an initial point")]
    fn initial_task_values_without_point_panics() {
        let values = Location {
            f: 1.0,
            ..Location::default()
        };
        initial_task(2, None, Some(&values), Needs::default());
    }

    #[test]
    fn initial_task_copies_point() {
        let (op, loc) = initial_task(2, Some(&[3.0, -4.0]), None, GRAD_NEEDS);
        assert_eq!(op, Operation::NoOperation);
        assert_eq!(loc.x, vec![3.0, -4.0]);
        assert_eq!(loc.gradient.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn initial_task_folds_known_values() {
        let values = Location {
            f: 25.0,
            gradient: Some(vec![6.0, -8.0]),
            ..Location::default()
        };
        let (op, loc) = initial_task(2, Some(&[3.0, -4.0]), Some(&values), GRAD_NEEDS);
        assert_eq!(op, Operation::Evaluate(Eval::FUNC | Eval::GRAD));
        assert_eq!(loc.f, 25.0);
        assert_eq!(loc.gradient, Some(vec![6.0, -8.0]));
    }

    #[test]
    fn initial_task_ignores_values_the_method_does_not_need() {
        let values = Location {
            f: 25.0,
            gradient: Some(vec![6.0, -8.0]),
            ..Location::default()
        };
        let (op, loc) = initial_task(2, Some(&[3.0, -4.0]), Some(&values), Needs::default());
        assert_eq!(op, Operation::Evaluate(Eval::FUNC));
        assert!(loc.gradient.is_none());
    }

    #[test]
    #[should_panic(expected = "pass the initial point as init_x")]
    fn initial_task_rejects_point_inside_values() {
        let values = Location {
            x: vec![1.0, 2.0],
            ..Location::default()
        };
        initial_task(2, Some(&[3.0, -4.0]), Some(&values), Needs::default());
    }

    #[test]
    #[should_panic(expected = "initial gradient does not match")]
    fn initial_task_rejects_wrong_gradient_dimension() {
        let values = Location {
            f: 1.0,
            gradient: Some(vec![1.0]),
            ..Location::default()
        };
        initial_task(2, Some(&[3.0, -4.0]), Some(&values), GRAD_NEEDS);
    }

    #[test]
    fn evaluate_fills_requested_quantities() {
        let problem = quadratic();
        let mut loc = Location::sized(2, GRAD_NEEDS);
        loc.x = vec![3.0, -4.0];
        let mut scratch = vec![0.0; 2];
        evaluate(
            &problem,
            &mut loc,
            Operation::Evaluate(Eval::FUNC | Eval::GRAD),
            &mut scratch,
        );
        assert_eq!(loc.f, 25.0);
        assert_eq!(loc.gradient, Some(vec![6.0, -8.0]));
        assert_eq!(scratch, vec![3.0, -4.0]);
    }

    #[test]
    #[should_panic(expected = "invalid evaluation operation")]
    fn evaluate_rejects_non_evaluation_ops() {
        let problem = quadratic();
        let mut loc = Location::sized(1, Needs::default());
        let mut scratch = vec![0.0];
        evaluate(&problem, &mut loc, Operation::MajorIteration, &mut scratch);
    }

    #[test]
    fn evaluation_limits_in_order() {
        let problem = Problem::new(|x: &[f64]| x[0]);
        let settings = Settings {
            func_evaluations: 2,
            grad_evaluations: 1,
            ..Settings::default()
        };
        let mut stats = Stats::default();
        stats.func_evaluations = 1;
        stats.grad_evaluations = 1;
        // func limit not yet reached, grad limit is
        assert_eq!(
            check_evaluation_limits(&problem, &stats, &settings),
            (Status::GradientEvaluationLimit, None)
        );
        stats.func_evaluations = 2;
        assert_eq!(
            check_evaluation_limits(&problem, &stats, &settings),
            (Status::FunctionEvaluationLimit, None)
        );
    }

    #[test]
    fn problem_status_takes_precedence_over_limits() {
        let problem =
            Problem::new(|x: &[f64]| x[0]).with_status(|| Ok(Status::Custom("user requested")));
        let settings = Settings {
            func_evaluations: 1,
            ..Settings::default()
        };
        let mut stats = Stats::default();
        stats.func_evaluations = 5;
        assert_eq!(
            check_evaluation_limits(&problem, &stats, &settings),
            (Status::Custom("user requested"), None)
        );
    }

    #[test]
    fn location_convergence_order() {
        let mut settings = Settings {
            gradient_threshold: 1e-6,
            function_threshold: -1e6,
            function_converge: None,
            ..Settings::default()
        };
        let mut loc = Location::sized(1, GRAD_NEEDS);

        loc.f = f64::NEG_INFINITY;
        assert_eq!(
            check_location_convergence(&loc, &mut settings),
            Status::FunctionNegativeInfinity
        );

        loc.f = 1.0;
        loc.gradient = Some(vec![1e-9]);
        assert_eq!(
            check_location_convergence(&loc, &mut settings),
            Status::GradientThreshold
        );

        loc.gradient = Some(vec![1.0]);
        loc.f = -2e6;
        assert_eq!(
            check_location_convergence(&loc, &mut settings),
            Status::FunctionThreshold
        );

        loc.f = 1.0;
        assert_eq!(
            check_location_convergence(&loc, &mut settings),
            Status::NotTerminated
        );
    }

    #[test]
    fn major_iteration_commits_and_counts() {
        let mut settings = Settings {
            function_converge: None,
            major_iterations: 2,
            ..Settings::default()
        };
        let mut opt_loc = Location::sized(2, Needs::default());
        opt_loc.f = f64::INFINITY;
        let mut stats = Stats::default();
        let mut candidate = Location::sized(2, Needs::default());
        candidate.x = vec![1.0, 2.0];
        candidate.f = 7.0;

        let status = perform_major_iteration(
            &mut opt_loc,
            &candidate,
            &mut stats,
            Instant::now(),
            &mut settings,
        );
        assert_eq!(status, Status::NotTerminated);
        assert_eq!(opt_loc.x, vec![1.0, 2.0]);
        assert_eq!(opt_loc.f, 7.0);
        assert_eq!(stats.major_iterations, 1);

        let status = perform_major_iteration(
            &mut opt_loc,
            &candidate,
            &mut stats,
            Instant::now(),
            &mut settings,
        );
        assert_eq!(status, Status::IterationLimit);
    }
}
