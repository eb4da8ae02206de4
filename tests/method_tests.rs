//! Tests of the built-in methods through the public driver.

use descent::{minimize, Bfgs, NelderMead, Settings, Status};

mod common;
use common::{rosenbrock, sphere, sphere_no_grad};

// =============================================================================
// BFGS
// =============================================================================

#[tokio::test]
async fn bfgs_minimizes_the_sphere_exactly() {
    let solution = minimize(sphere(), &[3.0, -4.0], None, Some(Box::new(Bfgs::default())))
        .await
        .unwrap();

    assert_eq!(solution.status, Status::GradientThreshold);
    assert_eq!(solution.location.x, vec![0.0, 0.0]);
    assert_eq!(solution.location.f, 0.0);
}

#[tokio::test]
async fn bfgs_minimizes_rosenbrock() {
    let solution = minimize(
        rosenbrock(),
        &[-1.2, 1.0],
        None,
        Some(Box::new(Bfgs::default())),
    )
    .await
    .unwrap();

    assert!(
        solution.location.f < 1e-6,
        "rosenbrock optimum value {} should be near zero (status {})",
        solution.location.f,
        solution.status
    );
    assert!(
        (solution.location.x[0] - 1.0).abs() < 1e-3
            && (solution.location.x[1] - 1.0).abs() < 1e-3,
        "optimum {:?} should be near (1, 1)",
        solution.location.x
    );
}

#[tokio::test]
async fn bfgs_is_the_default_for_gradient_problems() {
    // Same run with and without naming the method.
    let explicit = minimize(sphere(), &[1.0, 2.0], None, Some(Box::new(Bfgs::default())))
        .await
        .unwrap();
    let implicit = minimize(sphere(), &[1.0, 2.0], None, None).await.unwrap();

    assert_eq!(explicit.status, implicit.status);
    assert_eq!(explicit.location.x, implicit.location.x);
    assert_eq!(
        explicit.stats.func_evaluations,
        implicit.stats.func_evaluations
    );
}

// =============================================================================
// Nelder-Mead
// =============================================================================

#[tokio::test]
async fn nelder_mead_minimizes_without_derivatives() {
    let solution = minimize(
        sphere_no_grad(),
        &[10.0],
        None,
        Some(Box::new(NelderMead::default())),
    )
    .await
    .unwrap();

    assert_eq!(solution.status, Status::FunctionConvergence);
    assert!(
        solution.location.x[0].abs() < 1e-3,
        "optimum {:?} should be near the origin",
        solution.location.x
    );
    assert!(solution.location.f < 1e-6);
}

#[tokio::test]
async fn nelder_mead_handles_two_dimensions() {
    let solution = minimize(
        sphere_no_grad(),
        &[3.0, -4.0],
        None,
        Some(Box::new(NelderMead::default())),
    )
    .await
    .unwrap();

    assert_eq!(solution.status, Status::FunctionConvergence);
    assert!(
        solution.location.x.iter().all(|v| v.abs() < 1e-3),
        "optimum {:?} should be near the origin",
        solution.location.x
    );
}

#[tokio::test]
async fn nelder_mead_is_the_default_without_a_gradient() {
    let solution = minimize(sphere_no_grad(), &[2.0], None, None).await.unwrap();

    assert_eq!(solution.status, Status::FunctionConvergence);
    assert!(solution.location.x[0].abs() < 1e-2);
}

#[tokio::test]
async fn nelder_mead_respects_the_iteration_budget() {
    let settings = Settings {
        major_iterations: 5,
        ..Settings::default()
    };
    let solution = minimize(
        sphere_no_grad(),
        &[10.0],
        Some(settings),
        Some(Box::new(NelderMead::default())),
    )
    .await
    .unwrap();

    assert_eq!(solution.status, Status::IterationLimit);
    assert_eq!(solution.stats.major_iterations, 5);
}
