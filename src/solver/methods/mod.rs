//! Numerical methods for solving differential equations
//!
//! This module contains concrete implementations of the [`Solver`](crate::solver::Solver) trait.
//!
//! # Available Methods
//!
//! ## Adaptive Methods
//!
//! - **[`Dopri5Solver`]**: Dormand-Prince 5(4)
//!   - Order: fifth-order solution, fourth-order error estimate
//!   - Cost: 6 function evaluations per step (FSAL)
//!   - Use: **default**, non-stiff problems, tight tolerances
//!
//! - **[`SdirkSolver`]**: two-stage L-stable singly diagonally implicit RK 2(1)
//!   - Order: second-order solution, first-order error estimate
//!   - Cost: Jacobian + LU + a few Newton iterations per step
//!   - Use: stiff parameter sets (very fast recovery or death rates)
//!
//! ## Fixed-Step Methods
//!
//! - **[`EulerSolver`]**: Forward Euler, O(dt)
//! - **[`RK4Solver`]**: Classical fourth-order Runge-Kutta, O(dt⁴)
//!
//! Fixed-step methods take `substeps` equal steps between two output times.
//!
//! # Design Philosophy
//!
//! Each solver is:
//! - **Self-contained**: No shared mutable state
//! - **Stateless**: Can be reused for multiple simulations
//! - **Thread-safe**: `Send + Sync`, usable from parallel sweeps

mod dopri5;
mod euler;
mod rk4;
mod sdirk;

pub use dopri5::Dopri5Solver;
pub use euler::EulerSolver;
pub use rk4::RK4Solver;
pub use sdirk::SdirkSolver;

use nalgebra::DVector;

use crate::model::OdeModel;
use crate::solver::AdaptiveSettings;
use crate::solver::trajectory::SolverStats;

// =================================================================================================
// Shared Step-Size Control
// =================================================================================================

/// Scaled RMS norm of a local error estimate
///
/// ```text
/// sc_i = atol + rtol · max(|y_i|, |ŷ_i|)
/// ‖err‖ = sqrt( mean( (err_i / sc_i)² ) )
/// ```
pub(crate) fn error_norm(
    error: &DVector<f64>,
    y: &DVector<f64>,
    y_new: &DVector<f64>,
    settings: &AdaptiveSettings,
) -> f64 {
    let n = error.len();
    let sum: f64 = (0..n)
        .map(|i| {
            let scale = settings.atol + settings.rtol * y[i].abs().max(y_new[i].abs());
            let ratio = error[i] / scale;
            ratio * ratio
        })
        .sum();
    (sum / n as f64).sqrt()
}

/// RMS norm of `v` scaled by `atol + rtol·|y|`
pub(crate) fn scaled_norm(v: &DVector<f64>, y: &DVector<f64>, settings: &AdaptiveSettings) -> f64 {
    let n = v.len();
    let sum: f64 = (0..n)
        .map(|i| {
            let ratio = v[i] / (settings.atol + settings.rtol * y[i].abs());
            ratio * ratio
        })
        .sum();
    (sum / n as f64).sqrt()
}

/// Starting step size (Hairer, Nørsett & Wanner, Solving ODEs I, II.4)
///
/// Estimates the step for which an explicit Euler step would produce an
/// error of the order of the tolerance, then corrects it with a second
/// derivative estimate. Costs one extra function evaluation.
#[allow(clippy::too_many_arguments)]
pub(crate) fn initial_step(
    model: &dyn OdeModel,
    t0: f64,
    y0: &DVector<f64>,
    f0: &DVector<f64>,
    settings: &AdaptiveSettings,
    order: u32,
    span: f64,
    stats: &mut SolverStats,
) -> f64 {
    let d0 = scaled_norm(y0, y0, settings);
    let d1 = scaled_norm(f0, y0, settings);

    let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };
    let h0 = h0.min(span);

    let y1 = y0 + f0 * h0;
    let f1 = model.derivatives(t0 + h0, &y1);
    stats.function_evaluations += 1;

    let d2 = scaled_norm(&(&f1 - f0), y0, settings) / h0;
    let dmax = d1.max(d2);

    let h1 = if dmax <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / dmax).powf(1.0 / (order as f64 + 1.0))
    };

    let mut h = (100.0 * h0).min(h1).min(span);
    if let Some(max_step) = settings.max_step {
        h = h.min(max_step);
    }
    h
}

/// True when `h` is too small to advance `t` in floating point
pub(crate) fn step_underflow(t: f64, h: f64) -> bool {
    h <= 0.0 || h < 16.0 * f64::EPSILON * t.abs()
}
