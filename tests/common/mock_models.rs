//! Mock ODE models for testing
//!
//! These models have known analytical solutions, making them
//! ideal for validating numerical solver accuracy.

use nalgebra::DVector;
use seird_rs::model::OdeModel;

// =================================================================================================
// Exponential Decay: dy/dt = -k*y
// =================================================================================================

/// `dimension` independent copies of dy/dt = -k*y
///
/// Analytical solution: y(t) = y₀ * exp(-k*t)
pub struct ExponentialDecay {
    pub dimension: usize,
    pub decay_rate: f64,
}

impl ExponentialDecay {
    pub fn new(dimension: usize, decay_rate: f64) -> Self {
        Self { dimension, decay_rate }
    }

    pub fn analytical_solution(&self, t: f64, y0: f64) -> f64 {
        y0 * (-self.decay_rate * t).exp()
    }
}

impl OdeModel for ExponentialDecay {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn derivatives(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
        state * -self.decay_rate
    }

    fn name(&self) -> &str {
        "Exponential Decay"
    }
}

// =================================================================================================
// Constant Growth: dy/dt = c
// =================================================================================================

/// dy/dt = c, every method integrates it exactly
pub struct ConstantGrowth {
    pub rate: f64,
}

impl OdeModel for ConstantGrowth {
    fn dimension(&self) -> usize {
        1
    }

    fn derivatives(&self, _t: f64, _state: &DVector<f64>) -> DVector<f64> {
        DVector::from_element(1, self.rate)
    }

    fn name(&self) -> &str {
        "Constant Growth"
    }
}

// =================================================================================================
// Finite-time blow-up: dy/dt = y²
// =================================================================================================

/// dy/dt = y², y(t) = y₀ / (1 - y₀ t), singular at t = 1/y₀
pub struct BlowUp;

impl OdeModel for BlowUp {
    fn dimension(&self) -> usize {
        1
    }

    fn derivatives(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
        state.map(|y| y * y)
    }

    fn jacobian(&self, _t: f64, state: &DVector<f64>) -> nalgebra::DMatrix<f64> {
        nalgebra::DMatrix::from_element(1, 1, 2.0 * state[0])
    }

    fn name(&self) -> &str {
        "Blow-up"
    }
}

// =================================================================================================
// Stiff relaxation: dy/dt = -λ (y - cos t) - sin t
// =================================================================================================

/// Fast relaxation onto the slow manifold y = cos t
///
/// With y(0) = 1 the exact solution is y(t) = cos t for every λ, but an
/// explicit method still needs steps of order 1/λ to stay stable.
pub struct StiffDecay {
    pub lambda: f64,
}

impl OdeModel for StiffDecay {
    fn dimension(&self) -> usize {
        1
    }

    fn derivatives(&self, t: f64, state: &DVector<f64>) -> DVector<f64> {
        DVector::from_element(1, -self.lambda * (state[0] - t.cos()) - t.sin())
    }

    fn jacobian(&self, _t: f64, _state: &DVector<f64>) -> nalgebra::DMatrix<f64> {
        nalgebra::DMatrix::from_element(1, 1, -self.lambda)
    }

    fn name(&self) -> &str {
        "Stiff Decay"
    }
}
