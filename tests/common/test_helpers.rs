//! Helper functions for integration tests

use nalgebra::DVector;
use seird_rs::model::{Compartments, OdeModel, SeirdParameters};
use seird_rs::solver::{Scenario, TimeGrid, Trajectory};

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// Scenario with every component starting at `y0`
pub fn create_scenario(model: Box<dyn OdeModel>, y0: f64, grid: TimeGrid) -> Scenario {
    let initial = DVector::from_element(model.dimension(), y0);
    Scenario::new(model, initial, grid)
}

/// Moderate outbreak rates (R0 = 2.5) in a population of `population`
pub fn moderate_parameters(population: f64) -> SeirdParameters {
    SeirdParameters::new(population, 1.0, 0.5, 0.4, 0.01).unwrap()
}

/// Fully susceptible population with `infected` initial cases
pub fn seird_initial(population: f64, infected: f64) -> Compartments {
    Compartments::new(population - infected, 0.0, infected, 0.0, 0.0).unwrap()
}

/// Assert that the total population stays within `tolerance` (relative)
pub fn assert_conserved(trajectory: &Trajectory, tolerance: f64, message: &str) {
    let drift = trajectory.max_relative_conservation_drift();
    assert!(
        drift < tolerance,
        "{}: relative population drift {:.3e} exceeds {:.1e}",
        message,
        drift,
        tolerance
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_error() {
        assert!((relative_error(1.0, 1.0) - 0.0).abs() < 1e-10);
        assert!((relative_error(1.1, 1.0) - 0.1).abs() < 1e-10);
        assert!((relative_error(0.9, 1.0) - 0.1).abs() < 1e-10);
    }
}
