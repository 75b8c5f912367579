//! Simulation scenario definition
//!
//! A scenario combines a model with an initial state and the output times.
use nalgebra::DVector;

use crate::error::{Result, SimulationError};
use crate::model::OdeModel;
use crate::solver::time_grid::TimeGrid;

/// Simulation scenario
///
/// Defines a specific case to simulate:
/// - Model (equations)
/// - Initial state at `grid.start()`
/// - Output time grid
///
/// # Design
///
/// The same scenario can be solved with different numerical methods.
/// This is the "WHAT to solve" (not "HOW to solve").
///
/// # Examples
///
/// ```rust
/// use seird_rs::model::{Compartments, SeirdModel, SeirdParameters};
/// use seird_rs::solver::{Dopri5Solver, RK4Solver, Scenario, Solver, SolverConfiguration, TimeGrid};
///
/// let model = SeirdModel::new(SeirdParameters::new(1000.0, 1.0, 0.5, 0.4, 0.01).unwrap());
/// let initial = Compartments::new(999.0, 0.0, 1.0, 0.0, 0.0).unwrap();
/// let scenario = Scenario::new(Box::new(model), initial.to_state(), TimeGrid::linspace(0.0, 10.0, 11).unwrap());
///
/// let adaptive = Dopri5Solver::new().solve(&scenario, &SolverConfiguration::default()).unwrap();
/// let fixed = RK4Solver::new().solve(&scenario, &SolverConfiguration::fixed(20)).unwrap();
/// assert_eq!(adaptive.len(), fixed.len());
/// ```
pub struct Scenario {
    /// Model (equations)
    pub model: Box<dyn OdeModel>,

    /// State at the first grid time
    pub initial_state: DVector<f64>,

    /// Output times
    pub grid: TimeGrid,
}

impl Scenario {
    /// Create a scenario
    pub fn new(model: Box<dyn OdeModel>, initial_state: DVector<f64>, grid: TimeGrid) -> Self {
        Self { model, initial_state, grid }
    }

    /// Check that the initial state fits the model
    pub fn validate(&self) -> Result<()> {
        let dimension = self.model.dimension();
        if dimension == 0 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "model '{}' has no state components",
                self.model.name()
            )));
        }

        if self.initial_state.len() != dimension {
            return Err(SimulationError::invalid_parameter(
                "initial state dimension",
                self.initial_state.len() as f64,
                format!("model '{}' expects {} components", self.model.name(), dimension),
            ));
        }

        if let Some((index, value)) = self
            .initial_state
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(SimulationError::invalid_parameter(
                format!("initial state[{}]", index),
                *value,
                "must be finite",
            ));
        }

        self.model.validate_state(&self.initial_state)
    }

    /// Get model name
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Number of state components
    pub fn dimension(&self) -> usize {
        self.model.dimension()
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("model", &self.model_name())
            .field("dimension", &self.dimension())
            .field("initial_state", &self.initial_state.as_slice())
            .field("time span", &(self.grid.start(), self.grid.end()))
            .field("output points", &self.grid.len())
            .finish()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
