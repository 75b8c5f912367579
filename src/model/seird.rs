//! SEIRD compartmental model
//!
//! # Mathematical Model
//!
//! Five compartments, homogeneous mixing, constant rates:
//!
//! ```text
//! dS/dt = -β·S·I/N
//! dE/dt =  β·S·I/N - σ·E
//! dI/dt =  σ·E - (γ + μ)·I
//! dR/dt =  γ·I
//! dD/dt =  μ·I
//! ```
//!
//! Flows only move mass between compartments, so the five derivatives
//! sum to zero and S + E + I + R + D stays constant along exact solutions.
//!
//! # Jacobian
//!
//! ```text
//!        S        E        I          R   D
//! S [ -β·I/N      0     -β·S/N        0   0 ]
//! E [  β·I/N     -σ      β·S/N        0   0 ]
//! I [    0        σ    -(γ + μ)       0   0 ]
//! R [    0        0       γ           0   0 ]
//! D [    0        0       μ           0   0 ]
//! ```
//!
//! # Note on N
//!
//! N is the fixed parameter given at construction. It is **not** recomputed
//! from the state, even though S + E + I + R + D may differ from it.

use nalgebra::{DMatrix, DVector};

use crate::error::{Result, SimulationError};
use crate::model::compartments::{Compartment, Compartments};
use crate::model::parameters::SeirdParameters;
use crate::model::statistics::DerivedStatistics;
use crate::model::traits::OdeModel;
use crate::solver::{Scenario, SolverConfiguration, SolverMethod, TimeGrid, Trajectory};

/// SEIRD outbreak model
///
/// # Example
///
/// ```rust
/// use seird_rs::model::{Compartments, SeirdModel, SeirdParameters};
/// use seird_rs::model::OdeModel;
///
/// let parameters = SeirdParameters::new(1000.0, 1.0, 0.5, 0.4, 0.01).unwrap();
/// let model = SeirdModel::new(parameters);
///
/// let state = Compartments::new(999.0, 0.0, 1.0, 0.0, 0.0).unwrap().to_state();
/// let rates = model.derivatives(0.0, &state);
/// assert!(rates.sum().abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeirdModel {
    parameters: SeirdParameters,
}

impl SeirdModel {
    pub fn new(parameters: SeirdParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &SeirdParameters {
        &self.parameters
    }

    /// Instantaneous rates of change for a typed state
    pub fn rates(&self, state: &Compartments) -> [f64; 5] {
        self.flows(state.susceptible(), state.exposed(), state.infected())
    }

    /// The five SEIRD equations, in compartment order
    fn flows(&self, s: f64, e: f64, i: f64) -> [f64; 5] {
        let p = &self.parameters;

        let infection = p.beta() * s * i / p.population();
        let onset = p.sigma() * e;
        let recovery = p.gamma() * i;
        let death = p.mu() * i;

        [
            -infection,
            infection - onset,
            onset - recovery - death,
            recovery,
            death,
        ]
    }

    /// Derived epidemiological statistics (R0, herd-immunity threshold, ...)
    pub fn statistics(&self) -> Result<DerivedStatistics> {
        DerivedStatistics::from_parameters(&self.parameters)
    }

    /// Integrate the model from `initial` over `grid`
    ///
    /// Convenience wrapper: builds a [`Scenario`] and dispatches to the
    /// solver selected by `method`.
    pub fn simulate(
        &self,
        initial: &Compartments,
        grid: &TimeGrid,
        method: SolverMethod,
        config: &SolverConfiguration,
    ) -> Result<Trajectory> {
        let scenario = Scenario::new(Box::new(*self), initial.to_state(), grid.clone());
        method.solver().solve(&scenario, config)
    }
}

impl OdeModel for SeirdModel {
    fn dimension(&self) -> usize {
        Compartment::COUNT
    }

    fn derivatives(&self, _t: f64, state: &DVector<f64>) -> DVector<f64> {
        DVector::from_row_slice(&self.flows(state[0], state[1], state[2]))
    }

    /// Compartments are population counts: no component may start negative
    fn validate_state(&self, state: &DVector<f64>) -> Result<()> {
        match state.iter().position(|v| *v < 0.0) {
            Some(index) => Err(SimulationError::invalid_parameter(
                Compartment::from_index(index).map_or("initial state", Compartment::label),
                state[index],
                "compartment values must be non-negative",
            )),
            None => Ok(()),
        }
    }

    fn jacobian(&self, _t: f64, state: &DVector<f64>) -> DMatrix<f64> {
        let p = &self.parameters;
        let (s, i) = (state[0], state[2]);
        let n = p.population();

        let d_infection_ds = p.beta() * i / n;
        let d_infection_di = p.beta() * s / n;

        #[rustfmt::skip]
        let entries = [
            -d_infection_ds, 0.0,       -d_infection_di,        0.0, 0.0,
             d_infection_ds, -p.sigma(), d_infection_di,        0.0, 0.0,
             0.0,             p.sigma(), -(p.gamma() + p.mu()), 0.0, 0.0,
             0.0,             0.0,        p.gamma(),            0.0, 0.0,
             0.0,             0.0,        p.mu(),               0.0, 0.0,
        ];

        DMatrix::from_row_slice(5, 5, &entries)
    }

    fn labels(&self) -> Vec<String> {
        Compartment::ALL.iter().map(|c| c.label().to_string()).collect()
    }

    fn name(&self) -> &str {
        "SEIRD"
    }

    fn description(&self) -> Option<&str> {
        Some("Susceptible-Exposed-Infected-Recovered-Dead compartmental model")
    }
}

// =================================================================================================
// Tests
// =================================================================================================
