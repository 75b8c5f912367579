//! Simulation result
//!
//! A [`Trajectory`] is the sampled solution of an integration: one state per
//! output time, plus the solver statistics and free-form metadata.

use nalgebra::DVector;
use ndarray::Array2;
use std::collections::BTreeMap;

use crate::error::{Result, SimulationError};
use crate::model::{Compartment, Compartments};

// =================================================================================================
// Solver Statistics
// =================================================================================================

/// Work counters collected during an integration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolverStats {
    /// Right-hand side evaluations
    pub function_evaluations: usize,

    /// Jacobian evaluations (implicit methods only)
    pub jacobian_evaluations: usize,

    /// LU factorizations of the Newton matrix (implicit methods only)
    pub lu_decompositions: usize,

    pub accepted_steps: usize,
    pub rejected_steps: usize,
}

impl SolverStats {
    pub fn total_steps(&self) -> usize {
        self.accepted_steps + self.rejected_steps
    }
}

// =================================================================================================
// Trajectory
// =================================================================================================

/// Sampled solution of an initial value problem
///
/// # Invariants
///
/// - `times.len() == states.len()`, at least one entry
/// - `times` are strictly increasing and equal the requested grid
/// - `states[0]` is the initial state, unchanged
///
/// # Example
///
/// ```rust
/// use seird_rs::model::{Compartment, Compartments, SeirdModel, SeirdParameters};
/// use seird_rs::solver::{SolverConfiguration, SolverMethod, TimeGrid};
///
/// let model = SeirdModel::new(SeirdParameters::new(1000.0, 1.0, 0.5, 0.4, 0.01).unwrap());
/// let initial = Compartments::new(999.0, 0.0, 1.0, 0.0, 0.0).unwrap();
/// let grid = TimeGrid::linspace(0.0, 30.0, 31).unwrap();
///
/// let trajectory = model
///     .simulate(&initial, &grid, SolverMethod::Dopri5, &SolverConfiguration::default())
///     .unwrap();
///
/// assert_eq!(trajectory.len(), 31);
/// assert!(trajectory.max_conservation_drift() < 1e-6);
/// let (_, peak) = trajectory.peak(Compartment::Infected.index());
/// assert!(peak > 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    states: Vec<DVector<f64>>,
    labels: Vec<String>,
    stats: SolverStats,
    metadata: BTreeMap<String, String>,
}

impl Trajectory {
    /// Assemble a trajectory (solvers call this once integration succeeded)
    pub fn new(times: Vec<f64>, states: Vec<DVector<f64>>, labels: Vec<String>, stats: SolverStats) -> Self {
        debug_assert_eq!(times.len(), states.len());
        debug_assert!(!times.is_empty());
        Self {
            times,
            states,
            labels,
            stats,
            metadata: BTreeMap::new(),
        }
    }

    /// Number of output times
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[DVector<f64>] {
        &self.states
    }

    /// State at output index `index`
    pub fn state(&self, index: usize) -> Option<&DVector<f64>> {
        self.states.get(index)
    }

    pub fn initial_state(&self) -> &DVector<f64> {
        &self.states[0]
    }

    pub fn final_state(&self) -> &DVector<f64> {
        &self.states[self.states.len() - 1]
    }

    pub fn final_time(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Number of state components
    pub fn dimension(&self) -> usize {
        self.states[0].len()
    }

    /// Component labels, one per state component
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn stats(&self) -> &SolverStats {
        &self.stats
    }

    /// Time series of one state component
    ///
    /// # Panics
    ///
    /// If `component >= self.dimension()`.
    pub fn series(&self, component: usize) -> Vec<f64> {
        self.states.iter().map(|s| s[component]).collect()
    }

    /// Time series of one SEIRD compartment
    pub fn compartment(&self, compartment: Compartment) -> Vec<f64> {
        self.series(compartment.index())
    }

    /// SEIRD state at output index `index`
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when `index` is past the last output time or the
    /// state does not have five components.
    pub fn compartments_at(&self, index: usize) -> Result<Compartments> {
        let state = self.states.get(index).ok_or_else(|| {
            SimulationError::invalid_parameter(
                "output index",
                index as f64,
                format!("trajectory has {} output times", self.len()),
            )
        })?;
        Compartments::from_state(state)
    }

    /// Sum of all components at every output time
    pub fn totals(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.sum()).collect()
    }

    /// Largest |total(t) - total(t0)| over the trajectory
    pub fn max_conservation_drift(&self) -> f64 {
        let initial = self.states[0].sum();
        self.states
            .iter()
            .map(|s| (s.sum() - initial).abs())
            .fold(0.0, f64::max)
    }

    /// [`max_conservation_drift`](Self::max_conservation_drift) divided by |total(t0)|
    ///
    /// Falls back to the absolute drift when the initial total is zero.
    pub fn max_relative_conservation_drift(&self) -> f64 {
        let initial = self.states[0].sum().abs();
        let drift = self.max_conservation_drift();
        if initial > 0.0 { drift / initial } else { drift }
    }

    /// `(time, value)` of the largest value of one component
    ///
    /// The first occurrence wins on ties.
    ///
    /// # Panics
    ///
    /// If `component >= self.dimension()`, like [`series`](Self::series).
    pub fn peak(&self, component: usize) -> (f64, f64) {
        let mut best = (self.times[0], self.states[0][component]);
        for (t, s) in self.times.iter().zip(self.states.iter()).skip(1) {
            if s[component] > best.1 {
                best = (*t, s[component]);
            }
        }
        best
    }

    /// Smallest value of any component over the whole trajectory
    pub fn min_value(&self) -> f64 {
        self.states
            .iter()
            .flat_map(|s| s.iter().copied())
            .fold(f64::INFINITY, f64::min)
    }

    /// Dense `(len, 1 + dimension)` array, first column is time
    pub fn to_array(&self) -> Array2<f64> {
        let columns = 1 + self.dimension();
        Array2::from_shape_fn((self.len(), columns), |(row, col)| {
            if col == 0 {
                self.times[row]
            } else {
                self.states[row][col - 1]
            }
        })
    }

    /// `(time, state)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (f64, &DVector<f64>)> {
        self.times.iter().copied().zip(self.states.iter())
    }

    // ====== Metadata ======

    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}
