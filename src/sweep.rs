//! Parameter sweeps
//!
//! Runs one integration per parameter set against a shared initial state,
//! output grid and solver configuration. Runs are independent: with the
//! `parallel` feature (on by default) they are distributed over rayon's
//! thread pool, otherwise they execute one after the other. Either way the
//! results come back in input order and a failing run does not affect the
//! others.
//!
//! ```rust
//! use seird_rs::model::{Compartments, SeirdParameters};
//! use seird_rs::solver::{SolverConfiguration, SolverMethod, TimeGrid};
//! use seird_rs::sweep::{beta_sweep, run_sweep};
//!
//! let base = SeirdParameters::new(1.0e4, 1.0, 0.5, 0.4, 0.01).unwrap();
//! let sets = beta_sweep(&base, &[0.2, 0.6, 1.0]).unwrap();
//! let initial = Compartments::new(9999.0, 0.0, 1.0, 0.0, 0.0).unwrap();
//! let grid = TimeGrid::linspace(0.0, 50.0, 51).unwrap();
//!
//! let results = run_sweep(&sets, &initial, &grid, SolverMethod::Dopri5, &SolverConfiguration::default());
//! assert_eq!(results.len(), 3);
//! assert!(results.iter().all(|r| r.is_ok()));
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::model::{Compartment, Compartments, DerivedStatistics, SeirdModel, SeirdParameters};
use crate::solver::{SolverConfiguration, SolverMethod, TimeGrid, Trajectory};

/// Integrate every parameter set, returning one result per set in input order
pub fn run_sweep(
    parameter_sets: &[SeirdParameters],
    initial: &Compartments,
    grid: &TimeGrid,
    method: SolverMethod,
    config: &SolverConfiguration,
) -> Vec<Result<Trajectory>> {
    log::debug!("sweep: {} parameter sets with {}", parameter_sets.len(), method);

    let run = |parameters: &SeirdParameters| SeirdModel::new(*parameters).simulate(initial, grid, method, config);

    #[cfg(feature = "parallel")]
    let results: Vec<Result<Trajectory>> = parameter_sets.par_iter().map(run).collect();

    #[cfg(not(feature = "parallel"))]
    let results: Vec<Result<Trajectory>> = parameter_sets.iter().map(run).collect();

    let failures = results.iter().filter(|r| r.is_err()).count();
    if failures > 0 {
        log::warn!("sweep: {failures} of {} runs failed", results.len());
    }

    results
}

/// Copies of `base` with the contact rate replaced by each value of `betas`
pub fn beta_sweep(base: &SeirdParameters, betas: &[f64]) -> Result<Vec<SeirdParameters>> {
    betas.iter().map(|&beta| base.with_beta(beta)).collect()
}

/// Headline numbers of one sweep run
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepSummary {
    pub beta: f64,

    /// `None` when the statistics are degenerate (gamma = 0 or beta = 0)
    pub r0: Option<f64>,

    pub peak_time: f64,
    pub peak_infected: f64,
    pub final_dead: f64,
    pub final_recovered: f64,
}

impl SweepSummary {
    pub fn new(parameters: &SeirdParameters, trajectory: &Trajectory) -> Self {
        let (peak_time, peak_infected) = trajectory.peak(Compartment::Infected.index());
        let last = trajectory.final_state();

        Self {
            beta: parameters.beta(),
            r0: DerivedStatistics::from_parameters(parameters).ok().map(|s| s.r0),
            peak_time,
            peak_infected,
            final_dead: last[Compartment::Dead.index()],
            final_recovered: last[Compartment::Recovered.index()],
        }
    }
}

/// Pair sweep results with their parameter sets, keeping only successful runs
pub fn summarize(parameter_sets: &[SeirdParameters], results: &[Result<Trajectory>]) -> Vec<SweepSummary> {
    parameter_sets
        .iter()
        .zip(results)
        .filter_map(|(parameters, result)| result.as_ref().ok().map(|t| SweepSummary::new(parameters, t)))
        .collect()
}
