//! seird-rs: SEIRD Outbreak Simulator
//!
//! Simulates the spread of an infectious disease through a closed population
//! split into five compartments (Susceptible, Exposed, Infected, Recovered,
//! Dead), integrates the resulting ODE system over a time grid, and derives
//! the basic reproduction number and herd-immunity threshold.
//!
//! # Architecture
//!
//! seird-rs is built on two core principles:
//!
//! 1. **Separation of Model and Numerics**
//!    - Models define equations (what to solve)
//!    - Solvers provide methods (how to solve)
//!
//! 2. **Validated configuration**
//!    - Parameters, initial state and grid are checked before integration
//!    - Failures come back as [`error::SimulationError`], never as partial results
//!
//! # Quick Start
//!
//! ```rust
//! use seird_rs::model::{Compartment, Compartments, SeirdModel, SeirdParameters};
//! use seird_rs::solver::{SolverConfiguration, SolverMethod, TimeGrid};
//!
//! # fn main() -> seird_rs::error::Result<()> {
//! // 1. Model: N = 1e6, beta = 1, sigma = 0.5, gamma = 0.4, mu = 0.01
//! let model = SeirdModel::new(SeirdParameters::new(1.0e6, 1.0, 0.5, 0.4, 0.01)?);
//!
//! // 2. Initial state and output times
//! let initial = Compartments::new(999_999.0, 0.0, 1.0, 0.0, 0.0)?;
//! let grid = TimeGrid::linspace(0.0, 100.0, 101)?;
//!
//! // 3. Integrate with the default adaptive method
//! let trajectory = model.simulate(&initial, &grid, SolverMethod::Dopri5, &SolverConfiguration::default())?;
//!
//! // 4. Inspect
//! let stats = model.statistics()?;
//! assert_eq!(stats.r0, 2.5);
//! let (peak_time, peak) = trajectory.peak(Compartment::Infected.index());
//! assert!(peak > 1.0 && peak_time > 0.0);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`model`]: SEIRD equations, parameters, compartments, derived statistics
//! - [`solver`]: Numerical solvers (Dormand-Prince, SDIRK, RK4, Euler)
//! - [`sweep`]: Many parameter sets against one initial state (rayon)
//! - [`config`]: JSON run configuration and reference presets
//! - [`output`]: CSV export, plots and text reports
//! - [`error`]: Error types

pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod solver;
pub mod sweep;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use seird_rs::prelude::*;
    //! ```
    pub use crate::config::{Preset, SimulationConfig};
    pub use crate::error::{Result, SimulationError};
    pub use crate::model::{Compartment, Compartments, DerivedStatistics, OdeModel, SeirdModel, SeirdParameters};
    pub use crate::solver::{
        Scenario, Solver, SolverConfiguration, SolverMethod, TimeGrid, Trajectory,
    };
    pub use crate::sweep::run_sweep;
}
