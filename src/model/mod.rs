//! Compartmental model abstractions
//!
//! # Structure
//!
//! - **`traits`**: the `OdeModel` trait (right-hand side + Jacobian)
//! - **`compartments`**: `Compartment` identifiers and the `Compartments` vector
//! - **`parameters`**: validated `SeirdParameters`
//! - **`seird`**: the `SeirdModel` equations
//! - **`statistics`**: `DerivedStatistics` (R0, herd-immunity threshold, ...)
//!
//! # Design
//!
//! The model describes the EQUATIONS only. Time integration lives in
//! [`crate::solver`], so any solver can be applied to any `OdeModel`.

mod compartments;
mod parameters;
mod seird;
mod statistics;
mod traits;

pub use compartments::{Compartment, Compartments};
pub use parameters::SeirdParameters;
pub use seird::SeirdModel;
pub use statistics::DerivedStatistics;
pub use traits::OdeModel;
