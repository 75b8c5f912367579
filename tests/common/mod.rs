//! Common utilities for integration tests

#![allow(dead_code)]

pub mod mock_models;
pub mod test_helpers;

// Re-export commonly used items
pub use mock_models::{BlowUp, ConstantGrowth, ExponentialDecay, StiffDecay};
pub use test_helpers::{
    assert_conserved, create_scenario, moderate_parameters, relative_error, seird_initial,
};
