//! Behavioural properties of SEIRD runs
//!
//! Conservation, initial-condition fidelity, boundary cases and the two
//! reference outbreaks, checked through the public API only.

use approx::assert_relative_eq;

use seird_rs::config::{Preset, SimulationConfig};
use seird_rs::error::{FailureKind, SimulationError};
use seird_rs::model::{Compartment, Compartments, DerivedStatistics, SeirdModel, SeirdParameters};
use seird_rs::solver::{Dopri5Solver, Scenario, Solver, SolverConfiguration, SolverMethod, TimeGrid};

mod common;
use common::{BlowUp, assert_conserved, create_scenario, moderate_parameters, seird_initial};

fn all_methods() -> Vec<(SolverMethod, SolverConfiguration)> {
    SolverMethod::ALL
        .iter()
        .map(|&method| (method, method.default_configuration()))
        .collect()
}

// =================================================================================================
// Structural properties
// =================================================================================================

#[test]
fn test_population_conserved_by_every_method() {
    let population = 1.0e6;
    let model = SeirdModel::new(moderate_parameters(population));
    let initial = seird_initial(population, 10.0);
    let grid = TimeGrid::linspace(0.0, 150.0, 151).unwrap();

    for (method, config) in all_methods() {
        let trajectory = model.simulate(&initial, &grid, method, &config).unwrap();
        assert_conserved(&trajectory, 1e-6, method.as_str());
    }
}

#[test]
fn test_initial_state_reported_exactly() {
    let population = 1.0e5;
    let model = SeirdModel::new(moderate_parameters(population));
    let initial = Compartments::new(99_000.0, 500.0, 400.0, 90.0, 10.0).unwrap();
    let grid = TimeGrid::linspace(0.0, 30.0, 16).unwrap();

    for (method, config) in all_methods() {
        let trajectory = model.simulate(&initial, &grid, method, &config).unwrap();
        assert_eq!(trajectory.initial_state(), &initial.to_state(), "{method}");
        assert_eq!(trajectory.compartments_at(0).unwrap(), initial);
    }
}

#[test]
fn test_times_match_grid() {
    let population = 1.0e5;
    let model = SeirdModel::new(moderate_parameters(population));
    let grid = TimeGrid::new(vec![0.0, 0.5, 3.0, 3.25, 20.0, 47.5]).unwrap();

    for (method, config) in all_methods() {
        let trajectory = model
            .simulate(&seird_initial(population, 5.0), &grid, method, &config)
            .unwrap();
        assert_eq!(trajectory.times(), grid.points(), "{method}");
        assert_eq!(trajectory.len(), grid.len());
    }
}

#[test]
fn test_single_point_grid() {
    let model = SeirdModel::new(moderate_parameters(1000.0));
    let initial = seird_initial(1000.0, 1.0);
    let grid = TimeGrid::linspace(5.0, 5.0, 1).unwrap();

    let trajectory = model
        .simulate(&initial, &grid, SolverMethod::Dopri5, &SolverConfiguration::default())
        .unwrap();
    assert_eq!(trajectory.len(), 1);
    assert_eq!(trajectory.final_time(), 5.0);
    assert_eq!(trajectory.final_state(), &initial.to_state());
}

// =================================================================================================
// Boundary behaviour
// =================================================================================================

#[test]
fn test_zero_transmission() {
    let population = 1.0e6;
    let parameters = SeirdParameters::new(population, 0.0, 0.1, 0.05, 1.0).unwrap();
    let initial = Compartments::new(population - 1100.0, 100.0, 1000.0, 0.0, 0.0).unwrap();
    let grid = TimeGrid::linspace(0.0, 50.0, 51).unwrap();

    let trajectory = SeirdModel::new(parameters)
        .simulate(&initial, &grid, SolverMethod::Dopri5, &SolverConfiguration::default())
        .unwrap();

    let susceptible = trajectory.compartment(Compartment::Susceptible);
    assert!(susceptible.iter().all(|&s| s == initial.susceptible()));

    // E(t) = E0 exp(-sigma t)
    for (t, state) in trajectory.iter() {
        assert_relative_eq!(state[Compartment::Exposed.index()], 100.0 * (-0.1 * t).exp(), max_relative = 1e-6);
    }

    let infected = trajectory.compartment(Compartment::Infected);
    assert!(infected.windows(2).all(|w| w[1] < w[0]));
}

#[test]
fn test_no_infection_no_dynamics() {
    let population = 1.0e4;
    let initial = Compartments::new(population, 0.0, 0.0, 0.0, 0.0).unwrap();
    let grid = TimeGrid::linspace(0.0, 100.0, 11).unwrap();

    for (method, config) in all_methods() {
        let trajectory = SeirdModel::new(moderate_parameters(population))
            .simulate(&initial, &grid, method, &config)
            .unwrap();
        assert!(trajectory.states().iter().all(|s| s == &initial.to_state()), "{method}");
    }
}

// =================================================================================================
// Derived statistics
// =================================================================================================

#[test]
fn test_r0_and_threshold() {
    let stats = DerivedStatistics::from_parameters(&moderate_parameters(1.0e6)).unwrap();
    assert_relative_eq!(stats.r0, 2.5);
    assert_relative_eq!(stats.herd_immunity_threshold, 0.6, epsilon = 1e-12);
}

#[test]
fn test_degenerate_statistics() {
    let no_recovery = SeirdParameters::new(1.0e6, 1.0, 0.5, 0.0, 0.01).unwrap();
    assert!(matches!(
        SeirdModel::new(no_recovery).statistics(),
        Err(SimulationError::DegenerateStatistics(_))
    ));

    // The dynamics are still well defined
    let grid = TimeGrid::linspace(0.0, 10.0, 11).unwrap();
    assert!(
        SeirdModel::new(no_recovery)
            .simulate(&seird_initial(1.0e6, 1.0), &grid, SolverMethod::Dopri5, &SolverConfiguration::default())
            .is_ok()
    );
}

// =================================================================================================
// Reference outbreaks
// =================================================================================================

#[test]
fn test_world_outbreak() {
    let config = SimulationConfig::preset(Preset::World).unwrap();
    let trajectory = config.run().unwrap();

    assert_eq!(trajectory.len(), 200);
    assert_conserved(&trajectory, 1e-6, "world");

    let infected = trajectory.compartment(Compartment::Infected);
    let (peak_time, peak) = trajectory.peak(Compartment::Infected.index());
    assert!(peak > 1.0e6, "peak {peak:e}");
    assert!(peak_time > 0.0 && peak_time < 200.0);
    assert!(infected[infected.len() - 1] < 1e-3 * peak);

    let dead = trajectory.compartment(Compartment::Dead);
    assert!(dead.windows(2).all(|w| w[1] >= w[0] - 1e-6 * (1.0 + w[0])));
    assert!(trajectory.min_value() > -1e-3);
}

#[test]
fn test_moderate_outbreak() {
    let config = SimulationConfig::preset(Preset::Moderate).unwrap();
    let stats = config.model().statistics().unwrap();
    assert_relative_eq!(stats.r0, 2.5);
    assert_relative_eq!(stats.herd_immunity_threshold, 0.6, epsilon = 1e-12);

    let trajectory = config.run().unwrap();
    assert_conserved(&trajectory, 1e-6, "moderate");

    let infected = trajectory.compartment(Compartment::Infected);
    let (peak_time, peak) = trajectory.peak(Compartment::Infected.index());
    assert!(peak < config.parameters.population());
    assert!(peak_time > 10.0 && peak_time < 190.0, "peak at {peak_time}");
    assert!(infected[infected.len() - 1] < 0.01 * peak);
}

#[test]
fn test_methods_agree() {
    let population = 1.0e6;
    let model = SeirdModel::new(moderate_parameters(population));
    let initial = seird_initial(population, 10.0);
    let grid = TimeGrid::linspace(0.0, 120.0, 121).unwrap();

    let reference = model
        .simulate(&initial, &grid, SolverMethod::Dopri5, &SolverConfiguration::adaptive(1e-10, 1e-10))
        .unwrap();

    let candidates = [
        (SolverMethod::Sdirk, SolverConfiguration::adaptive(1e-7, 1e-7).with_max_steps(5000)),
        (SolverMethod::Rk4, SolverConfiguration::fixed(20)),
    ];

    for (method, config) in candidates {
        let trajectory = model.simulate(&initial, &grid, method, &config).unwrap();
        for compartment in Compartment::ALL {
            let expected = reference.final_state()[compartment.index()];
            let actual = trajectory.final_state()[compartment.index()];
            assert_relative_eq!(actual, expected, max_relative = 1e-4, epsilon = 1e-3);
        }
    }
}

// =================================================================================================
// Failures
// =================================================================================================

#[test]
fn test_invalid_inputs_rejected() {
    assert!(SeirdParameters::new(0.0, 1.0, 0.5, 0.4, 0.01).is_err());
    assert!(SeirdParameters::new(1000.0, -1.0, 0.5, 0.4, 0.01).is_err());
    assert!(SeirdParameters::new(1000.0, 1.0, 0.5, f64::NAN, 0.01).is_err());
    assert!(Compartments::new(1000.0, -1.0, 1.0, 0.0, 0.0).is_err());
    assert!(TimeGrid::new(vec![0.0, 1.0, 1.0]).is_err());
    assert!(TimeGrid::new(vec![]).is_err());
    assert!(TimeGrid::linspace(10.0, 0.0, 5).is_err());
}

#[test]
fn test_dimension_mismatch_rejected() {
    let model = SeirdModel::new(moderate_parameters(1000.0));
    let scenario = Scenario::new(
        Box::new(model),
        nalgebra::DVector::from_vec(vec![999.0, 1.0]),
        TimeGrid::linspace(0.0, 1.0, 2).unwrap(),
    );

    let err = Dopri5Solver::new().solve(&scenario, &SolverConfiguration::default()).unwrap_err();
    assert!(matches!(err, SimulationError::InvalidParameter { .. }));
}

#[test]
fn test_negative_initial_state_rejected() {
    let model = SeirdModel::new(moderate_parameters(1000.0));
    let scenario = Scenario::new(
        Box::new(model),
        nalgebra::DVector::from_vec(vec![1000.0, 0.0, -5.0, 0.0, 0.0]),
        TimeGrid::linspace(0.0, 10.0, 11).unwrap(),
    );

    for method in SolverMethod::ALL {
        let err = method
            .solver()
            .solve(&scenario, &method.default_configuration())
            .unwrap_err();
        assert!(matches!(err, SimulationError::InvalidParameter { .. }), "{method}: {err:?}");
    }
}

#[test]
fn test_stiff_parameters_need_implicit_method() {
    let population = 1.0e6;
    let parameters = SeirdParameters::new(population, 1.0, 0.5, 0.4, 1.0e7).unwrap();
    let model = SeirdModel::new(parameters);
    let initial = seird_initial(population, 100.0);
    let grid = TimeGrid::linspace(0.0, 20.0, 21).unwrap();

    let err = model
        .simulate(&initial, &grid, SolverMethod::Dopri5, &SolverConfiguration::default())
        .unwrap_err();
    match err {
        SimulationError::IntegrationFailure { kind, time, .. } => {
            assert!(matches!(kind, FailureKind::MaxStepsExceeded { max_steps: 500 }));
            assert!(time < 1.0);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let trajectory = model
        .simulate(&initial, &grid, SolverMethod::Sdirk, &SolverMethod::Sdirk.default_configuration())
        .unwrap();
    assert_conserved(&trajectory, 1e-6, "stiff SDIRK");
    assert!(trajectory.final_state()[Compartment::Dead.index()] > 99.0);
}

#[test]
fn test_blow_up_reported() {
    let scenario = create_scenario(Box::new(BlowUp), 1.0, TimeGrid::linspace(0.0, 2.0, 2).unwrap());

    // y = 1 / (1 - t) blows up at t = 1
    let err = Dopri5Solver::new().solve(&scenario, &SolverConfiguration::default()).unwrap_err();
    match err {
        SimulationError::IntegrationFailure { kind, time, .. } => {
            assert!(
                matches!(
                    kind,
                    FailureKind::StepSizeUnderflow { .. }
                        | FailureKind::MaxStepsExceeded { .. }
                        | FailureKind::NonFiniteState { .. }
                ),
                "unexpected failure {kind:?}"
            );
            assert!((time - 1.0).abs() < 1e-6, "failure reported at t = {time}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}
