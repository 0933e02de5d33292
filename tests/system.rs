mod common;

use common::{quiet_para, EnergyOnly, Flat, MultiState};
use ndarray::{array, Array1};
use pes_explorer::pes_exploration::conditions::{BerendsenThermostat, PeriodicBoundary};
use pes_explorer::pes_exploration::md::{Langevin, VelocityVerlet};
use pes_explorer::pes_exploration::monte_carlo::MetropolisMonteCarlo;
use pes_explorer::pes_exploration::potential::{HarmonicOscillator, MetadynamicsBias};
use pes_explorer::{Condition, ConditionSlot, Potential, Sampler, SimulatePara, SimulationError, State, System};
use std::fs;

fn quiet(steps: usize, save_every_state: usize) -> SimulatePara
{
    SimulatePara
    {
        steps,
        save_every_state,
        verbosity: false,
        ..Default::default()
    }
}

fn assert_energy_invariant(state: &State)
{
    match state.total_kinetic_energy()
    {
        None => assert_eq!(state.total_system_energy(), state.total_potential_energy()),
        Some(kin) => assert!((state.total_system_energy() - (state.total_potential_energy() + kin)).abs() < 1e-12),
    }
}

fn assert_consistent<P: Potential, S: Sampler>(s: &System<P, S>)
{
    let last: &State = s.trajectory().last().expect("trajectory is empty");
    assert_eq!(last, s.current_state());
    assert_eq!(last.position(), s.position());
    assert_eq!(last.velocity(), s.velocity());
    assert_eq!(last.force(), s.force());
    assert_eq!(last.total_potential_energy(), s.total_potential_energy());
    assert_eq!(last.total_kinetic_energy(), s.total_kinetic_energy());
    assert_eq!(last.total_system_energy(), s.total_system_energy());
}



#[test]
fn trajectory_ends_with_the_live_state_after_construction()
{
    let md = System::new(HarmonicOscillator::new(1.0, 0.0), VelocityVerlet::new(0.01), Vec::new(), &quiet_para(None, 1)).unwrap();
    assert_eq!(md.trajectory().len(), 1);
    assert_consistent(&md);

    let mc = System::new(HarmonicOscillator::new(1.0, 0.0), MetropolisMonteCarlo::new(0.5, Some(1)).unwrap(), Vec::new(), &quiet_para(None, 2)).unwrap();
    assert_eq!(mc.trajectory().len(), 1);
    assert_consistent(&mc);
    assert_eq!(mc.n_particles(), 1);
}

#[test]
fn flat_potential_at_the_origin_has_zero_energy()
{
    let s = System::new(Flat { n_dimensions: 1 }, MetropolisMonteCarlo::new(0.5, Some(1)).unwrap(), Vec::new(), &quiet_para(Some(vec![0.0]), 1)).unwrap();
    assert_eq!(s.total_potential_energy(), 0.0);
    assert_eq!(s.current_state().total_potential_energy(), 0.0);
    assert_eq!(s.force(), Some(&array![0.0]));
}

#[test]
fn zero_dimensional_potential_is_a_configuration_error()
{
    let result = System::new(Flat { n_dimensions: 0 }, MetropolisMonteCarlo::new(0.5, Some(1)).unwrap(), Vec::new(), &quiet_para(None, 1));
    assert!(matches!(result, Err(SimulationError::Configuration(_))));
}

#[test]
fn start_position_must_match_the_dimensionality()
{
    let result = System::new(Flat { n_dimensions: 2 }, MetropolisMonteCarlo::new(0.5, Some(1)).unwrap(), Vec::new(), &quiet_para(Some(vec![0.0]), 1));
    assert!(matches!(result, Err(SimulationError::ShapeMismatch { expected: 2, found: 1, .. })));

    let mut s = System::new(Flat { n_dimensions: 2 }, MetropolisMonteCarlo::new(0.5, Some(1)).unwrap(), Vec::new(), &quiet_para(Some(vec![0.0, 1.0]), 1)).unwrap();
    let err = s.initialise(true, true, false, Some(array![3.0])).unwrap_err();
    assert!(matches!(err, SimulationError::ShapeMismatch { .. }));
}

#[test]
fn explicit_reinitialisation_resets_the_trajectory()
{
    let mut s = System::new(HarmonicOscillator::new(1.0, 0.0), VelocityVerlet::new(0.01), Vec::new(), &quiet_para(Some(vec![1.0]), 1)).unwrap();
    s.simulate_with(&quiet(10, 1)).unwrap();
    assert_eq!(s.trajectory().len(), 11);

    s.initialise(true, true, true, Some(array![-2.0])).unwrap();
    assert_eq!(s.trajectory().len(), 1);
    assert_eq!(s.initial_position(), &array![-2.0]);
    assert_eq!(s.step(), 0);
    assert_eq!(s.force(), Some(&array![2.0]));
    assert_consistent(&s);
}

#[test]
fn missing_force_is_only_a_warning()
{
    let mut s = System::new(EnergyOnly, MetropolisMonteCarlo::new(0.5, Some(3)).unwrap(), Vec::new(), &quiet_para(Some(vec![2.0]), 1)).unwrap();
    assert_eq!(s.force(), None);
    assert_eq!(s.total_potential_energy(), 2.0);

    s.simulate_with(&quiet(20, 1)).unwrap();
    assert_eq!(s.trajectory().len(), 21);
    assert!(s.trajectory().iter().all(|state| state.force().is_none()));
}

#[test]
fn revert_on_a_single_entry_is_a_no_op()
{
    let mut s = System::new(HarmonicOscillator::new(1.0, 0.0), VelocityVerlet::new(0.01), Vec::new(), &quiet_para(Some(vec![1.0]), 1)).unwrap();
    let before: State = s.current_state().clone();
    assert!(!s.revert_step());
    assert_eq!(s.trajectory().len(), 1);
    assert_eq!(s.current_state(), &before);
}

#[test]
fn revert_restores_the_previous_entry()
{
    let mut s = System::new(HarmonicOscillator::new(1.0, 0.0), VelocityVerlet::new(0.05), Vec::new(), &quiet_para(Some(vec![1.0]), 1)).unwrap();
    s.simulate_with(&quiet(4, 1)).unwrap();
    let n: usize = s.trajectory().len();
    let previous: State = s.trajectory()[n - 2].clone();

    assert!(s.revert_step());
    assert_eq!(s.trajectory().len(), n - 1);
    assert_eq!(s.current_state(), &previous);
    assert_consistent(&s);
}

#[test]
fn unit_stride_keeps_every_step()
{
    let mut s = System::new(HarmonicOscillator::new(1.0, 0.0), VelocityVerlet::new(0.01), Vec::new(), &quiet_para(Some(vec![1.0]), 1)).unwrap();
    let last: State = s.simulate_with(&quiet(25, 1)).unwrap();
    assert_eq!(s.trajectory().len(), 26);
    assert_eq!(s.trajectory().last(), Some(&last));
    assert_consistent(&s);
}

#[test]
fn strided_simulation_keeps_every_kth_step_and_the_final_one()
{
    for (steps, k) in [(10, 2), (12, 3), (20, 5), (7, 7)]
    {
        let mut s = System::new(HarmonicOscillator::new(1.0, 0.0), MetropolisMonteCarlo::new(0.3, Some(4)).unwrap(), Vec::new(), &quiet_para(Some(vec![1.0]), 1)).unwrap();
        s.simulate_with(&quiet(steps, k)).unwrap();
        let interior: usize = (steps + k - 1) / k;
        assert_eq!(s.trajectory().len(), 1 + interior + 1, "steps = {}, k = {}", steps, k);
    }
}

#[test]
fn stride_hit_on_the_last_step_is_only_kept_once()
{
    // Steps 0 and 5 are kept in the loop, step 10 only as the final entry
    let mut s = System::new(HarmonicOscillator::new(1.0, 0.0), MetropolisMonteCarlo::new(0.3, Some(4)).unwrap(), Vec::new(), &quiet_para(Some(vec![1.0]), 1)).unwrap();
    s.simulate_with(&quiet(11, 5)).unwrap();
    assert_eq!(s.trajectory().len(), 4);

    let mut s = System::new(HarmonicOscillator::new(1.0, 0.0), MetropolisMonteCarlo::new(0.3, Some(4)).unwrap(), Vec::new(), &quiet_para(Some(vec![1.0]), 1)).unwrap();
    s.simulate_with(&quiet(1, 1)).unwrap();
    assert_eq!(s.trajectory().len(), 2);
}

#[test]
fn reseeding_recomputes_the_force_at_the_new_position()
{
    let pot = HarmonicOscillator::new(1.0, 0.0);
    let mut s = System::new(pot.clone(), VelocityVerlet::new(0.01), Vec::new(), &quiet_para(Some(vec![5.0]), 3)).unwrap();
    assert_eq!(s.force(), Some(&array![-5.0]));

    let para = SimulatePara { init_system: true, withdraw_traj: true, ..quiet(0, 1) };
    s.simulate_with(&para).unwrap();
    let first: &State = &s.trajectory()[0];
    assert_eq!(first.force(), Some(&pot.get_force(first.position()).unwrap()));
    assert_consistent(&s);

    s.set_position(array![-3.0]).unwrap();
    assert_eq!(s.current_state().force(), Some(&array![3.0]));
}

#[test]
fn invalid_collaborator_parameters_are_configuration_errors()
{
    assert!(matches!(MetropolisMonteCarlo::new(0.0, Some(1)), Err(SimulationError::Configuration(_))));
    assert!(matches!(MetropolisMonteCarlo::new(-1.0, Some(1)), Err(SimulationError::Configuration(_))));
    assert!(matches!(BerendsenThermostat::new(0.0), Err(SimulationError::Configuration(_))));
    assert!(matches!(PeriodicBoundary::new(1.0, -1.0), Err(SimulationError::Configuration(_))));
}

#[test]
fn every_snapshot_satisfies_the_energy_invariant()
{
    let mut md = System::new(HarmonicOscillator::new(2.0, 0.5), Langevin::new(0.01, 0.5, Some(8)), Vec::new(), &quiet_para(None, 8)).unwrap();
    md.simulate_with(&quiet(200, 3)).unwrap();
    md.trajectory().iter().for_each(assert_energy_invariant);
    assert!(md.trajectory().iter().all(|state| state.total_kinetic_energy().is_some()));

    let mut mc = System::new(HarmonicOscillator::new(2.0, 0.5), MetropolisMonteCarlo::new(0.2, Some(8)).unwrap(), Vec::new(), &quiet_para(None, 8)).unwrap();
    mc.simulate_with(&quiet(200, 3)).unwrap();
    mc.trajectory().iter().for_each(assert_energy_invariant);
    assert!(mc.trajectory().iter().all(|state| state.total_kinetic_energy().is_none()));
}

#[test]
fn instantaneous_temperature_follows_the_target()
{
    let mut s = System::new(HarmonicOscillator::new(1.0, 0.0), Langevin::new(0.01, 1.0, Some(2)), Vec::new(), &quiet_para(None, 2)).unwrap();
    s.set_temperature(150.0).unwrap();
    s.simulate_with(&quiet(10, 1)).unwrap();
    assert!(s.trajectory().iter().skip(1).all(|state| state.temperature() == 150.0));
}

#[test]
fn metadynamics_bias_is_registered_once_as_the_last_condition()
{
    let bias = MetadynamicsBias::new(HarmonicOscillator::new(1.0, 0.0), 0.5, 0.2, 2);
    let conditions: Vec<Box<dyn Condition>> = vec![Box::new(PeriodicBoundary::new(-5.0, 5.0).unwrap())];
    let mut s = System::new(bias, MetropolisMonteCarlo::new(0.3, Some(6)).unwrap(), conditions, &quiet_para(Some(vec![0.0]), 6)).unwrap();

    assert_eq!(s.conditions().len(), 2);
    assert!(matches!(s.conditions()[0], ConditionSlot::Coupled(_)));
    assert!(matches!(s.conditions()[1], ConditionSlot::Potential));

    s.couple_conditions().unwrap();
    s.couple_conditions().unwrap();
    assert_eq!(s.conditions().len(), 2);

    s.simulate_with(&quiet(10, 1)).unwrap();
    assert_eq!(s.potential().hills().len(), 5);

    // The live energy is the biased one
    let position: Array1<f64> = s.position().clone();
    let expected: f64 = s.potential().get_energy(&position);
    assert_eq!(s.total_potential_energy(), expected);
    assert!(expected >= s.potential().origin.get_energy(&position));
}

#[test]
fn mismatched_condition_cannot_be_coupled()
{
    let one_dimensional = MetadynamicsBias::new(HarmonicOscillator::new(1.0, 0.0), 0.5, 0.2, 1);
    let conditions: Vec<Box<dyn Condition>> = vec![Box::new(one_dimensional)];
    let result = System::new(Flat { n_dimensions: 2 }, MetropolisMonteCarlo::new(0.3, Some(6)).unwrap(), conditions, &quiet_para(None, 6));
    assert!(matches!(result, Err(SimulationError::ConditionType { .. })));

    let mut s = System::new(Flat { n_dimensions: 2 }, MetropolisMonteCarlo::new(0.3, Some(6)).unwrap(), Vec::new(), &quiet_para(None, 6)).unwrap();
    let one_dimensional = MetadynamicsBias::new(HarmonicOscillator::new(1.0, 0.0), 0.5, 0.2, 1);
    assert!(s.add_condition(Box::new(one_dimensional)).is_err());
    assert!(s.conditions().is_empty());
    assert!(s.add_condition(Box::new(PeriodicBoundary::new(-1.0, 1.0).unwrap())).is_ok());
    assert_eq!(s.conditions().len(), 1);
}

#[test]
fn conditions_get_the_step_size_of_the_sampler()
{
    let conditions: Vec<Box<dyn Condition>> = vec![Box::new(BerendsenThermostat::new(1.0).unwrap())];
    let s = System::new(HarmonicOscillator::new(1.0, 0.0), VelocityVerlet::new(0.02), conditions, &quiet_para(None, 1)).unwrap();
    match &s.conditions()[0]
    {
        ConditionSlot::Coupled(condition) => assert_eq!(condition.coupling().map(|c| c.dt), Some(0.02)),
        ConditionSlot::Potential => panic!("unexpected potential slot"),
    }
}

#[test]
fn conditions_act_on_every_step()
{
    let conditions: Vec<Box<dyn Condition>> = vec![Box::new(BerendsenThermostat::new(0.1).unwrap()), Box::new(PeriodicBoundary::new(-1.0, 1.0).unwrap())];
    let para = pes_explorer::SystemPara { temperature: 1000.0, ..quiet_para(Some(vec![0.9]), 12) };
    let mut s = System::new(Flat { n_dimensions: 1 }, VelocityVerlet::new(0.05), conditions, &para).unwrap();
    s.simulate_with(&quiet(500, 1)).unwrap();

    assert!(s.trajectory().iter().skip(1).all(|state| (-1.0..1.0).contains(&state.position()[0])));
}

#[test]
fn multi_state_systems_seed_one_velocity_per_state_and_dimension()
{
    let s = System::new(MultiState { n_dimensions: 2, n_states: 3 }, Langevin::new(0.01, 1.0, Some(1)), Vec::new(), &quiet_para(Some(vec![0.0, 0.0]), 1)).unwrap();
    assert_eq!(s.n_states(), 3);
    assert_eq!(s.velocity().map(|v| v.len()), Some(6));
    assert_eq!(s.position().len(), 2);
    assert_eq!(s.force(), None);

    let result = System::new(MultiState { n_dimensions: 2, n_states: 0 }, Langevin::new(0.01, 1.0, Some(1)), Vec::new(), &quiet_para(None, 1));
    assert!(matches!(result, Err(SimulationError::Configuration(_))));
}

#[test]
fn trajectory_is_exported_as_a_table()
{
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trajectory.csv");
    let mut s = System::new(HarmonicOscillator::new(1.0, 0.0), MetropolisMonteCarlo::new(0.3, Some(2)).unwrap(), Vec::new(), &quiet_para(Some(vec![1.0]), 2)).unwrap();
    s.simulate_with(&quiet(9, 1)).unwrap();

    let written = s.write_trajectory(&path).unwrap();
    assert_eq!(written, path);
    let content: String = fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), s.trajectory().len() + 1);
    assert!(content.starts_with("index,position,temperature,total_system_energy"));

    let missing = dir.path().join("nope").join("trajectory.csv");
    assert!(matches!(s.write_trajectory(&missing), Err(SimulationError::OutputDirectory(_))));
}

#[test]
fn append_state_always_extends_the_trajectory()
{
    let mut s = System::new(HarmonicOscillator::new(1.0, 0.0), VelocityVerlet::new(0.01), Vec::new(), &quiet_para(Some(vec![1.0]), 1)).unwrap();
    s.append_state(array![0.0], Some(array![1.0]), Some(array![0.0])).unwrap();
    s.append_state(array![0.5], Some(array![0.0]), Some(array![-0.5])).unwrap();
    assert_eq!(s.trajectory().len(), 3);
    assert_eq!(s.total_kinetic_energy(), Some(0.0));
    assert_eq!(s.total_system_energy(), 0.125);
    assert_consistent(&s);
}
