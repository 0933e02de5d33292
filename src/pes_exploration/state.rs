//! About the instantaneous quantities of the system and the immutable snapshots recorded in the trajectory.

use crate::matrix;
use ndarray::Array1;





/// An immutable record of the system at one simulation step.
///
/// # Fields
/// ```text
/// position: the position of the particle (n_dimensions)
/// temperature: the temperature of the system
/// total_system_energy: potential energy, plus kinetic energy if the latter is defined
/// total_potential_energy: the potential energy at position
/// total_kinetic_energy: the kinetic energy, None when the system carries no (valid) velocity
/// force: the force at position, None when the potential defines no force
/// velocity: the velocity of the particle, None when the sampler uses no velocities
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct State
{
    position: Array1<f64>,
    temperature: f64,
    total_system_energy: f64,
    total_potential_energy: f64,
    total_kinetic_energy: Option<f64>,
    force: Option<Array1<f64>>,
    velocity: Option<Array1<f64>>,
}



impl State
{
    /// Build a snapshot. The total energy is derived here, so every snapshot satisfies
    /// total = potential when the kinetic energy is undefined, and total = potential + kinetic otherwise.
    pub fn new(position: Array1<f64>, temperature: f64, total_potential_energy: f64, total_kinetic_energy: Option<f64>, force: Option<Array1<f64>>, velocity: Option<Array1<f64>>) -> Self
    {
        let total_system_energy: f64 = match total_kinetic_energy
        {
            Some(kin) => total_potential_energy + kin,
            None => total_potential_energy,
        };

        State
        {
            position,
            temperature,
            total_system_energy,
            total_potential_energy,
            total_kinetic_energy,
            force,
            velocity,
        }
    }

    pub fn position(&self) -> &Array1<f64>
    {
        &self.position
    }

    pub fn temperature(&self) -> f64
    {
        self.temperature
    }

    pub fn total_system_energy(&self) -> f64
    {
        self.total_system_energy
    }

    pub fn total_potential_energy(&self) -> f64
    {
        self.total_potential_energy
    }

    pub fn total_kinetic_energy(&self) -> Option<f64>
    {
        self.total_kinetic_energy
    }

    pub fn force(&self) -> Option<&Array1<f64>>
    {
        self.force.as_ref()
    }

    pub fn velocity(&self) -> Option<&Array1<f64>>
    {
        self.velocity.as_ref()
    }
}





/// The mutable quantities of the system between two snapshots.
///
/// Samplers read it, conditions may write it. The owning system restores the consistency
/// between position, velocity, and energies only at its explicit recompute points,
/// so energies read here after a condition moved the particle can be stale.
///
/// # Fields
/// ```text
/// position: the current position (n_dimensions)
/// velocity: the current velocity (n_states * n_dimensions), None if not seeded
/// force: the current force (n_dimensions), None if undefined
/// temperature: the instantaneous temperature
/// target_temperature: the configured temperature of the system
/// mass: the mass of the particle
/// total_potential_energy, total_kinetic_energy, total_system_energy: the energies at the last recompute
/// step: the index of the current step of the simulation loop
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LiveState
{
    pub position: Array1<f64>,
    pub velocity: Option<Array1<f64>>,
    pub force: Option<Array1<f64>>,
    pub temperature: f64,
    pub target_temperature: f64,
    pub mass: f64,
    pub total_potential_energy: f64,
    pub total_kinetic_energy: Option<f64>,
    pub total_system_energy: f64,
    pub step: usize,
}



impl LiveState
{
    /// Kinetic energy 0.5 * m * |v|^2, defined only if every velocity component is a finite number
    pub fn kinetic_energy(&self) -> Option<f64>
    {
        match &self.velocity
        {
            Some(vel) if vel.iter().all(|v| v.is_finite()) => Some(0.5 * self.mass * matrix::norm_sq(vel)),
            _ => None,
        }
    }

    /// Overwrite the live quantities with a snapshot
    pub(crate) fn restore(&mut self, state: &State)
    {
        self.position = state.position.clone();
        self.velocity = state.velocity.clone();
        self.force = state.force.clone();
        self.temperature = state.temperature;
        self.total_potential_energy = state.total_potential_energy;
        self.total_kinetic_energy = state.total_kinetic_energy;
        self.total_system_energy = state.total_system_energy;
    }

    /// Take a snapshot of the live quantities
    pub(crate) fn snapshot(&self) -> State
    {
        State::new(self.position.clone(), self.temperature, self.total_potential_energy, self.total_kinetic_energy, self.force.clone(), self.velocity.clone())
    }
}
