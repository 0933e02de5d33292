//! About the traits of the collaborators driven by the system: potentials, samplers, and conditions
use crate::common::error::{Result, SimulationError};
use crate::pes_exploration::state::LiveState;
use ndarray::Array1;





/// A potential energy surface explored by the system.
pub trait Potential
{
    /// Number of spatial dimensions the potential is defined on. Zero is rejected by the system.
    fn n_dimensions(&self) -> usize;

    /// Number of discrete states, for state-dependent potentials
    fn n_states(&self) -> Option<usize>
    {
        None
    }

    fn get_energy(&self, position: &Array1<f64>) -> f64;

    /// The force (negative gradient) at position
    fn get_force(&self, _position: &Array1<f64>) -> Result<Array1<f64>>
    {
        Err(SimulationError::ForceUnavailable)
    }

    /// The condition role of a bias potential. The system registers a potential returning
    /// Some here into its condition list, so it is stepped after every propagation.
    fn as_condition_mut(&mut self) -> Option<&mut dyn Condition>
    {
        None
    }
}





/// The families of samplers known to the system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SamplerKind
{
    Newtonian,
    Langevin,
    MonteCarlo,
}



impl SamplerKind
{
    /// Whether the system seeds Maxwell-Boltzmann velocities for this family
    pub fn seeds_velocity(self) -> bool
    {
        match self
        {
            SamplerKind::Newtonian | SamplerKind::Langevin => true,
            SamplerKind::MonteCarlo => false,
        }
    }
}





/// The new position, velocity, and force produced by one sampler step.
#[derive(Clone, Debug, PartialEq)]
pub struct Propagation
{
    pub position: Array1<f64>,
    pub velocity: Option<Array1<f64>>,
    pub force: Option<Array1<f64>>,
}





/// A stepping algorithm advancing the live quantities of the system.
pub trait Sampler
{
    fn kind(&self) -> SamplerKind;

    /// The characteristic step size, if any
    fn dt(&self) -> Option<f64>
    {
        None
    }

    fn step<P: Potential + ?Sized>(&mut self, potential: &P, live: &LiveState) -> Result<Propagation>;
}





/// What a condition learns about the system when it is coupled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coupling
{
    pub n_dimensions: usize,
    pub dt: f64,
}



/// A restraint, constraint, or bias applied to the system once per step after the sampler.
pub trait Condition
{
    fn name(&self) -> &str;

    /// Dimensionality the condition is written for; None if it works in any dimension
    fn n_dimensions(&self) -> Option<usize>
    {
        None
    }

    /// Couple the condition to a system. Coupling again replaces the previous coupling.
    fn couple_system(&mut self, coupling: Coupling);

    fn coupling(&self) -> Option<&Coupling>;

    fn apply_coupled(&mut self, live: &mut LiveState) -> Result<()>;
}
