//! Molecular-dynamics-like samplers: Newtonian (velocity Verlet) and Langevin dynamics.
use crate::common::constants::GAS_CONSTANT;
use crate::common::error::{check_len, Result};
use crate::matrix;
use crate::pes_exploration::state::LiveState;
use crate::pes_exploration::traits::{Potential, Propagation, Sampler, SamplerKind};
use ndarray::Array1;
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand::rngs::StdRng;





// Velocity and force of the live state, zero where undefined
fn velocity_force<P: Potential + ?Sized>(potential: &P, live: &LiveState) -> Result<(Array1<f64>, Array1<f64>)>
{
    let n: usize = live.position.len();
    let vel: Array1<f64> = match &live.velocity
    {
        Some(vel) =>
        {
            check_len("velocity", n, vel.len())?;
            vel.clone()
        },
        None => Array1::zeros(n),
    };
    let force: Array1<f64> = match &live.force
    {
        Some(force) => force.clone(),
        None => potential.get_force(&live.position)?,
    };

    Ok((vel, force))
}





/// Newtonian dynamics integrated with the velocity Verlet scheme
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityVerlet
{
    pub dt: f64,
}



impl VelocityVerlet
{
    pub fn new(dt: f64) -> Self
    {
        VelocityVerlet { dt }
    }
}



impl Sampler for VelocityVerlet
{
    fn kind(&self) -> SamplerKind
    {
        SamplerKind::Newtonian
    }

    fn dt(&self) -> Option<f64>
    {
        Some(self.dt)
    }

    fn step<P: Potential + ?Sized>(&mut self, potential: &P, live: &LiveState) -> Result<Propagation>
    {
        let dt: f64 = self.dt;
        let (vel, force) = velocity_force(potential, live)?;

        // x(t+dt) = x(t) + v(t)*dt + a(t)*dt^2/2
        let acc: Array1<f64> = &force / live.mass;
        let position: Array1<f64> = &live.position + &(&vel * dt) + &(&acc * (0.5 * dt * dt));

        // v(t+dt) = v(t) + (a(t) + a(t+dt))*dt/2
        let new_force: Array1<f64> = potential.get_force(&position)?;
        let new_acc: Array1<f64> = &new_force / live.mass;
        let velocity: Array1<f64> = vel + &((acc + &new_acc) * (0.5 * dt));

        Ok(Propagation
        {
            position,
            velocity: Some(velocity),
            force: Some(new_force),
        })
    }
}





/// Langevin dynamics (Euler-Maruyama), coupling the particle to a heat bath at the target
/// temperature of the system through the friction gamma and matching random kicks.
///
/// # Fields
/// ```text
/// dt: the time step
/// gamma: the friction coefficient
/// rng: the random number generator of the kicks
/// ```
#[derive(Clone, Debug)]
pub struct Langevin
{
    pub dt: f64,
    pub gamma: f64,
    rng: StdRng,
}



impl Langevin
{
    pub fn new(dt: f64, gamma: f64, seed: Option<u64>) -> Self
    {
        let rng: StdRng = match seed
        {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Langevin { dt, gamma, rng }
    }
}



impl Sampler for Langevin
{
    fn kind(&self) -> SamplerKind
    {
        SamplerKind::Langevin
    }

    fn dt(&self) -> Option<f64>
    {
        Some(self.dt)
    }

    fn step<P: Potential + ?Sized>(&mut self, potential: &P, live: &LiveState) -> Result<Propagation>
    {
        let dt: f64 = self.dt;
        let (vel, force) = velocity_force(potential, live)?;

        let noise_scale: f64 = (2.0 * self.gamma * GAS_CONSTANT * live.target_temperature / live.mass).sqrt() * dt.sqrt();
        let kick: Array1<f64> = matrix::rand_normal(vel.len(), &mut self.rng) * noise_scale;

        let deterministic: Array1<f64> = &force / live.mass - &(&vel * self.gamma);
        let velocity: Array1<f64> = vel + &(deterministic * dt) + &kick;
        let position: Array1<f64> = &live.position + &(&velocity * dt);
        let new_force: Array1<f64> = potential.get_force(&position)?;

        Ok(Propagation
        {
            position,
            velocity: Some(velocity),
            force: Some(new_force),
        })
    }
}
