//! Metropolis Monte Carlo sampler
use crate::common::constants::GAS_CONSTANT;
use crate::common::error::{Result, SimulationError};
use crate::matrix;
use crate::pes_exploration::state::LiveState;
use crate::pes_exploration::traits::{Potential, Propagation, Sampler, SamplerKind};
use ndarray::Array1;
use ndarray_rand::rand::{Rng, SeedableRng};
use ndarray_rand::rand::rngs::StdRng;
use tracing::trace;





/// Metropolis Monte Carlo: a uniform trial displacement in every dimension, accepted with
/// probability min(1, exp(-dE / (R*T))) at the target temperature of the system.
///
/// # Fields
/// ```text
/// max_displacement: trial moves are drawn from [-max_displacement, max_displacement) per dimension
/// n_accepted, n_trials: acceptance bookkeeping
/// ```
#[derive(Clone, Debug)]
pub struct MetropolisMonteCarlo
{
    pub max_displacement: f64,
    pub n_accepted: usize,
    pub n_trials: usize,
    rng: StdRng,
}



impl MetropolisMonteCarlo
{
    pub fn new(max_displacement: f64, seed: Option<u64>) -> Result<Self>
    {
        if !(max_displacement.is_finite() && max_displacement > 0.0)
        {
            return Err(SimulationError::Configuration(format!("max_displacement must be a positive number, got {}", max_displacement)))
        }

        let rng: StdRng = match seed
        {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(MetropolisMonteCarlo
        {
            max_displacement,
            n_accepted: 0,
            n_trials: 0,
            rng,
        })
    }

    pub fn acceptance_ratio(&self) -> Option<f64>
    {
        match self.n_trials
        {
            0 => None,
            n => Some(self.n_accepted as f64 / n as f64),
        }
    }
}



impl Sampler for MetropolisMonteCarlo
{
    fn kind(&self) -> SamplerKind
    {
        SamplerKind::MonteCarlo
    }

    fn step<P: Potential + ?Sized>(&mut self, potential: &P, live: &LiveState) -> Result<Propagation>
    {
        let n: usize = live.position.len();
        let trial: Array1<f64> = &live.position + &matrix::rand_uniform(n, -self.max_displacement, self.max_displacement, &mut self.rng);

        let delta_e: f64 = potential.get_energy(&trial) - potential.get_energy(&live.position);
        let kt: f64 = GAS_CONSTANT * live.target_temperature;
        let accepted: bool = match delta_e <= 0.0
        {
            true => true,
            false => (kt > 0.0) && (self.rng.gen::<f64>() < (-delta_e / kt).exp()),
        };
        self.n_trials += 1;
        trace!(delta_e, accepted, "Metropolis trial.");

        let position: Array1<f64> = match accepted
        {
            true =>
            {
                self.n_accepted += 1;
                trial
            },
            false => live.position.clone(),
        };
        let force: Option<Array1<f64>> = potential.get_force(&position).ok();

        Ok(Propagation
        {
            position,
            velocity: None,
            force,
        })
    }
}
