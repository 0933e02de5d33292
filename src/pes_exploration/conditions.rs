//! About the conditions coupled to a system: thermostats and boundaries.
use crate::common::constants::GAS_CONSTANT;
use crate::common::error::{Result, SimulationError};
use crate::matrix;
use crate::pes_exploration::state::LiveState;
use crate::pes_exploration::traits::{Condition, Coupling};
use ndarray::Array1;





/// Berendsen thermostat: rescales the velocity by
/// lambda = sqrt( 1 + dt/tau * (T0/T - 1) ) after every step,
/// with T = m*|v|^2 / (n_dof * R) and T0 the target temperature of the system.
#[derive(Clone, Debug, PartialEq)]
pub struct BerendsenThermostat
{
    pub tau: f64,
    coupling: Option<Coupling>,
}



impl BerendsenThermostat
{
    pub fn new(tau: f64) -> Result<Self>
    {
        if !(tau.is_finite() && tau > 0.0)
        {
            return Err(SimulationError::Configuration(format!("thermostat coupling time tau must be a positive number, got {}", tau)))
        }

        Ok(BerendsenThermostat { tau, coupling: None })
    }

    /// Instantaneous temperature of a velocity
    pub fn temperature(velocity: &Array1<f64>, mass: f64) -> f64
    {
        mass * matrix::norm_sq(velocity) / (velocity.len() as f64 * GAS_CONSTANT)
    }
}



impl Condition for BerendsenThermostat
{
    fn name(&self) -> &str
    {
        "berendsen_thermostat"
    }

    fn couple_system(&mut self, coupling: Coupling)
    {
        self.coupling = Some(coupling);
    }

    fn coupling(&self) -> Option<&Coupling>
    {
        self.coupling.as_ref()
    }

    fn apply_coupled(&mut self, live: &mut LiveState) -> Result<()>
    {
        let dt: f64 = match &self.coupling
        {
            Some(coupling) => coupling.dt,
            None => return Err(SimulationError::ConditionType { name: self.name().to_string(), reason: String::from("applied before being coupled") }),
        };
        let vel: &mut Array1<f64> = match live.velocity.as_mut()
        {
            Some(vel) if !vel.is_empty() => vel,
            _ => return Ok(()),
        };

        // Avoid the division by a vanishing temperature
        let temp: f64 = Self::temperature(vel, live.mass).max(1.0);
        let lambda: f64 = (1.0 + (dt / self.tau) * (live.target_temperature / temp - 1.0)).max(0.0).sqrt();
        *vel *= lambda;

        Ok(())
    }
}





/// Periodic boundary: wraps every position component into [lower, upper).
#[derive(Clone, Debug, PartialEq)]
pub struct PeriodicBoundary
{
    pub lower: f64,
    pub upper: f64,
    coupling: Option<Coupling>,
}



impl PeriodicBoundary
{
    pub fn new(lower: f64, upper: f64) -> Result<Self>
    {
        if !(lower < upper)
        {
            return Err(SimulationError::Configuration(format!("periodic boundary needs lower < upper, got [{}, {})", lower, upper)))
        }

        Ok(PeriodicBoundary { lower, upper, coupling: None })
    }

    pub fn wrap(&self, x: f64) -> f64
    {
        let length: f64 = self.upper - self.lower;
        self.lower + (x - self.lower).rem_euclid(length)
    }
}



impl Condition for PeriodicBoundary
{
    fn name(&self) -> &str
    {
        "periodic_boundary"
    }

    fn couple_system(&mut self, coupling: Coupling)
    {
        self.coupling = Some(coupling);
    }

    fn coupling(&self) -> Option<&Coupling>
    {
        self.coupling.as_ref()
    }

    fn apply_coupled(&mut self, live: &mut LiveState) -> Result<()>
    {
        live.position.mapv_inplace(|x| self.wrap(x));
        Ok(())
    }
}
