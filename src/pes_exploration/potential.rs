use crate::common::error::{check_len, Result};
use crate::pes_exploration::state::LiveState;
use crate::pes_exploration::traits::{Condition, Coupling, Potential};
use ndarray::Array1;
use tracing::trace;





/// The harmonic oscillator potential E = k/2 * |x - x0|^2 + y_shift.
///
/// # Fields
/// ```text
/// k: the force constant
/// x0: the position of the minimum, which also fixes the dimensionality
/// y_shift: the energy at the minimum
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct HarmonicOscillator
{
    pub k: f64,
    pub x0: Array1<f64>,
    pub y_shift: f64,
}



impl HarmonicOscillator
{
    /// A one-dimensional oscillator with its minimum at x0
    pub fn new(k: f64, x0: f64) -> Self
    {
        HarmonicOscillator
        {
            k,
            x0: Array1::from(vec![x0]),
            y_shift: 0.0,
        }
    }

    pub fn with_minimum(k: f64, x0: Array1<f64>) -> Self
    {
        HarmonicOscillator
        {
            k,
            x0,
            y_shift: 0.0,
        }
    }
}



impl Potential for HarmonicOscillator
{
    fn n_dimensions(&self) -> usize
    {
        self.x0.len()
    }

    fn get_energy(&self, position: &Array1<f64>) -> f64
    {
        let dx: Array1<f64> = position - &self.x0;
        0.5 * self.k * dx.dot(&dx) + self.y_shift
    }

    fn get_force(&self, position: &Array1<f64>) -> Result<Array1<f64>>
    {
        check_len("position", self.x0.len(), position.len())?;
        Ok((&self.x0 - position) * self.k)
    }
}





/// A metadynamics bias on top of an origin potential.
///
/// It is a potential (origin energy plus all deposited Gaussian hills) and, through
/// `as_condition_mut`, a condition that deposits a new hill at the live position every
/// `deposit_every` steps, progressively filling the visited wells.
///
/// # Fields
/// ```text
/// origin: the unbiased potential
/// height: the height of every hill
/// width: the standard deviation of every hill
/// deposit_every: a hill is deposited at steps that are multiples of it
/// hills: the centres of the deposited hills
/// ```
pub struct MetadynamicsBias<P: Potential>
{
    pub origin: P,
    pub height: f64,
    pub width: f64,
    pub deposit_every: usize,
    hills: Vec<Array1<f64>>,
    coupling: Option<Coupling>,
}



impl<P: Potential> MetadynamicsBias<P>
{
    pub fn new(origin: P, height: f64, width: f64, deposit_every: usize) -> Self
    {
        MetadynamicsBias
        {
            origin,
            height,
            width,
            deposit_every: deposit_every.max(1),
            hills: Vec::new(),
            coupling: None,
        }
    }

    pub fn hills(&self) -> &[Array1<f64>]
    {
        &self.hills
    }

    pub fn add_hill(&mut self, centre: Array1<f64>)
    {
        self.hills.push(centre);
    }

    // Energy of one hill and its displacement from the hill centre
    fn hill(&self, centre: &Array1<f64>, position: &Array1<f64>) -> (f64, Array1<f64>)
    {
        let dx: Array1<f64> = position - centre;
        let energy: f64 = self.height * (-dx.dot(&dx) / (2.0 * self.width * self.width)).exp();
        (energy, dx)
    }

    /// The energy of the deposited hills alone
    pub fn bias_energy(&self, position: &Array1<f64>) -> f64
    {
        self.hills.iter().map(|centre| self.hill(centre, position).0).sum()
    }

    /// The force of the deposited hills alone
    pub fn bias_force(&self, position: &Array1<f64>) -> Array1<f64>
    {
        let mut force: Array1<f64> = Array1::zeros(position.len());
        for centre in self.hills.iter()
        {
            let (energy, dx) = self.hill(centre, position);
            force += &(dx * (energy / (self.width * self.width)));
        }
        force
    }
}



impl<P: Potential> Potential for MetadynamicsBias<P>
{
    fn n_dimensions(&self) -> usize
    {
        self.origin.n_dimensions()
    }

    fn n_states(&self) -> Option<usize>
    {
        self.origin.n_states()
    }

    fn get_energy(&self, position: &Array1<f64>) -> f64
    {
        self.origin.get_energy(position) + self.bias_energy(position)
    }

    fn get_force(&self, position: &Array1<f64>) -> Result<Array1<f64>>
    {
        Ok(self.origin.get_force(position)? + self.bias_force(position))
    }

    fn as_condition_mut(&mut self) -> Option<&mut dyn Condition>
    {
        Some(self)
    }
}



impl<P: Potential> Condition for MetadynamicsBias<P>
{
    fn name(&self) -> &str
    {
        "metadynamics"
    }

    fn n_dimensions(&self) -> Option<usize>
    {
        Some(self.origin.n_dimensions())
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
        if live.step % self.deposit_every == 0
        {
            trace!(step = live.step, centre = ?live.position, "Depositing metadynamics hill.");
            self.hills.push(live.position.clone());
        }

        Ok(())
    }
}
