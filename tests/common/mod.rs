#![allow(dead_code)]

use ndarray::Array1;
use pes_explorer::{Potential, Result, SystemPara};

/// E = 0 and F = 0 everywhere
pub struct Flat
{
    pub n_dimensions: usize,
}

impl Potential for Flat
{
    fn n_dimensions(&self) -> usize
    {
        self.n_dimensions
    }

    fn get_energy(&self, _position: &Array1<f64>) -> f64
    {
        0.0
    }

    fn get_force(&self, position: &Array1<f64>) -> Result<Array1<f64>>
    {
        Ok(Array1::zeros(position.len()))
    }
}

/// A potential with an energy but without a force
pub struct EnergyOnly;

impl Potential for EnergyOnly
{
    fn n_dimensions(&self) -> usize
    {
        1
    }

    fn get_energy(&self, position: &Array1<f64>) -> f64
    {
        position[0].abs()
    }
}

/// A state-dependent potential on n_dimensions with n_states states
pub struct MultiState
{
    pub n_dimensions: usize,
    pub n_states: usize,
}

impl Potential for MultiState
{
    fn n_dimensions(&self) -> usize
    {
        self.n_dimensions
    }

    fn n_states(&self) -> Option<usize>
    {
        Some(self.n_states)
    }

    fn get_energy(&self, position: &Array1<f64>) -> f64
    {
        position.dot(position)
    }
}

pub fn quiet_para(start_position: Option<Vec<f64>>, seed: u64) -> SystemPara
{
    SystemPara
    {
        start_position,
        verbose: false,
        seed: Some(seed),
        ..Default::default()
    }
}
