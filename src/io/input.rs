//! About the input parameters.
use crate::common::constants::{DEFAULT_MASS, DEFAULT_SAVE_EVERY_STATE, DEFAULT_TEMPERATURE};
use crate::common::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;





/// The structure containing the parameters for constructing a system
///
/// # Fields
/// ```text
/// temperature: the target temperature of the system (Unit: K)
/// mass: the mass of the particle
/// start_position: the starting position; None places the particle randomly
/// verbose: whether the system reports its construction
/// seed: seed of the random number generator; None seeds from entropy
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemPara
{
    pub temperature: f64,
    pub mass: f64,
    pub start_position: Option<Vec<f64>>,
    pub verbose: bool,
    pub seed: Option<u64>,
}



impl Default for SystemPara
{
    fn default() -> Self
    {
        SystemPara
        {
            temperature: DEFAULT_TEMPERATURE,
            mass: DEFAULT_MASS,
            start_position: None,
            verbose: true,
            seed: None,
        }
    }
}





/// The structure containing the parameters of a simulation run
///
/// # Fields
/// ```text
/// steps: the number of sampler steps
/// withdraw_traj: discard the trajectory (keeping the current state) before running
/// save_every_state: keep every n-th step in the trajectory; the last step is always kept
/// init_system: reseed position (and velocities, if the sampler uses them) before running
/// verbosity: show a progress bar
/// progress_prefix: label of the progress bar
/// ```
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulatePara
{
    pub steps: usize,
    pub withdraw_traj: bool,
    pub save_every_state: usize,
    pub init_system: bool,
    pub verbosity: bool,
    pub progress_prefix: String,
}



impl Default for SimulatePara
{
    fn default() -> Self
    {
        SimulatePara
        {
            steps: 100,
            withdraw_traj: false,
            save_every_state: DEFAULT_SAVE_EVERY_STATE,
            init_system: false,
            verbosity: true,
            progress_prefix: String::from("Simulation"),
        }
    }
}



impl SimulatePara
{
    pub fn with_steps(steps: usize) -> Self
    {
        SimulatePara
        {
            steps,
            ..Default::default()
        }
    }
}





#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Para
{
    // System parameters
    pub system: SystemPara,

    // Simulation parameters
    pub simulate: SimulatePara,
}



impl Para
{
    pub fn new() -> Self
    {
        Para::default()
    }

    /// Read the parameters from a TOML string, any missing field takes its default
    pub fn from_toml_str(content: &str) -> Result<Self>
    {
        Ok(toml::from_str(content)?)
    }

    /// Read the parameters from a TOML file
    pub fn from_toml_file<T: AsRef<Path>>(filename: T) -> Result<Self>
    {
        let content: String = fs::read_to_string(filename)?;
        Self::from_toml_str(&content)
    }
}
