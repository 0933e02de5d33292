//! Reading parameters and writing trajectories.

pub mod input;
pub mod output;
