//! PES explorer
//!
//! A simulation orchestrator for sampling low-dimensional potential energy surfaces (PES) with a single particle.
//! The `System` owns the live quantities and the trajectory, and drives three collaborators without knowing
//! their algorithms: a `Potential` giving energies and forces, a `Sampler` stepping the particle
//! (Newtonian, Langevin, or Monte Carlo), and a list of `Condition`s (thermostats, boundaries, biases)
//! applied after every step. A bias potential such as metadynamics takes both roles at once.

pub mod common;
pub mod io;
pub mod matrix;
pub mod pes_exploration;

pub use crate::common::error::{Result, SimulationError};
pub use crate::io::input::{Para, SimulatePara, SystemPara};
pub use crate::pes_exploration::state::{LiveState, State};
pub use crate::pes_exploration::system::{ConditionSlot, System};
pub use crate::pes_exploration::traits::{Condition, Coupling, Potential, Propagation, Sampler, SamplerKind};
