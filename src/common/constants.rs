//! Contains physical constants and the default simulation settings.





// Physical

/// Molar gas constant in kJ/(mol*K), the energy unit shared by potentials and samplers
pub const GAS_CONSTANT: f64 = 8.314462618E-3;










// Defaults of the orchestrator

pub const DEFAULT_TEMPERATURE: f64 = 298.0;
pub const DEFAULT_MASS: f64 = 1.0;
pub const DEFAULT_SAVE_EVERY_STATE: usize = 1;

/// Randomly placed particles are drawn uniformly from [RANDOM_POSITION_LOW, RANDOM_POSITION_HIGH) per dimension
pub const RANDOM_POSITION_LOW: f64 = -10.0;
pub const RANDOM_POSITION_HIGH: f64 = 10.0;

/// The orchestrator handles exactly one logical particle
pub const N_PARTICLES: usize = 1;

/// Step size handed to conditions when the sampler declares none
pub const DEFAULT_CONDITION_DT: f64 = 1.0;
