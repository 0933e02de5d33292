//! About the errors raised when the system is constructed, initialised, propagated, or exported.

use std::path::PathBuf;
use thiserror::Error;





#[derive(Debug, Error)]
pub enum SimulationError
{
    /// Invalid construction or simulation parameters (e.g. a potential declaring zero dimensions)
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// An array whose length disagrees with the dimensionality of the system
    #[error("Shape mismatch for '{variable}': expected {expected} component(s), found {found}")]
    ShapeMismatch
    {
        variable: &'static str,
        expected: usize,
        found: usize,
    },

    /// A condition that cannot be coupled to the system
    #[error("Condition '{name}' cannot be coupled: {reason}")]
    ConditionType
    {
        name: String,
        reason: String,
    },

    #[error("The potential does not define a force")]
    ForceUnavailable,

    #[error("Sampler step failed: {0}")]
    Sampler(String),

    #[error("Could not find output folder '{}'", .0.display())]
    OutputDirectory(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}



pub type Result<T> = std::result::Result<T, SimulationError>;





/// Check that an array has the expected number of components
///
/// # Parameters
/// ```text
/// variable: name of the checked quantity, reported in the error
/// expected: the required number of components
/// found: the actual number of components
/// ```
pub fn check_len(variable: &'static str, expected: usize, found: usize) -> Result<()>
{
    if expected == found
    {
        Ok(())
    }
    else
    {
        Err(SimulationError::ShapeMismatch { variable, expected, found })
    }
}
