//! A module about exploring a potential energy surface with a single particle.

pub mod traits;
pub mod state;
pub mod system;
pub mod potential;
pub mod md;
pub mod monte_carlo;
pub mod conditions;
