//! Common constants and error types.

pub mod constants;
pub mod error;
