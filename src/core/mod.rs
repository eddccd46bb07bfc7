//! Shared constants, combat math, and tuning configuration.

pub mod combat_math;
pub mod config;
pub mod constants;

pub use combat_math::*;
pub use config::*;
pub use constants::*;
