//! Skirmish - combat simulation and balancing engine for a roguelite auto-battler.
//!
//! - [`combat`]: combatants, status effects, attack resolution, and the
//!   tick-driven [`Battle`](combat::Battle) state machine.
//! - [`balance`]: per-level power targets and the enemy stat solver.
//! - [`simulator`]: seeded headless campaigns for balance analysis.
//! - [`core`]: tick constants, combat math, and tuning configuration.

pub mod balance;
pub mod combat;
pub mod core;
pub mod error;
pub mod simulator;

pub use error::{CombatError, ConfigError, InvalidStat};
