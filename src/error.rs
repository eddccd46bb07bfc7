//! Error types for battle setup and configuration loading.
//!
//! The solver never fails (it reports its residual error instead), so the
//! errors here cover the two places where bad input can enter the engine:
//! combatant records handed to a battle, and tuning files read from disk.

use thiserror::Error;

use crate::combat::types::Side;

/// A single combatant field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum InvalidStat {
    #[error("max hp must be positive and finite (got {0})")]
    MaxHp(f64),

    #[error("hp {hp} is outside 0..={max_hp}")]
    Hp { hp: f64, max_hp: f64 },

    #[error("attack speed must be positive and finite (got {0})")]
    AttackSpeed(f64),

    #[error("attack must be non-negative and finite (got {0})")]
    Attack(f64),

    #[error("armor must be non-negative and finite (got {0})")]
    Armor(f64),

    #[error("flat reduction must be non-negative and finite (got {0})")]
    FlatReduction(f64),

    #[error("crit chance must be within [0, 1] (got {0})")]
    CritChance(f64),

    #[error("lifesteal must be non-negative and finite (got {0})")]
    Lifesteal(f64),
}

/// Errors raised by the battle orchestrator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CombatError {
    /// A combatant record is structurally invalid; the battle must not start.
    #[error("{side} combatant is invalid: {reason}")]
    InvalidCombatant { side: Side, reason: InvalidStat },

    /// The requested operation is not allowed in the battle's current state.
    #[error("cannot {action} a battle that is {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    /// A headless run hit its tick cap before either side fell.
    #[error("battle did not finish within {ticks} ticks")]
    TickLimitExceeded { ticks: u64 },
}

/// Errors raised while loading or validating tuning configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
