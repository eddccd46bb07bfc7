//! Combat system: combatants, status effects, attack resolution, and the battle loop.

pub mod effects;
pub mod engine;
pub mod events;
pub mod resolver;
pub mod stats;
pub mod types;

pub use effects::{
    ComboMilestone, ComboState, EffectApplication, EffectKind, PeriodicDamage, StatusEffect,
    StatusEffectLedger,
};
pub use engine::{
    Battle, BattleObserver, BattleState, BattleSummary, SpeedMultiplier, TickReport,
};
pub use events::{BattleOutcome, CombatEvent, HealSource};
pub use resolver::{AttackOutcome, DamageResolver};
pub use stats::{BattleStats, SideStats};
pub use types::*;
