//! Events produced by a battle tick.
//!
//! The presentation layer maps these to combat log lines and visual effects;
//! the engine itself never looks at them again.

use serde::{Deserialize, Serialize};

use super::effects::{ComboMilestone, EffectApplication, EffectKind};
use super::types::Side;

/// Where a heal came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealSource {
    Lifesteal,
    Proc,
}

/// Final result of a battle, from the player's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleOutcome {
    Won,
    Lost,
}

impl BattleOutcome {
    pub fn winner(self) -> Side {
        match self {
            BattleOutcome::Won => Side::Player,
            BattleOutcome::Lost => Side::Enemy,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// An attack landed (possibly for zero after mitigation).
    Attack {
        attacker: Side,
        damage: f64,
        was_crit: bool,
        procced: bool,
        armor_ignored: bool,
    },

    /// A combatant's counter matured but it was already down, so it didn't swing.
    AttackSkipped { attacker: Side },

    Healed {
        side: Side,
        amount: f64,
        source: HealSource,
    },

    /// The defender returned a share of the attacker's max hp.
    Reflected { by: Side, damage: f64 },

    Stunned { side: Side, seconds: f64 },

    EffectApplied {
        target: Side,
        kind: EffectKind,
        application: EffectApplication,
    },

    ComboMilestone {
        side: Side,
        milestone: ComboMilestone,
    },

    PeriodicDamage {
        side: Side,
        kind: EffectKind,
        amount: f64,
    },

    SympathyLinkLocked { side: Side, max_hp: f64 },

    BattleEnded { outcome: BattleOutcome },
}
