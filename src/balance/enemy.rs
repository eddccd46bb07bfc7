//! Enemy archetypes and per-level enemy generation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::solver::{BalanceRating, BalanceTarget, SolvedStats, StatSolver};
use super::targets::balance_target;
use crate::combat::types::{Combatant, TraitFlags};
use crate::core::config::BalanceConfig;

/// Static shape of an enemy family. The solver fills in the numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    pub name: String,
    pub hp_multiplier: f64,
    pub speed_multiplier: f64,
    /// How much of the boss hp bias this archetype takes.
    pub hp_weight: f64,
    pub crit_chance: f64,
    pub traits: TraitFlags,
}

impl EnemyArchetype {
    pub fn new(name: impl Into<String>, hp_multiplier: f64, speed_multiplier: f64) -> Self {
        Self {
            name: name.into(),
            hp_multiplier,
            speed_multiplier,
            hp_weight: 1.0,
            crit_chance: 0.0,
            traits: TraitFlags::empty(),
        }
    }
}

/// The shipped rotation.
pub fn default_archetypes() -> Vec<EnemyArchetype> {
    vec![
        EnemyArchetype::new("Grunt", 1.0, 1.0),
        EnemyArchetype {
            hp_weight: 0.5,
            crit_chance: 0.15,
            ..EnemyArchetype::new("Skirmisher", 0.8, 1.4)
        },
        EnemyArchetype {
            hp_weight: 1.5,
            ..EnemyArchetype::new("Brute", 1.4, 0.7)
        },
        EnemyArchetype {
            traits: TraitFlags::ARMOR_PIERCING,
            ..EnemyArchetype::new("Wraith", 0.9, 1.0)
        },
        EnemyArchetype {
            hp_weight: 0.75,
            traits: TraitFlags::POISON,
            ..EnemyArchetype::new("Viper", 0.9, 1.2)
        },
    ]
}

/// Archetype fought at `level`, cycling through the list.
pub fn archetype_for_level(level: u32, archetypes: &[EnemyArchetype]) -> Option<&EnemyArchetype> {
    if archetypes.is_empty() {
        return None;
    }
    let index = level.saturating_sub(1) as usize % archetypes.len();
    archetypes.get(index)
}

/// Cosmetic boss tag for the presentation layer. Has no effect on the solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossAbility {
    Enrage,
    Regenerate,
    Thorns,
    Frenzy,
}

impl BossAbility {
    pub const ALL: [BossAbility; 4] = [
        BossAbility::Enrage,
        BossAbility::Regenerate,
        BossAbility::Thorns,
        BossAbility::Frenzy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BossAbility::Enrage => "Enraged",
            BossAbility::Regenerate => "Regenerating",
            BossAbility::Thorns => "Thorned",
            BossAbility::Frenzy => "Frenzied",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EncounterKind {
    Normal,
    Boss(BossAbility),
}

/// A freshly built enemy plus the numbers behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedEnemy {
    pub combatant: Combatant,
    pub kind: EncounterKind,
    pub target: BalanceTarget,
    pub solved: SolvedStats,
    pub rating: BalanceRating,
}

impl GeneratedEnemy {
    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EncounterKind::Boss(_))
    }
}

pub fn is_boss_level(level: u32, config: &BalanceConfig) -> bool {
    let interval = config.boss.level_interval;
    interval > 0 && level > 0 && level % interval == 0
}

/// Solve and build the enemy for `level`.
///
/// An enemy whose solve misses the acceptable band is still returned; the
/// miss is logged and reported through `rating`.
pub fn generate_enemy(
    level: u32,
    archetype: &EnemyArchetype,
    config: &BalanceConfig,
) -> GeneratedEnemy {
    let solver = StatSolver::new(config);
    let target = balance_target(level, archetype, config);

    let (kind, solved, name) = if is_boss_level(level, config) {
        let index = (level / config.boss.level_interval).saturating_sub(1) as usize;
        let ability = BossAbility::ALL[index % BossAbility::ALL.len()];
        let solved = solver.solve_boss(&target, archetype.hp_weight);
        let name = format!("{} {} Boss", ability.label(), archetype.name);
        (EncounterKind::Boss(ability), solved, name)
    } else {
        let solved = solver.solve_target(&target);
        (EncounterKind::Normal, solved, archetype.name.clone())
    };

    let rating = solved.rating(&config.bands);
    if rating.is_acceptable() {
        debug!(level, enemy = %name, ?rating, error = solved.relative_error, "enemy solved");
    } else {
        warn!(
            level,
            enemy = %name,
            ?rating,
            target = solved.target_power,
            achieved = solved.achieved_power,
            "solved enemy is outside the acceptable balance band"
        );
    }

    let combatant = Combatant::new(
        name,
        solved.hp,
        solved.attack,
        solved.attack_speed,
        solved.armor,
    )
    .with_crit_chance(archetype.crit_chance)
    .with_traits(archetype.traits);

    GeneratedEnemy {
        combatant,
        kind,
        target,
        solved,
        rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archetypes_rotate_by_level() {
        let archetypes = default_archetypes();
        assert_eq!(archetype_for_level(1, &archetypes).unwrap().name, "Grunt");
        assert_eq!(archetype_for_level(2, &archetypes).unwrap().name, "Skirmisher");
        assert_eq!(archetype_for_level(6, &archetypes).unwrap().name, "Grunt");
        assert!(archetype_for_level(1, &[]).is_none());
    }

    #[test]
    fn test_level_one_grunt_matches_solver() {
        let config = BalanceConfig::default();
        let grunt = EnemyArchetype::new("Grunt", 1.0, 1.0);
        let enemy = generate_enemy(1, &grunt, &config);

        assert_eq!(enemy.kind, EncounterKind::Normal);
        assert_eq!(enemy.combatant.max_hp(), 134.0);
        assert_eq!(enemy.combatant.attack, 8.0);
        assert_eq!(enemy.combatant.armor, 13.0);
        assert_eq!(enemy.combatant.attack_speed(), 1.0);
        assert_eq!(enemy.rating, BalanceRating::Perfect);
        assert!(enemy.combatant.validate().is_ok());
    }

    #[test]
    fn test_every_fifth_level_is_a_boss() {
        let config = BalanceConfig::default();
        let grunt = EnemyArchetype::new("Grunt", 1.0, 1.0);

        let normal = generate_enemy(4, &grunt, &config);
        let boss = generate_enemy(5, &grunt, &config);
        let second_boss = generate_enemy(10, &grunt, &config);

        assert!(!normal.is_boss());
        assert_eq!(boss.kind, EncounterKind::Boss(BossAbility::Enrage));
        assert_eq!(second_boss.kind, EncounterKind::Boss(BossAbility::Regenerate));
        assert!(boss.combatant.name.contains("Boss"));
        assert_eq!(
            boss.solved.target_power,
            boss.target.effective_power() * config.boss.power_multiplier
        );
    }

    #[test]
    fn test_zero_interval_disables_bosses() {
        let mut config = BalanceConfig::default();
        config.boss.level_interval = 0;
        assert!(!is_boss_level(5, &config));
        assert!(!is_boss_level(0, &BalanceConfig::default()));
    }

    #[test]
    fn test_archetype_traits_carry_over() {
        let config = BalanceConfig::default();
        let archetypes = default_archetypes();
        let wraith = archetype_for_level(4, &archetypes).unwrap();
        let enemy = generate_enemy(4, wraith, &config);
        assert!(enemy.combatant.traits.contains(TraitFlags::ARMOR_PIERCING));
    }
}
