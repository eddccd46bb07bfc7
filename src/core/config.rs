//! Tunable combat and balance configuration.
//!
//! Every value the engine reads at runtime lives here and is passed into the
//! battle and the solver as an immutable value. `Default` supplies the shipped
//! tuning from [`super::constants`]; a JSON file only needs to name the fields
//! it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::constants::*;
use crate::balance::solver::{BalanceBands, ReferenceStats, SolverConfig};
use crate::balance::targets::TargetCurve;
use crate::error::ConfigError;

/// Proc tuning: chances, damage multiplier, and the timed effects a proc can grant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcConfig {
    pub base_chance: f64,
    pub enhanced_chance: f64,
    pub damage_multiplier: f64,
    /// Stun applied by storm procs. `None` disables stuns entirely.
    pub stun: Option<StunConfig>,
    pub shield_armor: f64,
    pub shield_seconds: f64,
    pub heal_amount: f64,
    pub haste_multiplier: f64,
    pub haste_seconds: f64,
    /// Multiplier on proc durations for combatants with enhanced duration.
    pub enhanced_duration_factor: f64,
}

impl Default for ProcConfig {
    fn default() -> Self {
        Self {
            base_chance: PROC_BASE_CHANCE,
            enhanced_chance: PROC_ENHANCED_CHANCE,
            damage_multiplier: PROC_DAMAGE_MULTIPLIER,
            stun: Some(StunConfig::default()),
            shield_armor: PROC_SHIELD_ARMOR,
            shield_seconds: PROC_SHIELD_SECONDS,
            heal_amount: PROC_HEAL_AMOUNT,
            haste_multiplier: PROC_HASTE_MULTIPLIER,
            haste_seconds: PROC_HASTE_SECONDS,
            enhanced_duration_factor: ENHANCED_DURATION_FACTOR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StunConfig {
    pub seconds: f64,
}

impl Default for StunConfig {
    fn default() -> Self {
        Self {
            seconds: PROC_STUN_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectConfig {
    /// Every Nth hit received triggers a reflect.
    pub hit_interval: u32,
    /// Fraction of the attacker's max hp dealt back to it.
    pub max_hp_fraction: f64,
}

impl Default for ReflectConfig {
    fn default() -> Self {
        Self {
            hit_interval: REFLECT_HIT_INTERVAL,
            max_hp_fraction: REFLECT_MAX_HP_FRACTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BleedConfig {
    pub chance: f64,
    /// Bleed magnitude as a fraction of the hit that applied it.
    pub damage_fraction: f64,
    /// The magnitude is dealt evenly over this many seconds.
    pub window_seconds: f64,
    pub duration_seconds: f64,
}

impl Default for BleedConfig {
    fn default() -> Self {
        Self {
            chance: BLEED_CHANCE,
            damage_fraction: BLEED_DAMAGE_FRACTION,
            window_seconds: BLEED_WINDOW_SECONDS,
            duration_seconds: BLEED_DURATION_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoisonConfig {
    pub chance: f64,
    /// Fraction of the victim's max hp dealt per second, per instance.
    pub max_hp_rate: f64,
    pub duration_seconds: f64,
}

impl Default for PoisonConfig {
    fn default() -> Self {
        Self {
            chance: POISON_CHANCE,
            max_hp_rate: POISON_MAX_HP_RATE,
            duration_seconds: POISON_DURATION_SECONDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboConfig {
    pub window_seconds: f64,
    pub crit_milestone: u32,
    pub haste_milestone: u32,
    pub bonus_milestone: u32,
    pub haste_multiplier: f64,
    pub haste_seconds: f64,
    /// Bonus damage granted at the final milestone, as a multiple of attack.
    pub bonus_attack_factor: f64,
}

impl Default for ComboConfig {
    fn default() -> Self {
        Self {
            window_seconds: COMBO_WINDOW_SECONDS,
            crit_milestone: COMBO_CRIT_MILESTONE,
            haste_milestone: COMBO_HASTE_MILESTONE,
            bonus_milestone: COMBO_BONUS_MILESTONE,
            haste_multiplier: COMBO_HASTE_MULTIPLIER,
            haste_seconds: COMBO_HASTE_SECONDS,
            bonus_attack_factor: COMBO_BONUS_ATTACK_FACTOR,
        }
    }
}

/// Everything the battle loop and damage resolver read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    pub crit_multiplier: f64,
    pub proc: ProcConfig,
    pub reflect: ReflectConfig,
    pub bleed: BleedConfig,
    pub poison: PoisonConfig,
    pub combo: ComboConfig,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            crit_multiplier: BASE_CRIT_MULTIPLIER,
            proc: ProcConfig::default(),
            reflect: ReflectConfig::default(),
            bleed: BleedConfig::default(),
            poison: PoisonConfig::default(),
            combo: ComboConfig::default(),
        }
    }
}

/// Boss generation tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub power_multiplier: f64,
    /// Added to the hp multiplier, scaled by the archetype's hp weight.
    pub hp_bias: f64,
    /// Every Nth level is a boss level. Zero disables bosses.
    pub level_interval: u32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            power_multiplier: BOSS_POWER_MULTIPLIER,
            hp_bias: BOSS_HP_BIAS,
            level_interval: BOSS_LEVEL_INTERVAL,
        }
    }
}

/// Everything the stat solver and enemy generator read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    pub solver: SolverConfig,
    pub reference: ReferenceStats,
    pub boss: BossConfig,
    pub curve: TargetCurve,
    pub difficulty: f64,
    pub bands: BalanceBands,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            reference: ReferenceStats::default(),
            boss: BossConfig::default(),
            curve: TargetCurve::default(),
            difficulty: 1.0,
            bands: BalanceBands::default(),
        }
    }
}

/// Top-level tuning file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub combat: CombatConfig,
    pub balance: BalanceConfig,
}

impl GameConfig {
    /// Load configuration from a JSON file and validate it.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse configuration from a JSON string and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.combat.validate()?;
        self.balance.validate()
    }
}

pub(crate) fn check_probability(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{value} is not a probability in [0, 1]"),
        ))
    }
}

pub(crate) fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be positive")))
    }
}

pub(crate) fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{value} must be non-negative"),
        ))
    }
}

impl CombatConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("combat.crit_multiplier", self.crit_multiplier)?;

        let proc = &self.proc;
        check_probability("combat.proc.base_chance", proc.base_chance)?;
        check_probability("combat.proc.enhanced_chance", proc.enhanced_chance)?;
        check_positive("combat.proc.damage_multiplier", proc.damage_multiplier)?;
        if let Some(stun) = proc.stun {
            check_positive("combat.proc.stun.seconds", stun.seconds)?;
        }
        check_non_negative("combat.proc.shield_armor", proc.shield_armor)?;
        check_positive("combat.proc.shield_seconds", proc.shield_seconds)?;
        check_non_negative("combat.proc.heal_amount", proc.heal_amount)?;
        check_positive("combat.proc.haste_multiplier", proc.haste_multiplier)?;
        check_positive("combat.proc.haste_seconds", proc.haste_seconds)?;
        check_positive(
            "combat.proc.enhanced_duration_factor",
            proc.enhanced_duration_factor,
        )?;

        if self.reflect.hit_interval == 0 {
            return Err(ConfigError::invalid(
                "combat.reflect.hit_interval",
                "must be at least 1",
            ));
        }
        check_non_negative("combat.reflect.max_hp_fraction", self.reflect.max_hp_fraction)?;

        check_probability("combat.bleed.chance", self.bleed.chance)?;
        check_non_negative("combat.bleed.damage_fraction", self.bleed.damage_fraction)?;
        check_positive("combat.bleed.window_seconds", self.bleed.window_seconds)?;
        check_positive("combat.bleed.duration_seconds", self.bleed.duration_seconds)?;

        check_probability("combat.poison.chance", self.poison.chance)?;
        check_non_negative("combat.poison.max_hp_rate", self.poison.max_hp_rate)?;
        check_positive("combat.poison.duration_seconds", self.poison.duration_seconds)?;

        let combo = &self.combo;
        check_positive("combat.combo.window_seconds", combo.window_seconds)?;
        if combo.crit_milestone == 0 || combo.haste_milestone == 0 || combo.bonus_milestone == 0 {
            return Err(ConfigError::invalid(
                "combat.combo",
                "milestones must be at least 1",
            ));
        }
        check_positive("combat.combo.haste_multiplier", combo.haste_multiplier)?;
        check_positive("combat.combo.haste_seconds", combo.haste_seconds)?;
        check_non_negative("combat.combo.bonus_attack_factor", combo.bonus_attack_factor)
    }
}

impl BalanceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let solver = &self.solver;
        check_positive("balance.solver.min_scale", solver.min_scale)?;
        if solver.max_scale <= solver.min_scale {
            return Err(ConfigError::invalid(
                "balance.solver.max_scale",
                format!(
                    "{} must exceed min_scale {}",
                    solver.max_scale, solver.min_scale
                ),
            ));
        }
        if solver.max_iterations == 0 {
            return Err(ConfigError::invalid(
                "balance.solver.max_iterations",
                "must be at least 1",
            ));
        }
        check_positive("balance.solver.precision", solver.precision)?;
        check_non_negative("balance.solver.armor_rate", solver.armor_rate)?;
        check_positive("balance.solver.min_hp", solver.min_hp)?;
        check_non_negative("balance.solver.min_attack", solver.min_attack)?;
        check_non_negative("balance.solver.min_armor", solver.min_armor)?;

        check_positive("balance.reference.hp", self.reference.hp)?;
        check_positive("balance.reference.attack_speed", self.reference.attack_speed)?;
        check_non_negative("balance.reference.armor", self.reference.armor)?;

        check_positive("balance.boss.power_multiplier", self.boss.power_multiplier)?;
        check_non_negative("balance.boss.hp_bias", self.boss.hp_bias)?;

        self.curve.validate()?;
        check_positive("balance.difficulty", self.difficulty)?;
        self.bands.validate()
    }
}
