//! Enemy stat solver.
//!
//! Given a target combat power (DPS x effective HP), [`StatSolver`] searches a
//! single scale factor by bisection. Hp and armor grow with the scale (armor
//! at a slower rate), attack speed comes straight from the archetype, and
//! attack is whatever DPS is left to hit the target. Rounding every stat to a
//! whole number means achieved power wobbles around the target instead of
//! rising monotonically with the scale, so the solver remembers the best
//! scale it has seen rather than trusting the last midpoint.
//!
//! The solver never fails. It always returns its best approximation along
//! with the relative error; callers rate that error with [`BalanceRating`].

use serde::{Deserialize, Serialize};

use crate::core::combat_math::{combat_power, effective_hp};
use crate::core::config::{check_positive, BalanceConfig};
use crate::core::constants::*;
use crate::error::ConfigError;

/// Bisection parameters and per-attribute floors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    pub max_iterations: u32,
    /// Stop once the error is below this fraction of the target.
    pub precision: f64,
    /// Armor grows at this fraction of the hp scale.
    pub armor_rate: f64,
    pub min_hp: f64,
    pub min_attack: f64,
    pub min_armor: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_scale: SOLVER_MIN_SCALE,
            max_scale: SOLVER_MAX_SCALE,
            max_iterations: SOLVER_MAX_ITERATIONS,
            precision: SOLVER_PRECISION,
            armor_rate: SOLVER_ARMOR_RATE,
            min_hp: MIN_ENEMY_HP,
            min_attack: MIN_ENEMY_ATTACK,
            min_armor: MIN_ENEMY_ARMOR,
        }
    }
}

/// Reference enemy at scale 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceStats {
    pub hp: f64,
    pub attack_speed: f64,
    pub armor: f64,
}

impl Default for ReferenceStats {
    fn default() -> Self {
        let (hp, attack_speed, armor) = REFERENCE_ENEMY_STATS;
        Self {
            hp,
            attack_speed,
            armor,
        }
    }
}

/// Relative-error bands used to rate a solved enemy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceBands {
    pub perfect: f64,
    pub good: f64,
    pub acceptable: f64,
}

impl Default for BalanceBands {
    fn default() -> Self {
        Self {
            perfect: BALANCE_PERFECT_BAND,
            good: BALANCE_GOOD_BAND,
            acceptable: BALANCE_ACCEPTABLE_BAND,
        }
    }
}

impl BalanceBands {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("balance.bands.perfect", self.perfect)?;
        if !(self.perfect <= self.good && self.good <= self.acceptable) {
            return Err(ConfigError::invalid(
                "balance.bands",
                "bands must satisfy perfect <= good <= acceptable",
            ));
        }
        Ok(())
    }
}

/// How close a solved enemy landed to its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceRating {
    Perfect,
    Good,
    Acceptable,
    /// Achieved power is above the acceptable band.
    TooStrong,
    /// Achieved power is below the acceptable band.
    TooWeak,
}

impl BalanceRating {
    /// Rate a signed relative error (`(achieved - target) / target`).
    pub fn from_error(signed_error: f64, bands: &BalanceBands) -> Self {
        let magnitude = signed_error.abs();
        if magnitude <= bands.perfect {
            BalanceRating::Perfect
        } else if magnitude <= bands.good {
            BalanceRating::Good
        } else if magnitude <= bands.acceptable {
            BalanceRating::Acceptable
        } else if signed_error > 0.0 {
            BalanceRating::TooStrong
        } else {
            BalanceRating::TooWeak
        }
    }

    pub fn is_acceptable(self) -> bool {
        !matches!(self, BalanceRating::TooStrong | BalanceRating::TooWeak)
    }
}

/// Per-level solver input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceTarget {
    pub level: u32,
    /// Curve value before the difficulty scalar.
    pub raw_target_power: f64,
    pub hp_multiplier: f64,
    pub speed_multiplier: f64,
    pub difficulty: f64,
}

impl BalanceTarget {
    /// Power the solver actually aims for.
    pub fn effective_power(&self) -> f64 {
        self.raw_target_power * self.difficulty
    }
}

/// Solver output: whole-number stats plus how well they hit the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolvedStats {
    pub hp: f64,
    pub attack: f64,
    pub attack_speed: f64,
    pub armor: f64,
    pub target_power: f64,
    pub achieved_power: f64,
    /// `|achieved - target| / target`
    pub relative_error: f64,
    pub scale: f64,
    pub iterations: u32,
}

impl SolvedStats {
    /// Relative error keeping its sign (positive means stronger than asked for).
    pub fn signed_error(&self) -> f64 {
        (self.achieved_power - self.target_power) / self.target_power.max(f64::EPSILON)
    }

    pub fn rating(&self, bands: &BalanceBands) -> BalanceRating {
        BalanceRating::from_error(self.signed_error(), bands)
    }
}

/// Stats evaluated at one scale, before the attribute floors.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    hp: f64,
    armor: f64,
    attack: f64,
    attack_speed: f64,
    power: f64,
}

pub struct StatSolver<'a> {
    config: &'a BalanceConfig,
}

impl<'a> StatSolver<'a> {
    pub fn new(config: &'a BalanceConfig) -> Self {
        Self { config }
    }

    /// Solve for a level target (difficulty applied).
    pub fn solve_target(&self, target: &BalanceTarget) -> SolvedStats {
        self.solve(
            target.effective_power(),
            target.hp_multiplier,
            target.speed_multiplier,
        )
    }

    /// Solve a boss: more power overall, with the extra weighted toward hp.
    pub fn solve_boss(&self, target: &BalanceTarget, hp_weight: f64) -> SolvedStats {
        let boss = &self.config.boss;
        self.solve(
            target.effective_power() * boss.power_multiplier,
            target.hp_multiplier + boss.hp_bias * hp_weight,
            target.speed_multiplier,
        )
    }

    /// Bisect the scale factor until achieved power is within precision of
    /// `target_power` or the iteration cap is hit.
    pub fn solve(
        &self,
        target_power: f64,
        hp_multiplier: f64,
        speed_multiplier: f64,
    ) -> SolvedStats {
        let solver = &self.config.solver;
        let tolerance = target_power * solver.precision;

        let mut low = solver.min_scale;
        let mut high = solver.max_scale;
        let mut best_scale = (low + high) / 2.0;
        let mut best_error = f64::INFINITY;
        let mut iterations = 0;

        while iterations < solver.max_iterations {
            iterations += 1;
            let scale = (low + high) / 2.0;
            let candidate = self.evaluate(scale, target_power, hp_multiplier, speed_multiplier);
            let error = (candidate.power - target_power).abs();

            if error < best_error {
                best_error = error;
                best_scale = scale;
            }
            if error < tolerance {
                break;
            }
            if candidate.power < target_power {
                low = scale;
            } else {
                high = scale;
            }
        }

        let best = self.evaluate(best_scale, target_power, hp_multiplier, speed_multiplier);
        let hp = best.hp.max(solver.min_hp);
        let attack = best.attack.max(solver.min_attack);
        let armor = best.armor.max(solver.min_armor);
        let achieved_power = combat_power(attack, best.attack_speed, hp, armor);

        SolvedStats {
            hp,
            attack,
            attack_speed: best.attack_speed,
            armor,
            target_power,
            achieved_power,
            relative_error: (achieved_power - target_power).abs() / target_power.max(f64::EPSILON),
            scale: best_scale,
            iterations,
        }
    }

    fn evaluate(
        &self,
        scale: f64,
        target_power: f64,
        hp_multiplier: f64,
        speed_multiplier: f64,
    ) -> Candidate {
        let reference = &self.config.reference;
        let hp = (reference.hp * hp_multiplier * scale).round().max(1.0);
        let armor = (reference.armor * scale * self.config.solver.armor_rate).round();
        let attack_speed = reference.attack_speed * speed_multiplier;

        let ehp = effective_hp(hp, armor);
        let required_dps = target_power / ehp;
        let attack = (required_dps / attack_speed).round();

        Candidate {
            hp,
            armor,
            attack,
            attack_speed,
            power: attack * attack_speed * ehp,
        }
    }
}
