//! Shared combat math functions for the battle engine and the stat solver.
//!
//! These pure functions calculate mitigation and combat power without side
//! effects. Both the live battle and the balancing solver use them so that
//! a solved enemy is measured with exactly the formulas it will fight with.

use super::constants::ARMOR_SCALING;

/// Fraction of incoming damage removed by armor: `armor / (armor + 100)`.
///
/// Negative armor is treated as zero, so the result is always in `[0, 1)`.
pub fn damage_reduction(armor: f64) -> f64 {
    let armor = armor.max(0.0);
    armor / (armor + ARMOR_SCALING)
}

/// Hit points an attacker must chew through once armor is accounted for.
///
/// # Arguments
/// * `hp` - Raw hit points
/// * `armor` - Armor stat (negative values count as zero)
///
/// # Returns
/// `hp / (1 - damage_reduction(armor))`, never less than `hp`
pub fn effective_hp(hp: f64, armor: f64) -> f64 {
    hp / (1.0 - damage_reduction(armor))
}

/// Damage that lands after armor and flat reduction.
///
/// Armor divides the hit (`damage / (1 + armor / 100)`), then flat reduction
/// is subtracted. The result is floored at zero.
pub fn mitigate(raw_damage: f64, armor: f64, flat_reduction: f64) -> f64 {
    let after_armor = raw_damage / (1.0 + armor.max(0.0) / ARMOR_SCALING);
    (after_armor - flat_reduction.max(0.0)).max(0.0)
}

/// Raw damage per second: attack x attacks per second.
pub fn raw_dps(attack: f64, attack_speed: f64) -> f64 {
    attack * attack_speed
}

/// Raw balancing scalar: DPS x effective HP.
pub fn combat_power(attack: f64, attack_speed: f64, hp: f64, armor: f64) -> f64 {
    raw_dps(attack, attack_speed) * effective_hp(hp, armor)
}

/// Apply damage to HP, returning remaining HP (minimum 0).
pub fn apply_damage(current_hp: f64, damage: f64) -> f64 {
    (current_hp - damage.max(0.0)).max(0.0)
}

/// Apply healing to HP, returning the new HP (capped at `max_hp`).
pub fn apply_heal(current_hp: f64, amount: f64, max_hp: f64) -> f64 {
    (current_hp + amount.max(0.0)).min(max_hp)
}

/// Check if a combatant is still standing.
pub fn is_alive(current_hp: f64) -> bool {
    current_hp > 0.0
}
