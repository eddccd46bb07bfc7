//! Aggregated per-battle statistics for results screens and the simulator.

use serde::{Deserialize, Serialize};

use super::effects::PeriodicDamage;
use super::resolver::AttackOutcome;
use super::types::Side;
use crate::core::constants::TICKS_PER_SECOND;

/// Counters for one side of a battle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SideStats {
    pub attacks: u32,
    pub crits: u32,
    pub procs: u32,
    /// Stuns this side inflicted.
    pub stuns: u32,
    /// Reflects this side triggered as the defender.
    pub reflects: u32,
    /// Direct, reflected, and periodic damage credited to this side.
    pub damage_dealt: f64,
    pub damage_taken: f64,
    /// Bleed and poison damage this side suffered (included in `damage_taken`).
    pub periodic_damage_taken: f64,
    pub healing: f64,
}

impl SideStats {
    pub fn crit_rate(&self) -> f64 {
        if self.attacks == 0 {
            0.0
        } else {
            f64::from(self.crits) / f64::from(self.attacks)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleStats {
    pub player: SideStats,
    pub enemy: SideStats,
    pub ticks: u64,
}

impl BattleStats {
    pub fn side(&self, side: Side) -> &SideStats {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut SideStats {
        match side {
            Side::Player => &mut self.player,
            Side::Enemy => &mut self.enemy,
        }
    }

    /// Virtual seconds simulated so far.
    pub fn elapsed_seconds(&self) -> f64 {
        self.ticks as f64 / f64::from(TICKS_PER_SECOND)
    }

    pub fn average_dps(&self, side: Side) -> f64 {
        per_second(self.side(side).damage_dealt, self.elapsed_seconds())
    }

    pub fn average_damage_taken(&self, side: Side) -> f64 {
        per_second(self.side(side).damage_taken, self.elapsed_seconds())
    }

    pub(crate) fn record_attack(&mut self, attacker: Side, outcome: &AttackOutcome) {
        let defender = attacker.opponent();
        {
            let stats = self.side_mut(attacker);
            stats.attacks += 1;
            stats.crits += u32::from(outcome.was_crit);
            stats.procs += u32::from(outcome.procced);
            stats.stuns += u32::from(outcome.stun_seconds.is_some());
            stats.damage_dealt += outcome.final_damage;
            stats.healing += outcome.proc_heal + outcome.lifesteal_heal;
        }
        self.side_mut(defender).damage_taken += outcome.final_damage;

        if let Some(reflected) = outcome.reflected {
            let stats = self.side_mut(defender);
            stats.reflects += 1;
            stats.damage_dealt += reflected;
            self.side_mut(attacker).damage_taken += reflected;
        }
    }

    /// Credit periodic damage suffered by `side` to its opponent.
    pub(crate) fn record_periodic(&mut self, side: Side, damage: &PeriodicDamage) {
        let total = damage.total();
        if total <= 0.0 {
            return;
        }
        let stats = self.side_mut(side);
        stats.damage_taken += total;
        stats.periodic_damage_taken += total;
        self.side_mut(side.opponent()).damage_dealt += total;
    }
}

fn per_second(amount: f64, seconds: f64) -> f64 {
    if seconds > 0.0 {
        amount / seconds
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflect_is_credited_to_defender() {
        let mut stats = BattleStats::default();
        let outcome = AttackOutcome {
            final_damage: 12.0,
            was_crit: true,
            reflected: Some(5.0),
            ..Default::default()
        };
        stats.record_attack(Side::Player, &outcome);

        assert_eq!(stats.player.attacks, 1);
        assert_eq!(stats.player.crits, 1);
        assert_eq!(stats.player.damage_dealt, 12.0);
        assert_eq!(stats.player.damage_taken, 5.0);
        assert_eq!(stats.enemy.reflects, 1);
        assert_eq!(stats.enemy.damage_dealt, 5.0);
        assert_eq!(stats.enemy.damage_taken, 12.0);
    }

    #[test]
    fn test_averages_use_virtual_time() {
        let mut stats = BattleStats::default();
        stats.record_attack(
            Side::Enemy,
            &AttackOutcome {
                final_damage: 30.0,
                ..Default::default()
            },
        );
        stats.record_periodic(
            Side::Enemy,
            &PeriodicDamage {
                bleed: 4.0,
                poison: 6.0,
                sympathy_locked: None,
            },
        );
        stats.ticks = 40;

        assert_eq!(stats.elapsed_seconds(), 2.0);
        assert_eq!(stats.average_dps(Side::Enemy), 15.0);
        assert_eq!(stats.average_dps(Side::Player), 5.0);
        assert_eq!(stats.average_damage_taken(Side::Player), 15.0);
        assert_eq!(stats.enemy.periodic_damage_taken, 10.0);
    }

    #[test]
    fn test_empty_battle_has_zero_rates() {
        let stats = BattleStats::default();
        assert_eq!(stats.average_dps(Side::Player), 0.0);
        assert_eq!(stats.player.crit_rate(), 0.0);
    }
}
