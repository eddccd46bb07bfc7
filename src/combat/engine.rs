//! Tick-driven battle orchestrator.
//!
//! A [`Battle`] owns both fighters for one encounter and advances them on a
//! fixed virtual time step. Every tick runs the same four steps in the same
//! order:
//!
//! 1. advance both attack counters (stunned fighters hold still),
//! 2. resolve each matured attack, player first, and reset its counter,
//! 3. update both status-effect ledgers and count down timed modifiers,
//! 4. check for a knockout.
//!
//! Given the same starting records and RNG sequence the battle replays
//! identically. [`SpeedMultiplier`] only decides how many ticks a single
//! scheduling callback advances; it never changes the outcome.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::effects::EffectKind;
use super::events::{BattleOutcome, CombatEvent};
use super::resolver::DamageResolver;
use super::stats::BattleStats;
use super::types::{Combatant, Fighter, Side};
use crate::core::config::CombatConfig;
use crate::core::constants::TICK_DELTA_SECONDS;
use crate::error::CombatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleState {
    Idle,
    Running,
    Paused,
    Finished(BattleOutcome),
}

impl BattleState {
    fn name(self) -> &'static str {
        match self {
            BattleState::Idle => "idle",
            BattleState::Running => "running",
            BattleState::Paused => "paused",
            BattleState::Finished(_) => "finished",
        }
    }
}

/// Playback rate: virtual ticks advanced per scheduling callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeedMultiplier {
    #[default]
    X1,
    X3,
    X10,
}

impl SpeedMultiplier {
    pub fn ticks_per_batch(self) -> u32 {
        match self {
            SpeedMultiplier::X1 => 1,
            SpeedMultiplier::X3 => 3,
            SpeedMultiplier::X10 => 10,
        }
    }

    pub fn from_factor(factor: u32) -> Option<Self> {
        match factor {
            1 => Some(SpeedMultiplier::X1),
            3 => Some(SpeedMultiplier::X3),
            10 => Some(SpeedMultiplier::X10),
            _ => None,
        }
    }
}

/// What happened during one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// 1-based index of this tick within the battle.
    pub tick: u64,
    pub events: Vec<CombatEvent>,
    /// Set on the tick that ended the battle.
    pub outcome: Option<BattleOutcome>,
}

/// Read-only hook called after every tick (rendering, logging, recording).
pub trait BattleObserver {
    fn on_tick(&mut self, battle: &Battle, report: &TickReport);
}

impl<F> BattleObserver for F
where
    F: FnMut(&Battle, &TickReport),
{
    fn on_tick(&mut self, battle: &Battle, report: &TickReport) {
        self(battle, report)
    }
}

/// Final snapshot handed to the results screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleSummary {
    /// `None` if the battle was abandoned before a knockout.
    pub outcome: Option<BattleOutcome>,
    pub player: Combatant,
    pub enemy: Combatant,
    pub stats: BattleStats,
}

#[derive(Debug, Clone)]
pub struct Battle {
    config: CombatConfig,
    player: Fighter,
    enemy: Fighter,
    state: BattleState,
    speed: SpeedMultiplier,
    stats: BattleStats,
}

impl Battle {
    /// Pair the player with an enemy. Both records are validated up front;
    /// a malformed combatant never enters a battle.
    pub fn new(
        player: Combatant,
        enemy: Combatant,
        config: CombatConfig,
    ) -> Result<Self, CombatError> {
        for (side, combatant) in [(Side::Player, &player), (Side::Enemy, &enemy)] {
            combatant
                .validate()
                .map_err(|reason| CombatError::InvalidCombatant { side, reason })?;
        }

        Ok(Self {
            config,
            player: Fighter::new(player),
            enemy: Fighter::new(enemy),
            state: BattleState::Idle,
            speed: SpeedMultiplier::default(),
            stats: BattleStats::default(),
        })
    }

    pub fn state(&self) -> BattleState {
        self.state
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        match self.state {
            BattleState::Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn speed(&self) -> SpeedMultiplier {
        self.speed
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn fighter(&self, side: Side) -> &Fighter {
        match side {
            Side::Player => &self.player,
            Side::Enemy => &self.enemy,
        }
    }

    pub fn player(&self) -> &Combatant {
        &self.player.combatant
    }

    pub fn enemy(&self) -> &Combatant {
        &self.enemy.combatant
    }

    pub fn stats(&self) -> &BattleStats {
        &self.stats
    }

    pub fn ticks(&self) -> u64 {
        self.stats.ticks
    }

    pub fn start(&mut self) -> Result<(), CombatError> {
        self.transition("start", BattleState::Idle, BattleState::Running)?;
        debug!(
            player = %self.player.combatant.name,
            enemy = %self.enemy.combatant.name,
            "battle started"
        );
        Ok(())
    }

    /// Stop advancing. Timers, counters, and effects are kept exactly as they are.
    pub fn pause(&mut self) -> Result<(), CombatError> {
        self.transition("pause", BattleState::Running, BattleState::Paused)
    }

    pub fn resume(&mut self) -> Result<(), CombatError> {
        self.transition("resume", BattleState::Paused, BattleState::Running)
    }

    /// Change playback rate. Allowed in any state.
    pub fn set_speed(&mut self, speed: SpeedMultiplier) {
        self.speed = speed;
    }

    fn transition(
        &mut self,
        action: &'static str,
        from: BattleState,
        to: BattleState,
    ) -> Result<(), CombatError> {
        if self.state != from {
            return Err(CombatError::InvalidTransition {
                action,
                state: self.state.name(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Advance exactly one virtual tick. The battle must be running.
    pub fn tick(&mut self, rng: &mut impl Rng) -> Result<TickReport, CombatError> {
        if self.state != BattleState::Running {
            return Err(CombatError::InvalidTransition {
                action: "tick",
                state: self.state.name(),
            });
        }

        let Self {
            config,
            player,
            enemy,
            state,
            stats,
            ..
        } = self;

        stats.ticks += 1;
        let mut report = TickReport {
            tick: stats.ticks,
            ..Default::default()
        };

        // 1. Attack counters
        let ready = [
            player.combatant.advance_attack_counter(),
            enemy.combatant.advance_attack_counter(),
        ];

        // 2. Matured attacks, player first
        let resolver = DamageResolver::new(config);
        for (side, matured) in Side::ALL.into_iter().zip(ready) {
            if !matured {
                continue;
            }
            let (attacker, defender) = match side {
                Side::Player => (&mut *player, &mut *enemy),
                Side::Enemy => (&mut *enemy, &mut *player),
            };
            attacker.combatant.reset_attack_counter();

            if !attacker.combatant.is_alive() {
                report.events.push(CombatEvent::AttackSkipped { attacker: side });
                continue;
            }
            if !defender.combatant.is_alive() {
                continue;
            }

            let outcome = resolver.resolve(attacker, defender, rng);
            if let Some(milestone) = outcome.combo {
                debug!(side = %side, ?milestone, "combo milestone");
            }
            stats.record_attack(side, &outcome);
            outcome.push_events(side, &mut report.events);
        }

        // 3. Status effects and timed modifiers
        for side in Side::ALL {
            let fighter = match side {
                Side::Player => &mut *player,
                Side::Enemy => &mut *enemy,
            };
            let periodic = fighter
                .effects
                .update(TICK_DELTA_SECONDS, &mut fighter.combatant, config);
            fighter.combatant.tick_modifiers(TICK_DELTA_SECONDS);

            stats.record_periodic(side, &periodic);
            for (kind, amount) in [
                (EffectKind::Bleed, periodic.bleed),
                (EffectKind::Poison, periodic.poison),
            ] {
                if amount > 0.0 {
                    report
                        .events
                        .push(CombatEvent::PeriodicDamage { side, kind, amount });
                }
            }
            if let Some(max_hp) = periodic.sympathy_locked {
                report
                    .events
                    .push(CombatEvent::SympathyLinkLocked { side, max_hp });
            }
        }

        // 4. Knockout; a mutual knockout goes to the player
        let outcome = if !enemy.combatant.is_alive() {
            Some(BattleOutcome::Won)
        } else if !player.combatant.is_alive() {
            Some(BattleOutcome::Lost)
        } else {
            None
        };
        if let Some(outcome) = outcome {
            *state = BattleState::Finished(outcome);
            report.outcome = Some(outcome);
            report.events.push(CombatEvent::BattleEnded { outcome });
            debug!(
                ?outcome,
                ticks = stats.ticks,
                player_hp = player.combatant.hp(),
                enemy_hp = enemy.combatant.hp(),
                "battle finished"
            );
        }

        Ok(report)
    }

    /// Advance one scheduling callback's worth of ticks at the current speed.
    ///
    /// Does nothing unless the battle is running, and stops early on a
    /// knockout. Returns the number of ticks advanced.
    pub fn run_batch(
        &mut self,
        rng: &mut impl Rng,
        observer: &mut impl BattleObserver,
    ) -> Result<u32, CombatError> {
        let mut advanced = 0;
        for _ in 0..self.speed.ticks_per_batch() {
            if self.state != BattleState::Running {
                break;
            }
            let report = self.tick(rng)?;
            observer.on_tick(self, &report);
            advanced += 1;
        }
        Ok(advanced)
    }

    /// Drive the battle headlessly until someone falls.
    ///
    /// Starts an idle battle. Fails if the battle is paused or if `max_ticks`
    /// ticks pass without a knockout.
    pub fn run_to_completion(
        &mut self,
        rng: &mut impl Rng,
        max_ticks: u64,
    ) -> Result<BattleOutcome, CombatError> {
        self.run_to_completion_with(rng, max_ticks, &mut |_: &Battle, _: &TickReport| {})
    }

    /// [`Battle::run_to_completion`] with an observer.
    pub fn run_to_completion_with(
        &mut self,
        rng: &mut impl Rng,
        max_ticks: u64,
        observer: &mut impl BattleObserver,
    ) -> Result<BattleOutcome, CombatError> {
        if self.state == BattleState::Idle {
            self.start()?;
        }
        loop {
            match self.state {
                BattleState::Finished(outcome) => return Ok(outcome),
                BattleState::Running if self.stats.ticks >= max_ticks => {
                    return Err(CombatError::TickLimitExceeded {
                        ticks: self.stats.ticks,
                    });
                }
                BattleState::Running => {
                    let report = self.tick(rng)?;
                    observer.on_tick(self, &report);
                }
                BattleState::Idle | BattleState::Paused => {
                    return Err(CombatError::InvalidTransition {
                        action: "run",
                        state: self.state.name(),
                    });
                }
            }
        }
    }

    /// Consume the battle, handing back both records and the statistics.
    pub fn into_summary(self) -> BattleSummary {
        BattleSummary {
            outcome: self.outcome(),
            player: self.player.combatant,
            enemy: self.enemy.combatant,
            stats: self.stats,
        }
    }
}
