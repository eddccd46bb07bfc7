// Tick and timing
pub const TICKS_PER_SECOND: u32 = 20;
pub const TICK_DELTA_SECONDS: f64 = 1.0 / TICKS_PER_SECOND as f64;
pub const TICK_INTERVAL_MS: u64 = 1000 / TICKS_PER_SECOND as u64;

// Timers within this of zero count as expired (absorbs tick accumulation drift)
pub const EXPIRY_EPSILON: f64 = 1e-9;

// Mitigation: reduction = armor / (armor + ARMOR_SCALING)
pub const ARMOR_SCALING: f64 = 100.0;

// Critical hits
pub const BASE_CRIT_MULTIPLIER: f64 = 2.0;

// Procs
pub const PROC_BASE_CHANCE: f64 = 0.10;
pub const PROC_ENHANCED_CHANCE: f64 = 0.20;
pub const PROC_DAMAGE_MULTIPLIER: f64 = 1.5;
pub const PROC_STUN_SECONDS: f64 = 1.0;
pub const PROC_SHIELD_ARMOR: f64 = 25.0;
pub const PROC_SHIELD_SECONDS: f64 = 3.0;
pub const PROC_HEAL_AMOUNT: f64 = 10.0;
pub const PROC_HASTE_MULTIPLIER: f64 = 1.5;
pub const PROC_HASTE_SECONDS: f64 = 3.0;
pub const ENHANCED_DURATION_FACTOR: f64 = 1.5;

// Reflect cadence
pub const REFLECT_HIT_INTERVAL: u32 = 5;
pub const REFLECT_MAX_HP_FRACTION: f64 = 0.05;

// Bleed: magnitude = BLEED_DAMAGE_FRACTION x source, dealt over BLEED_WINDOW_SECONDS
pub const BLEED_CHANCE: f64 = 0.25;
pub const BLEED_DAMAGE_FRACTION: f64 = 0.40;
pub const BLEED_WINDOW_SECONDS: f64 = 3.0;
pub const BLEED_DURATION_SECONDS: f64 = 3.0;

// Poison: POISON_MAX_HP_RATE of the owner's max hp per second, per instance
pub const POISON_CHANCE: f64 = 0.25;
pub const POISON_MAX_HP_RATE: f64 = 0.005;
pub const POISON_DURATION_SECONDS: f64 = 5.0;

// Combo
pub const COMBO_WINDOW_SECONDS: f64 = 2.0;
pub const COMBO_CRIT_MILESTONE: u32 = 5;
pub const COMBO_HASTE_MILESTONE: u32 = 10;
pub const COMBO_BONUS_MILESTONE: u32 = 20;
pub const COMBO_HASTE_MULTIPLIER: f64 = 2.0;
pub const COMBO_HASTE_SECONDS: f64 = 3.0;
pub const COMBO_BONUS_ATTACK_FACTOR: f64 = 3.0;

// Sympathy link: locks max hp at this fraction once hp first falls to it
pub const SYMPATHY_LINK_THRESHOLD: f64 = 0.5;

// Stat solver
pub const SOLVER_MIN_SCALE: f64 = 0.1;
pub const SOLVER_MAX_SCALE: f64 = 10.0;
pub const SOLVER_MAX_ITERATIONS: u32 = 50;
pub const SOLVER_PRECISION: f64 = 0.01;
pub const SOLVER_ARMOR_RATE: f64 = 0.5;
pub const MIN_ENEMY_HP: f64 = 20.0;
pub const MIN_ENEMY_ATTACK: f64 = 5.0;
pub const MIN_ENEMY_ARMOR: f64 = 0.0;

// Reference enemy: (hp, attack_speed, armor)
pub const REFERENCE_ENEMY_STATS: (f64, f64, f64) = (100.0, 1.0, 20.0);

// Bosses
pub const BOSS_POWER_MULTIPLIER: f64 = 3.0;
pub const BOSS_HP_BIAS: f64 = 0.5;
pub const BOSS_LEVEL_INTERVAL: u32 = 5;

// Per-level target power: LEVEL_ONE_TARGET_POWER x TARGET_POWER_GROWTH^(level - 1)
pub const LEVEL_ONE_TARGET_POWER: f64 = 1200.0;
pub const TARGET_POWER_GROWTH: f64 = 1.18;

// Balance validation bands (relative error)
pub const BALANCE_PERFECT_BAND: f64 = 0.02;
pub const BALANCE_GOOD_BAND: f64 = 0.05;
pub const BALANCE_ACCEPTABLE_BAND: f64 = 0.10;

// Display
pub const POWER_THOUSANDS_THRESHOLD: f64 = 1_000.0;
pub const POWER_MILLIONS_THRESHOLD: f64 = 1_000_000.0;

// Battle safety net for headless runs: ten minutes of virtual time
pub const DEFAULT_MAX_BATTLE_TICKS: u64 = 10 * 60 * TICKS_PER_SECOND as u64;
