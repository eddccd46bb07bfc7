//! Skirmish headless balance simulator.
//!
//! Runs seeded campaigns through the real battle engine and prints a per-level
//! balance report, or plays a single battle in real time.
//!
//! Usage:
//!   cargo run --bin simulator -- [OPTIONS]
//!
//! Logging honours `RUST_LOG`; `--verbose` raises the default level to debug.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::EnvFilter;

use skirmish::balance::{
    archetype_for_level, default_archetypes, display_power, format_power, generate_enemy,
};
use skirmish::combat::{Battle, CombatEvent, HealSource, Side, SpeedMultiplier, TickReport};
use skirmish::core::{GameConfig, DEFAULT_MAX_BATTLE_TICKS, TICK_INTERVAL_MS};
use skirmish::simulator::{run_simulation, starting_player, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(
    author,
    version,
    about = "Balance simulator for the skirmish combat engine",
    long_about = None
)]
struct Args {
    /// Number of campaigns to simulate
    #[arg(long, default_value_t = 100)]
    runs: u32,

    /// RNG seed; run i uses seed + i (default: random)
    #[arg(long)]
    seed: Option<u64>,

    /// Levels per campaign
    #[arg(long, default_value_t = 20)]
    levels: u32,

    /// JSON tuning file (fields not named keep their defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Watch a single battle in real time instead of running campaigns
    #[arg(long)]
    realtime: bool,

    /// Level fought in real-time mode
    #[arg(long, default_value_t = 1)]
    level: u32,

    /// Playback speed in real-time mode: 1, 3 or 10
    #[arg(long, default_value = "1", value_parser = parse_speed)]
    speed: SpeedMultiplier,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the campaign report as JSON
    #[arg(long)]
    json: bool,
}

fn parse_speed(value: &str) -> Result<SpeedMultiplier, String> {
    value
        .parse::<u32>()
        .ok()
        .and_then(SpeedMultiplier::from_factor)
        .ok_or_else(|| format!("speed must be 1, 3 or 10 (got {value})"))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let game = match &args.config {
        Some(path) => match GameConfig::load_from_file(path) {
            Ok(game) => game,
            Err(err) => {
                eprintln!("Error: {}: {err}", path.display());
                return ExitCode::FAILURE;
            }
        },
        None => GameConfig::default(),
    };

    if args.realtime {
        return match watch_battle(&args, &game) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("Error: {err}");
                ExitCode::FAILURE
            }
        };
    }

    let config = SimConfig {
        num_runs: args.runs,
        seed: args.seed,
        levels: args.levels,
        ..Default::default()
    };
    let report = run_simulation(&config, &game);
    if args.json {
        println!("{}", report.to_json());
    } else {
        print!("{}", report.to_text());
    }
    ExitCode::SUCCESS
}

/// Play one battle against the enemy for `--level`, paced like the game loop.
fn watch_battle(args: &Args, game: &GameConfig) -> Result<(), Box<dyn std::error::Error>> {
    let archetypes = default_archetypes();
    let archetype = archetype_for_level(args.level, &archetypes).ok_or("no enemy archetypes")?;
    let enemy = generate_enemy(args.level, archetype, &game.balance);

    let player = starting_player();
    println!(
        "{} (power {}) vs {} (power {})",
        player.name,
        format_power(display_power(player.raw_power())),
        enemy.combatant.name,
        format_power(display_power(enemy.combatant.raw_power())),
    );

    let mut rng = match args.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let mut battle = Battle::new(player, enemy.combatant, game.combat.clone())?;
    battle.set_speed(args.speed);
    battle.start()?;
    println!("Speed {:?}", battle.speed());

    let mut print_events = |battle: &Battle, report: &TickReport| {
        for event in &report.events {
            println!("[{:>7.2}s] {}", battle.stats().elapsed_seconds(), describe(event));
        }
    };
    while battle.outcome().is_none() {
        if battle.ticks() >= DEFAULT_MAX_BATTLE_TICKS {
            println!("battle abandoned after {} ticks", battle.ticks());
            break;
        }
        battle.run_batch(&mut rng, &mut print_events)?;
        std::thread::sleep(Duration::from_millis(TICK_INTERVAL_MS));
    }

    let summary = battle.into_summary();
    println!(
        "Player DPS {:.1}, enemy DPS {:.1}, {} crits, {} procs, {} reflects",
        summary.stats.average_dps(Side::Player),
        summary.stats.average_dps(Side::Enemy),
        summary.stats.player.crits,
        summary.stats.player.procs,
        summary.stats.player.reflects + summary.stats.enemy.reflects,
    );
    Ok(())
}

fn describe(event: &CombatEvent) -> String {
    match event {
        CombatEvent::Attack {
            attacker,
            damage,
            was_crit,
            procced,
            armor_ignored,
        } => {
            let mut tags = Vec::new();
            if *was_crit {
                tags.push("crit");
            }
            if *procced {
                tags.push("proc");
            }
            if *armor_ignored {
                tags.push("pierce");
            }
            if tags.is_empty() {
                format!("{attacker} hits for {damage:.1}")
            } else {
                format!("{attacker} hits for {damage:.1} ({})", tags.join(", "))
            }
        }
        CombatEvent::AttackSkipped { attacker } => format!("{attacker} is down and cannot swing"),
        CombatEvent::Healed {
            side,
            amount,
            source,
        } => {
            let source = match source {
                HealSource::Lifesteal => "lifesteal",
                HealSource::Proc => "proc",
            };
            format!("{side} heals {amount:.1} ({source})")
        }
        CombatEvent::Reflected { by, damage } => format!("{by} reflects {damage:.1}"),
        CombatEvent::Stunned { side, seconds } => format!("{side} is stunned for {seconds:.1}s"),
        CombatEvent::EffectApplied {
            target,
            kind,
            application,
        } => format!("{kind:?} on {target}: {application:?}"),
        CombatEvent::ComboMilestone { side, milestone } => {
            format!("{side} combo milestone: {milestone:?}")
        }
        CombatEvent::PeriodicDamage { side, kind, amount } => {
            format!("{side} takes {amount:.2} from {kind:?}")
        }
        CombatEvent::SympathyLinkLocked { side, max_hp } => {
            format!("{side} sympathy link locks max hp at {max_hp:.0}")
        }
        CombatEvent::BattleEnded { outcome } => format!("battle over: {} wins", outcome.winner()),
    }
}
