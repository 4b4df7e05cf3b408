//! battle-runner: headless AI-vs-AI battles from the command line.
//!
//! Usage:
//!   battle-runner --scenario duel --seed 42
//!   battle-runner --config tuning.toml --scenario leaderhunt --max-updates 100000
//!
//! Every event is written to stdout as one JSON line. Logs go to stderr
//! (`RUST_LOG` overrides the default `info` filter).

use std::path::PathBuf;
use std::process;

use partbreak_core::commands::BattleCommand;
use partbreak_core::config::BattleConfig;
use partbreak_core::constants::TICK_INTERVAL_MS;
use partbreak_core::enums::{BattlePhase, ScenarioId};
use partbreak_sim::BattleEngine;

const DEFAULT_MAX_UPDATES: u64 = 500_000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "help" || a == "--help" || a == "-h") {
        print_usage();
        return;
    }

    let mut config = match parse_flag(&args, "--config") {
        Some(path) => load_config(&PathBuf::from(path)),
        None => BattleConfig::default(),
    };
    if let Some(seed) = parse_flag(&args, "--seed") {
        config.seed = parse_or_exit(seed, "--seed");
    }
    let scenario: ScenarioId = match parse_flag(&args, "--scenario") {
        Some(name) => parse_or_exit(name, "--scenario"),
        None => ScenarioId::default(),
    };
    let max_updates: u64 = match parse_flag(&args, "--max-updates") {
        Some(n) => parse_or_exit(n, "--max-updates"),
        None => DEFAULT_MAX_UPDATES,
    };

    run(config, scenario, max_updates);
}

fn print_usage() {
    eprintln!(
        "battle-runner: PARTBREAK headless battle runner\n\
         \n\
         Options:\n\
         \n\
           --config <path>      TOML battle config (default: built-in tuning)\n\
           --scenario <name>    duel | skirmish | leaderhunt (default: skirmish)\n\
           --seed <N>           RNG seed, overrides the config file\n\
           --max-updates <N>    Give up after N updates (default: {DEFAULT_MAX_UPDATES})\n\
         \n\
         Examples:\n\
         \n\
           battle-runner --scenario duel --seed 42\n\
           RUST_LOG=partbreak_sim=debug battle-runner --config tuning.toml\n"
    );
}

fn parse_flag<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_or_exit<T: std::str::FromStr>(value: &str, flag: &str) -> T {
    match value.parse() {
        Ok(v) => v,
        Err(_) => {
            eprintln!("Error: invalid value for {flag}: {value}");
            process::exit(1);
        }
    }
}

fn load_config(path: &PathBuf) -> BattleConfig {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        }
    };
    match BattleConfig::from_toml_str(&source) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error in {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn run(config: BattleConfig, scenario: ScenarioId, max_updates: u64) {
    let mut engine = match BattleEngine::try_new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    engine.queue_commands([
        BattleCommand::SelectScenario { scenario },
        BattleCommand::StartBattle,
    ]);

    for _ in 0..max_updates {
        let report = engine.update(TICK_INTERVAL_MS);
        for event in &report.events {
            match serde_json::to_string(event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::error!(%e, "failed to encode event"),
            }
        }
        match report.phase {
            BattlePhase::GameOver => {
                let snapshot = engine.snapshot();
                eprintln!(
                    "Winner: {:?} after {} turns, {} updates",
                    snapshot.winning_team, snapshot.turn_number, snapshot.time.tick
                );
                return;
            }
            BattlePhase::Idle => {
                eprintln!("Error: battle did not start (invalid roster?)");
                process::exit(1);
            }
            _ => {}
        }
    }

    eprintln!("No winner after {max_updates} updates");
    process::exit(2);
}
