//! Angler Headless Balance Simulator
//!
//! Plays scripted fishing encounters against the real engine and reports
//! outcome rates per species. Used to tune `EngineConfig`.
//!
//! Usage:
//!   cargo run --bin simulator -- [OPTIONS]
//!
//! Options:
//!   --preset NAME   pond | ghost (default: pond)
//!   --casts N       Casts to simulate
//!   --seed N        RNG seed (default: random)
//!   --location ID   Location id
//!   --hour H        Local hour 0-23
//!   --weather W     CLEAR, CLOUDY, RAIN, STORM, FOG, SNOW
//!   --bait ID       Equipped bait
//!   --hook N        Angler hook skill
//!   --reel N        Angler reel skill
//!   --reaction MS   Delay before setting the hook
//!   --catalog FILE  Species catalog JSON (default: builtin)
//!   --config FILE   Engine config JSON (default: $ANGLER_CONFIG_PATH or builtin)
//!   --persistent    Keep legendary claims between casts
//!   --save FILE     Write the resulting world save
//!   --verbose       Per-cast logging
//!   --quiet         Only final summary line

use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::sync::Arc;

use angler::core::config::{load_config_from_env, EngineConfig};
use angler::save_manager::WorldSave;
use angler::simulator::{run_simulation_in, SimConfig, SimWorld};
use angler::species::{InMemoryCatalog, SpeciesCatalog, Weather};
use chrono::NaiveTime;
use tracing_subscriber::EnvFilter;

// ── CLI Configuration ────────────────────────────────────────────────

struct CliConfig {
    sim: SimConfig,
    catalog_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    save_path: Option<PathBuf>,
    quiet: bool,
}

fn parse_value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|v| v.parse()) {
        Some(Ok(value)) => value,
        _ => {
            eprintln!("{flag} requires a valid value");
            print_usage();
            process::exit(1);
        }
    }
}

fn parse_weather(raw: &str) -> Weather {
    let quoted = format!("\"{}\"", raw.to_uppercase());
    match serde_json::from_str(&quoted) {
        Ok(weather) => weather,
        Err(_) => {
            eprintln!("Unknown weather: {raw}");
            process::exit(1);
        }
    }
}

fn parse_args() -> CliConfig {
    let args: Vec<String> = std::env::args().collect();

    let preset = args
        .iter()
        .position(|a| a == "--preset")
        .and_then(|i| args.get(i + 1))
        .map(String::as_str);
    let sim = match preset {
        None | Some("pond") => SimConfig::pond_baseline(),
        Some("ghost") => SimConfig::legendary_hunt(),
        Some(other) => {
            eprintln!("Unknown preset: {other}");
            process::exit(1);
        }
    };

    let mut config = CliConfig {
        sim,
        catalog_path: None,
        config_path: None,
        save_path: None,
        quiet: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--preset" => i += 1,
            "--casts" => {
                i += 1;
                config.sim.num_casts = parse_value(&args, i, "--casts");
            }
            "--seed" => {
                i += 1;
                config.sim.seed = Some(parse_value(&args, i, "--seed"));
            }
            "--location" => {
                i += 1;
                config.sim.location = parse_value(&args, i, "--location");
            }
            "--hour" => {
                i += 1;
                let hour: u32 = parse_value(&args, i, "--hour");
                config.sim.clock = NaiveTime::from_hms_opt(hour % 24, 0, 0).unwrap_or_default();
            }
            "--weather" => {
                i += 1;
                let raw: String = parse_value(&args, i, "--weather");
                config.sim.weather = parse_weather(&raw);
            }
            "--bait" => {
                i += 1;
                config.sim.bait = Some(parse_value(&args, i, "--bait"));
            }
            "--hook" => {
                i += 1;
                config.sim.skill.hook = parse_value(&args, i, "--hook");
            }
            "--reel" => {
                i += 1;
                config.sim.skill.reel = parse_value(&args, i, "--reel");
            }
            "--reaction" => {
                i += 1;
                config.sim.strategy.reaction_ms = parse_value(&args, i, "--reaction");
            }
            "--catalog" => {
                i += 1;
                config.catalog_path = Some(parse_value(&args, i, "--catalog"));
            }
            "--config" => {
                i += 1;
                config.config_path = Some(parse_value(&args, i, "--config"));
            }
            "--save" => {
                i += 1;
                config.save_path = Some(parse_value(&args, i, "--save"));
            }
            "--persistent" => config.sim.persistent_ledger = true,
            "--verbose" => config.sim.verbosity = 2,
            "--quiet" => {
                config.quiet = true;
                config.sim.verbosity = 0;
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }
    config
}

fn print_usage() {
    eprintln!(
        "Angler Headless Balance Simulator\n\
         \n\
         Usage: simulator [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 --preset NAME   pond | ghost (default: pond)\n\
         \x20 --casts N       Casts to simulate\n\
         \x20 --seed N        RNG seed (default: random)\n\
         \x20 --location ID   Location id\n\
         \x20 --hour H        Local hour 0-23\n\
         \x20 --weather W     CLEAR, CLOUDY, RAIN, STORM, FOG, SNOW\n\
         \x20 --bait ID       Equipped bait\n\
         \x20 --hook N        Angler hook skill\n\
         \x20 --reel N        Angler reel skill\n\
         \x20 --reaction MS   Delay before setting the hook\n\
         \x20 --catalog FILE  Species catalog JSON (default: builtin)\n\
         \x20 --config FILE   Engine config JSON (default: $ANGLER_CONFIG_PATH or builtin)\n\
         \x20 --persistent    Keep legendary claims between casts\n\
         \x20 --save FILE     Write the resulting world save\n\
         \x20 --verbose       Per-cast logging\n\
         \x20 --quiet         Only final summary line\n\
         \x20 --help, -h      Show this help"
    );
}

// ── Main ─────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let mut cli = parse_args();

    let catalog: Arc<dyn SpeciesCatalog> = match &cli.catalog_path {
        Some(path) => match InMemoryCatalog::from_file(path) {
            Ok(catalog) => Arc::new(catalog),
            Err(err) => {
                eprintln!("Failed to load catalog: {err}");
                process::exit(1);
            }
        },
        None => Arc::new(InMemoryCatalog::builtin()),
    };

    cli.sim.engine = match &cli.config_path {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("Failed to load engine config: {err}");
                process::exit(1);
            }
        },
        None => load_config_from_env(),
    };

    if !cli.quiet {
        eprintln!(
            "Angler Simulator: {} casts at {} ({}, {:?}), seed={}",
            cli.sim.num_casts,
            cli.sim.location,
            cli.sim.clock.format("%H:%M"),
            cli.sim.weather,
            cli.sim
                .seed
                .map_or_else(|| "random".to_string(), |s| s.to_string()),
        );
    }

    let sim_world = SimWorld::default();
    let report = match run_simulation_in(&cli.sim, catalog, &sim_world) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Simulation failed: {err}");
            process::exit(1);
        }
    };

    if cli.quiet {
        println!("{}", report.summary_line());
    } else {
        print!("{}", report.to_text());
    }

    if let Some(path) = &cli.save_path {
        let save = WorldSave::capture(&sim_world.ledger, &sim_world.records);
        if let Err(err) = save.save_to(path) {
            eprintln!("Failed to write world save: {err}");
            process::exit(1);
        }
    }
}
