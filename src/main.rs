//! Grid simulator entry point — CLI wiring and unpaced batch-mode ticking.

use std::path::Path;
use std::process;

use gridsim::config;
use gridsim::world::{World, WorldConfig};

/// Parsed CLI arguments.
struct CliArgs {
    config_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    ticks: u32,
    replay_dir: Option<String>,
    export_csv: Option<String>,
    #[cfg(feature = "api")]
    serve: bool,
    #[cfg(feature = "api")]
    port: u16,
}

fn print_help() {
    eprintln!("gridsim — deterministic national electricity grid simulator");
    eprintln!();
    eprintln!("Usage: gridsim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>          Load configuration from a TOML file");
    eprintln!("  --preset <name>          Use a built-in preset (baseline, high_wind, tight_reserves)");
    eprintln!("  --seed <u64>             Override the random seed");
    eprintln!("  --ticks <u32>            Number of 1 s ticks to run (default: one full day, 86400)");
    eprintln!("  --replay-dir <path>      Load and validate a historical replay day instead of running the RNG");
    eprintln!("  --export-csv <path>      Export tick history to CSV after the run");
    #[cfg(feature = "api")]
    {
        eprintln!("  --serve                  Start the REST API server after the run");
        eprintln!("  --port <u16>             API server port (default: 3000)");
    }
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If neither --config nor --preset is given, the baseline preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        config_path: None,
        preset: None,
        seed_override: None,
        ticks: 86_400,
        replay_dir: None,
        export_csv: None,
        #[cfg(feature = "api")]
        serve: false,
        #[cfg(feature = "api")]
        port: 3000,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --config requires a path argument");
                    process::exit(1);
                }
                cli.config_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                match args[i].parse::<u64>() {
                    Ok(s) => cli.seed_override = Some(s),
                    Err(_) => {
                        eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                        process::exit(1);
                    }
                }
            }
            "--ticks" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --ticks requires a u32 argument");
                    process::exit(1);
                }
                match args[i].parse::<u32>() {
                    Ok(t) => cli.ticks = t,
                    Err(_) => {
                        eprintln!("error: --ticks value \"{}\" is not a valid u32", args[i]);
                        process::exit(1);
                    }
                }
            }
            "--replay-dir" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --replay-dir requires a path argument");
                    process::exit(1);
                }
                cli.replay_dir = Some(args[i].clone());
            }
            "--export-csv" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --export-csv requires a path argument");
                    process::exit(1);
                }
                cli.export_csv = Some(args[i].clone());
            }
            #[cfg(feature = "api")]
            "--serve" => {
                cli.serve = true;
            }
            #[cfg(feature = "api")]
            "--port" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --port requires a u16 argument");
                    process::exit(1);
                }
                match args[i].parse::<u16>() {
                    Ok(p) => cli.port = p,
                    Err(_) => {
                        eprintln!("error: --port value \"{}\" is not a valid u16", args[i]);
                        process::exit(1);
                    }
                }
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Resolves `--config`/`--preset`/baseline precedence into a `WorldConfig`,
/// applying `--seed` last, and exits the process on any load/validate error.
fn load_config(cli: &CliArgs) -> WorldConfig {
    let mut cfg = if let Some(ref path) = cli.config_path {
        match config::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match config::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        config::baseline()
    };

    if let Some(seed) = cli.seed_override {
        cfg.seed = seed;
    }

    let errors = config::validate(&cfg);
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    cfg
}

/// Loads and validates a replay day, logging a summary. Parsing errors are
/// fatal (spec §7: load errors are not recoverable at startup).
fn load_replay(dir: &str) {
    match gridsim::replay::load_day(Path::new(dir)) {
        Ok(day) => {
            tracing::info!(
                frequency_rows = day.frequency.frequency_hz.len(),
                production_slots = day.production.len(),
                consumption_slots = day.consumption.len(),
                price_hours = day.prices.len(),
                "replay day loaded"
            );
        }
        Err(e) => {
            eprintln!("error: failed to load replay day from \"{dir}\": {e}");
            process::exit(1);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = parse_args();
    let cfg = load_config(&cli);

    if let Some(ref dir) = cli.replay_dir {
        load_replay(dir);
    }

    let mut world = World::new(cfg);
    {
        let span = tracing::info_span!("run", ticks = cli.ticks);
        let _enter = span.enter();
        for _ in 0..cli.ticks {
            if world.phase() == gridsim::world::Phase::DayComplete {
                break;
            }
            world.tick();
        }
    }

    let settlement = world.settlement();
    println!(
        "ran {} ticks; cumulative net cashflow {:.2} EUR, cumulative deviation {:.4} MWh",
        world.history().len(),
        settlement.cumulative_net_cash_eur(),
        settlement.cumulative_deviation_mwh(),
    );

    if let Some(ref path) = cli.export_csv {
        if let Err(e) = gridsim::io::export::export_csv(world.history(), Path::new(path)) {
            eprintln!("error: failed to write CSV: {e}");
            process::exit(1);
        }
        eprintln!("history written to {path}");
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::{Arc, Mutex};

        let state = Arc::new(gridsim::api::AppState {
            world: Mutex::new(world),
        });
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
            eprintln!("error: failed to create tokio runtime: {e}");
            process::exit(1);
        });
        rt.block_on(gridsim::api::serve(state, addr));
    }
}
