//! Bounce Core headless runner
//!
//! Runs the simulation against the virtual scheduler and prints the final
//! state as JSON.
//!
//! Example:
//!   cargo run -- settings.json 200

use std::path::{Path, PathBuf};

use bounce_core::Settings;
use bounce_core::sim::{BounceSimulation, VirtualScheduler};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run the bounce simulation headless", long_about = None)]
struct Args {
    /// Settings JSON file; defaults are used when omitted
    settings: Option<PathBuf>,
    /// Number of arrivals to deliver before printing the snapshot
    #[arg(default_value_t = 50)]
    arrivals: usize,
}

fn load_settings(path: Option<&Path>) -> Result<Settings, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Settings::load(path)?),
        None => {
            log::info!("No settings file given, using defaults");
            Ok(Settings::default())
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(args.settings.as_deref())?;
    settings.validate()?;

    let mut sim = BounceSimulation::from_settings(&settings)?;
    let mut scheduler = VirtualScheduler::new();
    sim.start(&mut scheduler);

    let delivered = sim.run_arrivals(&mut scheduler, args.arrivals);
    log::info!(
        "Delivered {} arrivals over {:.2}s of simulated time",
        delivered,
        scheduler.now()
    );

    sim.teardown();
    scheduler.cancel_all();

    for failure in sim.failures() {
        log::error!("Entity {} failed: {}", failure.entity, failure.error);
    }

    println!("{}", serde_json::to_string_pretty(&sim.snapshot())?);
    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    log::info!("Bounce Core (headless) starting...");

    if let Err(e) = run(args) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
