#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the tower simulation headlessly.

use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tower_sim_core::{Command, Event, RemovalReason};
use tower_sim_system_fuel_supply::{self as fuel_supply, FuelSupply};
use tower_sim_system_spawning::{self as spawning, Spawning};
use tower_sim_world::{self as world, query, FuelPolicy, World, WorldConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Simulated time covered by one tick.
const TICK: f32 = 1.0;

/// Command-line arguments accepted by the tower simulation.
#[derive(Debug, Parser)]
#[command(name = "tower-sim", about = "Headless airport tower simulation")]
struct CliArgs {
    /// Number of ticks to simulate.
    #[arg(long, default_value_t = 5_000)]
    ticks: u32,
    /// Seed of the aircraft spawner.
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// TOML file holding the world configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Ticks between two spawned aircraft.
    #[arg(long, default_value_t = 150.0)]
    spawn_interval: f32,
    /// Meter the airport fuel starting from this stock instead of refuelling for free.
    #[arg(long, value_name = "FUEL")]
    fuel_stock: Option<u32>,
}

/// Totals gathered from the event stream of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Summary {
    spawned: u32,
    rejected: u32,
    serviced: u32,
    departed: u32,
    fuel_exhausted: u32,
    crashed: u32,
    faulted: u32,
    fuel_delivered: u64,
    fuel_dispensed: u64,
}

impl Summary {
    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::AircraftSpawned { .. } => self.spawned += 1,
                Event::SpawnRejected { .. } => self.rejected += 1,
                Event::ServiceFinished { .. } => self.serviced += 1,
                Event::AircraftRemoved { reason, .. } => match reason {
                    RemovalReason::LiftedOff => self.departed += 1,
                    RemovalReason::FuelExhausted => self.fuel_exhausted += 1,
                    RemovalReason::Crashed => self.crashed += 1,
                    RemovalReason::Faulted => self.faulted += 1,
                },
                Event::FuelDelivered { amount, .. } => self.fuel_delivered += u64::from(*amount),
                Event::AircraftRefueled { amount, .. } => self.fuel_dispensed += u64::from(*amount),
                Event::TimeAdvanced { .. }
                | Event::TerminalReserved { .. }
                | Event::ServiceStarted { .. } => {}
            }
        }
    }
}

/// Entry point for the tower simulation command-line interface.
fn main() -> Result<()> {
    install_tracing();
    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => WorldConfig::default(),
    };
    if let Some(initial_stock) = args.fuel_stock {
        config.fuel_policy = FuelPolicy::Metered { initial_stock };
    }

    let mut world = World::new(config).context("invalid world configuration")?;
    let summary = run(&mut world, &args);

    println!("ticks simulated:   {}", query::tick_index(&world));
    println!("aircraft spawned:  {}", summary.spawned);
    println!("spawns rejected:   {}", summary.rejected);
    println!("services finished: {}", summary.serviced);
    println!("departures:        {}", summary.departed);
    println!("out of fuel:       {}", summary.fuel_exhausted);
    println!("crashes:           {}", summary.crashed);
    println!("faults:            {}", summary.faulted);
    println!("still flying:      {}", query::aircraft_count(&world));
    println!("fuel delivered:    {}", summary.fuel_delivered);
    println!("fuel dispensed:    {}", summary.fuel_dispensed);
    Ok(())
}

fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn load_config(path: &Path) -> Result<WorldConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    parse_config(&text).with_context(|| format!("failed to parse config file {}", path.display()))
}

fn parse_config(text: &str) -> Result<WorldConfig> {
    Ok(toml::from_str(text)?)
}

fn run(world: &mut World, args: &CliArgs) -> Summary {
    let mut spawning = Spawning::new(spawning::Config::new(args.spawn_interval, args.seed));
    let mut fuel_supply = FuelSupply::new(fuel_supply::Config::default());
    let metered = args.fuel_stock.is_some();

    let mut summary = Summary::default();
    let mut events = Vec::new();
    let mut commands = Vec::new();

    // Seed the first spawn so the airspace is not empty for a whole interval.
    events.push(Event::TimeAdvanced {
        dt: args.spawn_interval,
    });

    for _ in 0..args.ticks {
        spawning.handle(
            &events,
            query::aircraft_types(world),
            &query::aircraft_view(world),
            query::airport_position(world),
            &mut commands,
        );
        if metered {
            fuel_supply.handle(&events, query::total_missing_fuel(world), &mut commands);
        }

        events.clear();
        for command in commands.drain(..) {
            world::apply(world, command, &mut events);
        }
        world::apply(world, Command::Tick { dt: TICK }, &mut events);
        summary.record(&events);
    }

    info!(
        crashes = query::crash_count(world),
        aircraft = query::aircraft_count(world),
        "simulation finished"
    );
    summary
}
