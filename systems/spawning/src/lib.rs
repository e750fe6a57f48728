#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting aircraft spawn commands.

use std::{collections::BTreeSet, f32::consts::TAU, ops::Range, sync::Arc};

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_sim_core::{AircraftType, AircraftTypeId, AircraftView, Command, Event, FlightNumber};
use tracing::warn;

/// Carrier codes drawn for new flights when none are configured.
pub const DEFAULT_CARRIERS: [&str; 8] = ["AF", "LH", "EY", "DL", "KL", "BA", "AY", "EY"];

const FLIGHT_DIGITS: Range<u32> = 1_000..10_000;
const MAX_FLIGHT_NUMBER_DRAWS: usize = 64;
const SPAWN_RADIUS: f32 = 3.0;
const SPAWN_ALTITUDE: Vec3 = Vec3::new(0.0, 0.0, 2.0);
const SPAWN_SPEED: f32 = 0.05;
const MIN_SPAWN_FUEL: f32 = 150.0;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug)]
pub struct Config {
    spawn_interval: f32,
    rng_seed: u64,
    carriers: Vec<String>,
}

impl Config {
    /// Creates a configuration spawning one aircraft every `spawn_interval` ticks.
    #[must_use]
    pub fn new(spawn_interval: f32, rng_seed: u64) -> Self {
        Self {
            spawn_interval,
            rng_seed,
            carriers: DEFAULT_CARRIERS.iter().map(|code| (*code).to_owned()).collect(),
        }
    }

    /// Replaces the carrier codes new flight numbers are drawn from.
    #[must_use]
    pub fn with_carriers<I, S>(mut self, carriers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.carriers = carriers.into_iter().map(Into::into).collect();
        self
    }
}

/// Pure system that deterministically emits spawn commands as time advances.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: f32,
    accumulator: f32,
    rng: ChaCha8Rng,
    carriers: Vec<String>,
    skipped_spawns: u32,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: 0.0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            carriers: config.carriers,
            skipped_spawns: 0,
        }
    }

    /// Spawns dropped because no free flight number could be drawn.
    #[must_use]
    pub const fn skipped_spawns(&self) -> u32 {
        self.skipped_spawns
    }

    /// Consumes events and immutable views to emit spawn commands.
    ///
    /// `aircraft` lists the live flights so new flight numbers never collide
    /// with them; `airport` is the centre new aircraft head for.
    pub fn handle(
        &mut self,
        events: &[Event],
        catalogue: &[Arc<AircraftType>],
        aircraft: &AircraftView,
        airport: Vec3,
        out: &mut Vec<Command>,
    ) {
        if !(self.spawn_interval > 0.0) || catalogue.is_empty() || self.carriers.is_empty() {
            return;
        }

        let accumulated: f32 = events
            .iter()
            .filter_map(|event| match event {
                Event::TimeAdvanced { dt } => Some(*dt),
                _ => None,
            })
            .sum();
        if accumulated <= 0.0 {
            return;
        }

        self.accumulator += accumulated;
        let spawn_attempts = self.resolve_spawn_attempts();
        if spawn_attempts == 0 {
            return;
        }

        let taken: BTreeSet<FlightNumber> = aircraft
            .iter()
            .map(|snapshot| snapshot.flight_number.clone())
            .collect();
        self.emit_spawns(spawn_attempts, taken, catalogue, airport, out);
    }

    fn emit_spawns(
        &mut self,
        spawn_attempts: usize,
        mut taken: BTreeSet<FlightNumber>,
        catalogue: &[Arc<AircraftType>],
        airport: Vec3,
        out: &mut Vec<Command>,
    ) {
        for _ in 0..spawn_attempts {
            let Some(flight_number) = self.next_flight_number(&taken) else {
                self.skipped_spawns += 1;
                warn!(
                    draws = MAX_FLIGHT_NUMBER_DRAWS,
                    live = taken.len(),
                    "no free flight number, spawn skipped"
                );
                continue;
            };
            let _ = taken.insert(flight_number.clone());
            out.push(self.spawn_command(flight_number, catalogue, airport));
        }
    }

    fn resolve_spawn_attempts(&mut self) -> usize {
        let mut attempts = 0;
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;
            attempts += 1;
        }
        attempts
    }

    fn next_flight_number(&mut self, taken: &BTreeSet<FlightNumber>) -> Option<FlightNumber> {
        (0..MAX_FLIGHT_NUMBER_DRAWS).find_map(|_| {
            let carrier = &self.carriers[self.rng.gen_range(0..self.carriers.len())];
            let digits = self.rng.gen_range(FLIGHT_DIGITS);
            let candidate = FlightNumber::new(format!("{carrier}{digits}"));
            (!taken.contains(&candidate)).then_some(candidate)
        })
    }

    fn spawn_command(
        &mut self,
        flight_number: FlightNumber,
        catalogue: &[Arc<AircraftType>],
        airport: Vec3,
    ) -> Command {
        let index = self.rng.gen_range(0..catalogue.len());
        let max_fuel = (catalogue[index].max_fuel as f32).max(MIN_SPAWN_FUEL + 1.0);
        let angle: f32 = self.rng.gen_range(0.0..TAU);
        let offset = Vec3::new(angle.sin(), angle.cos(), 0.0) * SPAWN_RADIUS + SPAWN_ALTITUDE;

        Command::SpawnAircraft {
            flight_number,
            aircraft_type: AircraftTypeId::new(index as u32),
            position: airport + offset,
            velocity: -offset.normalize_or_zero() * SPAWN_SPEED,
            fuel: self.rng.gen_range(MIN_SPAWN_FUEL..max_fuel),
        }
    }
}
