#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative airport and airspace state for the tower simulation.

mod aircraft;
mod airport;
mod config;
mod layout;
mod manager;
mod terminal;
mod tower;

use std::sync::Arc;

use glam::Vec3;
use tower_sim_core::{
    AircraftId, AircraftType, AircraftTypeId, Command, Event, FlightNumber, SpawnError, Tuning,
};
use tracing::{info, warn};

pub use aircraft::{Aircraft, Control, Instruction, Progress};
pub use airport::Airport;
pub use config::{ConfigError, FuelPolicy, WorldConfig};
pub use layout::{AirportLayout, Runway};
pub use manager::AircraftManager;
pub use terminal::Terminal;
pub use tower::{Tower, TowerControl};

/// Represents the authoritative tower simulation state.
#[derive(Debug)]
pub struct World {
    tuning: Tuning,
    aircraft_types: Vec<Arc<AircraftType>>,
    airport: Airport,
    tower: Tower,
    fleet: AircraftManager,
    fuel_policy: FuelPolicy,
    next_aircraft_id: u32,
    tick_index: u64,
}

impl World {
    /// Creates a world with an empty airspace from a validated configuration.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let WorldConfig {
            tuning,
            layout,
            airport_position,
            fuel_policy,
            departure_seed,
            aircraft_types,
        } = config;

        let mut airport = Airport::new(
            layout,
            airport_position,
            tuning.service_cycles,
            tuning.distance_threshold,
            departure_seed,
        );
        if let FuelPolicy::Metered { initial_stock } = fuel_policy {
            airport.set_fuel_stock(initial_stock);
        }

        Ok(Self {
            tower: Tower::new(tuning.holding_radius),
            aircraft_types: aircraft_types.into_iter().map(Arc::new).collect(),
            fleet: AircraftManager::new(),
            airport,
            fuel_policy,
            tuning,
            next_aircraft_id: 0,
            tick_index: 0,
        })
    }

    /// Puts a new aircraft into the airspace.
    ///
    /// Fails when the type is not in the catalogue or the flight number is
    /// already carried by a live aircraft.
    pub fn spawn(
        &mut self,
        flight_number: FlightNumber,
        aircraft_type: AircraftTypeId,
        position: Vec3,
        velocity: Vec3,
        fuel: f32,
    ) -> Result<AircraftId, SpawnError> {
        let kind = self
            .aircraft_types
            .get(aircraft_type.get() as usize)
            .ok_or(SpawnError::UnknownType)?;
        if self.fleet.contains_flight(&flight_number) {
            return Err(SpawnError::DuplicateFlightNumber);
        }

        let id = AircraftId::new(self.next_aircraft_id);
        self.next_aircraft_id = self.next_aircraft_id.wrapping_add(1);
        info!(flight = %flight_number, kind = %kind.name, fuel, "aircraft spawned");
        self.fleet.add(Aircraft::new(
            id,
            flight_number,
            Arc::clone(kind),
            position,
            velocity,
            fuel,
            &self.tuning,
        ));
        Ok(id)
    }

    fn tick(&mut self, dt: f32, out_events: &mut Vec<Event>) {
        if self.fuel_policy == FuelPolicy::Unlimited {
            self.airport.set_fuel_stock(u32::MAX);
        }

        self.airport
            .service_terminals(dt, &mut self.fleet, out_events);

        let mut control = TowerControl::new(&mut self.tower, &mut self.airport, out_events);
        self.fleet.advance(dt, &self.tuning, &mut control);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.tick(dt, out_events);
        }
        Command::SpawnAircraft {
            flight_number,
            aircraft_type,
            position,
            velocity,
            fuel,
        } => match world.spawn(flight_number.clone(), aircraft_type, position, velocity, fuel) {
            Ok(aircraft) => out_events.push(Event::AircraftSpawned {
                aircraft,
                flight_number,
            }),
            Err(reason) => {
                warn!(flight = %flight_number, ?reason, "spawn rejected");
                out_events.push(Event::SpawnRejected {
                    flight_number,
                    reason,
                });
            }
        },
        Command::DeliverFuel { amount } => {
            let stock = world.airport.deliver_fuel(amount);
            out_events.push(Event::FuelDelivered { amount, stock });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::sync::Arc;

    use glam::Vec3;
    use tower_sim_core::{AircraftId, AircraftType, AircraftView, TerminalSnapshot};

    use super::World;

    /// Captures the draw hook snapshots of every live aircraft in identifier order.
    #[must_use]
    pub fn aircraft_view(world: &World) -> AircraftView {
        AircraftView::from_snapshots(world.fleet.iter().map(|aircraft| aircraft.snapshot()).collect())
    }

    /// Number of live aircraft operated by `carrier`.
    #[must_use]
    pub fn count_on_carrier(world: &World, carrier: &str) -> u32 {
        world.fleet.count_on_carrier(carrier)
    }

    /// Fuel owed to aircraft circling low on fuel.
    #[must_use]
    pub fn total_missing_fuel(world: &World) -> u32 {
        world.fleet.total_missing_fuel()
    }

    /// Aircraft removed by any fault since the world was created.
    ///
    /// Invariant violations are included; [`fault_count`] reports them alone.
    #[must_use]
    pub fn crash_count(world: &World) -> u32 {
        world.fleet.crash_count()
    }

    /// Crashes caused by a breached bookkeeping invariant.
    #[must_use]
    pub fn fault_count(world: &World) -> u32 {
        world.fleet.fault_count()
    }

    /// Number of live aircraft.
    #[must_use]
    pub fn aircraft_count(world: &World) -> usize {
        world.fleet.len()
    }

    /// Fuel stock currently held by the airport.
    #[must_use]
    pub fn fuel_stock(world: &World) -> u32 {
        world.airport.fuel_stock()
    }

    /// Position, phase and occupant of every terminal in index order.
    #[must_use]
    pub fn terminal_view(world: &World) -> Vec<TerminalSnapshot> {
        world.airport.terminal_view(&world.fleet)
    }

    /// Live terminal reservations ordered by aircraft.
    #[must_use]
    pub fn reservations(world: &World) -> Vec<(AircraftId, usize)> {
        world.tower.reservations().collect()
    }

    /// Catalogue of spawnable aircraft models, indexed by `AircraftTypeId`.
    #[must_use]
    pub fn aircraft_types(world: &World) -> &[Arc<AircraftType>] {
        &world.aircraft_types
    }

    /// Centre of the airport in world coordinates.
    #[must_use]
    pub fn airport_position(world: &World) -> Vec3 {
        world.airport.position()
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}
