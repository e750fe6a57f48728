#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tower simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically.

pub mod geometry;

mod aircraft_type;
mod fault;
mod tuning;
mod waypoint;

use std::fmt;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

pub use aircraft_type::{AircraftType, AircraftTypeId};
pub use fault::{Fault, InvariantViolation};
pub use tuning::{Tuning, NUM_AIRCRAFT_TILES};
pub use waypoint::{Path, Waypoint, WaypointKind};

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation by the provided amount of simulated time.
    Tick {
        /// Elapsed simulated time, measured in ticks.
        dt: f32,
    },
    /// Requests that a new aircraft enter the airspace.
    SpawnAircraft {
        /// Flight number to assign; must not collide with a live aircraft.
        flight_number: FlightNumber,
        /// Catalogue entry describing the aircraft model.
        aircraft_type: AircraftTypeId,
        /// Initial position in airport coordinates.
        position: Vec3,
        /// Initial velocity in units per tick.
        velocity: Vec3,
        /// Initial fuel level.
        fuel: f32,
    },
    /// Adds fuel to the airport's shared stock.
    DeliverFuel {
        /// Amount of fuel delivered.
        amount: u32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Simulated time that elapsed in the tick.
        dt: f32,
    },
    /// Confirms that an aircraft entered the simulation.
    AircraftSpawned {
        /// Identifier allocated by the world.
        aircraft: AircraftId,
        /// Flight number assigned to the aircraft.
        flight_number: FlightNumber,
    },
    /// Reports that a spawn request was rejected.
    SpawnRejected {
        /// Flight number provided in the request.
        flight_number: FlightNumber,
        /// Specific reason the spawn failed.
        reason: SpawnError,
    },
    /// Confirms that the tower reserved a terminal for an aircraft.
    TerminalReserved {
        /// Aircraft holding the reservation.
        aircraft: AircraftId,
        /// Index of the reserved terminal.
        terminal: usize,
    },
    /// Announces that an aircraft reached its gate and servicing began.
    ServiceStarted {
        /// Aircraft being serviced.
        aircraft: AircraftId,
        /// Terminal performing the service.
        terminal: usize,
    },
    /// Announces that an aircraft left its gate with a departure path.
    ServiceFinished {
        /// Aircraft that was serviced.
        aircraft: AircraftId,
        /// Terminal that became idle.
        terminal: usize,
    },
    /// Reports fuel transferred from the airport stock into an aircraft.
    AircraftRefueled {
        /// Aircraft that received fuel.
        aircraft: AircraftId,
        /// Amount transferred.
        amount: u32,
    },
    /// Confirms that an aircraft left the simulation.
    AircraftRemoved {
        /// Aircraft that was removed.
        aircraft: AircraftId,
        /// Flight number the aircraft carried.
        flight_number: FlightNumber,
        /// Why the aircraft was removed.
        reason: RemovalReason,
    },
    /// Confirms that fuel was added to the airport stock.
    FuelDelivered {
        /// Amount of fuel delivered.
        amount: u32,
        /// Stock after the delivery.
        stock: u32,
    },
}

/// Reasons an aircraft leaves the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalReason {
    /// The aircraft ran out of fuel.
    FuelExhausted,
    /// The aircraft took off and left the airport.
    LiftedOff,
    /// The aircraft hit the ground without its landing gear.
    Crashed,
    /// The aircraft's update breached a bookkeeping invariant.
    Faulted,
}

/// Reasons a spawn request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnError {
    /// The requested aircraft type is not in the catalogue.
    UnknownType,
    /// A live aircraft already carries the requested flight number.
    DuplicateFlightNumber,
}

/// Unique identifier assigned to an aircraft for as long as it is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AircraftId(u32);

impl AircraftId {
    /// Creates a new aircraft identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AircraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flight number made of a carrier code followed by digits, e.g. `AF1234`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightNumber(String);

impl FlightNumber {
    /// Wraps the provided flight number.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the flight number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reports whether the flight is operated by the carrier with the given code.
    #[must_use]
    pub fn is_operated_by(&self, carrier: &str) -> bool {
        self.0.starts_with(carrier)
    }
}

impl fmt::Display for FlightNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Observable phase of a terminal's servicing cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalState {
    /// No aircraft is assigned.
    Idle,
    /// An aircraft is assigned but servicing has not started yet.
    Reserved,
    /// The assigned aircraft is being serviced.
    Servicing,
    /// Servicing completed; the aircraft awaits its departure path.
    Done,
}

/// Immutable representation of a single aircraft used by renderers.
#[derive(Clone, Debug, PartialEq)]
pub struct AircraftSnapshot {
    /// Identifier allocated by the world.
    pub id: AircraftId,
    /// Flight number carried by the aircraft.
    pub flight_number: FlightNumber,
    /// Model name of the aircraft type.
    pub type_name: String,
    /// Sprite key of the aircraft type.
    pub sprite: String,
    /// Position in airport coordinates.
    pub position: Vec3,
    /// Position projected onto the isometric screen plane.
    pub screen_position: Vec2,
    /// Sprite tile matching the direction of travel, in `0..NUM_AIRCRAFT_TILES`.
    pub orientation: u32,
    /// Remaining fuel.
    pub fuel: f32,
    /// Indicates whether the landing gear is deployed.
    pub gear_deployed: bool,
    /// Indicates whether the aircraft is parked at a terminal.
    pub at_terminal: bool,
}

/// Read-only snapshot describing all live aircraft.
#[derive(Clone, Debug, Default)]
pub struct AircraftView {
    snapshots: Vec<AircraftSnapshot>,
}

impl AircraftView {
    /// Creates a new aircraft view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<AircraftSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &AircraftSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<AircraftSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single terminal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerminalSnapshot {
    /// Index of the terminal within the airport.
    pub index: usize,
    /// Gate position in airport coordinates.
    pub position: Vec3,
    /// Current servicing phase.
    pub state: TerminalState,
    /// Aircraft assigned to the terminal, if any.
    pub occupant: Option<AircraftId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carrier_prefix_matches_flight_number() {
        let flight = FlightNumber::new("KL4821");
        assert!(flight.is_operated_by("KL"));
        assert!(!flight.is_operated_by("LH"));
        assert!(flight.is_operated_by(""));
    }

    #[test]
    fn aircraft_view_orders_by_identifier() {
        let snapshot = |id| AircraftSnapshot {
            id: AircraftId::new(id),
            flight_number: FlightNumber::new(format!("AF{id}")),
            type_name: "l1011".to_owned(),
            sprite: "l1011".to_owned(),
            position: Vec3::ZERO,
            screen_position: Vec2::ZERO,
            orientation: 0,
            fuel: 100.0,
            gear_deployed: false,
            at_terminal: false,
        };

        let view = AircraftView::from_snapshots(vec![snapshot(7), snapshot(2), snapshot(5)]);
        let ids: Vec<u32> = view.iter().map(|snapshot| snapshot.id.get()).collect();
        assert_eq!(ids, vec![2, 5, 7]);
    }
}
