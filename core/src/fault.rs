//! Failure kinds raised while advancing an aircraft.

use thiserror::Error;

use crate::{geometry::GeometryError, AircraftId, FlightNumber};

/// Failures that end an aircraft's update for the current tick.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Fault {
    /// The aircraft touched the ground without its landing gear deployed.
    #[error("{flight} crashed into the ground")]
    GroundWithoutGear {
        /// Flight number of the crashed aircraft.
        flight: FlightNumber,
    },
    /// A bookkeeping invariant did not hold; this signals a defect.
    #[error(transparent)]
    InvariantViolation(#[from] InvariantViolation),
}

/// Invariants whose breach reveals a programming error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The tower holds no reservation for an aircraft that needs one.
    #[error("no terminal reservation for aircraft {0}")]
    MissingReservation(AircraftId),
    /// A reservation was requested for a terminal already held by another aircraft.
    #[error("terminal {terminal} is already reserved by aircraft {holder}")]
    TerminalTaken {
        /// Index of the contested terminal.
        terminal: usize,
        /// Aircraft currently holding the terminal.
        holder: AircraftId,
    },
    /// An aircraft asked for a second terminal while still holding one.
    #[error("aircraft {aircraft} already holds terminal {terminal}")]
    AlreadyReserved {
        /// Aircraft holding the reservation.
        aircraft: AircraftId,
        /// Terminal it holds.
        terminal: usize,
    },
    /// A layout was asked for a runway it does not have.
    #[error("runway {index} out of range for a layout with {count} runways")]
    RunwayOutOfRange {
        /// Requested runway index.
        index: usize,
        /// Number of runways in the layout.
        count: usize,
    },
    /// A layout or airport was asked for a terminal it does not have.
    #[error("terminal {index} out of range for a layout with {count} terminals")]
    TerminalOutOfRange {
        /// Requested terminal index.
        index: usize,
        /// Number of terminals in the layout.
        count: usize,
    },
    /// An aircraft tried to use a terminal assigned to someone else.
    #[error("aircraft {aircraft} does not occupy terminal {terminal}")]
    NotOccupant {
        /// Aircraft that attempted the operation.
        aircraft: AircraftId,
        /// Terminal involved in the operation.
        terminal: usize,
    },
    /// Servicing started while the aircraft was still away from the gate.
    #[error("aircraft {aircraft} is {distance} away from terminal {terminal}")]
    NotAtTerminal {
        /// Aircraft that reported arrival.
        aircraft: AircraftId,
        /// Terminal the aircraft reported arriving at.
        terminal: usize,
        /// Remaining distance, formatted for diagnostics.
        distance: String,
    },
    /// A geometric operation received degenerate input.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
