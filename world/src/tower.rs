//! Terminal reservation ledger and the instructions handed to aircraft.

use std::collections::BTreeMap;

use glam::Vec3;
use tower_sim_core::{
    geometry::distance, AircraftId, Event, Fault, InvariantViolation, Path, RemovalReason,
    Waypoint,
};
use tracing::{debug, error, info};

use crate::{
    aircraft::{Aircraft, Control, Instruction},
    airport::Airport,
};

/// Corners of the holding loop relative to the airport, flown in order.
const HOLDING_PATTERN: [Vec3; 4] = [
    Vec3::new(-1.5, -1.5, 0.5),
    Vec3::new(1.5, -1.5, 0.5),
    Vec3::new(1.5, 1.5, 0.5),
    Vec3::new(-1.5, 1.5, 0.5),
];

/// Controller that hands out terminals and paths for one airport.
///
/// No terminal index appears twice in the reservation ledger.
#[derive(Clone, Debug)]
pub struct Tower {
    reservations: BTreeMap<AircraftId, usize>,
    holding_radius: f32,
}

impl Tower {
    /// Creates a tower that keeps aircraft at or beyond `holding_radius` in the holding loop.
    #[must_use]
    pub fn new(holding_radius: f32) -> Self {
        Self {
            reservations: BTreeMap::new(),
            holding_radius,
        }
    }

    /// Terminal reserved for `aircraft`, if any.
    #[must_use]
    pub fn reservation(&self, aircraft: AircraftId) -> Option<usize> {
        self.reservations.get(&aircraft).copied()
    }

    /// All live reservations ordered by aircraft.
    pub fn reservations(&self) -> impl Iterator<Item = (AircraftId, usize)> + '_ {
        self.reservations
            .iter()
            .map(|(aircraft, terminal)| (*aircraft, *terminal))
    }

    /// Four point air loop around `center`.
    #[must_use]
    pub fn holding_pattern(center: Vec3) -> Path {
        HOLDING_PATTERN
            .iter()
            .map(|corner| Waypoint::air(center + *corner))
            .collect()
    }

    /// Decides what an aircraft with an exhausted path does next.
    pub fn instructions(
        &mut self,
        airport: &mut Airport,
        aircraft: &Aircraft,
        events: &mut Vec<Event>,
    ) -> Result<Instruction, Fault> {
        let id = aircraft.id();

        if aircraft.is_at_terminal() {
            let terminal = self
                .reservation(id)
                .ok_or(InvariantViolation::MissingReservation(id))?;
            let low_on_fuel = aircraft.is_low_on_fuel();
            if airport.terminal(terminal)?.is_servicing(low_on_fuel) {
                return Ok(Instruction::Stay);
            }

            let departure = airport.departure_path(terminal)?;
            airport.finish_service(terminal, low_on_fuel)?;
            let _ = self.reservations.remove(&id);
            info!(flight = %aircraft.flight_number(), terminal, "cleared for departure");
            events.push(Event::ServiceFinished {
                aircraft: id,
                terminal,
            });
            return Ok(Instruction::Depart(departure));
        }

        if !self.is_near(airport, aircraft) {
            debug!(flight = %aircraft.flight_number(), "holding outside the approach radius");
            return Ok(Instruction::Follow(Self::holding_pattern(airport.position())));
        }

        match self.try_reserve(airport, aircraft, events)? {
            Some(path) => Ok(Instruction::Follow(path)),
            None => {
                debug!(flight = %aircraft.flight_number(), "no free terminal, holding");
                Ok(Instruction::Follow(Self::holding_pattern(airport.position())))
            }
        }
    }

    /// Offers a terminal to a circling aircraft if it is close enough and one is free.
    pub fn reserve_terminal(
        &mut self,
        airport: &mut Airport,
        aircraft: &Aircraft,
        events: &mut Vec<Event>,
    ) -> Result<Option<Path>, Fault> {
        if aircraft.has_terminal() || !self.is_near(airport, aircraft) {
            return Ok(None);
        }
        Ok(self.try_reserve(airport, aircraft, events)?)
    }

    /// Starts servicing an aircraft that reached its reserved terminal.
    pub fn arrived_at_terminal(
        &mut self,
        airport: &mut Airport,
        aircraft: &Aircraft,
        events: &mut Vec<Event>,
    ) -> Result<(), Fault> {
        let id = aircraft.id();
        let terminal = self
            .reservation(id)
            .ok_or(InvariantViolation::MissingReservation(id))?;
        airport.start_service(terminal, id, aircraft.position())?;
        info!(flight = %aircraft.flight_number(), terminal, "service started");
        events.push(Event::ServiceStarted {
            aircraft: id,
            terminal,
        });
        Ok(())
    }

    /// Drops the reservation of `aircraft` and frees its terminal.
    ///
    /// Returns the terminal that was released.
    pub fn release(
        &mut self,
        airport: &mut Airport,
        aircraft: AircraftId,
    ) -> Result<Option<usize>, InvariantViolation> {
        let Some(terminal) = self.reservations.remove(&aircraft) else {
            return Ok(None);
        };
        airport.vacate(terminal)?;
        Ok(Some(terminal))
    }

    fn is_near(&self, airport: &Airport, aircraft: &Aircraft) -> bool {
        distance(aircraft.position(), airport.position()) < self.holding_radius
    }

    fn try_reserve(
        &mut self,
        airport: &mut Airport,
        aircraft: &Aircraft,
        events: &mut Vec<Event>,
    ) -> Result<Option<Path>, InvariantViolation> {
        let id = aircraft.id();
        if let Some(terminal) = self.reservation(id) {
            return Err(InvariantViolation::AlreadyReserved {
                aircraft: id,
                terminal,
            });
        }

        let Some((path, terminal)) = airport.reserve_terminal(id)? else {
            return Ok(None);
        };
        if let Some((holder, _)) = self.reservations().find(|(_, held)| *held == terminal) {
            // Undo the assignment; the airport saw this terminal as idle.
            airport.vacate(terminal)?;
            return Err(InvariantViolation::TerminalTaken { terminal, holder });
        }

        let _ = self.reservations.insert(id, terminal);
        debug!(flight = %aircraft.flight_number(), terminal, "terminal reserved");
        events.push(Event::TerminalReserved {
            aircraft: id,
            terminal,
        });
        Ok(Some(path))
    }
}

/// [`Control`] implementation backed by a tower, its airport and an event sink.
#[derive(Debug)]
pub struct TowerControl<'a> {
    tower: &'a mut Tower,
    airport: &'a mut Airport,
    events: &'a mut Vec<Event>,
}

impl<'a> TowerControl<'a> {
    /// Bundles the collaborators an aircraft talks to during a tick.
    pub fn new(tower: &'a mut Tower, airport: &'a mut Airport, events: &'a mut Vec<Event>) -> Self {
        Self {
            tower,
            airport,
            events,
        }
    }
}

impl Control for TowerControl<'_> {
    fn instructions(&mut self, aircraft: &Aircraft) -> Result<Instruction, Fault> {
        self.tower.instructions(self.airport, aircraft, self.events)
    }

    fn reserve_terminal(&mut self, aircraft: &Aircraft) -> Result<Option<Path>, Fault> {
        self.tower.reserve_terminal(self.airport, aircraft, self.events)
    }

    fn arrived_at_terminal(&mut self, aircraft: &Aircraft) -> Result<(), Fault> {
        self.tower.arrived_at_terminal(self.airport, aircraft, self.events)
    }

    fn aircraft_removed(&mut self, aircraft: &Aircraft, reason: RemovalReason) {
        if let Err(violation) = self.tower.release(self.airport, aircraft.id()) {
            error!(aircraft = %aircraft.id(), %violation, "failed to release terminal");
        }
        self.events.push(Event::AircraftRemoved {
            aircraft: aircraft.id(),
            flight_number: aircraft.flight_number().clone(),
            reason,
        });
    }
}
