//! Terminals, runways and the shared fuel stock of one airport.

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_sim_core::{AircraftId, Event, InvariantViolation, Path, TerminalSnapshot};
use tracing::debug;

use crate::{layout::AirportLayout, manager::AircraftManager, terminal::Terminal};

/// Runway every generated path uses.
const MAIN_RUNWAY: usize = 0;

/// A placed airport: a layout template at a world position with live terminals.
#[derive(Clone, Debug)]
pub struct Airport {
    layout: AirportLayout,
    position: Vec3,
    terminals: Vec<Terminal>,
    fuel_stock: u32,
    rng: ChaCha8Rng,
    distance_threshold: f32,
}

impl Airport {
    /// Builds one terminal per layout gate; the terminal list never changes afterwards.
    #[must_use]
    pub fn new(
        layout: AirportLayout,
        position: Vec3,
        service_cycles: f32,
        distance_threshold: f32,
        departure_seed: u64,
    ) -> Self {
        let terminals = layout
            .terminals()
            .iter()
            .map(|gate| Terminal::new(position + *gate, service_cycles))
            .collect();
        Self {
            layout,
            position,
            terminals,
            fuel_stock: 0,
            rng: ChaCha8Rng::seed_from_u64(departure_seed),
            distance_threshold,
        }
    }

    /// Centre of the airport in world coordinates.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Terminals in index order.
    #[must_use]
    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    /// Looks up a terminal by index.
    pub fn terminal(&self, index: usize) -> Result<&Terminal, InvariantViolation> {
        self.terminals
            .get(index)
            .ok_or(InvariantViolation::TerminalOutOfRange {
                index,
                count: self.terminals.len(),
            })
    }

    fn terminal_mut(&mut self, index: usize) -> Result<&mut Terminal, InvariantViolation> {
        let count = self.terminals.len();
        self.terminals
            .get_mut(index)
            .ok_or(InvariantViolation::TerminalOutOfRange { index, count })
    }

    /// Fuel available for refuelling.
    #[must_use]
    pub const fn fuel_stock(&self) -> u32 {
        self.fuel_stock
    }

    /// Overwrites the fuel stock.
    pub fn set_fuel_stock(&mut self, stock: u32) {
        self.fuel_stock = stock;
    }

    /// Adds a delivery to the stock and returns the new stock.
    pub fn deliver_fuel(&mut self, amount: u32) -> u32 {
        self.fuel_stock = self.fuel_stock.saturating_add(amount);
        self.fuel_stock
    }

    /// Assigns the first idle terminal to `aircraft`.
    ///
    /// Returns the approach path to the terminal together with its index, or
    /// `None` when every terminal is in use.
    pub fn reserve_terminal(
        &mut self,
        aircraft: AircraftId,
    ) -> Result<Option<(Path, usize)>, InvariantViolation> {
        let Some(index) = self.terminals.iter().position(|terminal| !terminal.in_use()) else {
            return Ok(None);
        };

        let path = self
            .layout
            .air_to_terminal(self.position, MAIN_RUNWAY, index)?;
        self.terminal_mut(index)?.assign_craft(aircraft);
        debug!(%aircraft, terminal = index, "terminal assigned");
        Ok(Some((path, index)))
    }

    /// Builds a departure path from terminal `index` with a fresh heading.
    pub fn departure_path(&mut self, index: usize) -> Result<Path, InvariantViolation> {
        self.layout
            .terminal_to_air(self.position, MAIN_RUNWAY, index, &mut self.rng)
    }

    /// Starts servicing `aircraft`, which must be the occupant and at the gate.
    pub fn start_service(
        &mut self,
        index: usize,
        aircraft: AircraftId,
        position: Vec3,
    ) -> Result<(), InvariantViolation> {
        let threshold = self.distance_threshold;
        self.terminal_mut(index)?
            .start_service(index, aircraft, position, threshold)
    }

    /// Ends the occupant's service; does nothing while it is still servicing.
    pub fn finish_service(
        &mut self,
        index: usize,
        occupant_low_on_fuel: bool,
    ) -> Result<(), InvariantViolation> {
        self.terminal_mut(index)?.finish_service(occupant_low_on_fuel);
        Ok(())
    }

    /// Frees terminal `index` regardless of its service state.
    pub fn vacate(&mut self, index: usize) -> Result<(), InvariantViolation> {
        self.terminal_mut(index)?.vacate();
        Ok(())
    }

    /// Runs the per-tick refuel and service progress over all terminals in index order.
    pub fn service_terminals(&mut self, dt: f32, fleet: &mut AircraftManager, out: &mut Vec<Event>) {
        for terminal in &mut self.terminals {
            let occupant = terminal
                .occupant()
                .and_then(|id| fleet.get_mut(id));
            let low_on_fuel = match occupant {
                Some(aircraft) => {
                    let amount = terminal.refill(aircraft, &mut self.fuel_stock);
                    if amount > 0 {
                        out.push(Event::AircraftRefueled {
                            aircraft: aircraft.id(),
                            amount,
                        });
                    }
                    aircraft.is_low_on_fuel()
                }
                None => false,
            };
            terminal.advance(dt, low_on_fuel);
        }
    }

    /// Snapshot of every terminal in index order.
    #[must_use]
    pub fn terminal_view(&self, fleet: &AircraftManager) -> Vec<TerminalSnapshot> {
        self.terminals
            .iter()
            .enumerate()
            .map(|(index, terminal)| {
                let low_on_fuel = terminal
                    .occupant()
                    .and_then(|id| fleet.get(id))
                    .is_some_and(|aircraft| aircraft.is_low_on_fuel());
                TerminalSnapshot {
                    index,
                    position: terminal.position(),
                    state: terminal.state(low_on_fuel),
                    occupant: terminal.occupant(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sim_core::{AircraftType, FlightNumber, TerminalState, Tuning, WaypointKind};

    use super::*;
    use crate::aircraft::Aircraft;

    fn airport() -> Airport {
        Airport::new(AirportLayout::one_lane(), Vec3::ZERO, 40.0, 0.05, 1)
    }

    fn parked(id: u32, position: Vec3, fuel: f32) -> Aircraft {
        Aircraft::new(
            AircraftId::new(id),
            FlightNumber::new(format!("AF{}", 1000 + id)),
            Arc::new(AircraftType::new("test", 0.02, 0.05, 0.02, 1.0, 3_000)),
            position,
            Vec3::ZERO,
            fuel,
            &Tuning::default(),
        )
        .with_landing_gear(true)
    }

    #[test]
    fn reservation_is_first_fit_by_index() {
        let mut airport = airport();
        let (_, first) = airport
            .reserve_terminal(AircraftId::new(1))
            .expect("valid layout")
            .expect("free terminal");
        let (path, second) = airport
            .reserve_terminal(AircraftId::new(2))
            .expect("valid layout")
            .expect("free terminal");

        assert_eq!((first, second), (0, 1));
        assert_eq!(path.back().map(|wp| wp.kind()), Some(WaypointKind::Terminal));
        assert_eq!(
            airport.terminal(1).expect("in range").occupant(),
            Some(AircraftId::new(2))
        );

        let _ = airport.reserve_terminal(AircraftId::new(3)).expect("valid layout");
        assert_eq!(
            airport.reserve_terminal(AircraftId::new(4)),
            Ok(None),
            "all three gates are taken"
        );

        airport.vacate(0).expect("in range");
        let (_, reused) = airport
            .reserve_terminal(AircraftId::new(5))
            .expect("valid layout")
            .expect("free terminal");
        assert_eq!(reused, 0);
    }

    #[test]
    fn short_stock_is_emptied_into_the_first_terminal() {
        let mut airport = airport();
        let mut fleet = AircraftManager::new();
        let gate = airport.terminals()[0].position();
        // Five short of a full tank and under the 160 unit reserve.
        let aircraft = Aircraft::new(
            AircraftId::new(1),
            FlightNumber::new("AF1001"),
            Arc::new(AircraftType::new("small", 0.02, 0.05, 0.02, 1.0, 155)),
            gate,
            Vec3::ZERO,
            150.0,
            &Tuning::default(),
        )
        .with_landing_gear(true);
        fleet.add(aircraft);
        let _ = airport.reserve_terminal(AircraftId::new(1)).expect("valid layout");
        airport
            .start_service(0, AircraftId::new(1), gate)
            .expect("at the gate");
        airport.set_fuel_stock(3);

        let mut events = Vec::new();
        airport.service_terminals(1.0, &mut fleet, &mut events);

        assert_eq!(airport.fuel_stock(), 0);
        let fuel = fleet.get(AircraftId::new(1)).expect("alive").fuel();
        assert!((fuel - 153.0).abs() < f32::EPSILON);
        assert_eq!(
            events,
            vec![Event::AircraftRefueled {
                aircraft: AircraftId::new(1),
                amount: 3,
            }]
        );
    }

    #[test]
    fn lower_index_terminals_refuel_first() {
        let mut airport = airport();
        let mut fleet = AircraftManager::new();
        for (id, index) in [(1, 0), (2, 1)] {
            let gate = airport.terminals()[index].position();
            fleet.add(parked(id, gate, 100.0));
            let _ = airport.reserve_terminal(AircraftId::new(id)).expect("valid layout");
            airport
                .start_service(index, AircraftId::new(id), gate)
                .expect("at the gate");
        }
        airport.set_fuel_stock(3_000);

        let mut events = Vec::new();
        airport.service_terminals(1.0, &mut fleet, &mut events);

        assert_eq!(
            events,
            vec![
                Event::AircraftRefueled {
                    aircraft: AircraftId::new(1),
                    amount: 2_900,
                },
                Event::AircraftRefueled {
                    aircraft: AircraftId::new(2),
                    amount: 100,
                },
            ]
        );
        assert_eq!(airport.fuel_stock(), 0);
        let view = airport.terminal_view(&fleet);
        assert_eq!(view[0].state, TerminalState::Servicing);
        assert_eq!(view[1].occupant, Some(AircraftId::new(2)));
        assert_eq!(view[2].state, TerminalState::Idle);
    }

    #[test]
    fn deliveries_saturate() {
        let mut airport = airport();
        airport.set_fuel_stock(u32::MAX - 1);
        assert_eq!(airport.deliver_fuel(10), u32::MAX);
    }

    #[test]
    fn unknown_terminal_indices_are_rejected() {
        let mut airport = airport();
        assert_eq!(
            airport.start_service(7, AircraftId::new(1), Vec3::ZERO),
            Err(InvariantViolation::TerminalOutOfRange { index: 7, count: 3 })
        );
        assert!(airport.departure_path(3).is_err());
    }
}
