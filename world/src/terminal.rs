//! Single-gate servicing state machine.

use glam::Vec3;
use tower_sim_core::{geometry::distance, AircraftId, InvariantViolation, TerminalState};

use crate::aircraft::Aircraft;

/// A gate that services one aircraft at a time.
///
/// The terminal only stores the handle of its occupant. Operations that
/// depend on the occupant's fuel level receive it from the caller, which
/// resolves the handle against the fleet.
#[derive(Clone, Debug)]
pub struct Terminal {
    position: Vec3,
    service_cycles: f32,
    service_progress: f32,
    occupant: Option<AircraftId>,
    arrived: bool,
}

impl Terminal {
    /// Creates an idle terminal that needs `service_cycles` to turn an aircraft around.
    #[must_use]
    pub fn new(position: Vec3, service_cycles: f32) -> Self {
        Self {
            position,
            service_cycles,
            service_progress: service_cycles,
            occupant: None,
            arrived: false,
        }
    }

    /// Gate position in airport coordinates.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Aircraft assigned to the gate, if any.
    #[must_use]
    pub const fn occupant(&self) -> Option<AircraftId> {
        self.occupant
    }

    /// Reports whether an aircraft is assigned to the gate.
    #[must_use]
    pub const fn in_use(&self) -> bool {
        self.occupant.is_some()
    }

    /// Reports whether the occupant must stay at the gate.
    ///
    /// Servicing lasts at least `service_cycles` and is extended for as long
    /// as the occupant is low on fuel.
    #[must_use]
    pub fn is_servicing(&self, occupant_low_on_fuel: bool) -> bool {
        self.service_progress < self.service_cycles || (self.in_use() && occupant_low_on_fuel)
    }

    /// Current phase of the servicing cycle.
    #[must_use]
    pub fn state(&self, occupant_low_on_fuel: bool) -> TerminalState {
        if !self.in_use() {
            TerminalState::Idle
        } else if !self.arrived {
            TerminalState::Reserved
        } else if self.is_servicing(occupant_low_on_fuel) {
            TerminalState::Servicing
        } else {
            TerminalState::Done
        }
    }

    /// Assigns the gate to an aircraft that is on its way.
    ///
    /// Service progress is left untouched until the aircraft arrives.
    pub fn assign_craft(&mut self, aircraft: AircraftId) {
        self.occupant = Some(aircraft);
        self.arrived = false;
    }

    /// Starts servicing the occupant once it has reached the gate.
    pub fn start_service(
        &mut self,
        index: usize,
        aircraft: AircraftId,
        position: Vec3,
        threshold: f32,
    ) -> Result<(), InvariantViolation> {
        if self.occupant != Some(aircraft) {
            return Err(InvariantViolation::NotOccupant {
                aircraft,
                terminal: index,
            });
        }

        let remaining = distance(position, self.position);
        if remaining >= threshold {
            return Err(InvariantViolation::NotAtTerminal {
                aircraft,
                terminal: index,
                distance: format!("{remaining:.3}"),
            });
        }

        self.service_progress = 0.0;
        self.arrived = true;
        Ok(())
    }

    /// Releases the occupant once servicing is over; does nothing while still servicing.
    pub fn finish_service(&mut self, occupant_low_on_fuel: bool) {
        if self.is_servicing(occupant_low_on_fuel) {
            return;
        }
        self.occupant = None;
        self.arrived = false;
    }

    /// Frees the gate immediately, abandoning any service in progress.
    pub fn vacate(&mut self) {
        self.occupant = None;
        self.arrived = false;
        self.service_progress = self.service_cycles;
    }

    /// Advances service progress while an aircraft is being serviced.
    pub fn advance(&mut self, dt: f32, occupant_low_on_fuel: bool) {
        if self.in_use() && self.is_servicing(occupant_low_on_fuel) {
            self.service_progress += dt;
        }
    }

    /// Tops up the occupant from the shared stock if it arrived low on fuel.
    ///
    /// Returns the amount transferred.
    pub fn refill(&self, aircraft: &mut Aircraft, fuel_stock: &mut u32) -> u32 {
        if !self.arrived || self.occupant != Some(aircraft.id()) || !aircraft.is_low_on_fuel() {
            return 0;
        }
        aircraft.refill(fuel_stock)
    }
}
