//! Per-aircraft flight dynamics, fuel and landing-gear state machine.

use std::{cmp::Ordering, f32::consts::TAU, sync::Arc};

use glam::Vec3;
use tower_sim_core::{
    geometry::{cap_length, distance, normalize_to, project_2d, GeometryError},
    AircraftId, AircraftSnapshot, AircraftType, Fault, FlightNumber, InvariantViolation, Path,
    RemovalReason, Tuning, NUM_AIRCRAFT_TILES,
};
use tracing::debug;

/// Controller an aircraft consults for paths and reports its progress to.
///
/// The tower implements this for live simulation; tests may script it.
pub trait Control {
    /// Called when the aircraft has run out of waypoints.
    fn instructions(&mut self, aircraft: &Aircraft) -> Result<Instruction, Fault>;

    /// Called every tick while the aircraft is circling; a granted path replaces the current one.
    fn reserve_terminal(&mut self, aircraft: &Aircraft) -> Result<Option<Path>, Fault>;

    /// Called when the aircraft reaches its terminal waypoint.
    fn arrived_at_terminal(&mut self, aircraft: &Aircraft) -> Result<(), Fault>;

    /// Called once the aircraft has been taken out of the simulation.
    fn aircraft_removed(&mut self, aircraft: &Aircraft, reason: RemovalReason);
}

/// Answer to an aircraft that asked for new waypoints.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// Remain where you are for another tick.
    Stay,
    /// Fly the provided path.
    Follow(Path),
    /// Leave the terminal along the provided path.
    Depart(Path),
}

/// Outcome of advancing an aircraft by one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// The aircraft stays in the simulation.
    Continue,
    /// The aircraft ran out of fuel and must be removed.
    FuelExhausted,
    /// The aircraft lifted off and must be removed.
    LiftedOff,
}

impl Progress {
    /// Reports whether the aircraft must leave the simulation.
    #[must_use]
    pub const fn is_removal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// A single aircraft flying, taxiing or parked around the airport.
#[derive(Clone, Debug)]
pub struct Aircraft {
    id: AircraftId,
    flight_number: FlightNumber,
    kind: Arc<AircraftType>,
    position: Vec3,
    velocity: Vec3,
    fuel: f32,
    min_fuel: f32,
    path: Path,
    landing_gear_deployed: bool,
    at_terminal: bool,
}

impl Aircraft {
    /// Creates an airborne aircraft with retracted gear and no path.
    #[must_use]
    pub fn new(
        id: AircraftId,
        flight_number: FlightNumber,
        kind: Arc<AircraftType>,
        position: Vec3,
        velocity: Vec3,
        fuel: f32,
        tuning: &Tuning,
    ) -> Self {
        let min_fuel = kind.min_fuel(tuning.low_fuel_reserve_ticks);
        Self {
            id,
            flight_number,
            kind,
            position,
            velocity,
            fuel,
            min_fuel,
            path: Path::new(),
            landing_gear_deployed: false,
            at_terminal: false,
        }
    }

    /// Replaces the queued path.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }

    /// Sets the landing gear state.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_landing_gear(mut self, deployed: bool) -> Self {
        self.landing_gear_deployed = deployed;
        self
    }

    /// Identifier allocated by the world.
    #[must_use]
    pub const fn id(&self) -> AircraftId {
        self.id
    }

    /// Flight number carried by the aircraft.
    #[must_use]
    pub fn flight_number(&self) -> &FlightNumber {
        &self.flight_number
    }

    /// Model of the aircraft.
    #[must_use]
    pub fn kind(&self) -> &AircraftType {
        &self.kind
    }

    /// Current position in airport coordinates.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    /// Current velocity in units per tick.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Remaining fuel.
    #[must_use]
    pub const fn fuel(&self) -> f32 {
        self.fuel
    }

    /// Waypoints still to be flown.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Indicates whether the landing gear is deployed.
    #[must_use]
    pub const fn landing_gear_deployed(&self) -> bool {
        self.landing_gear_deployed
    }

    /// Indicates whether the aircraft is parked at its terminal.
    #[must_use]
    pub const fn is_at_terminal(&self) -> bool {
        self.at_terminal
    }

    /// Current scalar speed.
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Aircraft below the arrival threshold altitude are on the ground.
    #[must_use]
    pub fn is_on_ground(&self, tuning: &Tuning) -> bool {
        self.position.z < tuning.distance_threshold
    }

    /// Reports whether the fuel level dropped below the type's reserve.
    #[must_use]
    pub fn is_low_on_fuel(&self) -> bool {
        self.fuel < self.min_fuel
    }

    /// Fuel needed to fill the tank, truncated to whole units.
    #[must_use]
    pub fn missing_fuel(&self) -> u32 {
        (self.kind.max_fuel as f32 - self.fuel).max(0.0) as u32
    }

    /// Reports whether the aircraft is flying a loop with no landing queued.
    #[must_use]
    pub fn is_circling(&self) -> bool {
        self.path
            .back()
            .is_some_and(|waypoint| !waypoint.is_on_ground())
            && !self.landing_gear_deployed
    }

    /// Reports whether the aircraft is bound for, or parked at, a terminal.
    #[must_use]
    pub fn has_terminal(&self) -> bool {
        self.at_terminal || self.path.back().is_some_and(|waypoint| waypoint.is_terminal())
    }

    /// Ordering used to decide which aircraft moves first in a tick.
    ///
    /// Aircraft with a terminal go first, then the ones with the least fuel.
    #[must_use]
    pub fn priority_cmp(&self, other: &Self) -> Ordering {
        other
            .has_terminal()
            .cmp(&self.has_terminal())
            .then_with(|| self.fuel.total_cmp(&other.fuel))
    }

    /// Transfers fuel from `fuel_stock` into the tank and returns the amount moved.
    ///
    /// A stock too small to fill the tank is emptied into it.
    pub fn refill(&mut self, fuel_stock: &mut u32) -> u32 {
        let amount = self.missing_fuel().min(*fuel_stock);
        self.fuel += amount as f32;
        *fuel_stock -= amount;
        amount
    }

    /// Sprite tile matching the direction of travel.
    #[must_use]
    pub fn orientation(&self) -> u32 {
        let speed = self.speed();
        if speed <= 0.0 {
            return 0;
        }

        let direction = self.velocity / speed;
        let heading = direction.x.clamp(-1.0, 1.0).acos();
        let angle = if direction.y > 0.0 { TAU - heading } else { heading };
        let tiles = NUM_AIRCRAFT_TILES as f32;
        ((angle * tiles / TAU).round() as u32 + 1) % NUM_AIRCRAFT_TILES
    }

    /// Captures the state a renderer needs to draw the aircraft.
    #[must_use]
    pub fn snapshot(&self) -> AircraftSnapshot {
        AircraftSnapshot {
            id: self.id,
            flight_number: self.flight_number.clone(),
            type_name: self.kind.name.clone(),
            sprite: self.kind.sprite.clone(),
            position: self.position,
            screen_position: project_2d(self.position),
            orientation: self.orientation(),
            fuel: self.fuel,
            gear_deployed: self.landing_gear_deployed,
            at_terminal: self.at_terminal,
        }
    }

    /// Advances the aircraft by `dt` ticks.
    pub fn advance<C>(&mut self, dt: f32, tuning: &Tuning, control: &mut C) -> Result<Progress, Fault>
    where
        C: Control + ?Sized,
    {
        if self.fuel <= 0.0 {
            return Ok(Progress::FuelExhausted);
        }

        let on_ground = self.is_on_ground(tuning);
        let burn = if on_ground {
            tuning.taxi_fuel_factor
        } else {
            self.speed() / self.max_speed(on_ground)
        };
        self.fuel -= dt * self.kind.fuel_consumption * burn;

        if self.path.is_empty() {
            match control.instructions(self)? {
                Instruction::Stay => {}
                Instruction::Follow(path) => self.path = path,
                Instruction::Depart(path) => {
                    self.at_terminal = false;
                    self.path = path;
                }
            }
        }

        if self.is_circling() {
            if let Some(path) = control.reserve_terminal(self)? {
                self.path = path;
            }
        }

        if self.at_terminal {
            return Ok(Progress::Continue);
        }

        self.turn_to_waypoint(on_ground)
            .map_err(InvariantViolation::from)?;
        self.position += self.velocity * dt;

        if let Some(next) = self.path.front().copied() {
            if distance(self.position, next.position()) < tuning.distance_threshold {
                if next.is_terminal() {
                    control.arrived_at_terminal(self)?;
                    self.at_terminal = true;
                } else if self.operate_landing_gear() {
                    return Ok(Progress::LiftedOff);
                }
                let _ = self.path.pop_front();
            }
        }

        let on_ground = self.is_on_ground(tuning);
        if on_ground && !self.landing_gear_deployed {
            return Err(Fault::GroundWithoutGear {
                flight: self.flight_number.clone(),
            });
        }

        let speed = self.speed();
        if !on_ground && speed < tuning.speed_threshold {
            self.position.z -= tuning.sink_factor * (tuning.speed_threshold - speed);
        }

        Ok(Progress::Continue)
    }

    fn max_speed(&self, on_ground: bool) -> f32 {
        if on_ground {
            self.kind.max_ground_speed
        } else {
            self.kind.max_air_speed
        }
    }

    fn turn_to_waypoint(&mut self, on_ground: bool) -> Result<(), GeometryError> {
        let Some(first) = self.path.front().map(|waypoint| waypoint.position()) else {
            return Ok(());
        };

        let mut target = first;
        if let Some(second) = self.path.second().map(|waypoint| waypoint.position()) {
            if first != second {
                let half_distance = distance(self.position, first) / 2.0;
                target += normalize_to(first - second, half_distance)?;
            }
        }

        let turn = cap_length(target - self.position - self.velocity, self.kind.max_accel);
        self.velocity = cap_length(self.velocity + turn, self.max_speed(on_ground));
        Ok(())
    }

    // Deploys or retracts the gear based on the leg between the next two waypoints.
    // Returns true when that leg is a liftoff.
    fn operate_landing_gear(&mut self) -> bool {
        let (Some(current), Some(next)) = (self.path.front(), self.path.second()) else {
            return false;
        };
        let ground_before = current.is_on_ground();
        let ground_after = next.is_on_ground();

        if ground_before && !ground_after {
            debug!(flight = %self.flight_number, "lift off");
            return true;
        }

        if !ground_before && ground_after {
            debug!(flight = %self.flight_number, "landing");
            self.landing_gear_deployed = true;
        } else if !ground_before {
            self.landing_gear_deployed = false;
        }
        false
    }
}
