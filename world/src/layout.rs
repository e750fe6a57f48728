//! Immutable airport templates that generate approach and departure paths.

use std::f32::consts::TAU;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tower_sim_core::{InvariantViolation, Path, Waypoint};

/// Height above the runway at which approaches start and departures end.
const RUNWAY_CLEARANCE: Vec3 = Vec3::new(0.0, 0.0, 0.7);
/// Radius of the circle departing aircraft head for after takeoff.
const DEPARTURE_RADIUS: f32 = 6.0;
/// Altitude of the post-takeoff point.
const DEPARTURE_ALTITUDE: Vec3 = Vec3::new(0.0, 0.0, 2.0);

/// Runway geometry relative to the airport position.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Runway {
    start: Vec3,
    end: Vec3,
}

impl Runway {
    /// Creates a runway of `length` running along the x-axis from `start`.
    #[must_use]
    pub fn new(start: Vec3, length: f32) -> Self {
        Self {
            start,
            end: start + Vec3::new(length, 0.0, 0.0),
        }
    }

    /// Threshold the aircraft touches down after.
    #[must_use]
    pub const fn start(&self) -> Vec3 {
        self.start
    }

    /// Far end of the runway.
    #[must_use]
    pub const fn end(&self) -> Vec3 {
        self.end
    }

    fn middle(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    fn half_length(&self) -> Vec3 {
        (self.end - self.start) * 0.5
    }
}

/// Fixed positions of an airport's runways, taxiway junctions and gates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirportLayout {
    crossing: Vec3,
    gateway: Vec3,
    terminals: Vec<Vec3>,
    runways: Vec<Runway>,
}

impl AirportLayout {
    /// Creates a layout from its taxiway junctions, gate positions and runways.
    #[must_use]
    pub fn new(crossing: Vec3, gateway: Vec3, terminals: Vec<Vec3>, runways: Vec<Runway>) -> Self {
        Self {
            crossing,
            gateway,
            terminals,
            runways,
        }
    }

    /// Single-runway airport with three gates.
    #[must_use]
    pub fn one_lane() -> Self {
        Self::new(
            Vec3::new(-0.1, -0.3, 0.0),
            Vec3::new(-0.6, 0.3, 0.0),
            vec![
                Vec3::new(0.3, 0.0, 0.0),
                Vec3::new(-0.3, 0.3, 0.0),
                Vec3::new(0.0, 0.55, 0.0),
            ],
            vec![Runway::new(Vec3::new(-0.5, -0.75, 0.0), 1.0)],
        )
    }

    /// Gate positions relative to the airport.
    #[must_use]
    pub fn terminals(&self) -> &[Vec3] {
        &self.terminals
    }

    /// Runways relative to the airport.
    #[must_use]
    pub fn runways(&self) -> &[Runway] {
        &self.runways
    }

    /// Path from the approach point in the air, along the runway and taxiways, to a gate.
    ///
    /// Gates other than the first are reached through the gateway so the
    /// aircraft does not taxi across the first gate.
    pub fn air_to_terminal(
        &self,
        offset: Vec3,
        runway: usize,
        terminal: usize,
    ) -> Result<Path, InvariantViolation> {
        let runway = self.runway(runway)?;
        let gate = self.terminal(terminal)?;

        let mut path: Path = vec![
            Waypoint::air(offset + runway.start - runway.half_length() + RUNWAY_CLEARANCE),
            Waypoint::ground(offset + runway.middle()),
            Waypoint::ground(offset + runway.end),
            Waypoint::ground(offset + self.crossing),
        ]
        .into();
        if terminal != 0 {
            path.push_back(Waypoint::ground(offset + self.gateway));
        }
        path.push_back(Waypoint::terminal(offset + gate));
        Ok(path)
    }

    /// Path from a gate, along the taxiways and runway, into the air.
    ///
    /// The final waypoint lies on a circle around the airport at a heading
    /// drawn from `rng`.
    pub fn terminal_to_air<R>(
        &self,
        offset: Vec3,
        runway: usize,
        terminal: usize,
        rng: &mut R,
    ) -> Result<Path, InvariantViolation>
    where
        R: Rng + ?Sized,
    {
        let runway = self.runway(runway)?;
        let _ = self.terminal(terminal)?;
        let angle: f32 = rng.gen_range(0.0..TAU);

        let mut path: Path = vec![
            Waypoint::ground(offset + self.crossing),
            Waypoint::ground(offset + runway.start),
            Waypoint::ground(offset + runway.middle()),
            Waypoint::air(offset + runway.end + runway.half_length() + RUNWAY_CLEARANCE),
            Waypoint::air(
                offset
                    + Vec3::new(angle.sin(), angle.cos(), 0.0) * DEPARTURE_RADIUS
                    + DEPARTURE_ALTITUDE,
            ),
        ]
        .into();
        if terminal != 0 {
            path.push_front(Waypoint::ground(offset + self.gateway));
        }
        Ok(path)
    }

    fn runway(&self, index: usize) -> Result<&Runway, InvariantViolation> {
        self.runways
            .get(index)
            .ok_or(InvariantViolation::RunwayOutOfRange {
                index,
                count: self.runways.len(),
            })
    }

    fn terminal(&self, index: usize) -> Result<Vec3, InvariantViolation> {
        self.terminals
            .get(index)
            .copied()
            .ok_or(InvariantViolation::TerminalOutOfRange {
                index,
                count: self.terminals.len(),
            })
    }
}

impl Default for AirportLayout {
    fn default() -> Self {
        Self::one_lane()
    }
}
