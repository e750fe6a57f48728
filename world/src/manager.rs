//! Owner of the live aircraft population.

use tower_sim_core::{AircraftId, Fault, FlightNumber, RemovalReason, Tuning};
use tracing::{debug, error, info};

use crate::aircraft::{Aircraft, Control, Progress};

/// Orders, advances and retires every live aircraft.
#[derive(Clone, Debug, Default)]
pub struct AircraftManager {
    aircraft: Vec<Aircraft>,
    crash_count: u32,
    fault_count: u32,
}

impl AircraftManager {
    /// Creates an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of a newly spawned aircraft.
    pub fn add(&mut self, aircraft: Aircraft) {
        self.aircraft.push(aircraft);
    }

    /// Advances every aircraft by `dt`, highest priority first.
    ///
    /// Each aircraft is isolated: a fault removes only the aircraft that
    /// raised it and the rest of the tick proceeds.
    pub fn advance<C>(&mut self, dt: f32, tuning: &Tuning, control: &mut C)
    where
        C: Control + ?Sized,
    {
        self.aircraft.sort_by(Aircraft::priority_cmp);

        let mut crashes = 0;
        let mut faults = 0;
        self.aircraft.retain_mut(|aircraft| {
            let reason = match aircraft.advance(dt, tuning, control) {
                Ok(Progress::Continue) => return true,
                Ok(Progress::FuelExhausted) => RemovalReason::FuelExhausted,
                Ok(Progress::LiftedOff) => {
                    info!(flight = %aircraft.flight_number(), "departed");
                    RemovalReason::LiftedOff
                }
                Err(fault @ Fault::GroundWithoutGear { .. }) => {
                    error!(flight = %aircraft.flight_number(), %fault, "crash");
                    crashes += 1;
                    RemovalReason::Crashed
                }
                Err(Fault::InvariantViolation(violation)) => {
                    error!(
                        aircraft = %aircraft.id(),
                        flight = %aircraft.flight_number(),
                        %violation,
                        "invariant violated"
                    );
                    crashes += 1;
                    faults += 1;
                    RemovalReason::Faulted
                }
            };
            debug!(flight = %aircraft.flight_number(), ?reason, "removing aircraft");
            control.aircraft_removed(aircraft, reason);
            false
        });

        self.crash_count += crashes;
        self.fault_count += faults;
    }

    /// Number of live aircraft whose flight number starts with `carrier`.
    #[must_use]
    pub fn count_on_carrier(&self, carrier: &str) -> u32 {
        self.aircraft
            .iter()
            .filter(|aircraft| aircraft.flight_number().is_operated_by(carrier))
            .count() as u32
    }

    /// Fuel still owed to aircraft that are circling low on fuel.
    #[must_use]
    pub fn total_missing_fuel(&self) -> u32 {
        self.aircraft
            .iter()
            .filter(|aircraft| aircraft.is_low_on_fuel() && aircraft.is_circling())
            .map(Aircraft::missing_fuel)
            .fold(0, u32::saturating_add)
    }

    /// Aircraft removed by a fault, whether ground contact with retracted
    /// gear or a breached invariant.
    #[must_use]
    pub const fn crash_count(&self) -> u32 {
        self.crash_count
    }

    /// Part of [`Self::crash_count`] caused by a breached invariant.
    #[must_use]
    pub const fn fault_count(&self) -> u32 {
        self.fault_count
    }

    /// Number of live aircraft.
    #[must_use]
    pub fn len(&self) -> usize {
        self.aircraft.len()
    }

    /// Reports whether no aircraft are alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.aircraft.is_empty()
    }

    /// Iterator over live aircraft in their last advance order.
    pub fn iter(&self) -> impl Iterator<Item = &Aircraft> {
        self.aircraft.iter()
    }

    /// Looks up a live aircraft by identifier.
    #[must_use]
    pub fn get(&self, id: AircraftId) -> Option<&Aircraft> {
        self.aircraft.iter().find(|aircraft| aircraft.id() == id)
    }

    /// Looks up a live aircraft by identifier for mutation.
    pub fn get_mut(&mut self, id: AircraftId) -> Option<&mut Aircraft> {
        self.aircraft.iter_mut().find(|aircraft| aircraft.id() == id)
    }

    /// Reports whether a live aircraft carries `flight_number`.
    #[must_use]
    pub fn contains_flight(&self, flight_number: &FlightNumber) -> bool {
        self.aircraft
            .iter()
            .any(|aircraft| aircraft.flight_number() == flight_number)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use glam::Vec3;
    use tower_sim_core::{AircraftType, InvariantViolation, Path, Waypoint};

    use super::*;
    use crate::aircraft::Instruction;

    #[derive(Default)]
    struct RecordingControl {
        asked: Vec<AircraftId>,
        removed: Vec<(AircraftId, RemovalReason)>,
        unreserved: Option<AircraftId>,
    }

    impl Control for RecordingControl {
        fn instructions(&mut self, aircraft: &Aircraft) -> Result<Instruction, Fault> {
            self.asked.push(aircraft.id());
            Ok(Instruction::Stay)
        }

        fn reserve_terminal(&mut self, _aircraft: &Aircraft) -> Result<Option<Path>, Fault> {
            Ok(None)
        }

        fn arrived_at_terminal(&mut self, aircraft: &Aircraft) -> Result<(), Fault> {
            match self.unreserved {
                Some(id) if id == aircraft.id() => {
                    Err(InvariantViolation::MissingReservation(id).into())
                }
                _ => Ok(()),
            }
        }

        fn aircraft_removed(&mut self, aircraft: &Aircraft, reason: RemovalReason) {
            self.removed.push((aircraft.id(), reason));
        }
    }

    fn aircraft(id: u32, flight: &str, position: Vec3, fuel: f32) -> Aircraft {
        Aircraft::new(
            AircraftId::new(id),
            FlightNumber::new(flight),
            Arc::new(AircraftType::new("test", 0.02, 0.05, 0.02, 1.0, 3_000)),
            position,
            Vec3::ZERO,
            fuel,
            &Tuning::default(),
        )
    }

    #[test]
    fn crash_is_counted_once_and_the_aircraft_removed() {
        let tuning = Tuning::default();
        let mut control = RecordingControl::default();
        let mut manager = AircraftManager::new();
        manager.add(
            aircraft(1, "AF1000", Vec3::ZERO, 100.0)
                .with_path(vec![Waypoint::air(Vec3::new(3.0, 0.0, 0.2))].into()),
        );
        manager.add(aircraft(2, "LH2000", Vec3::new(0.0, 0.0, 1.0), 200.0));

        manager.advance(1.0, &tuning, &mut control);

        assert_eq!(manager.crash_count(), 1);
        assert_eq!(manager.fault_count(), 0);
        assert_eq!(manager.len(), 1);
        assert!(manager.get(AircraftId::new(1)).is_none());
        assert_eq!(
            control.removed,
            vec![(AircraftId::new(1), RemovalReason::Crashed)]
        );
    }

    #[test]
    fn lifted_off_aircraft_leave_the_fleet_the_same_tick() {
        let tuning = Tuning::default();
        let mut control = RecordingControl::default();
        let mut manager = AircraftManager::new();
        manager.add(
            aircraft(1, "DL1000", Vec3::ZERO, 500.0)
                .with_landing_gear(true)
                .with_path(
                    vec![
                        Waypoint::ground(Vec3::ZERO),
                        Waypoint::air(Vec3::new(1.0, 0.0, 1.0)),
                    ]
                    .into(),
                ),
        );
        manager.add(aircraft(2, "DL2000", Vec3::new(0.0, 0.0, 1.0), 500.0));

        manager.advance(1.0, &tuning, &mut control);

        assert_eq!(manager.len(), 1);
        assert!(manager.get(AircraftId::new(1)).is_none());
        assert_eq!(
            control.removed,
            vec![(AircraftId::new(1), RemovalReason::LiftedOff)]
        );
        assert_eq!(manager.crash_count(), 0);
        assert_eq!(manager.fault_count(), 0);
    }

    #[test]
    fn invariant_fault_removes_only_the_offender() {
        let tuning = Tuning::default();
        let mut control = RecordingControl {
            unreserved: Some(AircraftId::new(1)),
            ..RecordingControl::default()
        };
        let mut manager = AircraftManager::new();
        let gate = Vec3::new(0.3, 0.0, 0.0);
        manager.add(
            aircraft(1, "KL1000", gate, 500.0)
                .with_landing_gear(true)
                .with_path(vec![Waypoint::terminal(gate)].into()),
        );
        let start = Vec3::new(0.0, 0.0, 1.0);
        manager.add(
            aircraft(2, "KL2000", start, 500.0)
                .with_path(vec![Waypoint::air(Vec3::new(1.0, 0.0, 1.0))].into()),
        );

        manager.advance(1.0, &tuning, &mut control);

        assert_eq!(manager.fault_count(), 1);
        assert_eq!(manager.crash_count(), 1, "faults count as crashes");
        assert_eq!(
            control.removed,
            vec![(AircraftId::new(1), RemovalReason::Faulted)]
        );
        let survivor = manager.get(AircraftId::new(2)).expect("still flying");
        assert!(survivor.position().x > start.x, "the rest of the tick proceeds");
    }

    #[test]
    fn empty_tanks_are_removed_silently() {
        let tuning = Tuning::default();
        let mut control = RecordingControl::default();
        let mut manager = AircraftManager::new();
        manager.add(aircraft(1, "AF1000", Vec3::new(0.0, 0.0, 1.0), 0.0));

        manager.advance(1.0, &tuning, &mut control);

        assert!(manager.is_empty());
        assert_eq!(manager.crash_count(), 0);
        assert_eq!(
            control.removed,
            vec![(AircraftId::new(1), RemovalReason::FuelExhausted)]
        );
    }

    #[test]
    fn lowest_fuel_advances_first_with_stable_ties() {
        let tuning = Tuning::default();
        let mut control = RecordingControl::default();
        let mut manager = AircraftManager::new();
        let high = Vec3::new(0.0, 0.0, 1.0);
        manager.add(aircraft(1, "AF1000", high, 900.0));
        manager.add(aircraft(2, "AF1001", high, 300.0));
        manager.add(aircraft(3, "AF1002", high, 900.0));
        manager.add(aircraft(4, "AF1003", high, 300.0));

        manager.advance(1.0, &tuning, &mut control);

        let order: Vec<u32> = control.asked.iter().map(AircraftId::get).collect();
        assert_eq!(order, vec![2, 4, 1, 3]);
    }

    #[test]
    fn carrier_count_matches_flight_prefix() {
        let mut manager = AircraftManager::new();
        manager.add(aircraft(1, "KL1000", Vec3::ZERO, 10.0));
        manager.add(aircraft(2, "KL2000", Vec3::ZERO, 10.0));
        manager.add(aircraft(3, "BA3000", Vec3::ZERO, 10.0));

        assert_eq!(manager.count_on_carrier("KL"), 2);
        assert_eq!(manager.count_on_carrier("BA"), 1);
        assert_eq!(manager.count_on_carrier("EY"), 0);
        assert!(manager.contains_flight(&FlightNumber::new("BA3000")));
    }

    #[test]
    fn missing_fuel_only_counts_low_circling_aircraft() {
        let holding: Path = vec![Waypoint::air(Vec3::new(1.5, 1.5, 0.5))].into();
        let mut manager = AircraftManager::new();
        // Low on fuel (reserve is 160) and circling.
        manager.add(aircraft(1, "AF1000", Vec3::new(0.0, 0.0, 1.0), 100.0).with_path(holding.clone()));
        // Low on fuel but not circling.
        manager.add(aircraft(2, "AF1001", Vec3::new(0.0, 0.0, 1.0), 100.0));
        // Circling with plenty of fuel.
        manager.add(aircraft(3, "AF1002", Vec3::new(0.0, 0.0, 1.0), 2_000.0).with_path(holding));

        assert_eq!(manager.total_missing_fuel(), 2_900);
    }
}
