use std::collections::BTreeSet;

use glam::Vec3;
use tower_sim_core::{AircraftView, Command, Event, FlightNumber};
use tower_sim_system_spawning::{Config, Spawning, DEFAULT_CARRIERS};
use tower_sim_world::{self as world, query, World, WorldConfig};

fn world() -> World {
    World::new(WorldConfig::default()).expect("default config is valid")
}

fn collect_spawns(seed: u64, ticks: u32) -> Vec<Command> {
    let world = world();
    let mut spawning = Spawning::new(Config::new(10.0, seed));
    let mut commands = Vec::new();
    for _ in 0..ticks {
        spawning.handle(
            &[Event::TimeAdvanced { dt: 1.0 }],
            query::aircraft_types(&world),
            &query::aircraft_view(&world),
            query::airport_position(&world),
            &mut commands,
        );
    }
    commands
}

#[test]
fn emits_one_spawn_per_elapsed_interval() {
    let world = world();
    let mut spawning = Spawning::new(Config::new(10.0, 0x1234_5678));
    let mut commands = Vec::new();

    spawning.handle(
        &[Event::TimeAdvanced { dt: 9.0 }],
        query::aircraft_types(&world),
        &query::aircraft_view(&world),
        Vec3::ZERO,
        &mut commands,
    );
    assert!(commands.is_empty(), "no spawn before a full interval");

    spawning.handle(
        &[Event::TimeAdvanced { dt: 1.0 }, Event::TimeAdvanced { dt: 30.0 }],
        query::aircraft_types(&world),
        &query::aircraft_view(&world),
        Vec3::ZERO,
        &mut commands,
    );
    assert_eq!(commands.len(), 4);
}

#[test]
fn spawned_aircraft_start_on_the_entry_circle_heading_home() {
    let world = world();
    let catalogue = query::aircraft_types(&world);

    for command in collect_spawns(7, 200) {
        let Command::SpawnAircraft {
            flight_number,
            aircraft_type,
            position,
            velocity,
            fuel,
        } = command
        else {
            panic!("unexpected command emitted");
        };

        assert!(DEFAULT_CARRIERS
            .iter()
            .any(|carrier| flight_number.is_operated_by(carrier)));
        let kind = &catalogue[aircraft_type.get() as usize];
        assert!((150.0..kind.max_fuel as f32).contains(&fuel));
        assert!((position.z - 2.0).abs() < 1e-5);
        assert!((position.truncate().length() - 3.0).abs() < 1e-4);
        assert!((velocity.length() - 0.05).abs() < 1e-5);
        assert!(velocity.dot(position) < 0.0, "aircraft fly towards the airport");
    }
}

#[test]
fn same_seed_reproduces_the_schedule() {
    assert_eq!(collect_spawns(99, 100), collect_spawns(99, 100));
    assert_ne!(collect_spawns(99, 100), collect_spawns(100, 100));
}

#[test]
fn flight_numbers_are_unique_among_live_aircraft() {
    let mut world = world();
    let mut events = Vec::new();
    let mut spawning = Spawning::new(Config::new(1.0, 3).with_carriers(["AF"]));

    for _ in 0..300 {
        let mut commands = Vec::new();
        spawning.handle(
            &[Event::TimeAdvanced { dt: 5.0 }],
            query::aircraft_types(&world),
            &query::aircraft_view(&world),
            query::airport_position(&world),
            &mut commands,
        );
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }
    }

    assert!(events
        .iter()
        .all(|event| !matches!(event, Event::SpawnRejected { .. })));
    let live: BTreeSet<FlightNumber> = query::aircraft_view(&world)
        .iter()
        .map(|snapshot| snapshot.flight_number.clone())
        .collect();
    assert_eq!(live.len(), 1_500);
    assert_eq!(query::count_on_carrier(&world, "AF"), 1_500);
}

#[test]
fn empty_catalogue_spawns_nothing() {
    let mut spawning = Spawning::new(Config::new(1.0, 3));
    let mut commands = Vec::new();
    spawning.handle(
        &[Event::TimeAdvanced { dt: 10.0 }],
        &[],
        &AircraftView::default(),
        Vec3::ZERO,
        &mut commands,
    );
    assert!(commands.is_empty());
}
