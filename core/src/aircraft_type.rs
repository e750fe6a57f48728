//! Immutable aircraft templates shared by every aircraft of the same model.

use serde::{Deserialize, Serialize};

/// Performance envelope and appearance shared by all aircraft of one model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AircraftType {
    /// Human readable model name.
    pub name: String,
    /// Highest speed reachable while on the ground, in units per tick.
    pub max_ground_speed: f32,
    /// Highest speed reachable while airborne, in units per tick.
    pub max_air_speed: f32,
    /// Largest velocity change applied in a single tick.
    pub max_accel: f32,
    /// Fuel burned per tick when flying at maximum speed.
    pub fuel_consumption: f32,
    /// Capacity of the fuel tank.
    pub max_fuel: u32,
    /// Opaque key the renderer resolves to a texture.
    #[serde(default)]
    pub sprite: String,
}

impl AircraftType {
    /// Creates a new aircraft type.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        max_ground_speed: f32,
        max_air_speed: f32,
        max_accel: f32,
        fuel_consumption: f32,
        max_fuel: u32,
    ) -> Self {
        let name = name.into();
        Self {
            sprite: name.clone(),
            name,
            max_ground_speed,
            max_air_speed,
            max_accel,
            fuel_consumption,
            max_fuel,
        }
    }

    /// Fuel level below which an aircraft of this type counts as low on fuel.
    ///
    /// The reserve is the amount burned at full speed during `reserve_ticks`.
    #[must_use]
    pub fn min_fuel(&self, reserve_ticks: f32) -> f32 {
        self.fuel_consumption * reserve_ticks
    }

    /// Models flown when no catalogue is configured.
    #[must_use]
    pub fn default_catalogue() -> Vec<AircraftType> {
        vec![
            AircraftType::new("l1011", 0.02, 0.05, 0.02, 1.0, 3_000),
            AircraftType::new("b707", 0.02, 0.05, 0.02, 1.2, 3_000),
            AircraftType::new("concorde", 0.02, 0.08, 0.02, 2.0, 3_000),
        ]
    }
}

/// Index of an aircraft type within the world's catalogue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AircraftTypeId(u32);

impl AircraftTypeId {
    /// Creates a new catalogue index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric catalogue index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}
