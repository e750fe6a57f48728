//! Deserializable world configuration and its validation.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sim_core::{AircraftType, Tuning};

use crate::layout::AirportLayout;

const DEFAULT_DEPARTURE_SEED: u64 = 0x7a3c_05e1_9b42_d810;

/// Everything needed to build a [`crate::World`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Thresholds and factors of the flight and service models.
    pub tuning: Tuning,
    /// Runway, taxiway and gate template.
    pub layout: AirportLayout,
    /// Where the airport sits in world coordinates.
    pub airport_position: Vec3,
    /// How the airport fuel stock is replenished.
    pub fuel_policy: FuelPolicy,
    /// Seed of the generator drawing post-takeoff headings.
    pub departure_seed: u64,
    /// Catalogue of aircraft models that may be spawned.
    pub aircraft_types: Vec<AircraftType>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            tuning: Tuning::default(),
            layout: AirportLayout::one_lane(),
            airport_position: Vec3::ZERO,
            fuel_policy: FuelPolicy::default(),
            departure_seed: DEFAULT_DEPARTURE_SEED,
            aircraft_types: AircraftType::default_catalogue(),
        }
    }
}

impl WorldConfig {
    /// Checks that the configuration describes a usable airport and catalogue.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.terminals().is_empty() {
            return Err(ConfigError::NoTerminals);
        }
        if self.layout.runways().is_empty() {
            return Err(ConfigError::NoRunways);
        }
        if self.aircraft_types.is_empty() {
            return Err(ConfigError::EmptyCatalogue);
        }

        for kind in &self.aircraft_types {
            let speeds = [kind.max_ground_speed, kind.max_air_speed, kind.max_accel];
            if speeds.iter().any(|value| !(*value > 0.0)) {
                return Err(ConfigError::InvalidAircraftType {
                    name: kind.name.clone(),
                    reason: "speeds and acceleration must be positive",
                });
            }
            if kind.fuel_consumption < 0.0 {
                return Err(ConfigError::InvalidAircraftType {
                    name: kind.name.clone(),
                    reason: "fuel consumption must not be negative",
                });
            }
        }

        let tuning = &self.tuning;
        if !(tuning.distance_threshold > 0.0) {
            return Err(ConfigError::InvalidTuning {
                field: "distance_threshold",
            });
        }
        if !(tuning.holding_radius > 0.0) {
            return Err(ConfigError::InvalidTuning {
                field: "holding_radius",
            });
        }
        if tuning.service_cycles < 0.0 {
            return Err(ConfigError::InvalidTuning {
                field: "service_cycles",
            });
        }
        Ok(())
    }
}

/// Replenishment strategy for the airport fuel stock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FuelPolicy {
    /// The stock is refilled to the maximum before every tick.
    #[default]
    Unlimited,
    /// The stock starts at `initial_stock` and grows only through deliveries.
    Metered {
        /// Fuel available before the first delivery.
        initial_stock: u32,
    },
}

/// Reasons a [`WorldConfig`] is rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The layout has no gates to service aircraft at.
    #[error("airport layout has no terminals")]
    NoTerminals,
    /// The layout has no runway to land on.
    #[error("airport layout has no runways")]
    NoRunways,
    /// No aircraft model can be spawned.
    #[error("aircraft type catalogue is empty")]
    EmptyCatalogue,
    /// An aircraft model has an unusable performance envelope.
    #[error("aircraft type `{name}` is invalid: {reason}")]
    InvalidAircraftType {
        /// Name of the offending model.
        name: String,
        /// What is wrong with it.
        reason: &'static str,
    },
    /// A tuning value is out of range.
    #[error("tuning value `{field}` is out of range")]
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn empty_catalogue_is_rejected() {
        let config = WorldConfig {
            aircraft_types: Vec::new(),
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyCatalogue));
    }

    #[test]
    fn layout_without_gates_is_rejected() {
        let one_lane = AirportLayout::one_lane();
        let config = WorldConfig {
            layout: AirportLayout::new(Vec3::ZERO, Vec3::ZERO, Vec::new(), one_lane.runways().to_vec()),
            ..WorldConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoTerminals));
    }

    #[test]
    fn stationary_aircraft_types_are_rejected() {
        let mut config = WorldConfig::default();
        config.aircraft_types[1].max_air_speed = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidAircraftType { name, .. }) if name == "b707"
        ));
    }

    #[test]
    fn fuel_policy_is_tagged() {
        let policy: FuelPolicy =
            toml::from_str("kind = \"metered\"\ninitial_stock = 250").expect("valid policy");
        assert_eq!(policy, FuelPolicy::Metered { initial_stock: 250 });
    }
}
