//! Tunable constants governing flight dynamics and terminal servicing.

use serde::{Deserialize, Serialize};

/// Number of discrete orientation tiles in an aircraft sprite sheet.
pub const NUM_AIRCRAFT_TILES: u32 = 8;

/// Thresholds and factors read by the simulation every tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Distance under which a waypoint counts as reached.
    ///
    /// Also the altitude under which an aircraft counts as on the ground.
    pub distance_threshold: f32,
    /// Airborne speed under which an aircraft starts to sink.
    pub speed_threshold: f32,
    /// Altitude lost per unit of speed deficit below `speed_threshold`.
    pub sink_factor: f32,
    /// Simulated time a terminal needs to turn an aircraft around.
    pub service_cycles: f32,
    /// Distance from the airport at or beyond which aircraft are told to hold.
    pub holding_radius: f32,
    /// Ticks of full-speed consumption an aircraft keeps in reserve before it is low on fuel.
    pub low_fuel_reserve_ticks: f32,
    /// Fraction of the airborne consumption burned while on the ground.
    pub taxi_fuel_factor: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            distance_threshold: 0.05,
            speed_threshold: 0.025,
            sink_factor: 0.1,
            service_cycles: 40.0,
            holding_radius: 5.0,
            low_fuel_reserve_ticks: 160.0,
            taxi_fuel_factor: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let tuning: Tuning = toml::from_str("service_cycles = 10.0").expect("valid tuning");
        assert!((tuning.service_cycles - 10.0).abs() < f32::EPSILON);
        assert_eq!(tuning.holding_radius, Tuning::default().holding_radius);
        assert_eq!(tuning.taxi_fuel_factor, 0.0);
    }
}
