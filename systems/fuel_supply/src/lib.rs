#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fuel supply system that orders deliveries sized from the fleet's outstanding demand.

use tower_sim_core::{Command, Event};

const DEFAULT_DELIVERY_INTERVAL: f32 = 100.0;
const DEFAULT_MAX_ORDER: u32 = 5_000;

/// Configuration parameters required to construct the fuel supply system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    delivery_interval: f32,
    max_order: u32,
}

impl Config {
    /// Creates a configuration delivering every `delivery_interval` ticks, at most `max_order` at a time.
    #[must_use]
    pub const fn new(delivery_interval: f32, max_order: u32) -> Self {
        Self {
            delivery_interval,
            max_order,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_DELIVERY_INTERVAL, DEFAULT_MAX_ORDER)
    }
}

/// Pure system that delivers the fuel ordered one interval earlier and places the next order.
#[derive(Debug)]
pub struct FuelSupply {
    delivery_interval: f32,
    max_order: u32,
    accumulator: f32,
    pending_order: u32,
}

impl FuelSupply {
    /// Creates a new fuel supply system with nothing on order.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            delivery_interval: config.delivery_interval,
            max_order: config.max_order,
            accumulator: 0.0,
            pending_order: 0,
        }
    }

    /// Fuel ordered and due at the next delivery.
    #[must_use]
    pub const fn pending_order(&self) -> u32 {
        self.pending_order
    }

    /// Consumes time events and the current demand to emit deliveries.
    ///
    /// `total_missing_fuel` is the fuel owed to aircraft circling low on fuel.
    pub fn handle(&mut self, events: &[Event], total_missing_fuel: u32, out: &mut Vec<Command>) {
        if !(self.delivery_interval > 0.0) {
            return;
        }

        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator += *dt;
            }
        }

        while self.accumulator >= self.delivery_interval {
            self.accumulator -= self.delivery_interval;
            if self.pending_order > 0 {
                out.push(Command::DeliverFuel {
                    amount: self.pending_order,
                });
            }
            self.pending_order = total_missing_fuel.min(self.max_order);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(supply: &mut FuelSupply, dt: f32, demand: u32) -> Vec<Command> {
        let mut commands = Vec::new();
        supply.handle(&[Event::TimeAdvanced { dt }], demand, &mut commands);
        commands
    }

    #[test]
    fn first_interval_only_places_an_order() {
        let mut supply = FuelSupply::new(Config::default());
        assert!(tick(&mut supply, 99.0, 800).is_empty());
        assert_eq!(supply.pending_order(), 0);

        assert!(tick(&mut supply, 1.0, 800).is_empty());
        assert_eq!(supply.pending_order(), 800);
    }

    #[test]
    fn order_is_delivered_one_interval_later() {
        let mut supply = FuelSupply::new(Config::default());
        let _ = tick(&mut supply, 100.0, 800);

        assert!(tick(&mut supply, 50.0, 0).is_empty());
        assert_eq!(
            tick(&mut supply, 50.0, 0),
            vec![Command::DeliverFuel { amount: 800 }]
        );
        assert_eq!(supply.pending_order(), 0);
    }

    #[test]
    fn orders_are_capped() {
        let mut supply = FuelSupply::new(Config::new(10.0, 5_000));
        let _ = tick(&mut supply, 10.0, 12_000);
        assert_eq!(supply.pending_order(), 5_000);
    }

    #[test]
    fn zero_interval_is_inert() {
        let mut supply = FuelSupply::new(Config::new(0.0, 5_000));
        assert!(tick(&mut supply, 1_000.0, 100).is_empty());
        assert_eq!(supply.pending_order(), 0);
    }
}
