use crate::constants::STANDARD_GRAVITY;

use super::vehicle::VehicleConfig;

/// Outcome of one tick of engine operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Burn {
    pub thrust: f64,
    pub fuel_consumed: f64,
    pub effective_throttle: f64,
    /// Tank is empty once this burn is applied.
    pub exhausted: bool,
}

impl Burn {
    pub const NONE: Burn = Burn {
        thrust: 0.0,
        fuel_consumed: 0.0,
        effective_throttle: 0.0,
        exhausted: false,
    };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropulsionSystem {
    engine_thrust: f64,
    isp: f64,
}

impl PropulsionSystem {
    pub fn new(engine_thrust: f64, isp: f64) -> Self {
        PropulsionSystem { engine_thrust, isp }
    }

    pub fn from_vehicle(vehicle: &VehicleConfig) -> Self {
        Self::new(vehicle.engine_thrust, vehicle.isp)
    }

    /// Full-throttle propellant flow in kg/s. Isp is defined against
    /// standard gravity, not local gravity.
    pub fn mass_flow_rate(&self) -> f64 {
        self.engine_thrust / (self.isp * STANDARD_GRAVITY)
    }

    /// Nominal burn time at full throttle for `fuel_mass` of propellant.
    pub fn burn_time(&self, fuel_mass: f64) -> f64 {
        fuel_mass / self.mass_flow_rate()
    }

    /// Fuel use and thrust for one tick. Does not mutate anything; the
    /// integrator applies the result. A tick that would need more fuel than
    /// remains drains the tank and produces no thrust.
    pub fn burn(&self, fuel_mass: f64, throttle: f64, delta_time: f64) -> Burn {
        if fuel_mass <= 0.0 {
            return Burn {
                exhausted: true,
                ..Burn::NONE
            };
        }
        if throttle <= 0.0 || self.engine_thrust <= 0.0 {
            return Burn::NONE;
        }

        let demand = self.mass_flow_rate() * delta_time * throttle;
        if demand > fuel_mass {
            Burn {
                thrust: 0.0,
                fuel_consumed: fuel_mass,
                effective_throttle: 0.0,
                exhausted: true,
            }
        } else {
            Burn {
                thrust: self.engine_thrust * throttle,
                fuel_consumed: demand,
                effective_throttle: throttle,
                exhausted: fuel_mass - demand <= 0.0,
            }
        }
    }
}
