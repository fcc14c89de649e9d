use std::fmt;

use serde::{Deserialize, Serialize};

use super::vehicle::VehicleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightPhase {
    Burning,
    Coasting,
    ParachuteDeployed,
    Landed,
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightPhase::Burning => "burning",
            FlightPhase::Coasting => "coasting",
            FlightPhase::ParachuteDeployed => "parachute deployed",
            FlightPhase::Landed => "landed",
        };
        f.write_str(name)
    }
}

/// Physical state of one flight. Only the integrator in this crate mutates
/// it; everything else reads through the accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightState {
    /// Completed ticks; `time` is always `tick * dt`.
    pub(crate) tick: u64,
    pub(crate) time: f64,
    pub(crate) altitude: f64,
    pub(crate) velocity: f64,
    pub(crate) horizontal_velocity: f64,
    pub(crate) downrange: f64,
    pub(crate) acceleration: f64,
    pub(crate) fuel_mass: f64,
    pub(crate) dry_mass: f64,
    pub(crate) throttle: f64,
    pub(crate) pitch_angle: f64,
    pub(crate) phase: FlightPhase,
    pub(crate) max_altitude: f64,
    pub(crate) parachute_deployed: bool,
    pub(crate) engine_cutoff: bool,
}

impl FlightState {
    /// State on the pad at `t = 0`.
    pub fn initial(vehicle: &VehicleConfig) -> Self {
        let can_burn = vehicle.propellant_mass > 0.0 && vehicle.engine_thrust > 0.0;
        FlightState {
            tick: 0,
            time: 0.0,
            altitude: 0.0,
            velocity: 0.0,
            horizontal_velocity: 0.0,
            downrange: 0.0,
            acceleration: 0.0,
            fuel_mass: vehicle.propellant_mass,
            dry_mass: vehicle.dry_mass,
            throttle: 0.0,
            pitch_angle: vehicle.pitch_program.pitch_at(0.0).clamp(0.0, 90.0),
            phase: if can_burn {
                FlightPhase::Burning
            } else {
                FlightPhase::Coasting
            },
            max_altitude: 0.0,
            parachute_deployed: false,
            engine_cutoff: !can_burn,
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn horizontal_velocity(&self) -> f64 {
        self.horizontal_velocity
    }

    pub fn downrange(&self) -> f64 {
        self.downrange
    }

    pub fn acceleration(&self) -> f64 {
        self.acceleration
    }

    pub fn fuel_mass(&self) -> f64 {
        self.fuel_mass
    }

    pub fn dry_mass(&self) -> f64 {
        self.dry_mass
    }

    /// Always derived, never stored.
    pub fn mass(&self) -> f64 {
        self.dry_mass + self.fuel_mass
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    pub fn pitch_angle(&self) -> f64 {
        self.pitch_angle
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn max_altitude(&self) -> f64 {
        self.max_altitude
    }

    pub fn parachute_deployed(&self) -> bool {
        self.parachute_deployed
    }

    pub fn engine_cutoff(&self) -> bool {
        self.engine_cutoff
    }

    pub fn is_descending(&self) -> bool {
        self.phase != FlightPhase::Landed && self.velocity < 0.0
    }

    pub fn has_landed(&self) -> bool {
        self.phase == FlightPhase::Landed
    }
}
