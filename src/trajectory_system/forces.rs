use tracing::debug;

use crate::{
    control::{
        environment::EnvironmentSample,
        flight_state::FlightState,
        propulsion::{Burn, PropulsionSystem},
        vehicle::VehicleConfig,
    },
    utils::vector2d::Vector2D,
};

use super::aerodynamics::Aerodynamics;

/// Forces acting during one tick, in newtons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Forces {
    pub thrust: Vector2D,
    pub drag: Vector2D,
    pub weight: f64,
    pub drag_coefficient: f64,
    pub burn: Burn,
    /// Drag was capped at the force that stops relative motion this tick.
    pub drag_limited: bool,
}

impl Forces {
    pub fn net(&self) -> Vector2D {
        [self.thrust, self.drag, Vector2D::new(0.0, -self.weight)]
            .into_iter()
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceModel {
    propulsion: PropulsionSystem,
    aerodynamics: Aerodynamics,
}

impl ForceModel {
    pub fn new(propulsion: PropulsionSystem, aerodynamics: Aerodynamics) -> Self {
        ForceModel {
            propulsion,
            aerodynamics,
        }
    }

    pub fn from_vehicle(vehicle: &VehicleConfig) -> Self {
        Self::new(
            PropulsionSystem::from_vehicle(vehicle),
            Aerodynamics::from_vehicle(vehicle),
        )
    }

    /// Forces for the coming tick. Uses the mass before this tick's burn.
    pub fn compute(
        &self,
        state: &FlightState,
        environment: &EnvironmentSample,
        throttle: f64,
        pitch_angle: f64,
        delta_time: f64,
    ) -> Forces {
        let mass = state.mass();

        let burn = if state.engine_cutoff() {
            Burn {
                exhausted: state.fuel_mass() <= 0.0,
                ..Burn::NONE
            }
        } else {
            self.propulsion
                .burn(state.fuel_mass(), throttle, delta_time)
        };
        let thrust = Vector2D::from_elevation(pitch_angle) * burn.thrust;

        let airspeed = Vector2D::new(
            state.horizontal_velocity() - environment.wind,
            state.velocity(),
        );
        let raw_drag = self.aerodynamics.calculate_drag_vector(
            airspeed,
            environment.density,
            state.parachute_deployed(),
        );
        let drag = Vector2D::new(
            limit_drag(raw_drag.x, airspeed.x, mass, delta_time),
            limit_drag(raw_drag.y, airspeed.y, mass, delta_time),
        );
        let drag_limited = drag != raw_drag;
        if drag_limited {
            debug!(
                time = state.time(),
                raw_drag = raw_drag.y,
                limited_drag = drag.y,
                airspeed = airspeed.y,
                "drag capped at stopping force"
            );
        }

        Forces {
            thrust,
            drag,
            weight: mass * environment.gravity,
            drag_coefficient: self
                .aerodynamics
                .effective_drag_coefficient(state.parachute_deployed()),
            burn,
            drag_limited,
        }
    }
}

/// Drag can bring relative motion on an axis to rest within a tick but
/// never reverse it.
fn limit_drag(drag: f64, airspeed: f64, mass: f64, delta_time: f64) -> f64 {
    let stopping_force = mass * airspeed.abs() / delta_time;
    drag.clamp(-stopping_force, stopping_force)
}
