use crate::{control::vehicle::VehicleConfig, utils::vector2d::Vector2D};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aerodynamics {
    pub drag_coefficient: f64,
    pub parachute_drag_coefficient: f64,
    pub cross_section_area: f64,
}

impl Aerodynamics {
    pub fn new(
        drag_coefficient: f64,
        parachute_drag_coefficient: f64,
        cross_section_area: f64,
    ) -> Self {
        Aerodynamics {
            drag_coefficient,
            parachute_drag_coefficient,
            cross_section_area,
        }
    }

    pub fn from_vehicle(vehicle: &VehicleConfig) -> Self {
        Self::new(
            vehicle.drag_coefficient,
            vehicle.parachute_drag_coefficient,
            vehicle.cross_section_area,
        )
    }

    pub fn effective_drag_coefficient(&self, parachute_deployed: bool) -> f64 {
        if parachute_deployed {
            self.parachute_drag_coefficient
        } else {
            self.drag_coefficient
        }
    }

    pub fn dynamic_pressure(airspeed: f64, air_density: f64) -> f64 {
        0.5 * air_density * airspeed * airspeed
    }

    /// Signed drag along one axis; always opposes `airspeed`, zero when the
    /// vehicle is not moving through the air on that axis.
    pub fn calculate_drag(&self, airspeed: f64, air_density: f64, parachute_deployed: bool) -> f64 {
        if airspeed == 0.0 {
            return 0.0;
        }
        let magnitude = Self::dynamic_pressure(airspeed, air_density)
            * self.effective_drag_coefficient(parachute_deployed)
            * self.cross_section_area;
        -airspeed.signum() * magnitude
    }

    /// Per-axis drag for a planar airspeed.
    pub fn calculate_drag_vector(
        &self,
        airspeed: Vector2D,
        air_density: f64,
        parachute_deployed: bool,
    ) -> Vector2D {
        Vector2D::new(
            self.calculate_drag(airspeed.x, air_density, parachute_deployed),
            self.calculate_drag(airspeed.y, air_density, parachute_deployed),
        )
    }
}
