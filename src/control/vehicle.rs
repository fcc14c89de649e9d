use crate::constants::{
    DEFAULT_CROSS_SECTION_AREA, DEFAULT_DRAG_COEFFICIENT, DEFAULT_DRY_MASS, DEFAULT_ISP,
    DEFAULT_PARACHUTE_ALTITUDE, DEFAULT_PARACHUTE_DRAG_COEFFICIENT, DEFAULT_PROPELLANT_MASS,
    DEFAULT_THRUST,
};
use crate::errors::{Result, SimulationError};

use super::guidance::PitchProgram;

/// Immutable description of one vehicle. Shared read-only by every flight
/// that uses it.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleConfig {
    pub propellant_mass: f64,     // kg
    pub dry_mass: f64,            // kg
    pub cross_section_area: f64,  // m²
    pub drag_coefficient: f64,
    pub parachute_drag_coefficient: f64,
    pub engine_thrust: f64,       // N
    pub isp: f64,                 // s
    pub min_throttle: f64,
    pub parachute_deploy_altitude: f64, // m
    pub pitch_program: PitchProgram,
    /// Engine shuts down for good once this altitude is reached.
    pub cutoff_altitude: Option<f64>,
    /// Engine shuts down for good once acceleration exceeds this many g.
    pub max_g_force: Option<f64>,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        VehicleConfig {
            propellant_mass: DEFAULT_PROPELLANT_MASS,
            dry_mass: DEFAULT_DRY_MASS,
            cross_section_area: DEFAULT_CROSS_SECTION_AREA,
            drag_coefficient: DEFAULT_DRAG_COEFFICIENT,
            parachute_drag_coefficient: DEFAULT_PARACHUTE_DRAG_COEFFICIENT,
            engine_thrust: DEFAULT_THRUST,
            isp: DEFAULT_ISP,
            min_throttle: 0.0,
            parachute_deploy_altitude: DEFAULT_PARACHUTE_ALTITUDE,
            pitch_program: PitchProgram::Vertical,
            cutoff_altitude: None,
            max_g_force: None,
        }
    }
}

impl VehicleConfig {
    pub fn initial_mass(&self) -> f64 {
        self.dry_mass + self.propellant_mass
    }

    pub fn validate(&self) -> Result<()> {
        positive("dry_mass", self.dry_mass)?;
        non_negative("propellant_mass", self.propellant_mass)?;
        positive("cross_section_area", self.cross_section_area)?;
        non_negative("drag_coefficient", self.drag_coefficient)?;
        non_negative("parachute_drag_coefficient", self.parachute_drag_coefficient)?;
        non_negative("engine_thrust", self.engine_thrust)?;
        positive("isp", self.isp)?;
        non_negative("parachute_deploy_altitude", self.parachute_deploy_altitude)?;

        if !(0.0..=1.0).contains(&self.min_throttle) {
            return Err(SimulationError::ConfigurationError(format!(
                "min_throttle must lie in [0, 1], got {}",
                self.min_throttle
            )));
        }
        if let Some(altitude) = self.cutoff_altitude {
            positive("cutoff_altitude", altitude)?;
        }
        if let Some(limit) = self.max_g_force {
            positive("max_g_force", limit)?;
        }

        self.pitch_program.validate()
    }
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimulationError::ConfigurationError(format!(
            "{} must be finite and greater than zero, got {}",
            name, value
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::ConfigurationError(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )))
    }
}
