use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    constants::{
        DEFAULT_CROSS_SECTION_AREA, DEFAULT_DRAG_COEFFICIENT, DEFAULT_DRY_MASS, DEFAULT_ISP,
        DEFAULT_PARACHUTE_ALTITUDE, DEFAULT_PARACHUTE_DRAG_COEFFICIENT, DEFAULT_PROPELLANT_MASS,
        DEFAULT_THRUST, LANDING_GRACE_PERIOD, MAX_SIMULATION_TIME, STANDARD_GRAVITY, TIME_STEP,
    },
    control::{
        environment::{ConstantAtmosphere, EnvironmentModel, EnvironmentTable, StandardAtmosphere},
        guidance::PitchProgram,
        vehicle::VehicleConfig,
    },
    errors::{Result, SimulationError},
};

/// Type-erased environment chosen by the loader.
pub type DynEnvironment = Box<dyn EnvironmentModel + Send + Sync>;

/// Top-level JSON document. `Default` is the 50 km sounding rocket.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub rocket: RocketSection,
    pub engine: EngineSection,
    #[serde(default)]
    pub simulation: SimulationSettings,
    #[serde(default)]
    pub environment: EnvironmentSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RocketSection {
    pub propellant_mass: f64,
    pub dry_mass: f64,
    #[serde(default = "default_cross_section_area")]
    pub cross_section_area: f64,
    #[serde(default = "default_drag_coeff")]
    pub drag_coeff: f64,
    #[serde(default = "default_parachute_drag_coeff")]
    pub parachute_drag_coeff: f64,
    #[serde(default = "default_parachute_altitude")]
    pub parachute_altitude: f64,
    #[serde(default)]
    pub pitch_program: PitchProgram,
    #[serde(default)]
    pub cutoff_altitude: Option<f64>,
    #[serde(default)]
    pub max_g_force: Option<f64>,
}

impl Default for RocketSection {
    fn default() -> Self {
        RocketSection {
            propellant_mass: DEFAULT_PROPELLANT_MASS,
            dry_mass: DEFAULT_DRY_MASS,
            cross_section_area: DEFAULT_CROSS_SECTION_AREA,
            drag_coeff: DEFAULT_DRAG_COEFFICIENT,
            parachute_drag_coeff: DEFAULT_PARACHUTE_DRAG_COEFFICIENT,
            parachute_altitude: DEFAULT_PARACHUTE_ALTITUDE,
            pitch_program: PitchProgram::Vertical,
            cutoff_altitude: None,
            max_g_force: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSection {
    pub thrust: f64,
    pub isp: f64,
    #[serde(default)]
    pub min_throttle: f64,
}

impl Default for EngineSection {
    fn default() -> Self {
        EngineSection {
            thrust: DEFAULT_THRUST,
            isp: DEFAULT_ISP,
            min_throttle: 0.0,
        }
    }
}

/// Integration settings shared by the integrator and the mission runner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub time_step: f64,
    pub max_sim_time: f64,
    /// Ground contact before this time does not count as a landing.
    pub landing_grace_period: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        SimulationSettings {
            time_step: TIME_STEP,
            max_sim_time: MAX_SIMULATION_TIME,
            landing_grace_period: LANDING_GRACE_PERIOD,
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(SimulationError::ConfigurationError(format!(
                "time_step must be positive and finite, got {}",
                self.time_step
            )));
        }
        if self.max_sim_time.is_nan() || self.max_sim_time <= 0.0 {
            return Err(SimulationError::ConfigurationError(format!(
                "max_sim_time must be positive, got {}",
                self.max_sim_time
            )));
        }
        if !self.landing_grace_period.is_finite() || self.landing_grace_period < 0.0 {
            return Err(SimulationError::ConfigurationError(format!(
                "landing_grace_period must be finite and non-negative, got {}",
                self.landing_grace_period
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentSection {
    /// Surface gravity for the inverse-square law.
    pub gravity: f64,
    /// Uniform density override.
    pub air_density: Option<f64>,
    pub wind_speed: Option<f64>,
    /// Tabulated profile; relative paths resolve against the config file.
    pub profile: Option<PathBuf>,
}

impl Default for EnvironmentSection {
    fn default() -> Self {
        EnvironmentSection {
            gravity: STANDARD_GRAVITY,
            air_density: None,
            wind_speed: None,
            profile: None,
        }
    }
}

fn default_cross_section_area() -> f64 {
    DEFAULT_CROSS_SECTION_AREA
}

fn default_drag_coeff() -> f64 {
    DEFAULT_DRAG_COEFFICIENT
}

fn default_parachute_drag_coeff() -> f64 {
    DEFAULT_PARACHUTE_DRAG_COEFFICIENT
}

fn default_parachute_altitude() -> f64 {
    DEFAULT_PARACHUTE_ALTITUDE
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::from_json_str(&std::fs::read_to_string(path)?)?;

        if let (Some(profile), Some(dir)) = (config.environment.profile.as_mut(), path.parent()) {
            if profile.is_relative() {
                *profile = dir.join(&*profile);
            }
        }

        info!(
            path = %path.display(),
            time_step = config.simulation.time_step,
            max_sim_time = config.simulation.max_sim_time,
            "loaded simulation config"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.vehicle_config().validate()?;
        self.simulation.validate()?;

        let environment = &self.environment;
        if !environment.gravity.is_finite() || environment.gravity <= 0.0 {
            return Err(SimulationError::ConfigurationError(format!(
                "environment gravity must be positive, got {}",
                environment.gravity
            )));
        }
        if environment.wind_speed.is_some_and(|wind| !wind.is_finite()) {
            return Err(SimulationError::ConfigurationError(
                "environment wind_speed must be finite".to_string(),
            ));
        }
        Ok(())
    }

    pub fn vehicle_config(&self) -> VehicleConfig {
        VehicleConfig {
            propellant_mass: self.rocket.propellant_mass,
            dry_mass: self.rocket.dry_mass,
            cross_section_area: self.rocket.cross_section_area,
            drag_coefficient: self.rocket.drag_coeff,
            parachute_drag_coefficient: self.rocket.parachute_drag_coeff,
            engine_thrust: self.engine.thrust,
            isp: self.engine.isp,
            min_throttle: self.engine.min_throttle,
            parachute_deploy_altitude: self.rocket.parachute_altitude,
            pitch_program: self.rocket.pitch_program,
            cutoff_altitude: self.rocket.cutoff_altitude,
            max_g_force: self.rocket.max_g_force,
        }
    }

    /// Profile table first, then a uniform density override, otherwise the
    /// standard atmosphere.
    pub fn environment(&self) -> Result<DynEnvironment> {
        let section = &self.environment;
        let wind = section.wind_speed.unwrap_or(0.0);

        if let Some(profile) = &section.profile {
            let table = EnvironmentTable::from_file(profile)?
                .with_default_wind(wind)
                .with_surface_gravity(section.gravity);
            return Ok(Box::new(table));
        }
        if let Some(density) = section.air_density {
            return Ok(Box::new(ConstantAtmosphere::new(density, section.gravity, wind)?));
        }
        Ok(Box::new(StandardAtmosphere::new(section.gravity, wind)))
    }
}
