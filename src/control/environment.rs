use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::constants::{
    EARTH_RADIUS, PROFILE_BUCKET_SIZE, PROFILE_MAX_ALTITUDE, SEA_LEVEL_PRESSURE,
    SEA_LEVEL_TEMPERATURE, SPECIFIC_GAS_CONSTANT_AIR, STANDARD_GRAVITY, TROPOSPHERE_HEIGHT,
    TROPOSPHERE_LAPSE_RATE,
};
use crate::errors::{Result, SimulationError};

/// Environment conditions at one altitude, taken once per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentSample {
    pub density: f64,
    pub gravity: f64,
    pub wind: f64,
}

/// Altitude-indexed environment. Implementations must be pure: the same
/// altitude always yields the same values.
pub trait EnvironmentModel {
    /// Air density in kg/m³.
    fn density(&self, altitude: f64) -> f64;

    /// Local gravity in m/s².
    fn gravity(&self, altitude: f64) -> f64 {
        inverse_square_gravity(STANDARD_GRAVITY, altitude)
    }

    /// Horizontal wind speed in m/s, positive downrange.
    fn wind(&self, _altitude: f64) -> f64 {
        0.0
    }

    fn sample(&self, altitude: f64) -> EnvironmentSample {
        EnvironmentSample {
            density: self.density(altitude),
            gravity: self.gravity(altitude),
            wind: self.wind(altitude),
        }
    }
}

macro_rules! forward_environment_model {
    ($($wrapper:ty),*) => {
        $(
            impl<E: EnvironmentModel + ?Sized> EnvironmentModel for $wrapper {
                fn density(&self, altitude: f64) -> f64 {
                    (**self).density(altitude)
                }

                fn gravity(&self, altitude: f64) -> f64 {
                    (**self).gravity(altitude)
                }

                fn wind(&self, altitude: f64) -> f64 {
                    (**self).wind(altitude)
                }
            }
        )*
    };
}

forward_environment_model!(&E, Box<E>, Rc<E>, Arc<E>);

pub fn inverse_square_gravity(surface_gravity: f64, altitude: f64) -> f64 {
    let ratio = EARTH_RADIUS / (EARTH_RADIUS + altitude.max(0.0));
    surface_gravity * ratio * ratio
}

/// Rejects models that yield negative or non-finite density anywhere in the
/// tabulated band.
pub fn check_density_range<E: EnvironmentModel + ?Sized>(model: &E) -> Result<()> {
    let buckets = (PROFILE_MAX_ALTITUDE / PROFILE_BUCKET_SIZE) as u32;
    for bucket in 0..=buckets {
        let altitude = f64::from(bucket) * PROFILE_BUCKET_SIZE;
        let density = model.density(altitude);
        if !density.is_finite() || density < 0.0 {
            return Err(SimulationError::ConfigurationError(format!(
                "air density {} at {} m is not a finite non-negative value",
                density, altitude
            )));
        }
    }
    Ok(())
}

fn barometric_exponent() -> f64 {
    STANDARD_GRAVITY / (TROPOSPHERE_LAPSE_RATE * SPECIFIC_GAS_CONSTANT_AIR)
}

/// Two-layer standard atmosphere: linear lapse below the tropopause,
/// isothermal exponential decay above it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardAtmosphere {
    pub surface_gravity: f64,
    pub wind_speed: f64,
}

impl Default for StandardAtmosphere {
    fn default() -> Self {
        StandardAtmosphere {
            surface_gravity: STANDARD_GRAVITY,
            wind_speed: 0.0,
        }
    }
}

impl StandardAtmosphere {
    pub fn new(surface_gravity: f64, wind_speed: f64) -> Self {
        StandardAtmosphere {
            surface_gravity,
            wind_speed,
        }
    }

    pub fn temperature(&self, altitude: f64) -> f64 {
        let h = altitude.clamp(0.0, TROPOSPHERE_HEIGHT);
        SEA_LEVEL_TEMPERATURE - TROPOSPHERE_LAPSE_RATE * h
    }

    pub fn pressure(&self, altitude: f64) -> f64 {
        let h = altitude.max(0.0);
        let tropopause_temperature = self.temperature(TROPOSPHERE_HEIGHT);
        if h < TROPOSPHERE_HEIGHT {
            let temperature = self.temperature(h);
            SEA_LEVEL_PRESSURE * (temperature / SEA_LEVEL_TEMPERATURE).powf(barometric_exponent())
        } else {
            let tropopause_pressure = SEA_LEVEL_PRESSURE
                * (tropopause_temperature / SEA_LEVEL_TEMPERATURE).powf(barometric_exponent());
            let scale_height =
                SPECIFIC_GAS_CONSTANT_AIR * tropopause_temperature / STANDARD_GRAVITY;
            tropopause_pressure * (-(h - TROPOSPHERE_HEIGHT) / scale_height).exp()
        }
    }
}

impl EnvironmentModel for StandardAtmosphere {
    fn density(&self, altitude: f64) -> f64 {
        self.pressure(altitude) / (SPECIFIC_GAS_CONSTANT_AIR * self.temperature(altitude))
    }

    fn gravity(&self, altitude: f64) -> f64 {
        inverse_square_gravity(self.surface_gravity, altitude)
    }

    fn wind(&self, _altitude: f64) -> f64 {
        self.wind_speed
    }
}

/// Fixed air density at every altitude; used when the configuration pins
/// `air_density`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantAtmosphere {
    density: f64,
    surface_gravity: f64,
    wind_speed: f64,
}

impl ConstantAtmosphere {
    pub fn new(density: f64, surface_gravity: f64, wind_speed: f64) -> Result<Self> {
        if !density.is_finite() || density < 0.0 {
            return Err(SimulationError::ConfigurationError(format!(
                "air density override must be finite and non-negative, got {}",
                density
            )));
        }
        Ok(ConstantAtmosphere {
            density,
            surface_gravity,
            wind_speed,
        })
    }
}

impl EnvironmentModel for ConstantAtmosphere {
    fn density(&self, _altitude: f64) -> f64 {
        self.density
    }

    fn gravity(&self, altitude: f64) -> f64 {
        inverse_square_gravity(self.surface_gravity, altitude)
    }

    fn wind(&self, _altitude: f64) -> f64 {
        self.wind_speed
    }
}

/// On-disk profile: altitude (as a string key, meters) to value.
#[derive(Debug, Deserialize, Default)]
pub struct EnvironmentProfile {
    #[serde(default)]
    pub air_density: BTreeMap<String, f64>,
    #[serde(default)]
    pub wind_speed: BTreeMap<String, f64>,
}

/// Tabulated density/wind profile looked up by nearest 1000 m bucket.
/// Missing density buckets fall back to the standard atmosphere, missing
/// wind buckets to `default_wind`.
#[derive(Debug, Clone)]
pub struct EnvironmentTable {
    density: BTreeMap<i64, f64>,
    wind: BTreeMap<i64, f64>,
    default_wind: f64,
    fallback: StandardAtmosphere,
}

impl EnvironmentTable {
    pub fn new(density: BTreeMap<i64, f64>, wind: BTreeMap<i64, f64>) -> Result<Self> {
        for (altitude, value) in &density {
            if !value.is_finite() || *value < 0.0 {
                return Err(SimulationError::ConfigurationError(format!(
                    "profile density {} at {} m is not a finite non-negative value",
                    value, altitude
                )));
            }
        }
        if let Some((altitude, value)) = wind.iter().find(|(_, value)| !value.is_finite()) {
            return Err(SimulationError::ConfigurationError(format!(
                "profile wind {} at {} m is not finite",
                value, altitude
            )));
        }

        Ok(EnvironmentTable {
            density,
            wind,
            default_wind: 0.0,
            fallback: StandardAtmosphere::default(),
        })
    }

    pub fn from_profile(profile: EnvironmentProfile) -> Result<Self> {
        Self::new(
            parse_altitude_keys("air_density", profile.air_density)?,
            parse_altitude_keys("wind_speed", profile.wind_speed)?,
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let profile: EnvironmentProfile = serde_json::from_str(json)?;
        Self::from_profile(profile)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::from_json_str(&std::fs::read_to_string(path)?)?;
        info!(
            path = %path.display(),
            density_buckets = table.density.len(),
            wind_buckets = table.wind.len(),
            "loaded environment profile"
        );
        Ok(table)
    }

    pub fn with_default_wind(mut self, default_wind: f64) -> Self {
        self.default_wind = default_wind;
        self
    }

    pub fn with_surface_gravity(mut self, surface_gravity: f64) -> Self {
        self.fallback.surface_gravity = surface_gravity;
        self
    }

    pub fn bucket(altitude: f64) -> i64 {
        let clamped = altitude.clamp(0.0, PROFILE_MAX_ALTITUDE);
        (clamped / PROFILE_BUCKET_SIZE).round() as i64 * PROFILE_BUCKET_SIZE as i64
    }
}

/// Rows outside `[0, PROFILE_MAX_ALTITUDE]` are dropped so the fallback
/// covers them; two rows rounding into one bucket are an error.
fn parse_altitude_keys(quantity: &str, raw: BTreeMap<String, f64>) -> Result<BTreeMap<i64, f64>> {
    let mut table = BTreeMap::new();
    for (key, value) in raw {
        let altitude = key
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|altitude| altitude.is_finite())
            .ok_or_else(|| {
                SimulationError::ConfigurationError(format!(
                    "profile altitude key {:?} is not a number",
                    key
                ))
            })?;

        if !(0.0..=PROFILE_MAX_ALTITUDE).contains(&altitude) {
            warn!(quantity, altitude, "ignoring profile row outside the table range");
            continue;
        }

        let bucket = EnvironmentTable::bucket(altitude);
        if table.insert(bucket, value).is_some() {
            return Err(SimulationError::ConfigurationError(format!(
                "profile {} has more than one row in the {} m bucket (key {:?})",
                quantity, bucket, key
            )));
        }
    }
    Ok(table)
}

impl EnvironmentModel for EnvironmentTable {
    fn density(&self, altitude: f64) -> f64 {
        self.density
            .get(&Self::bucket(altitude))
            .copied()
            .unwrap_or_else(|| self.fallback.density(altitude))
    }

    fn gravity(&self, altitude: f64) -> f64 {
        self.fallback.gravity(altitude)
    }

    fn wind(&self, altitude: f64) -> f64 {
        self.wind
            .get(&Self::bucket(altitude))
            .copied()
            .unwrap_or(self.default_wind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_sea_level_conditions() {
        let atmosphere = StandardAtmosphere::default();

        assert_abs_diff_eq!(atmosphere.temperature(0.0), 288.15, epsilon = 1e-9);
        assert_abs_diff_eq!(atmosphere.pressure(0.0), 101_325.0, epsilon = 1e-6);
        assert_abs_diff_eq!(atmosphere.density(0.0), 1.225, epsilon = 0.01);
    }

    #[test]
    fn test_tropopause_conditions() {
        let atmosphere = StandardAtmosphere::default();

        assert_abs_diff_eq!(atmosphere.temperature(11_000.0), 216.65, epsilon = 1e-9);
        assert_abs_diff_eq!(atmosphere.pressure(11_000.0), 22_632.0, epsilon = 50.0);
        assert_abs_diff_eq!(atmosphere.density(11_000.0), 0.3639, epsilon = 0.01);
    }

    #[test]
    fn test_density_continuous_at_tropopause() {
        let atmosphere = StandardAtmosphere::default();
        let below = atmosphere.density(TROPOSPHERE_HEIGHT - 1e-6);
        let above = atmosphere.density(TROPOSPHERE_HEIGHT + 1e-6);

        assert_relative_eq!(below, above, max_relative = 0.01);
        assert_relative_eq!(below, above, max_relative = 1e-6);
    }

    #[test]
    fn test_density_positive_and_decreasing_to_50km() {
        let atmosphere = StandardAtmosphere::default();
        let mut previous = f64::MAX;
        for step in 0..=500 {
            let density = atmosphere.density(f64::from(step) * 100.0);
            assert!(density > 0.0 && density.is_finite());
            assert!(density < previous, "density must fall with altitude");
            previous = density;
        }
        assert!(check_density_range(&atmosphere).is_ok());
    }

    #[test]
    fn test_gravity_inverse_square() {
        let atmosphere = StandardAtmosphere::default();

        assert_eq!(atmosphere.gravity(0.0), STANDARD_GRAVITY);

        let mut previous = atmosphere.gravity(0.0);
        for altitude in [1.0, 1_000.0, 11_000.0, 50_000.0, 200_000.0] {
            let gravity = atmosphere.gravity(altitude);
            assert!(gravity < previous);
            previous = gravity;
        }

        let expected_ratio = (EARTH_RADIUS / (EARTH_RADIUS + 100_000.0)).powi(2);
        assert_relative_eq!(
            atmosphere.gravity(100_000.0) / atmosphere.gravity(0.0),
            expected_ratio,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sampling_is_repeatable() {
        let atmosphere = StandardAtmosphere::new(STANDARD_GRAVITY, 4.0);
        assert_eq!(atmosphere.sample(7_321.5), atmosphere.sample(7_321.5));
        assert_eq!(atmosphere.wind(30_000.0), 4.0);
    }

    #[test]
    fn test_constant_atmosphere_rejects_negative_density() {
        assert!(ConstantAtmosphere::new(-0.1, STANDARD_GRAVITY, 0.0).is_err());
        assert!(ConstantAtmosphere::new(f64::NAN, STANDARD_GRAVITY, 0.0).is_err());

        let atmosphere = ConstantAtmosphere::new(1.0, STANDARD_GRAVITY, 2.0).unwrap();
        assert_eq!(atmosphere.density(40_000.0), 1.0);
        assert_eq!(atmosphere.wind(40_000.0), 2.0);
    }

    #[test]
    fn test_bucket_rounding_and_clamping() {
        assert_eq!(EnvironmentTable::bucket(0.0), 0);
        assert_eq!(EnvironmentTable::bucket(1_499.0), 1_000);
        assert_eq!(EnvironmentTable::bucket(1_500.0), 2_000);
        assert_eq!(EnvironmentTable::bucket(-20.0), 0);
        assert_eq!(EnvironmentTable::bucket(73_000.0), 50_000);
    }

    #[test]
    fn test_table_lookup_from_profile_json() {
        let json = r#"{
            "air_density": { "0": 1.2, "1000": 1.1, "50000": 0.001 },
            "wind_speed": { "0": 3.5, "1000": 6.0 }
        }"#;
        let table = EnvironmentTable::from_json_str(json)
            .unwrap()
            .with_default_wind(-1.0);

        assert_eq!(table.density(420.0), 1.2);
        assert_eq!(table.density(1_200.0), 1.1);
        assert_eq!(table.density(90_000.0), 0.001);
        assert_eq!(table.wind(900.0), 6.0);
        assert_eq!(table.wind(25_000.0), -1.0);

        let standard = StandardAtmosphere::default();
        assert_eq!(table.density(20_000.0), standard.density(20_000.0));
        assert_eq!(table.gravity(0.0), STANDARD_GRAVITY);
    }

    #[test]
    fn test_table_rejects_bad_profiles() {
        assert!(EnvironmentTable::from_json_str(r#"{"air_density": {"0": -1.0}}"#).is_err());
        assert!(EnvironmentTable::from_json_str(r#"{"air_density": {"low": 1.0}}"#).is_err());
        assert!(EnvironmentTable::from_json_str("not json").is_err());
    }

    #[test]
    fn test_table_rejects_rows_sharing_a_bucket() {
        let json = r#"{"air_density": {"0": 1.225, "400": 0.5}}"#;
        assert!(matches!(
            EnvironmentTable::from_json_str(json),
            Err(SimulationError::ConfigurationError(_))
        ));

        let json = r#"{"wind_speed": {"2000": 4.0, "2300": 5.0}}"#;
        assert!(matches!(
            EnvironmentTable::from_json_str(json),
            Err(SimulationError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_table_drops_rows_outside_range() {
        let json = r#"{
            "air_density": { "0": 1.225, "50000": 0.001, "60000": 0.0003, "-500": 1.3 },
            "wind_speed": { "75000": 40.0 }
        }"#;
        let table = EnvironmentTable::from_json_str(json).unwrap();

        assert_eq!(table.density(0.0), 1.225);
        assert_eq!(table.density(50_000.0), 0.001);
        assert_eq!(table.wind(50_000.0), 0.0);
    }

    #[test]
    fn test_shared_model_through_arc() {
        let shared: Arc<dyn EnvironmentModel + Send + Sync> =
            Arc::new(StandardAtmosphere::default());
        let handle = Arc::clone(&shared);
        assert_eq!(shared.density(5_000.0), handle.density(5_000.0));
    }
}
