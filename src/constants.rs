// Physical Constants
pub const STANDARD_GRAVITY: f64 = 9.80665; // m/s², also the Isp reference
pub const EARTH_RADIUS: f64 = 6_371_000.0; // meters
pub const SPECIFIC_GAS_CONSTANT_AIR: f64 = 287.05; // J/(kg⋅K)

// Environmental Constants
pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15; // K
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0; // Pa
pub const TROPOSPHERE_LAPSE_RATE: f64 = 0.0065; // K per meter
pub const TROPOSPHERE_HEIGHT: f64 = 11_000.0; // m
pub const PROFILE_BUCKET_SIZE: f64 = 1_000.0; // m
pub const PROFILE_MAX_ALTITUDE: f64 = 50_000.0; // m

// Vehicle defaults (50 km sounding rocket)
pub const DEFAULT_PROPELLANT_MASS: f64 = 1_000.0; // kg
pub const DEFAULT_DRY_MASS: f64 = 400.0; // kg
pub const DEFAULT_THRUST: f64 = 120_000.0; // N
pub const DEFAULT_ISP: f64 = 280.0; // s
pub const DEFAULT_DRAG_COEFFICIENT: f64 = 0.45;
pub const DEFAULT_CROSS_SECTION_AREA: f64 = 1.0; // m²
pub const DEFAULT_PARACHUTE_DRAG_COEFFICIENT: f64 = 3.0;
pub const DEFAULT_PARACHUTE_ALTITUDE: f64 = 10_000.0; // m

// Simulation Parameters
pub const TIME_STEP: f64 = 1.0; // s
pub const MAX_SIMULATION_TIME: f64 = 1_000.0; // s
pub const LANDING_GRACE_PERIOD: f64 = 2.0; // s

// Policy layer
pub const LANDING_REWARD: f64 = 200.0;
pub const OBSERVATION_LOW: [f32; 3] = [0.0, -500.0, -100.0];
pub const OBSERVATION_HIGH: [f32; 3] = [100_000.0, 3_000.0, 100.0];
