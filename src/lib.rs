pub mod config;
pub mod constants;
pub mod control;
pub mod errors;
pub mod policy_system;
pub mod telemetry_system;
pub mod trajectory_system;
pub mod utils;

pub use config::{DynEnvironment, SimulationConfig, SimulationSettings};
pub use constants::*;
pub use control::command::Command;
pub use control::environment::{
    ConstantAtmosphere, EnvironmentModel, EnvironmentSample, EnvironmentTable, StandardAtmosphere,
};
pub use control::flight_state::{FlightPhase, FlightState};
pub use control::guidance::{PidController, PitchProgram};
pub use control::mission::{
    ConstantThrottle, FlightPlan, Mission, MissionOutcome, MissionReport, ThrottleSchedule,
    VelocityHold,
};
pub use control::rocket::Rocket;
pub use control::vehicle::VehicleConfig;
pub use errors::{Result, SimulationError};

// Re-export commonly used items from policy_system
pub use policy_system::episode::{FlightEnv, Transition};
pub use policy_system::reward::{AltitudeFuelReward, RewardFunction};

// Re-export commonly used items from telemetry_system
pub use telemetry_system::telemetry::{
    FlightSummary, JsonLinesSink, NullSink, TelemetryFrame, TelemetryRecorder, TelemetrySink,
};

// Re-export commonly used utilities
pub use utils::vector2d::Vector2D;
