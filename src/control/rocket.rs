use std::sync::Arc;

use tracing::{debug, info, trace};

use crate::{
    config::SimulationSettings,
    constants::STANDARD_GRAVITY,
    errors::{Result, SimulationError},
    telemetry_system::telemetry::{NullSink, TelemetryFrame, TelemetrySink},
    trajectory_system::{
        forces::{ForceModel, Forces},
        kinematics::Kinematics,
    },
    utils::vector2d::Vector2D,
};

use super::{
    command::Command,
    environment::{check_density_range, EnvironmentModel, EnvironmentSample, StandardAtmosphere},
    flight_state::{FlightPhase, FlightState},
    vehicle::VehicleConfig,
};

/// Fixed-step flight integrator. Owns exactly one `FlightState`; the
/// vehicle description and environment are read-only and may be shared
/// with other flights.
pub struct Rocket<E: EnvironmentModel = StandardAtmosphere> {
    vehicle: Arc<VehicleConfig>,
    environment: E,
    force_model: ForceModel,
    settings: SimulationSettings,
    state: FlightState,
    last_frame: TelemetryFrame,
}

impl<E: EnvironmentModel> Rocket<E> {
    pub fn new(
        vehicle: impl Into<Arc<VehicleConfig>>,
        environment: E,
        settings: SimulationSettings,
    ) -> Result<Self> {
        let vehicle = vehicle.into();
        vehicle.validate()?;
        settings.validate()?;
        check_density_range(&environment)?;

        let state = FlightState::initial(&vehicle);
        let last_frame = idle_frame(&state, &environment.sample(0.0));
        debug!(
            initial_mass = vehicle.initial_mass(),
            time_step = settings.time_step,
            "flight constructed"
        );

        Ok(Rocket {
            force_model: ForceModel::from_vehicle(&vehicle),
            vehicle,
            environment,
            settings,
            state,
            last_frame,
        })
    }

    /// Back to the pad with full tanks.
    pub fn reset(&mut self) {
        self.state = FlightState::initial(&self.vehicle);
        self.last_frame = idle_frame(&self.state, &self.environment.sample(0.0));
        debug!("flight reset");
    }

    pub fn state(&self) -> &FlightState {
        &self.state
    }

    pub fn vehicle(&self) -> &VehicleConfig {
        &self.vehicle
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Frame describing the most recent tick (or the pad before launch).
    pub fn snapshot(&self) -> TelemetryFrame {
        self.last_frame
    }

    pub fn step(&mut self, command: &Command) -> Result<TelemetryFrame> {
        self.step_with_sink(command, &mut NullSink)
    }

    /// Advances the flight by one time step and pushes the resulting frame
    /// into `sink`. On error the state is left exactly as it was.
    pub fn step_with_sink(
        &mut self,
        command: &Command,
        sink: &mut dyn TelemetrySink,
    ) -> Result<TelemetryFrame> {
        if self.state.phase == FlightPhase::Landed {
            return Ok(self.last_frame);
        }

        let dt = self.settings.time_step;
        let mut next = self.state.clone();

        let throttle = command
            .throttle_setting()
            .clamp(self.vehicle.min_throttle, 1.0);
        let pitch = command
            .pitch()
            .unwrap_or_else(|| self.vehicle.pitch_program.pitch_at(next.altitude))
            .clamp(0.0, 90.0);

        if !next.parachute_deployed
            && next.altitude <= self.vehicle.parachute_deploy_altitude
            && next.velocity < 0.0
        {
            next.parachute_deployed = true;
            next.phase = FlightPhase::ParachuteDeployed;
            info!(
                time = next.time,
                altitude = next.altitude,
                velocity = next.velocity,
                "parachute deployed"
            );
        }

        let sample = self.environment.sample(next.altitude);
        let forces = self
            .force_model
            .compute(&next, &sample, throttle, pitch, dt);
        let acceleration = forces.net() / next.mass();
        ensure_finite(acceleration, "acceleration", next.time)?;

        let (kinematics, grounded) = Kinematics::new(
            Vector2D::new(next.downrange, next.altitude),
            Vector2D::new(next.horizontal_velocity, next.velocity),
        )
        .step(acceleration, dt)
        .clamp_to_ground();
        ensure_finite(kinematics.position, "position", next.time)?;
        ensure_finite(kinematics.velocity, "velocity", next.time)?;

        next.fuel_mass = (next.fuel_mass - forces.burn.fuel_consumed).max(0.0);
        next.throttle = forces.burn.effective_throttle;
        next.pitch_angle = pitch;
        next.acceleration = acceleration.y;
        next.downrange = kinematics.position.x;
        next.altitude = kinematics.position.y;
        next.horizontal_velocity = kinematics.velocity.x;
        next.velocity = kinematics.velocity.y;
        next.max_altitude = next.max_altitude.max(next.altitude);

        let g_force = acceleration.magnitude() / STANDARD_GRAVITY;
        if !next.engine_cutoff {
            if let Some(reason) = self.cutoff_reason(&next, forces.burn.exhausted, g_force) {
                next.engine_cutoff = true;
                if next.phase == FlightPhase::Burning {
                    next.phase = FlightPhase::Coasting;
                }
                info!(
                    time = next.time + dt,
                    altitude = next.altitude,
                    velocity = next.velocity,
                    fuel_mass = next.fuel_mass,
                    reason,
                    "main engine cutoff"
                );
            }
        }

        if grounded && next.time > self.settings.landing_grace_period {
            next.velocity = 0.0;
            next.horizontal_velocity = 0.0;
            next.acceleration = 0.0;
            next.phase = FlightPhase::Landed;
            info!(
                time = next.time + dt,
                max_altitude = next.max_altitude,
                downrange = next.downrange,
                "touchdown"
            );
        }

        next.tick += 1;
        next.time = next.tick as f64 * dt;

        let frame = flight_frame(&next, &forces, &sample, g_force);
        trace!(
            time = frame.time,
            altitude = frame.altitude,
            velocity = frame.velocity,
            phase = %frame.phase,
            "tick"
        );

        self.state = next;
        self.last_frame = frame;
        sink.record(&frame);
        Ok(frame)
    }

    fn cutoff_reason(&self, state: &FlightState, exhausted: bool, g_force: f64) -> Option<&'static str> {
        if exhausted || state.fuel_mass <= 0.0 {
            return Some("propellant exhausted");
        }
        if self
            .vehicle
            .cutoff_altitude
            .is_some_and(|altitude| state.altitude >= altitude)
        {
            return Some("cutoff altitude reached");
        }
        if self.vehicle.max_g_force.is_some_and(|limit| g_force > limit) {
            return Some("g-force limit exceeded");
        }
        None
    }
}

fn ensure_finite(value: Vector2D, quantity: &str, time: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::NumericDegeneracy(format!(
            "{} became non-finite ({:?}) in the tick starting at t = {} s",
            quantity, value, time
        )))
    }
}

fn flight_frame(
    state: &FlightState,
    forces: &Forces,
    sample: &EnvironmentSample,
    g_force: f64,
) -> TelemetryFrame {
    let landed = state.phase == FlightPhase::Landed;
    TelemetryFrame {
        time: state.time,
        altitude: state.altitude,
        velocity: state.velocity,
        horizontal_velocity: state.horizontal_velocity,
        downrange: state.downrange,
        acceleration: state.acceleration,
        fuel_mass: state.fuel_mass,
        mass: state.mass(),
        phase: state.phase,
        throttle: state.throttle,
        pitch: state.pitch_angle,
        thrust: forces.burn.thrust,
        drag: forces.drag.y,
        drag_coefficient: forces.drag_coefficient,
        drag_limited: forces.drag_limited,
        air_density: sample.density,
        gravity: sample.gravity,
        g_force: if landed { 0.0 } else { g_force },
        max_altitude: state.max_altitude,
    }
}

fn idle_frame(state: &FlightState, sample: &EnvironmentSample) -> TelemetryFrame {
    TelemetryFrame {
        time: state.time,
        altitude: state.altitude,
        velocity: state.velocity,
        horizontal_velocity: state.horizontal_velocity,
        downrange: state.downrange,
        acceleration: state.acceleration,
        fuel_mass: state.fuel_mass,
        mass: state.mass(),
        phase: state.phase,
        throttle: state.throttle,
        pitch: state.pitch_angle,
        thrust: 0.0,
        drag: 0.0,
        drag_coefficient: 0.0,
        drag_limited: false,
        air_density: sample.density,
        gravity: sample.gravity,
        g_force: 0.0,
        max_altitude: state.max_altitude,
    }
}
