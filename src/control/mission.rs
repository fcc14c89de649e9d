use tracing::info;

use crate::{
    errors::Result,
    telemetry_system::telemetry::{FlightSummary, TelemetryRecorder, TelemetrySink},
};

use super::{
    command::Command,
    environment::EnvironmentModel,
    flight_state::{FlightPhase, FlightState},
    guidance::PidController,
    rocket::Rocket,
};

/// Source of one command per tick.
pub trait FlightPlan {
    fn command(&mut self, state: &FlightState) -> Result<Command>;
}

impl<F> FlightPlan for F
where
    F: FnMut(&FlightState) -> Result<Command>,
{
    fn command(&mut self, state: &FlightState) -> Result<Command> {
        self(state)
    }
}

/// Same command every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantThrottle(pub Command);

impl FlightPlan for ConstantThrottle {
    fn command(&mut self, _state: &FlightState) -> Result<Command> {
        Ok(self.0)
    }
}

/// Full throttle until `cutoff_time`, then the lowest possible request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrottleSchedule {
    cutoff_time: f64,
}

impl ThrottleSchedule {
    pub fn new(cutoff_time: f64) -> Self {
        ThrottleSchedule { cutoff_time }
    }

    /// Burns until the tanks are dry.
    pub fn full_burn() -> Self {
        Self::new(f64::INFINITY)
    }
}

impl FlightPlan for ThrottleSchedule {
    fn command(&mut self, state: &FlightState) -> Result<Command> {
        if state.time() < self.cutoff_time {
            Ok(Command::FULL_THROTTLE)
        } else {
            Ok(Command::IDLE)
        }
    }
}

/// Throttles to hold a vertical velocity with a PID loop.
#[derive(Debug, Clone)]
pub struct VelocityHold {
    target_velocity: f64,
    time_step: f64,
    controller: PidController,
}

impl VelocityHold {
    pub fn new(target_velocity: f64, time_step: f64) -> Self {
        Self::with_controller(target_velocity, time_step, PidController::default())
    }

    pub fn with_controller(target_velocity: f64, time_step: f64, controller: PidController) -> Self {
        VelocityHold {
            target_velocity,
            time_step,
            controller,
        }
    }
}

impl FlightPlan for VelocityHold {
    fn command(&mut self, state: &FlightState) -> Result<Command> {
        let error = self.target_velocity - state.velocity();
        Command::throttle(self.controller.calculate(error, self.time_step))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionOutcome {
    Landed,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct MissionReport {
    pub outcome: MissionOutcome,
    pub final_state: FlightState,
    pub summary: FlightSummary,
}

/// Drives a flight with a plan until touchdown or `max_sim_time`.
pub struct Mission<P: FlightPlan> {
    plan: P,
}

impl<P: FlightPlan> Mission<P> {
    pub fn new(plan: P) -> Self {
        Mission { plan }
    }

    pub fn run<E: EnvironmentModel>(&mut self, rocket: &mut Rocket<E>) -> Result<MissionReport> {
        self.run_with_sink(rocket, &mut crate::telemetry_system::telemetry::NullSink)
    }

    pub fn run_with_sink<E: EnvironmentModel>(
        &mut self,
        rocket: &mut Rocket<E>,
        sink: &mut dyn TelemetrySink,
    ) -> Result<MissionReport> {
        let max_sim_time = rocket.settings().max_sim_time;
        let mut recorder = TelemetryRecorder::new();

        while !rocket.state().has_landed() && rocket.state().time() < max_sim_time {
            let command = self.plan.command(rocket.state())?;
            rocket.step_with_sink(&command, &mut (&mut recorder, &mut *sink))?;
        }

        let outcome = if rocket.state().phase() == FlightPhase::Landed {
            MissionOutcome::Landed
        } else {
            MissionOutcome::TimedOut
        };
        info!(
            ?outcome,
            time = rocket.state().time(),
            max_altitude = rocket.state().max_altitude(),
            "mission finished"
        );

        Ok(MissionReport {
            outcome,
            final_state: rocket.state().clone(),
            summary: recorder.summary(),
        })
    }
}
