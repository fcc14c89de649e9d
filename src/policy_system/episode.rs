use tracing::debug;

use crate::{
    control::{
        command::Command,
        environment::{EnvironmentModel, StandardAtmosphere},
        rocket::Rocket,
    },
    errors::Result,
};

use super::{
    observation::{Observation, ObservationModel, ObservationSpace},
    reward::{AltitudeFuelReward, RewardFunction},
};

/// Outcome of one episode step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub observation: Observation,
    pub reward: f64,
    /// The vehicle has landed.
    pub terminated: bool,
    /// `max_sim_time` was reached.
    pub truncated: bool,
}

/// Episode wrapper around one flight: throttle in, observation and reward
/// out.
pub struct FlightEnv<E: EnvironmentModel = StandardAtmosphere, R = AltitudeFuelReward, O = ObservationSpace> {
    rocket: Rocket<E>,
    reward: R,
    observer: O,
}

impl<E: EnvironmentModel> FlightEnv<E> {
    pub fn new(rocket: Rocket<E>) -> Self {
        let observer = ObservationSpace::for_vehicle(rocket.vehicle());
        FlightEnv {
            rocket,
            reward: AltitudeFuelReward::default(),
            observer,
        }
    }
}

impl<E, R, O> FlightEnv<E, R, O>
where
    E: EnvironmentModel,
    R: RewardFunction,
    O: ObservationModel,
{
    pub fn with_models(rocket: Rocket<E>, reward: R, observer: O) -> Self {
        FlightEnv {
            rocket,
            reward,
            observer,
        }
    }

    pub fn rocket(&self) -> &Rocket<E> {
        &self.rocket
    }

    pub fn reset(&mut self) -> Observation {
        self.rocket.reset();
        debug!("episode reset");
        self.observer.observe(self.rocket.state())
    }

    /// Rejects throttles outside `[0, 1]`; the integrator saturates the rest
    /// to the vehicle's minimum.
    pub fn step(&mut self, throttle: f64) -> Result<Transition> {
        self.rocket.step(&Command::throttle(throttle)?)?;
        let state = self.rocket.state();

        Ok(Transition {
            observation: self.observer.observe(state),
            reward: self.reward.reward(state),
            terminated: state.has_landed(),
            truncated: state.time() >= self.rocket.settings().max_sim_time,
        })
    }
}
