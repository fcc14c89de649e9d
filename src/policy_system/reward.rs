use crate::{constants::LANDING_REWARD, control::flight_state::FlightState};

/// Scores the state reached after a tick. Swappable without touching the
/// integrator.
pub trait RewardFunction {
    fn reward(&self, state: &FlightState) -> f64;
}

impl<F: Fn(&FlightState) -> f64> RewardFunction for F {
    fn reward(&self, state: &FlightState) -> f64 {
        self(state)
    }
}

/// Altitude in kilometers minus a fuel penalty; a flat bonus on touchdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeFuelReward {
    pub landing_reward: f64,
    pub fuel_penalty: f64, // per kg left in the tank
}

impl Default for AltitudeFuelReward {
    fn default() -> Self {
        AltitudeFuelReward {
            landing_reward: LANDING_REWARD,
            fuel_penalty: 0.01,
        }
    }
}

impl RewardFunction for AltitudeFuelReward {
    fn reward(&self, state: &FlightState) -> f64 {
        if state.has_landed() {
            return self.landing_reward;
        }
        state.altitude() / 1000.0 - self.fuel_penalty * state.fuel_mass()
    }
}
