use crate::{
    constants::{OBSERVATION_HIGH, OBSERVATION_LOW},
    control::{flight_state::FlightState, vehicle::VehicleConfig},
};

/// `[altitude, velocity, acceleration, fuel_mass]`
pub type Observation = [f32; 4];

/// Turns flight state into the vector a policy sees.
pub trait ObservationModel {
    fn observe(&self, state: &FlightState) -> Observation;
}

/// Box-bounded observation; every component is clipped into its bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObservationSpace {
    pub low: Observation,
    pub high: Observation,
}

impl ObservationSpace {
    /// The fuel bound is the vehicle's full propellant load.
    pub fn for_vehicle(vehicle: &VehicleConfig) -> Self {
        let [altitude_low, velocity_low, acceleration_low] = OBSERVATION_LOW;
        let [altitude_high, velocity_high, acceleration_high] = OBSERVATION_HIGH;
        ObservationSpace {
            low: [altitude_low, velocity_low, acceleration_low, 0.0],
            high: [
                altitude_high,
                velocity_high,
                acceleration_high,
                vehicle.propellant_mass as f32,
            ],
        }
    }

    pub fn contains(&self, observation: &Observation) -> bool {
        observation
            .iter()
            .zip(self.low.iter().zip(self.high.iter()))
            .all(|(value, (low, high))| (*low..=*high).contains(value))
    }
}

impl ObservationModel for ObservationSpace {
    fn observe(&self, state: &FlightState) -> Observation {
        let raw = [
            state.altitude() as f32,
            state.velocity() as f32,
            state.acceleration() as f32,
            state.fuel_mass() as f32,
        ];
        let mut observation = [0.0; 4];
        for (index, value) in raw.into_iter().enumerate() {
            observation[index] = value.clamp(self.low[index], self.high[index]);
        }
        observation
    }
}
