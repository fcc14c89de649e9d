use crate::errors::{Result, SimulationError};

/// One tick's control input. Construction validates the values, so every
/// `Command` that reaches the integrator is finite and in range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Command {
    throttle: f64,
    pitch: Option<f64>,
}

impl Command {
    pub const FULL_THROTTLE: Command = Command {
        throttle: 1.0,
        pitch: None,
    };

    /// Lowest possible request; the integrator saturates it to the
    /// vehicle's minimum throttle.
    pub const IDLE: Command = Command {
        throttle: 0.0,
        pitch: None,
    };

    pub fn new(throttle: f64, pitch: Option<f64>) -> Result<Self> {
        if !throttle.is_finite() || !(0.0..=1.0).contains(&throttle) {
            return Err(SimulationError::InvalidCommand(format!(
                "throttle must be a finite value in [0, 1], got {}",
                throttle
            )));
        }
        if let Some(pitch) = pitch {
            if !pitch.is_finite() || !(0.0..=90.0).contains(&pitch) {
                return Err(SimulationError::InvalidCommand(format!(
                    "pitch must be a finite angle in [0, 90] degrees, got {}",
                    pitch
                )));
            }
        }
        Ok(Command { throttle, pitch })
    }

    pub fn throttle(throttle: f64) -> Result<Self> {
        Self::new(throttle, None)
    }

    pub fn with_pitch(self, pitch: f64) -> Result<Self> {
        Self::new(self.throttle, Some(pitch))
    }

    pub fn throttle_setting(&self) -> f64 {
        self.throttle
    }

    pub fn pitch(&self) -> Option<f64> {
        self.pitch
    }
}
