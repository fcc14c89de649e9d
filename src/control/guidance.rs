use serde::{Deserialize, Serialize};

use crate::errors::{Result, SimulationError};

/// Deterministic pitch schedule. Angles are degrees above the horizon,
/// 90 being vertical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PitchProgram {
    #[default]
    Vertical,
    Fixed {
        pitch: f64,
    },
    /// Linear pitch-over between two altitudes.
    GravityTurn {
        start_altitude: f64,
        end_altitude: f64,
        initial_pitch: f64,
        final_pitch: f64,
    },
}

impl PitchProgram {
    pub fn pitch_at(&self, altitude: f64) -> f64 {
        match *self {
            PitchProgram::Vertical => 90.0,
            PitchProgram::Fixed { pitch } => pitch,
            PitchProgram::GravityTurn {
                start_altitude,
                end_altitude,
                initial_pitch,
                final_pitch,
            } => {
                let progress =
                    ((altitude - start_altitude) / (end_altitude - start_altitude)).clamp(0.0, 1.0);
                initial_pitch - (initial_pitch - final_pitch) * progress
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let in_range = |angle: f64| angle.is_finite() && (0.0..=90.0).contains(&angle);
        match *self {
            PitchProgram::Vertical => Ok(()),
            PitchProgram::Fixed { pitch } if in_range(pitch) => Ok(()),
            PitchProgram::GravityTurn {
                start_altitude,
                end_altitude,
                initial_pitch,
                final_pitch,
            } if in_range(initial_pitch)
                && in_range(final_pitch)
                && start_altitude.is_finite()
                && end_altitude.is_finite()
                && end_altitude > start_altitude =>
            {
                Ok(())
            }
            other => Err(SimulationError::ConfigurationError(format!(
                "pitch program {:?} needs angles in [0, 90] and an increasing altitude band",
                other
            ))),
        }
    }
}

/// PID loop whose output is a throttle setting in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct PidController {
    kp: f64,
    ki: f64,
    kd: f64,
    previous_error: f64,
    integral: f64,
    output: f64,
}

impl PidController {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        PidController {
            kp,
            ki,
            kd,
            previous_error: 0.0,
            integral: 0.0,
            output: 0.0,
        }
    }

    pub fn calculate(&mut self, error: f64, delta_time: f64) -> f64 {
        // Anti-windup.
        self.integral = (self.integral + error * delta_time).clamp(-10.0, 10.0);
        let derivative = (error - self.previous_error) / delta_time;
        self.previous_error = error;
        self.output = (self.kp * error + self.ki * self.integral + self.kd * derivative)
            .clamp(0.0, 1.0);
        self.output
    }

    pub fn output(&self) -> f64 {
        self.output
    }

    pub fn reset(&mut self) {
        self.previous_error = 0.0;
        self.integral = 0.0;
        self.output = 0.0;
    }
}

impl Default for PidController {
    fn default() -> Self {
        PidController::new(0.5, 0.1, 0.2)
    }
}
