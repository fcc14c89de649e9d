use std::fmt;
use std::io::Write;

use serde::Serialize;
use tracing::warn;

use crate::control::flight_state::FlightPhase;

/// Read-only snapshot of a flight after one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TelemetryFrame {
    pub time: f64,
    pub altitude: f64,
    pub velocity: f64,
    pub horizontal_velocity: f64,
    pub downrange: f64,
    pub acceleration: f64,
    pub fuel_mass: f64,
    pub mass: f64,
    pub phase: FlightPhase,
    pub throttle: f64,
    pub pitch: f64,
    pub thrust: f64,
    pub drag: f64,
    pub drag_coefficient: f64,
    /// Drag was capped this tick; see `Forces::drag_limited`.
    pub drag_limited: bool,
    pub air_density: f64,
    pub gravity: f64,
    pub g_force: f64,
    pub max_altitude: f64,
}

/// Receives one frame per tick. Sinks cannot fail the physics step: any
/// I/O trouble is theirs to log and swallow.
pub trait TelemetrySink {
    fn record(&mut self, frame: &TelemetryFrame);
}

impl<S: TelemetrySink + ?Sized> TelemetrySink for &mut S {
    fn record(&mut self, frame: &TelemetryFrame) {
        (**self).record(frame)
    }
}

/// Fans each frame out to both sinks.
impl<A: TelemetrySink, B: TelemetrySink> TelemetrySink for (A, B) {
    fn record(&mut self, frame: &TelemetryFrame) {
        self.0.record(frame);
        self.1.record(frame);
    }
}

impl TelemetrySink for Vec<TelemetryFrame> {
    fn record(&mut self, frame: &TelemetryFrame) {
        self.push(*frame);
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn record(&mut self, _frame: &TelemetryFrame) {}
}

/// Writes each frame as one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
    failed_writes: usize,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink {
            writer,
            failed_writes: 0,
        }
    }

    pub fn failed_writes(&self) -> usize {
        self.failed_writes
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_frame(&mut self, frame: &TelemetryFrame) -> std::io::Result<()> {
        serde_json::to_writer(&mut self.writer, frame)?;
        self.writer.write_all(b"\n")
    }
}

impl<W: Write> TelemetrySink for JsonLinesSink<W> {
    fn record(&mut self, frame: &TelemetryFrame) {
        if let Err(error) = self.write_frame(frame) {
            self.failed_writes += 1;
            warn!(time = frame.time, %error, "dropping telemetry frame");
        }
    }
}

/// Keeps every frame and tracks flight extremes and phase changes.
#[derive(Debug, Default, Clone)]
pub struct TelemetryRecorder {
    frames: Vec<TelemetryFrame>,
    max_velocity: f64,
    max_altitude: f64,
    max_acceleration: f64,
    max_g_force: f64,
    min_fuel: Option<f64>,
    phase_transitions: Vec<(FlightPhase, f64)>,
}

impl TelemetryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[TelemetryFrame] {
        &self.frames
    }

    pub fn summary(&self) -> FlightSummary {
        let last = self.frames.last();
        FlightSummary {
            flight_time: last.map_or(0.0, |frame| frame.time),
            max_velocity: self.max_velocity,
            max_altitude: self.max_altitude,
            max_acceleration: self.max_acceleration,
            max_g_force: self.max_g_force,
            min_fuel: self.min_fuel.unwrap_or(0.0),
            downrange: last.map_or(0.0, |frame| frame.downrange),
            final_phase: last.map(|frame| frame.phase),
            phase_transitions: self.phase_transitions.clone(),
        }
    }
}

impl TelemetrySink for TelemetryRecorder {
    fn record(&mut self, frame: &TelemetryFrame) {
        self.max_velocity = self.max_velocity.max(frame.velocity.abs());
        self.max_altitude = self.max_altitude.max(frame.altitude);
        self.max_acceleration = self.max_acceleration.max(frame.acceleration.abs());
        self.max_g_force = self.max_g_force.max(frame.g_force);
        self.min_fuel = Some(self.min_fuel.map_or(frame.fuel_mass, |fuel| fuel.min(frame.fuel_mass)));

        if self.frames.last().map(|last| last.phase) != Some(frame.phase) {
            self.phase_transitions.push((frame.phase, frame.time));
        }
        self.frames.push(*frame);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlightSummary {
    pub flight_time: f64,
    pub max_velocity: f64,
    pub max_altitude: f64,
    pub max_acceleration: f64,
    pub max_g_force: f64,
    pub min_fuel: f64,
    pub downrange: f64,
    pub final_phase: Option<FlightPhase>,
    pub phase_transitions: Vec<(FlightPhase, f64)>,
}

fn format_time(elapsed_time: f64) -> String {
    if elapsed_time >= 3600.0 {
        let hours = (elapsed_time / 3600.0).floor();
        let minutes = ((elapsed_time % 3600.0) / 60.0).floor();
        let seconds = elapsed_time % 60.0;
        format!("{:.0}h {:.0}m {:.2}s", hours, minutes, seconds)
    } else if elapsed_time >= 60.0 {
        let minutes = (elapsed_time / 60.0).floor();
        let seconds = elapsed_time % 60.0;
        format!("{:.0}m {:.2}s", minutes, seconds)
    } else {
        format!("{:.2}s", elapsed_time)
    }
}

fn format_altitude(altitude: f64) -> String {
    if altitude >= 1000.0 {
        format!("{:.2} km", altitude / 1000.0)
    } else {
        format!("{:.2} m", altitude)
    }
}

impl fmt::Display for FlightSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Flight Summary ---")?;
        writeln!(f, "Flight Time: {}", format_time(self.flight_time))?;
        writeln!(f, "Max Altitude: {}", format_altitude(self.max_altitude))?;
        writeln!(f, "Max Velocity: {:.2} m/s", self.max_velocity)?;
        writeln!(f, "Max Acceleration: {:.2} m/s² ({:.2} g)", self.max_acceleration, self.max_g_force)?;
        writeln!(f, "Min Fuel: {:.2} kg", self.min_fuel)?;
        writeln!(f, "Downrange: {}", format_altitude(self.downrange))?;
        writeln!(f, "\n--- Phase Transitions ---")?;
        for (phase, time) in &self.phase_transitions {
            writeln!(f, "Phase {} reached at: {}", phase, format_time(*time))?;
        }
        Ok(())
    }
}
