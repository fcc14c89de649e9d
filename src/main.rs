use std::io;
use std::path::PathBuf;

use clap::Parser;
use flight_simulation::*;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Single-stage sounding rocket flight simulator
#[derive(Parser, Debug)]
#[command(name = "rocket-flight")]
#[command(author, version, about = "Fixed-step rocket flight simulator", long_about = None)]
struct Cli {
    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// JSON configuration file (rocket, engine, simulation, environment)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tabulated environment profile, overrides the config's profile
    #[arg(short, long)]
    profile: Option<PathBuf>,

    /// Integration time step in seconds
    #[arg(long)]
    time_step: Option<f64>,

    /// Cut the engine after this many seconds (default: burn until dry)
    #[arg(long, conflicts_with = "hold_velocity")]
    burn_time: Option<f64>,

    /// Throttle with a PID loop to hold this vertical velocity (m/s)
    #[arg(long)]
    hold_velocity: Option<f64>,

    /// Stream every telemetry frame to stdout as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("rocket flight simulator v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &cli.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(profile) = cli.profile {
        config.environment.profile = Some(profile);
    }
    if let Some(time_step) = cli.time_step {
        config.simulation.time_step = time_step;
    }

    let environment = config.environment()?;
    let mut rocket = Rocket::new(config.vehicle_config(), environment, config.simulation)?;

    let report = match (cli.hold_velocity, cli.burn_time) {
        (Some(target), _) => fly(
            VelocityHold::new(target, config.simulation.time_step),
            &mut rocket,
            cli.json,
        )?,
        (None, Some(burn_time)) => fly(ThrottleSchedule::new(burn_time), &mut rocket, cli.json)?,
        (None, None) => fly(ThrottleSchedule::full_burn(), &mut rocket, cli.json)?,
    };

    if report.outcome == MissionOutcome::TimedOut {
        warn!(
            max_sim_time = config.simulation.max_sim_time,
            altitude = report.final_state.altitude(),
            "simulation stopped before touchdown"
        );
    }

    if cli.json {
        eprint!("{}", report.summary);
    } else {
        print!("{}", report.summary);
    }

    Ok(())
}

fn fly<P: FlightPlan>(
    plan: P,
    rocket: &mut Rocket<DynEnvironment>,
    json: bool,
) -> flight_simulation::Result<MissionReport> {
    let mut mission = Mission::new(plan);
    if json {
        let mut sink = JsonLinesSink::new(io::stdout().lock());
        mission.run_with_sink(rocket, &mut sink)
    } else {
        mission.run(rocket)
    }
}
