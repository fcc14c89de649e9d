use std::sync::Arc;
use std::thread;

use approx::{assert_abs_diff_eq, assert_relative_eq};
use flight_simulation::{
    errors::SimulationError, Command, EnvironmentModel, EnvironmentTable, FlightPhase, Mission,
    MissionOutcome, Rocket, SimulationConfig, SimulationSettings, StandardAtmosphere,
    TelemetryFrame, TelemetryRecorder, ThrottleSchedule, VehicleConfig, STANDARD_GRAVITY,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn settings(time_step: f64) -> SimulationSettings {
    SimulationSettings {
        time_step,
        ..SimulationSettings::default()
    }
}

// Helper function to create the reference 50 km sounding rocket
fn create_test_rocket(vehicle: VehicleConfig, time_step: f64) -> Rocket {
    Rocket::new(vehicle, StandardAtmosphere::default(), settings(time_step))
        .expect("reference vehicle is valid")
}

fn fly_to_landing<E: EnvironmentModel>(rocket: &mut Rocket<E>, command: &Command) -> Vec<TelemetryFrame> {
    let mut frames = Vec::new();
    while !rocket.state().has_landed() {
        rocket
            .step_with_sink(command, &mut frames)
            .expect("tick should succeed");
        assert!(rocket.state().time() < 2_000.0, "flight never landed");
    }
    frames
}

#[test]
fn test_burnout_forces_coasting() {
    let mut rocket = create_test_rocket(VehicleConfig::default(), 1.0);
    let frames: Vec<TelemetryFrame> = (0..30)
        .map(|_| rocket.step(&Command::FULL_THROTTLE).unwrap())
        .collect();

    let last_burning = &frames[21];
    assert_eq!(last_burning.time, 22.0);
    assert_eq!(last_burning.phase, FlightPhase::Burning);
    assert_eq!(last_burning.thrust, 120_000.0);
    assert!(last_burning.fuel_mass > 0.0);

    let burnout = &frames[22];
    assert_eq!(burnout.time, 23.0);
    assert_eq!(burnout.thrust, 0.0);
    assert_eq!(burnout.fuel_mass, 0.0);
    assert_eq!(burnout.phase, FlightPhase::Coasting);
    assert_abs_diff_eq!(burnout.time, 1_000.0 / (120_000.0 / (280.0 * 9.81)), epsilon = 0.5);

    for frame in &frames[23..] {
        assert_eq!(frame.thrust, 0.0);
        assert_eq!(frame.phase, FlightPhase::Coasting);
        assert_eq!(frame.mass, 400.0);
    }
}

#[test]
fn test_parachute_deploys_on_crossing_tick() {
    let vehicle = VehicleConfig {
        parachute_deploy_altitude: 2_000.0,
        ..VehicleConfig::default()
    };
    let mut rocket = create_test_rocket(vehicle, 1.0);
    let frames = fly_to_landing(&mut rocket, &Command::FULL_THROTTLE);

    let deploy = frames
        .iter()
        .position(|frame| frame.phase == FlightPhase::ParachuteDeployed)
        .expect("parachute should deploy");
    let (before_crossing, crossed, deployed) = (&frames[deploy - 2], &frames[deploy - 1], &frames[deploy]);

    assert!(before_crossing.altitude > 2_000.0);
    assert!(crossed.altitude <= 2_000.0);
    assert!(crossed.velocity < 0.0);
    assert_eq!(crossed.phase, FlightPhase::Coasting);

    assert_eq!(crossed.drag_coefficient, 0.45);
    assert_eq!(deployed.drag_coefficient, 3.0);
    assert!(deployed.acceleration > crossed.acceleration);
    assert!(deployed.velocity > crossed.velocity);

    for frame in &frames[deploy..] {
        assert!(matches!(
            frame.phase,
            FlightPhase::ParachuteDeployed | FlightPhase::Landed
        ));
    }
}

fn apogee(time_step: f64) -> f64 {
    let mut rocket = create_test_rocket(VehicleConfig::default(), time_step);
    fly_to_landing(&mut rocket, &Command::FULL_THROTTLE);
    rocket.state().max_altitude()
}

// The burnout tick gives no thrust, so up to one step of impulse is lost and
// the apogee error tracks the coarse step size.
#[test]
fn test_halving_time_step_converges() {
    for coarse_step in [1.0, 0.5, 0.25, 0.12, 0.1] {
        let coarse = apogee(coarse_step);
        let fine = apogee(coarse_step / 2.0);
        let relative = (coarse - fine).abs() / fine;

        assert!(fine > 10_000.0);
        assert!(
            relative <= 0.1 * coarse_step + 0.005,
            "dt {} vs {}: apogee differs by {:.4}",
            coarse_step,
            coarse_step / 2.0,
            relative
        );
        if coarse_step <= 0.12 {
            assert_relative_eq!(coarse, fine, max_relative = 0.02);
        }
    }
}

#[test]
fn test_state_invariants_under_random_commands() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..20 {
        let vehicle = VehicleConfig {
            propellant_mass: rng.gen_range(0.0..2_000.0),
            dry_mass: rng.gen_range(100.0..1_000.0),
            engine_thrust: rng.gen_range(0.0..200_000.0),
            min_throttle: rng.gen_range(0.0..0.5),
            ..VehicleConfig::default()
        };
        let time_step = rng.gen_range(0.05..1.0);
        let mut rocket = create_test_rocket(vehicle.clone(), time_step);
        let mut previous_fuel = vehicle.propellant_mass;

        for _ in 0..2_000 {
            let throttle = rng.gen_range(0.0..=1.0);
            let command = if rng.gen_bool(0.3) {
                Command::new(throttle, Some(rng.gen_range(0.0..=90.0))).unwrap()
            } else {
                Command::throttle(throttle).unwrap()
            };
            let frame = rocket.step(&command).unwrap();
            let state = rocket.state();

            assert_eq!(state.mass(), state.dry_mass() + state.fuel_mass());
            assert_eq!(frame.mass, vehicle.dry_mass + frame.fuel_mass);
            assert!(state.fuel_mass() >= 0.0);
            assert!(state.fuel_mass() <= previous_fuel);
            assert!(state.altitude() >= 0.0);
            assert!(frame.throttle >= 0.0 && frame.throttle <= 1.0);
            previous_fuel = state.fuel_mass();

            if state.has_landed() {
                break;
            }
        }
    }
}

#[test]
fn test_landed_state_is_idempotent() {
    let mut rocket = create_test_rocket(VehicleConfig::default(), 1.0);
    fly_to_landing(&mut rocket, &Command::FULL_THROTTLE);
    let landed = rocket.state().clone();

    for _ in 0..5 {
        let frame = rocket.step(&Command::FULL_THROTTLE).unwrap();
        assert_eq!(frame.altitude, 0.0);
        assert_eq!(frame.velocity, 0.0);
        assert_eq!(frame.phase, FlightPhase::Landed);
    }
    assert_eq!(rocket.state(), &landed);
}

#[test]
fn test_throttle_boundaries() {
    let vehicle = VehicleConfig {
        min_throttle: 0.3,
        ..VehicleConfig::default()
    };
    let mut rocket = create_test_rocket(vehicle, 1.0);

    let at_minimum = rocket.step(&Command::throttle(0.3).unwrap()).unwrap();
    assert_relative_eq!(at_minimum.throttle, 0.3, epsilon = 1e-12);
    assert_relative_eq!(at_minimum.thrust, 36_000.0, epsilon = 1e-6);

    let at_maximum = rocket.step(&Command::throttle(1.0).unwrap()).unwrap();
    assert_eq!(at_maximum.throttle, 1.0);

    assert!(matches!(
        Command::throttle(1.1),
        Err(SimulationError::InvalidCommand(_))
    ));
    assert!(matches!(
        Command::throttle(f64::NAN),
        Err(SimulationError::InvalidCommand(_))
    ));
    assert!(matches!(
        Command::FULL_THROTTLE.with_pitch(95.0),
        Err(SimulationError::InvalidCommand(_))
    ));
}

#[test]
fn test_invalid_vehicles_are_rejected() {
    for vehicle in [
        VehicleConfig {
            dry_mass: 0.0,
            ..VehicleConfig::default()
        },
        VehicleConfig {
            engine_thrust: -1.0,
            ..VehicleConfig::default()
        },
        VehicleConfig {
            min_throttle: 1.5,
            ..VehicleConfig::default()
        },
    ] {
        assert!(matches!(
            Rocket::new(vehicle, StandardAtmosphere::default(), settings(1.0)),
            Err(SimulationError::ConfigurationError(_))
        ));
    }
}

#[test]
fn test_flights_share_environment_across_threads() {
    let profile = r#"{
        "air_density": { "0": 1.225, "1000": 1.112, "2000": 1.007, "5000": 0.736 },
        "wind_speed": { "0": 3.0, "1000": 6.0 }
    }"#;
    let environment = Arc::new(EnvironmentTable::from_json_str(profile).unwrap());
    let vehicle = Arc::new(VehicleConfig::default());

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let environment = Arc::clone(&environment);
            let vehicle = Arc::clone(&vehicle);
            thread::spawn(move || {
                let mut rocket = Rocket::new(vehicle, environment, settings(0.5)).unwrap();
                let mut recorder = TelemetryRecorder::new();
                while !rocket.state().has_landed() {
                    rocket
                        .step_with_sink(&Command::FULL_THROTTLE, &mut recorder)
                        .unwrap();
                }
                recorder
            })
        })
        .collect();

    let recorders: Vec<TelemetryRecorder> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    assert_eq!(recorders[0].frames(), recorders[1].frames());
    assert_eq!(recorders[0].summary(), recorders[1].summary());
    assert!(recorders[0].summary().downrange > 0.0);
    assert_eq!(
        recorders[0].frames().last().map(|frame| frame.phase),
        Some(FlightPhase::Landed)
    );
}

#[test]
fn test_config_file_end_to_end() {
    let dir = std::env::temp_dir().join(format!("rocket-flight-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("profile.json"),
        r#"{ "air_density": { "0": 1.2, "1000": 1.1 }, "wind_speed": { "0": 2.0 } }"#,
    )
    .unwrap();
    std::fs::write(
        dir.join("config.json"),
        r#"{
            "rocket": { "propellant_mass": 1000, "dry_mass": 400, "cross_section_area": 1.0,
                        "drag_coeff": 0.45, "parachute_drag_coeff": 3.0, "parachute_altitude": 10000 },
            "engine": { "thrust": 120000, "isp": 280, "min_throttle": 0.0 },
            "simulation": { "time_step": 0.5, "max_sim_time": 1000 },
            "environment": { "gravity": 9.80665, "profile": "profile.json" }
        }"#,
    )
    .unwrap();

    let config = SimulationConfig::from_file(dir.join("config.json")).unwrap();
    let environment = config.environment().unwrap();
    assert_relative_eq!(environment.density(400.0), 1.2, epsilon = 1e-12);
    assert_relative_eq!(environment.wind(0.0), 2.0, epsilon = 1e-12);
    assert_relative_eq!(environment.gravity(0.0), STANDARD_GRAVITY, epsilon = 1e-12);

    let mut rocket = Rocket::new(config.vehicle_config(), environment, config.simulation).unwrap();
    let report = Mission::new(ThrottleSchedule::full_burn())
        .run(&mut rocket)
        .unwrap();

    assert_eq!(report.outcome, MissionOutcome::Landed);
    assert!(report.summary.max_altitude > 10_000.0);
    assert!(report.summary.min_fuel == 0.0);

    std::fs::remove_dir_all(&dir).unwrap();
}
