use lander::{App, CommandProvider, FlightState, Input, Settings, Snapshot};
use std::env;

const DT: f64 = 1. / 60.;
const DEFAULT_TICKS: usize = 3600;
const GRAVITY: f64 = 0.025;
const THRUST_FORCE: f64 = 50.;

enum Phase {
    Climb { target_y: Option<f64> },
    Descend,
    Parked,
}

/// Climbs straight up off the pad, then sinks back onto it.
struct HoverAutopilot {
    dry_mass: f64,
    climb: f64,
    phase: Phase,
}

impl HoverAutopilot {
    fn new(dry_mass: f64) -> Self {
        Self {
            dry_mass,
            climb: 150.,
            phase: Phase::Climb { target_y: None },
        }
    }

    /// Thrust that moves `vy` a tenth of the way to `target_vy` this tick.
    fn thrust_for(&self, snapshot: &Snapshot, target_vy: f64) -> f64 {
        let acceleration = GRAVITY + 0.1 * (target_vy - snapshot.velocity.y);
        (acceleration * (self.dry_mass + snapshot.fuel) / THRUST_FORCE).max(0.)
    }
}

impl CommandProvider for HoverAutopilot {
    fn commands(&mut self, snapshot: &Snapshot) -> Vec<Input> {
        match self.phase {
            Phase::Climb { target_y: None } => {
                self.phase = Phase::Climb {
                    target_y: Some(snapshot.position.y + self.climb),
                };
                vec![Input::Thrust(self.thrust_for(snapshot, 1.))]
            }
            Phase::Climb {
                target_y: Some(target_y),
            } => {
                if snapshot.position.y >= target_y {
                    self.phase = Phase::Descend;
                }
                vec![Input::Thrust(self.thrust_for(snapshot, 1.))]
            }
            Phase::Descend if snapshot.state == FlightState::Flying => {
                vec![Input::Thrust(self.thrust_for(snapshot, -0.5))]
            }
            Phase::Descend => {
                self.phase = Phase::Parked;
                vec![Input::ReleaseThrust]
            }
            Phase::Parked => Vec::new(),
        }
    }
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings_file_path = env::args().nth(1);
    let ticks = match env::args().nth(2) {
        Some(ticks) => ticks
            .parse()
            .map_err(|e| format!("Invalid tick count {ticks}: {e}"))?,
        None => DEFAULT_TICKS,
    };

    let mut app = match settings_file_path {
        Some(path) => App::try_from_file(path),
        None => App::try_new(Settings::default()),
    }
    .map_err(|e| e.to_string())?;

    let mut autopilot = HoverAutopilot::new(app.settings().craft.dry_mass);
    let now = std::time::Instant::now();
    let result = app.run(&mut autopilot, DT, ticks);
    let elapsed = now.elapsed();
    println!("Run ended with result: {result:?} time: {elapsed:?}");

    let snapshot = app.snapshot();
    println!("{snapshot}");
    println!(
        "Finished {:?}, landings: {}, crashes: {}",
        snapshot.state, snapshot.landings, snapshot.crashes
    );
    result.map_err(|e| e.to_string())
}
