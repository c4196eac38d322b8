use std::fmt;

use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::error::Error;
use crate::simulation::*;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub terrain: TerrainSettings,
    pub craft: CraftSettings,
}

/// Pilot intents coming from touch, controller or a script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Thrust(f64),
    ReleaseThrust,
    Rotate(f64),
    Fire,
    ResetFlight,
    AddFuel(f64),
    TogglePause,
}

pub trait CommandProvider {
    fn commands(&mut self, snapshot: &Snapshot) -> Vec<Input>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FragmentView {
    pub position: Vec2,
    pub rotation: f64,
    pub opacity: f64,
    pub endpoints: (Vec2, Vec2),
}

/// Everything a renderer or HUD reads once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub time: f64,
    pub state: FlightState,
    pub position: Vec2,
    pub velocity: Vec2,
    pub rotation: f64,
    pub angular_velocity: f64,
    pub angular_acceleration: f64,
    pub acceleration: f64,
    pub thrust: f64,
    pub fuel: f64,
    pub fragments: Vec<FragmentView>,
    pub status: String,
    pub hot: bool,
    pub landings: usize,
    pub crashes: usize,
    pub paused: bool,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "f: {:+4.0}  a: {:4.2}  r: {:+5.3} {:+5.3}  v: {:+5.2},{:+5.2}  p: {:+4.1},{:+4.0},{:+4.0} l: {}",
            self.fuel,
            self.acceleration * 10.,
            self.angular_acceleration * 1000.,
            self.angular_velocity * 1000.,
            self.velocity.x,
            self.velocity.y,
            self.rotation,
            self.position.x,
            self.position.y,
            self.landings
        )
    }
}

pub struct App {
    controller: FlightController,
    settings: Settings,
    paused: bool,
    time: f64,
}

impl App {
    pub fn try_new(settings: Settings) -> Result<Self, Error> {
        settings.craft.validate()?;
        let mut rng = match settings.terrain.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let terrain = Terrain::generate_within(&settings.terrain, &mut rng)?;
        let craft = Craft::from_settings(&settings.craft);
        craft.check_hull(settings.terrain.panel_limit)?;

        let mut controller = FlightController::new(terrain, StdRng::seed_from_u64(rng.gen()))
            .with_craft(craft, FlightState::Flying);
        controller.drop_ship(settings.terrain.width)?;

        Ok(Self {
            controller,
            settings,
            paused: false,
            time: 0.,
        })
    }

    /// Advances the simulation unless paused.
    pub fn tick(&mut self, dt: f64) -> Option<Landing> {
        if self.paused {
            return None;
        }
        self.time += dt;
        self.controller.tick(dt, self.time)
    }

    pub fn apply(&mut self, input: Input) -> Result<(), Error> {
        match input {
            Input::Thrust(level) => self.controller.set_thrust(level),
            Input::ReleaseThrust => self.controller.release_thrust(),
            Input::Rotate(level) => self.controller.set_rotation_rate(level),
            Input::Fire => {
                if let Some(shot) = self.controller.fire() {
                    log::debug!("Fired towards ({:.0}, {:.0})", shot.end.x, shot.end.y);
                }
            }
            Input::ResetFlight => self.controller.reset_flight()?,
            Input::AddFuel(amount) => self.controller.add_fuel(amount),
            Input::TogglePause => {
                self.paused = !self.paused;
                log::info!("Paused: {}", self.paused);
            }
        }
        Ok(())
    }

    pub fn run<P: CommandProvider>(
        &mut self,
        provider: &mut P,
        dt: f64,
        ticks: usize,
    ) -> Result<(), Error> {
        for _ in 0..ticks {
            for input in provider.commands(&self.snapshot()) {
                self.apply(input)?;
            }
            self.tick(dt);
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let craft = self.controller.craft();
        let body = craft.body();
        Snapshot {
            time: self.time,
            state: self.controller.state(),
            position: craft.position(),
            velocity: craft.velocity(),
            rotation: craft.rotation(),
            angular_velocity: body.angular_velocity(),
            angular_acceleration: body.angular_acceleration(),
            acceleration: body.current_acceleration_magnitude(),
            thrust: craft.thrust(),
            fuel: craft.fuel(),
            fragments: self
                .controller
                .fragments()
                .iter()
                .map(|f| FragmentView {
                    position: f.position(),
                    rotation: f.rotation(),
                    opacity: f.opacity(),
                    endpoints: f.endpoints(),
                })
                .collect(),
            status: self.controller.status_label().to_owned(),
            hot: self.controller.is_hot(),
            landings: self.controller.landings(),
            crashes: self.controller.crashes(),
            paused: self.paused,
        }
    }

    pub fn panels(&self) -> Result<Vec<Panel>, Error> {
        Ok(self
            .controller
            .terrain()
            .panels(self.settings.terrain.panel_limit)?)
    }

    pub fn drain_signals(&mut self) -> Vec<Signal> {
        self.controller.drain_signals()
    }

    pub fn controller(&self) -> &FlightController {
        &self.controller
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}
