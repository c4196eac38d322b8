use rand::Rng;

use super::terrain::check_coordinates;
use super::{Fragment, KinematicBody, Vec2};
use crate::error::{Error, GeometryRangeError};

pub(crate) mod defaults {
    pub const INITIAL_FUEL: f64 = 5000.;
    pub const DRY_MASS: f64 = 1000.;
    pub const MAX_THRUST: f64 = 10.;
    pub const THRUST_FORCE: f64 = 50.;
    /// Fuel units burned per thrust unit per second.
    pub const FUEL_BURN_RATE: f64 = 10.;
    /// Thrust units shed per second while ramping down after release.
    pub const THRUST_RAMP_RATE: f64 = 20.;
    pub const ROTATION_ACCEL_LIMIT: f64 = 0.01;
    pub const ROTATION_INPUT_SCALE: f64 = 1. / 1000.;
    pub const IMPACT_FUEL_LOSS: f64 = 50.;
    pub const FRAGMENT_SPIN: (f64, f64) = (0.1, 0.3);
    pub const FRAGMENT_JITTER: f64 = 1.;
    pub const FRAGMENT_LIFT: (f64, f64) = (0.5, 1.5);
}

#[derive(Debug, Clone, PartialEq)]
pub struct CraftSettings {
    pub fuel: f64,
    pub dry_mass: f64,
}

impl Default for CraftSettings {
    fn default() -> Self {
        Self {
            fuel: defaults::INITIAL_FUEL,
            dry_mass: defaults::DRY_MASS,
        }
    }
}

impl CraftSettings {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.fuel >= 0.) {
            return Err(Error::Config(format!("Fuel ({}) must not be negative", self.fuel)));
        }
        if !(self.dry_mass > 0.) {
            return Err(Error::Config(format!(
                "DryMass ({}) must be positive",
                self.dry_mass
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    Flying,
    Landed,
    Destroyed,
}

/// Closed outline with the nose along local +y.
fn default_hull() -> Vec<Vec2> {
    vec![
        Vec2::new(10., -15.),
        Vec2::new(0., 15.),
        Vec2::new(-10., -15.),
        Vec2::new(0., -10.),
        Vec2::new(10., -15.),
    ]
}

#[derive(Debug, Clone)]
pub struct Craft {
    body: KinematicBody,
    fuel: f64,
    dry_mass: f64,
    thrust: f64,
    ramping_down: bool,
    max_altitude: f64,
    hull: Vec<Vec2>,
}

impl Default for Craft {
    fn default() -> Self {
        Self {
            body: KinematicBody::default(),
            fuel: defaults::INITIAL_FUEL,
            dry_mass: defaults::DRY_MASS,
            thrust: 0.,
            ramping_down: false,
            max_altitude: 0.,
            hull: default_hull(),
        }
    }
}

impl Craft {
    pub fn from_settings(settings: &CraftSettings) -> Self {
        Self::default()
            .with_fuel(settings.fuel)
            .with_dry_mass(settings.dry_mass)
    }

    pub fn with_body(self, body: KinematicBody) -> Self {
        Self {
            max_altitude: body.position().y,
            body,
            ..self
        }
    }

    pub fn with_position(self, position: Vec2) -> Self {
        let body = self.body.clone().with_position(position);
        self.with_body(body)
    }

    pub fn with_velocity(self, velocity: Vec2) -> Self {
        let body = self.body.clone().with_velocity(velocity);
        Self { body, ..self }
    }

    pub fn with_rotation(self, rotation: f64) -> Self {
        let body = self.body.clone().with_rotation(rotation);
        Self { body, ..self }
    }

    pub fn with_fuel(self, fuel: f64) -> Self {
        Self {
            fuel: fuel.max(0.),
            ..self
        }
    }

    pub fn with_dry_mass(self, dry_mass: f64) -> Self {
        assert!(dry_mass > 0.);
        Self { dry_mass, ..self }
    }

    pub fn with_hull(self, hull: Vec<Vec2>) -> Self {
        Self { hull, ..self }
    }

    /// Returns the new thrust intensity in `[0, 1]`.
    pub fn set_thrust(&mut self, level: f64) -> f64 {
        self.ramping_down = false;
        self.apply_thrust(level);
        self.thrust_intensity()
    }

    /// Starts decaying thrust to zero instead of cutting it off.
    pub fn release_thrust(&mut self) {
        self.ramping_down = self.thrust > 0.;
    }

    pub fn set_rotation_rate(&mut self, level: f64) {
        let level = if level.is_nan() { 0. } else { level };
        self.body.set_angular_acceleration(f64::clamp(
            -level * defaults::ROTATION_INPUT_SCALE,
            -defaults::ROTATION_ACCEL_LIMIT,
            defaults::ROTATION_ACCEL_LIMIT,
        ));
    }

    pub fn add_fuel(&mut self, amount: f64) {
        if amount > 0. && amount.is_finite() {
            self.fuel += amount;
        }
    }

    pub fn update(&mut self, dt: f64) {
        if self.ramping_down {
            self.apply_thrust(self.thrust - defaults::THRUST_RAMP_RATE * dt);
            self.ramping_down = self.thrust > 0.;
        }

        let burn = self.thrust * defaults::FUEL_BURN_RATE * dt;
        let delivered = if self.fuel < burn {
            let delivered = self.fuel / (defaults::FUEL_BURN_RATE * dt);
            self.fuel = 0.;
            delivered
        } else {
            self.fuel -= burn;
            self.thrust
        };
        let acceleration = self.thrust_acceleration(delivered);
        self.body.apply_thrust_acceleration(acceleration);
        if self.fuel <= 0. {
            self.thrust = 0.;
            self.ramping_down = false;
        }

        self.max_altitude = self.max_altitude.max(self.body.position().y);
        self.body.update(dt);
    }

    /// Splits the hull into one fragment per edge, anchored at the edge's
    /// midpoint in world space.
    pub fn breakup<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<Fragment> {
        self.fuel = (self.fuel - defaults::IMPACT_FUEL_LOSS).max(0.);
        self.thrust = 0.;
        self.ramping_down = false;
        self.body.apply_thrust_acceleration(0.);

        let position = self.body.position();
        let rotation = self.body.rotation();
        let velocity = self.body.velocity();
        let (spin_min, spin_max) = defaults::FRAGMENT_SPIN;
        let (lift_min, lift_max) = defaults::FRAGMENT_LIFT;
        let gravity = self.body.gravity();
        let lift = -0.3 * velocity.y + 1.;

        self.hull
            .windows(2)
            .map(|edge| {
                let midpoint = edge[0].midpoint(edge[1]);
                let body = KinematicBody::at(position + midpoint.rotated(rotation))
                    .with_gravity(gravity)
                    .with_rotation(rotation)
                    .with_angular_velocity(rng.gen_range(spin_min..=spin_max))
                    .with_velocity(Vec2::new(
                        velocity.x
                            + rng.gen_range(-defaults::FRAGMENT_JITTER..=defaults::FRAGMENT_JITTER),
                        lift * rng.gen_range(lift_min..=lift_max),
                    ));
                Fragment::new(body, (edge[0] - midpoint, edge[1] - midpoint))
            })
            .collect()
    }

    pub fn check_hull(&self, bound: f64) -> Result<(), GeometryRangeError> {
        check_coordinates(&self.hull, bound)
    }

    pub fn world_hull(&self) -> impl Iterator<Item = Vec2> + '_ {
        let position = self.body.position();
        let rotation = self.body.rotation();
        self.hull.iter().map(move |p| position + p.rotated(rotation))
    }

    fn apply_thrust(&mut self, level: f64) {
        let level = if level.is_nan() {
            0.
        } else {
            level.clamp(0., defaults::MAX_THRUST)
        };
        self.thrust = if self.fuel <= 0. { 0. } else { level };
        let acceleration = self.thrust_acceleration(self.thrust);
        self.body.apply_thrust_acceleration(acceleration);
    }

    /// Fuel has mass, so a lighter tank accelerates harder per unit thrust.
    fn thrust_acceleration(&self, thrust: f64) -> f64 {
        thrust * defaults::THRUST_FORCE / self.total_mass()
    }

    /// Fresh airframe for the next attempt. The tank carries over.
    pub(crate) fn refit(&mut self) {
        self.thrust = 0.;
        self.ramping_down = false;
        self.body.place(Vec2::ZERO);
        self.body.set_angular_acceleration(0.);
        self.body.apply_thrust_acceleration(0.);
        self.max_altitude = 0.;
    }

    pub(crate) fn body_mut(&mut self) -> &mut KinematicBody {
        &mut self.body
    }

    pub(crate) fn mark_altitude(&mut self) {
        self.max_altitude = self.body.position().y;
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    pub fn velocity(&self) -> Vec2 {
        self.body.velocity()
    }

    pub fn rotation(&self) -> f64 {
        self.body.rotation()
    }

    pub fn fuel(&self) -> f64 {
        self.fuel
    }

    pub fn thrust(&self) -> f64 {
        self.thrust
    }

    pub fn thrust_intensity(&self) -> f64 {
        self.thrust / defaults::MAX_THRUST
    }

    pub fn is_ramping_down(&self) -> bool {
        self.ramping_down
    }

    pub fn total_mass(&self) -> f64 {
        self.dry_mass + self.fuel
    }

    pub fn max_altitude(&self) -> f64 {
        self.max_altitude
    }

    pub fn hull(&self) -> &[Vec2] {
        &self.hull
    }
}
