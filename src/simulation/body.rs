use std::ops::{Add, AddAssign, Mul, Neg, Sub};

pub(crate) mod defaults {
    pub const ANGULAR_DAMPING: f64 = 0.98;
    pub const LINEAR_DAMPING: f64 = 0.999;
    pub const GRAVITY: (f64, f64) = (0., -0.025);
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0., y: 0. };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unit vector the craft's nose points along for a given rotation.
    /// Rotation 0 is straight up, positive values turn counter-clockwise.
    pub fn from_angle(rotation: f64) -> Self {
        let (sin, cos) = rotation.sin_cos();
        Self { x: -sin, y: cos }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn rotated(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self {
            x: self.x * cos - self.y * sin,
            y: self.x * sin + self.y * cos,
        }
    }

    pub fn midpoint(self, w: Vec2) -> Self {
        (self + w) * 0.5
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, w: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + w.x,
            y: self.y + w.y,
        }
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, w: Vec2) {
        self.x += w.x;
        self.y += w.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, w: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - w.x,
            y: self.y - w.y,
        }
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, k: f64) -> Vec2 {
        Vec2 {
            x: self.x * k,
            y: self.y * k,
        }
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl From<(f64, f64)> for Vec2 {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// A 2D particle advanced one fixed-size tick at a time.
///
/// The recurrence assumes a roughly constant tick rate: damping and the
/// acceleration terms are applied per tick, not per second. `dt` is only
/// consumed by rate-dependent inputs such as fuel burn.
#[derive(Debug, Clone)]
pub struct KinematicBody {
    position: Vec2,
    velocity: Vec2,
    linear_acceleration: Vec2,
    rotation: f64,
    angular_velocity: f64,
    angular_acceleration: f64,
    angular_damping: f64,
    linear_damping: f64,
    gravity: Vec2,
}

impl Default for KinematicBody {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            linear_acceleration: Vec2::ZERO,
            rotation: 0.,
            angular_velocity: 0.,
            angular_acceleration: 0.,
            angular_damping: defaults::ANGULAR_DAMPING,
            linear_damping: defaults::LINEAR_DAMPING,
            gravity: defaults::GRAVITY.into(),
        }
    }
}

impl KinematicBody {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn with_position(self, position: Vec2) -> Self {
        Self { position, ..self }
    }

    pub fn with_velocity(self, velocity: Vec2) -> Self {
        Self { velocity, ..self }
    }

    pub fn with_rotation(self, rotation: f64) -> Self {
        Self { rotation, ..self }
    }

    pub fn with_angular_velocity(self, angular_velocity: f64) -> Self {
        Self {
            angular_velocity,
            ..self
        }
    }

    pub fn with_gravity(self, gravity: Vec2) -> Self {
        Self { gravity, ..self }
    }

    pub fn with_angular_damping(self, angular_damping: f64) -> Self {
        Self {
            angular_damping,
            ..self
        }
    }

    pub fn with_linear_damping(self, linear_damping: f64) -> Self {
        Self {
            linear_damping,
            ..self
        }
    }

    pub fn update(&mut self, _dt: f64) {
        self.angular_velocity = self.angular_velocity * self.angular_damping + self.angular_acceleration;
        self.rotation += self.angular_velocity;

        self.velocity = self.velocity * self.linear_damping + self.linear_acceleration + self.gravity;
        self.position += self.velocity;
    }

    pub fn reset(&mut self) {
        self.rotation = 0.;
        self.angular_velocity = 0.;
        self.velocity = Vec2::ZERO;
    }

    pub fn apply_thrust_acceleration(&mut self, magnitude: f64) {
        self.linear_acceleration = Vec2::from_angle(self.rotation) * magnitude;
    }

    pub fn set_angular_acceleration(&mut self, angular_acceleration: f64) {
        self.angular_acceleration = angular_acceleration;
    }

    pub fn current_acceleration_magnitude(&self) -> f64 {
        self.linear_acceleration.length()
    }

    /// Ground clamps are the only writers of position outside the integrator.
    pub(crate) fn set_altitude(&mut self, y: f64) {
        self.position.y = y;
    }

    pub(crate) fn place(&mut self, position: Vec2) {
        self.position = position;
        self.reset();
    }

    /// Inelastic settle used when a fragment sinks through the ground.
    pub(crate) fn settle(&mut self, ground: f64) {
        self.position.y = ground;
        self.velocity = Vec2::new(-self.velocity.x / 2., 0.);
        self.angular_velocity = 0.;
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn linear_acceleration(&self) -> Vec2 {
        self.linear_acceleration
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn angular_acceleration(&self) -> f64 {
        self.angular_acceleration
    }

    pub fn gravity(&self) -> Vec2 {
        self.gravity
    }
}
