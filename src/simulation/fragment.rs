use super::{KinematicBody, Terrain, Vec2};

pub(crate) mod defaults {
    /// Seconds a fragment stays on screen after breakup.
    pub const LIFETIME: f64 = 2.;
    pub const FINAL_OPACITY: f64 = 0.5;
}

/// One hull edge flung away from a destroyed craft.
#[derive(Debug, Clone)]
pub struct Fragment {
    body: KinematicBody,
    endpoints: (Vec2, Vec2),
    age: f64,
    lifetime: f64,
}

impl Fragment {
    /// `endpoints` are relative to the body's position, before rotation.
    pub fn new(body: KinematicBody, endpoints: (Vec2, Vec2)) -> Self {
        Self {
            body,
            endpoints,
            age: 0.,
            lifetime: defaults::LIFETIME,
        }
    }

    pub fn with_lifetime(self, lifetime: f64) -> Self {
        Self { lifetime, ..self }
    }

    pub fn update(&mut self, dt: f64) {
        self.body.update(dt);
        self.age += dt;
    }

    pub fn settle_on(&mut self, terrain: &Terrain) {
        let position = self.body.position();
        let ground = terrain.height_at(position.x);
        if position.y < ground {
            self.body.settle(ground);
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age >= self.lifetime
    }

    pub fn opacity(&self) -> f64 {
        let progress = if self.lifetime > 0. {
            (self.age / self.lifetime).min(1.)
        } else {
            1.
        };
        1. - (1. - defaults::FINAL_OPACITY) * progress
    }

    pub fn world_endpoints(&self) -> (Vec2, Vec2) {
        let (a, b) = self.endpoints;
        let rotation = self.body.rotation();
        let position = self.body.position();
        (position + a.rotated(rotation), position + b.rotated(rotation))
    }

    pub fn endpoints(&self) -> (Vec2, Vec2) {
        self.endpoints
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn position(&self) -> Vec2 {
        self.body.position()
    }

    pub fn rotation(&self) -> f64 {
        self.body.rotation()
    }

    pub fn age(&self) -> f64 {
        self.age
    }
}
