//! Discrete events the simulation hands to audio and visual collaborators.
//! The core only states intent; playback and drawing live elsewhere.

use super::Vec2;

pub(crate) mod defaults {
    /// Seconds the thrust loop takes to fade out once the engine stops.
    pub const THRUST_FADE: f64 = 0.25;
    pub const CANNON_OFFSET: f64 = 20.;
    pub const SHOT_RANGE: f64 = 350.;
    pub const SHOT_DURATION: f64 = 1.5;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    ThrustIntensityChanged(f64),
    ExplosionTriggered,
    FireTriggered(Shot),
    Touchdown { credited: bool },
    Crashed,
}

/// A purely visual projectile travelling in a straight line from the nose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shot {
    pub origin: Vec2,
    pub end: Vec2,
    pub duration: f64,
}

impl Shot {
    pub fn from_nose(position: Vec2, rotation: f64) -> Self {
        let direction = Vec2::from_angle(rotation);
        let origin = position + direction * defaults::CANNON_OFFSET;
        Self {
            origin,
            end: origin + direction * defaults::SHOT_RANGE,
            duration: defaults::SHOT_DURATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ThrustSound {
    #[default]
    Stopped,
    Playing(f64),
    RampingDown { start_volume: f64, elapsed: f64 },
}

impl ThrustSound {
    pub fn volume(&self) -> f64 {
        match *self {
            ThrustSound::Stopped => 0.,
            ThrustSound::Playing(volume) => volume,
            ThrustSound::RampingDown {
                start_volume,
                elapsed,
            } => start_volume * (1. - elapsed / defaults::THRUST_FADE).max(0.),
        }
    }

    /// Tracks the engine's intensity. Returns the new volume when it changed.
    pub fn follow(&mut self, intensity: f64) -> Option<f64> {
        match *self {
            _ if intensity > 0. => {
                let changed = self.volume() != intensity;
                *self = ThrustSound::Playing(intensity);
                changed.then_some(intensity)
            }
            ThrustSound::Playing(volume) => {
                *self = ThrustSound::RampingDown {
                    start_volume: volume,
                    elapsed: 0.,
                };
                None
            }
            _ => None,
        }
    }

    pub fn advance(&mut self, dt: f64) -> Option<f64> {
        let ThrustSound::RampingDown {
            start_volume,
            elapsed,
        } = *self
        else {
            return None;
        };
        let elapsed = elapsed + dt;
        *self = if elapsed >= defaults::THRUST_FADE {
            ThrustSound::Stopped
        } else {
            ThrustSound::RampingDown {
                start_volume,
                elapsed,
            }
        };
        Some(self.volume())
    }
}
