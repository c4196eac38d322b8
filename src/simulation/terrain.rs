use rand::{rngs::StdRng, Rng, SeedableRng};

use super::Vec2;
use crate::error::{Error, GeometryRangeError};

pub(crate) mod defaults {
    pub const WIDTH: f64 = 5000.;
    pub const MAX_RELIEF: f64 = 300.;
    pub const FLOOR: f64 = 10.;
    pub const MAX_ELEVATION: f64 = 1500.;
    pub const PANEL_LIMIT: f64 = 4000.;
    pub const STEP_MIN: f64 = 40.;
    pub const STEP_MAX: f64 = 100.;
    pub const FLAT_PROBABILITY: f64 = 0.5;
    pub const REGENERATION_ATTEMPTS: usize = 4;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TerrainSettings {
    pub width: f64,
    pub max_relief: f64,
    pub seed: Option<u64>,
    /// Largest coordinate the geometry backend accepts inside one panel.
    pub panel_limit: f64,
    pub max_elevation: f64,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            width: defaults::WIDTH,
            max_relief: defaults::MAX_RELIEF,
            seed: None,
            panel_limit: defaults::PANEL_LIMIT,
            max_elevation: defaults::MAX_ELEVATION,
        }
    }
}

impl TerrainSettings {
    pub fn with_width(self, width: f64) -> Self {
        Self { width, ..self }
    }

    pub fn with_max_relief(self, max_relief: f64) -> Self {
        Self { max_relief, ..self }
    }

    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..self
        }
    }

    pub fn with_panel_limit(self, panel_limit: f64) -> Self {
        Self {
            panel_limit,
            ..self
        }
    }

    pub fn with_max_elevation(self, max_elevation: f64) -> Self {
        Self {
            max_elevation,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.width > 0.) {
            return Err(Error::Config(format!("Width ({}) must be positive", self.width)));
        }
        if !(self.max_relief >= 0.) {
            return Err(Error::Config(format!(
                "MaxRelief ({}) must not be negative",
                self.max_relief
            )));
        }
        if !(self.max_elevation >= defaults::FLOOR) {
            return Err(Error::Config(format!(
                "MaxElevation ({}) below terrain floor {}",
                self.max_elevation,
                defaults::FLOOR
            )));
        }
        if !(self.panel_limit >= defaults::STEP_MAX) {
            return Err(Error::Config(format!(
                "PanelLimit ({}) narrower than the widest terrain step {}",
                self.panel_limit,
                defaults::STEP_MAX
            )));
        }
        Ok(())
    }
}

/// Two consecutive terrain vertices bracketing an x coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub left: Vec2,
    pub right: Vec2,
}

impl Segment {
    pub fn is_flat(&self) -> bool {
        self.left.y == self.right.y
    }

    fn contains_strictly(&self, x: f64) -> bool {
        x > self.left.x && x < self.right.x
    }

    fn interpolate(&self, x: f64) -> f64 {
        let slope = (self.right.y - self.left.y) / (self.right.x - self.left.x);
        self.left.y + slope * (x - self.left.x)
    }
}

/// A contiguous slice of the ridge line in panel-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub origin_x: f64,
    pub points: Vec<Vec2>,
}

impl Panel {
    fn from_world(origin_x: f64, points: Vec<Vec2>) -> Self {
        Self {
            origin_x,
            points: points
                .into_iter()
                .map(|p| Vec2::new(p.x - origin_x, p.y))
                .collect(),
        }
    }
}

pub fn check_coordinates(points: &[Vec2], bound: f64) -> Result<(), GeometryRangeError> {
    match points
        .iter()
        .find(|p| !(p.x.abs() <= bound && p.y.abs() <= bound))
    {
        Some(&point) => Err(GeometryRangeError { point, bound }),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    points: Vec<Vec2>,
}

impl Terrain {
    pub fn from_points(points: Vec<Vec2>) -> Result<Self, Error> {
        if points.len() < 2 {
            return Err(Error::InvalidTerrain(format!(
                "needs at least two points, got {}",
                points.len()
            )));
        }
        if points[0].x != 0. {
            return Err(Error::InvalidTerrain(format!(
                "first point has to start at x = 0, got {}",
                points[0].x
            )));
        }
        if let Some(w) = points
            .windows(2)
            .find(|w| !(w[0].x < w[1].x) || !w[1].y.is_finite())
        {
            return Err(Error::InvalidTerrain(format!(
                "x has to be strictly increasing, {:?} -> {:?}",
                w[0], w[1]
            )));
        }
        Ok(Self { points })
    }

    pub fn generate(width: f64, max_relief: f64, seed: u64) -> Self {
        let settings = TerrainSettings::default()
            .with_width(width)
            .with_max_relief(max_relief);
        Self::generate_with(&settings, &mut StdRng::seed_from_u64(seed))
    }

    /// Random walk: step right, then either hold the height (a pad) or jump
    /// by up to `max_relief`, clamped between the floor and `max_elevation`.
    pub fn generate_with<R: Rng + ?Sized>(settings: &TerrainSettings, rng: &mut R) -> Self {
        let mut points = vec![Vec2::ZERO];
        let (mut x, mut y) = (0., 0.);
        while x < settings.width {
            let dx = rng.gen_range(defaults::STEP_MIN..=defaults::STEP_MAX);
            let dy = if settings.max_relief > 0. && !rng.gen_bool(defaults::FLAT_PROBABILITY) {
                rng.gen_range(-settings.max_relief..=settings.max_relief)
            } else {
                0.
            };
            x = (x + dx).min(settings.width);
            y = f64::clamp(y + dy, defaults::FLOOR, settings.max_elevation);
            points.push(Vec2::new(x, y));
        }
        Self { points }
    }

    /// Generates terrain whose panels fit the geometry bound, regenerating
    /// with a tighter elevation range whenever a coordinate falls outside.
    pub fn generate_within<R: Rng + ?Sized>(
        settings: &TerrainSettings,
        rng: &mut R,
    ) -> Result<Self, Error> {
        settings.validate()?;
        let mut adjusted = settings.clone();
        let mut last_error = None;
        for attempt in 0..defaults::REGENERATION_ATTEMPTS {
            let terrain = Self::generate_with(&adjusted, rng);
            match terrain.panels(settings.panel_limit) {
                Ok(panels) => {
                    log::info!(
                        "Generated terrain: {} points, {} panels, width {}",
                        terrain.points.len(),
                        panels.len(),
                        terrain.width()
                    );
                    return Ok(terrain);
                }
                Err(e) => {
                    log::warn!("Terrain attempt {attempt} rejected: {e}, regenerating");
                    adjusted.max_elevation = adjusted
                        .max_elevation
                        .min(settings.panel_limit)
                        .max(defaults::FLOOR);
                    adjusted.max_relief /= 2.;
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            Some(e) => Err(e.into()),
            None => Err(Error::Config("no terrain generation attempts".to_owned())),
        }
    }

    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn width(&self) -> f64 {
        self.points.last().map_or(0., |p| p.x)
    }

    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.points
            .windows(2)
            .enumerate()
            .map(|(index, w)| Segment {
                index,
                left: w[0],
                right: w[1],
            })
    }

    pub fn segment_at(&self, x: f64) -> Option<Segment> {
        let right = self.points.partition_point(|p| p.x <= x);
        if right == 0 || right == self.points.len() {
            return None;
        }
        Some(Segment {
            index: right - 1,
            left: self.points[right - 1],
            right: self.points[right],
        })
    }

    pub fn height_at(&self, x: f64) -> f64 {
        self.segment_at(x).map_or(0., |s| s.interpolate(x))
    }

    /// Both x values have to lie strictly inside one horizontal segment.
    pub fn is_level(&self, x1: f64, x2: f64) -> bool {
        if !(x1 > 0. && x2 > 0.) {
            return false;
        }
        match self.segment_at(x1) {
            Some(s) => s.contains_strictly(x1) && s.contains_strictly(x2) && s.is_flat(),
            None => false,
        }
    }

    pub fn is_above_ground(&self, position: Vec2, clearance: f64) -> bool {
        position.y > self.height_at(position.x) + clearance
    }

    /// Splits the ridge line into panels no wider than `limit`. Neighbouring
    /// panels share their seam vertex.
    pub fn panels(&self, limit: f64) -> Result<Vec<Panel>, GeometryRangeError> {
        if let Some(&point) = self.points.iter().find(|p| !(p.y.abs() <= limit)) {
            return Err(GeometryRangeError { point, bound: limit });
        }
        let mut panels = Vec::new();
        let mut origin_x = self.points[0].x;
        let mut current = vec![self.points[0]];
        for &point in &self.points[1..] {
            if point.x - origin_x > limit {
                let seam = current[current.len() - 1];
                if point.x - seam.x > limit {
                    return Err(GeometryRangeError { point, bound: limit });
                }
                panels.push(Panel::from_world(
                    origin_x,
                    std::mem::replace(&mut current, vec![seam]),
                ));
                origin_x = seam.x;
            }
            current.push(point);
        }
        panels.push(Panel::from_world(origin_x, current));
        Ok(panels)
    }
}
