use std::path::PathBuf;

use thiserror::Error;

use crate::simulation::Vec2;

/// A coordinate that a geometry backend cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("coordinate ({}, {}) exceeds geometry bound {bound}", point.x, point.y)]
pub struct GeometryRangeError {
    pub point: Vec2,
    pub bound: f64,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    GeometryRange(#[from] GeometryRangeError),
    #[error("no landing pad found after {attempts} attempts")]
    NoLandingPad { attempts: usize },
    #[error("invalid terrain: {0}")]
    InvalidTerrain(String),
    #[error("invalid settings: {0}")]
    Config(String),
    #[error("error while reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] json::Error),
}
