mod body;
mod craft;
mod flight_controller;
mod fragment;
pub mod signals;
mod terrain;

pub use body::*;
pub use craft::*;
pub use flight_controller::*;
pub use fragment::*;
pub use signals::{Shot, Signal, ThrustSound};
pub use terrain::*;
