mod app;
pub mod error;
pub mod init;
pub mod simulation;

pub use app::*;
pub use error::{Error, GeometryRangeError};
pub use simulation::*;
