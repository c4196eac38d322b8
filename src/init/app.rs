use std::path::Path;

use super::json;
use crate::error::Error;
use crate::App;

impl App {
    pub fn try_from_file<P: AsRef<Path>>(settings_file_path: P) -> Result<Self, Error> {
        let settings = json::parse_settings(settings_file_path)?;
        Self::try_new(settings)
    }
}
