use crate::error::Error;
use crate::simulation::*;
use crate::Settings;
use json::{self, JsonValue};
use std::{fs::File, io::Read, path::Path};

/// Reads an optional key. A present key of the wrong type is an error.
macro_rules! get_json_opt {
    ($json:ident,$($key:literal),+, $func:ident) => {{
        let value = &$json$([$key])+;
        if value.is_null() {
            None
        } else {
            Some(value.$func().ok_or_else(|| {
                Error::Config(concat!("Couldn't read ", concat!($("/", $key),+)).to_owned())
            })?)
        }
    }};
}

pub fn parse_settings<P: AsRef<Path>>(settings_file_path: P) -> Result<Settings, Error> {
    let settings_json = read_json(settings_file_path.as_ref())?;
    settings_from_json(&settings_json)
}

pub fn parse_settings_str(content: &str) -> Result<Settings, Error> {
    settings_from_json(&json::parse(content)?)
}

fn settings_from_json(json: &JsonValue) -> Result<Settings, Error> {
    if !json.is_object() {
        return Err(Error::Config("Settings have to be a json object".to_owned()));
    }
    let settings = Settings {
        terrain: parse_terrain(json)?,
        craft: parse_craft(json)?,
    };
    settings.terrain.validate()?;
    settings.craft.validate()?;
    Ok(settings)
}

fn read_json(file_path: &Path) -> Result<JsonValue, Error> {
    let io_error = |source| Error::Io {
        path: file_path.to_path_buf(),
        source,
    };
    let mut file_content = String::new();
    File::open(file_path)
        .map_err(io_error)?
        .read_to_string(&mut file_content)
        .map_err(io_error)?;
    Ok(json::parse(&file_content)?)
}

fn parse_terrain(json: &JsonValue) -> Result<TerrainSettings, Error> {
    let defaults = TerrainSettings::default();
    Ok(TerrainSettings {
        width: get_json_opt!(json, "Terrain", "Width", as_f64).unwrap_or(defaults.width),
        max_relief: get_json_opt!(json, "Terrain", "MaxRelief", as_f64)
            .unwrap_or(defaults.max_relief),
        seed: get_json_opt!(json, "Terrain", "Seed", as_u64),
        panel_limit: get_json_opt!(json, "Terrain", "PanelLimit", as_f64)
            .unwrap_or(defaults.panel_limit),
        max_elevation: get_json_opt!(json, "Terrain", "MaxElevation", as_f64)
            .unwrap_or(defaults.max_elevation),
    })
}

fn parse_craft(json: &JsonValue) -> Result<CraftSettings, Error> {
    let defaults = CraftSettings::default();
    Ok(CraftSettings {
        fuel: get_json_opt!(json, "Craft", "Fuel", as_f64).unwrap_or(defaults.fuel),
        dry_mass: get_json_opt!(json, "Craft", "DryMass", as_f64).unwrap_or(defaults.dry_mass),
    })
}
