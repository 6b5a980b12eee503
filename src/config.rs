//! Mission files.
//!
//! A mission file is TOML with an optional `name`, a `[parameters]` table
//! holding [`MissionParameters`], a `[loop]` table holding [`LoopSettings`]
//! and a `[sim]` table picking the simulated body and craft. Every field
//! has a default, so an empty file describes the stock mission.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mission::{LoopSettings, MissionParameters, ParamsError};
use crate::sim::{presets, Body, Craft};

/// Errors that can occur while loading a mission file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid mission: {0}")]
    Invalid(#[from] ParamsError),
    #[error("unknown craft `{0}` (known: {known})", known = presets::NAMES.join(", "))]
    UnknownCraft(String),
    #[error("unknown body `{0}`")]
    UnknownBody(String),
}

/// Which simulated world to fly in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimSettings {
    pub body: String,
    pub craft: String,
    /// Block on wall time while the simulator sleeps.
    pub realtime: bool,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            body: "kerbin".into(),
            craft: "kestrel".into(),
            realtime: false,
        }
    }
}

impl SimSettings {
    pub fn body(&self) -> Result<Body, ConfigError> {
        Body::by_name(&self.body).ok_or_else(|| ConfigError::UnknownBody(self.body.clone()))
    }

    pub fn craft(&self) -> Result<Craft, ConfigError> {
        presets::by_name(&self.craft).ok_or_else(|| ConfigError::UnknownCraft(self.craft.clone()))
    }
}

/// Parsed mission file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MissionFile {
    pub name: String,
    pub parameters: MissionParameters,
    #[serde(rename = "loop")]
    pub loop_settings: LoopSettings,
    pub sim: SimSettings,
}

impl Default for MissionFile {
    fn default() -> Self {
        Self {
            name: "Launch".into(),
            parameters: MissionParameters::default(),
            loop_settings: LoopSettings::default(),
            sim: SimSettings::default(),
        }
    }
}

impl MissionFile {
    /// Check every section; called again after CLI overrides are applied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.parameters.validate()?;
        self.loop_settings.validate()?;
        self.sim.body()?;
        self.sim.craft()?;
        Ok(())
    }
}

/// Parse and validate a mission from TOML text.
pub fn parse_mission(text: &str) -> Result<MissionFile, ConfigError> {
    let mission: MissionFile = toml::from_str(text)?;
    mission.validate()?;
    Ok(mission)
}

/// Load and validate a mission file.
pub fn load_mission<P: AsRef<Path>>(path: P) -> Result<MissionFile, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mission(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_the_stock_mission() {
        let m = parse_mission("").unwrap();
        assert_eq!(m, MissionFile::default());
        assert_eq!(m.name, "Launch");
        assert_eq!(m.loop_settings.refresh_hz, 5.0);
    }

    #[test]
    fn sections_override_defaults() {
        let m = parse_mission(
            r#"
            name = "Polar"

            [parameters]
            target_orbit_altitude = 120000.0
            inclination_deg = 90.0
            roll_deg = 0.0
            no_orbital_debris = false

            [loop]
            refresh_hz = 10.0
            tick_limit = 4000

            [sim]
            craft = "Hornet"
            "#,
        )
        .unwrap();
        assert_eq!(m.name, "Polar");
        assert_eq!(m.parameters.target_orbit_altitude, 120_000.0);
        assert_eq!(m.parameters.inclination_deg, 90.0);
        assert_eq!(m.parameters.roll_deg, Some(0.0));
        assert!(!m.parameters.no_orbital_debris);
        // untouched fields keep their defaults
        assert_eq!(m.parameters.gravity_turn_finish_altitude, 55_000.0);
        assert_eq!(m.loop_settings.refresh_hz, 10.0);
        assert_eq!(m.loop_settings.tick_limit, Some(4_000));
        assert_eq!(m.sim.craft().unwrap().name, "Hornet");
        assert_eq!(m.sim.body().unwrap().name, "Kerbin");
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = parse_mission("[parameters]\ninclination_deg = 200.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ParamsError::InclinationOutOfRange(_))));

        let err = parse_mission("[loop]\nrefresh_hz = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = parse_mission("[sim]\ncraft = \"saturn\"\n").unwrap_err();
        assert!(err.to_string().contains("kestrel"));
    }

    #[test]
    fn unknown_keys_are_parse_errors() {
        let err = parse_mission("[parameters]\ntarget_altitude = 1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn bundled_missions_are_valid() {
        let m = load_mission(concat!(env!("CARGO_MANIFEST_DIR"), "/missions/polar.toml")).unwrap();
        assert_eq!(m.parameters.inclination_deg, 90.0);
        assert_eq!(m.sim.craft, "hornet");
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"FromDisk\"").unwrap();
        let m = load_mission(file.path()).unwrap();
        assert_eq!(m.name, "FromDisk");

        let missing = load_mission("/nonexistent/mission.toml").unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
        assert!(missing.to_string().contains("/nonexistent/mission.toml"));
    }
}
