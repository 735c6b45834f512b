use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use player_camera::{CameraLens, LookLimit};
use player_input::{
    InputMapping, HORIZONTAL_AXIS, JUMP_ACTION, SPRINT_ACTION, VERTICAL_AXIS,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid controller config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize controller config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("{field} must be finite")]
    NonFinite { field: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensitivity {
    pub x: f32,
    pub y: f32,
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self { x: 0.1, y: 0.1 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Camera height above the body origin in meters.
    pub eye_height: f32,
    /// Starting pitch in degrees (90 looks level).
    pub initial_pitch: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let lens = CameraLens::default();
        Self {
            fov: lens.fov_y_degrees,
            near: lens.near,
            far: lens.far,
            eye_height: 0.0,
            initial_pitch: 90.0,
        }
    }
}

impl CameraConfig {
    pub fn lens(&self) -> CameraLens {
        CameraLens {
            fov_y_degrees: self.fov,
            near: self.near,
            far: self.far,
        }
    }
}

/// Names of the mapping entries the frame pipeline reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bindings {
    pub horizontal: String,
    pub vertical: String,
    pub jump: String,
    pub sprint: String,
}

impl Default for Bindings {
    fn default() -> Self {
        Self {
            horizontal: HORIZONTAL_AXIS.to_string(),
            vertical: VERTICAL_AXIS.to_string(),
            jump: JUMP_ACTION.to_string(),
            sprint: SPRINT_ACTION.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    /// Gap kept between the character origin and the ground; also the probe
    /// length.
    pub floor_distance: f32,
    pub gravity: f32,
    pub jump_power: f32,
    pub pointer_idle_ms: u64,
    pub sensitivity: Sensitivity,
    pub look_limit: LookLimit,
    pub camera: CameraConfig,
    pub bindings: Bindings,
    pub input: InputMapping,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 5.0,
            sprint_speed: 10.0,
            floor_distance: 1.0,
            gravity: -9.81,
            jump_power: 5.0,
            pointer_idle_ms: 10,
            sensitivity: Sensitivity::default(),
            look_limit: LookLimit::default(),
            camera: CameraConfig::default(),
            bindings: Bindings::default(),
            input: InputMapping::default(),
        }
    }
}

impl ControllerConfig {
    pub fn parse_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_toml(&text)
    }

    pub fn pointer_idle_window(&self) -> Duration {
        Duration::from_millis(self.pointer_idle_ms)
    }

    /// Rejects non-finite numbers. Ranges and mapping contents are the
    /// caller's business.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("walk_speed", self.walk_speed),
            ("sprint_speed", self.sprint_speed),
            ("floor_distance", self.floor_distance),
            ("gravity", self.gravity),
            ("jump_power", self.jump_power),
            ("sensitivity.x", self.sensitivity.x),
            ("sensitivity.y", self.sensitivity.y),
            ("look_limit.down", self.look_limit.down),
            ("look_limit.up", self.look_limit.up),
            ("camera.fov", self.camera.fov),
            ("camera.near", self.camera.near),
            ("camera.far", self.camera.far),
            ("camera.eye_height", self.camera.eye_height),
            ("camera.initial_pitch", self.camera.initial_pitch),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, value)| !value.is_finite()) {
            return Err(ConfigError::NonFinite {
                field: field.to_string(),
            });
        }
        for (axis, contributions) in &self.input.scalar {
            if contributions.iter().any(|entry| !entry.value.is_finite()) {
                return Err(ConfigError::NonFinite {
                    field: format!("input.scalar.{}", axis),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_fills_defaults() {
        let config = ControllerConfig::parse_toml(
            r#"
            walk_speed = 3.0
            gravity = -20.0

            [look_limit]
            down = 10.0
            up = 170.0
            "#,
        )
        .expect("config");
        assert_eq!(config.walk_speed, 3.0);
        assert_eq!(config.gravity, -20.0);
        assert_eq!(config.look_limit.up, 170.0);
        assert_eq!(config.sprint_speed, 10.0);
        assert_eq!(config.pointer_idle_window(), Duration::from_millis(10));
        assert_eq!(config.input, InputMapping::default());
    }

    #[test]
    fn custom_mapping_replaces_default() {
        let config = ControllerConfig::parse_toml(
            r#"
            [bindings]
            jump = "hop"

            [input.scalar]
            horizontal_axis = [{ inputs = ["KeyJ"], value = -1.0 }, { inputs = ["KeyL"], value = 1.0 }]
            vertical_axis = [{ inputs = ["KeyK"], value = -1.0 }, { inputs = ["KeyI"], value = 1.0 }]

            [input.discrete]
            hop = ["KeyH"]
            sprint = ["KeyU"]
            "#,
        )
        .expect("config");
        assert_eq!(config.bindings.jump, "hop");
        assert_eq!(config.bindings.sprint, SPRINT_ACTION);
        assert!(config.input.action_id("hop").is_ok());
        assert!(config.input.action_id(JUMP_ACTION).is_err());
    }

    #[test]
    fn serialized_defaults_parse_back() {
        let config = ControllerConfig::default();
        let text = config.to_toml().expect("serialize");
        assert_eq!(ControllerConfig::parse_toml(&text).expect("parse"), config);
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let mut config = ControllerConfig::default();
        assert!(config.validate().is_ok());
        config.sensitivity.y = f32::NAN;
        match config.validate() {
            Err(ConfigError::NonFinite { field }) => assert_eq!(field, "sensitivity.y"),
            other => panic!("unexpected result: {:?}", other),
        }

        let mut config = ControllerConfig::default();
        config
            .input
            .scalar
            .get_mut(HORIZONTAL_AXIS)
            .expect("axis")[0]
            .value = f32::INFINITY;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonFinite { .. })
        ));
    }

    #[test]
    fn load_reads_file_and_reports_missing_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "jump_power = 7.5").expect("write");
        let config = ControllerConfig::load(file.path()).expect("load");
        assert_eq!(config.jump_power, 7.5);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            ControllerConfig::load(&missing),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            ControllerConfig::parse_toml("walk_speed = \"fast\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
