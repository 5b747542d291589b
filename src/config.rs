//! Tuning file loading. Movement and camera feel can be tweaked from
//! `assets/config/tuning.json` without a rebuild; anything missing or broken falls back to the
//! built-in defaults.

use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::follow::CameraConfig;
use crate::motion::MotionConfig;

pub const TUNING_PATH: &str = "assets/config/tuning.json";
/// Root the asset server reads from.
pub const ASSET_ROOT: &str = "assets";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed tuning file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Everything the tuning file can override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub movement: MotionConfig,
    pub camera: CameraConfig,
}

fn require(field: &'static str, ok: bool, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: reason.to_owned(),
        })
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn non_negative(value: f32) -> bool {
    value.is_finite() && value >= 0.0
}

impl Tuning {
    pub fn from_json(source: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(source)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reads and validates a tuning file. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_owned(),
                    source,
                })
            }
        };
        Self::from_json(&source).map(Some)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let movement = &self.movement;
        require("movement.max_speed", positive(movement.max_speed), "must be > 0")?;
        require(
            "movement.acceleration",
            positive(movement.acceleration),
            "must be > 0",
        )?;
        require(
            "movement.deceleration",
            positive(movement.deceleration),
            "must be > 0",
        )?;
        require(
            "movement.input_deadzone",
            non_negative(movement.input_deadzone) && movement.input_deadzone < 1.0,
            "must be in [0, 1)",
        )?;
        require(
            "movement.smoothing_factor",
            non_negative(movement.smoothing_factor),
            "must be >= 0",
        )?;
        require("movement.tile_size", positive(movement.tile_size), "must be > 0")?;

        let camera = &self.camera;
        require(
            "camera.lerp_factor",
            positive(camera.lerp_factor) && camera.lerp_factor <= 1.0,
            "must be in (0, 1]",
        )?;
        require(
            "camera.lookahead_distance",
            non_negative(camera.lookahead_distance),
            "must be >= 0",
        )?;
        require(
            "camera.deadzone",
            non_negative(camera.deadzone.width) && non_negative(camera.deadzone.height),
            "width and height must be >= 0",
        )?;
        require(
            "camera.world_bounds",
            non_negative(camera.world_bounds.width) && non_negative(camera.world_bounds.height),
            "width and height must be >= 0",
        )?;
        require("camera.zoom", positive(camera.zoom), "must be > 0")?;
        require(
            "camera.viewport",
            positive(camera.viewport.width) && positive(camera.viewport.height),
            "width and height must be > 0",
        )?;
        Ok(())
    }
}

/// Movement tuning shared by every controllable entity.
#[derive(Resource, Debug, Clone, Copy, Default, Deref, DerefMut)]
pub struct MovementSettings(pub MotionConfig);

/// Camera tuning used when the follow camera is spawned.
#[derive(Resource, Debug, Clone, Copy, Default, Deref, DerefMut)]
pub struct CameraSettings(pub CameraConfig);

/// Loads the tuning file once at build time and publishes it as resources.
pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        let tuning = load_tuning();
        app.insert_resource(MovementSettings(tuning.movement))
            .insert_resource(CameraSettings(tuning.camera));
    }
}

/// Whether `path` (relative to [`ASSET_ROOT`]) ships with the game. The web build cannot look,
/// so it always tries the load.
#[cfg(not(target_arch = "wasm32"))]
pub fn asset_available(path: &str) -> bool {
    Path::new(ASSET_ROOT).join(path).is_file()
}

#[cfg(target_arch = "wasm32")]
pub fn asset_available(_path: &str) -> bool {
    true
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning() -> Tuning {
    match Tuning::load(Path::new(TUNING_PATH)) {
        Ok(Some(tuning)) => {
            info!("Loaded tuning overrides from {TUNING_PATH}");
            tuning
        }
        Ok(None) => Tuning::default(),
        Err(err) => {
            warn!("{err}; using default tuning");
            Tuning::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn load_tuning() -> Tuning {
    Tuning::default()
}
