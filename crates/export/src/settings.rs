use std::path::{Path, PathBuf};

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tileslicer_grid::ObjectFilter;
use tileslicer_tileset::{TileFormat, TileOriginMode};

/// Errors from loading or validating [`ExportSettings`].
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported settings file extension: {0}")]
    UnsupportedFormat(PathBuf),
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// What the scheduler does when the exporter fails on one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop the export and report the failing tile.
    #[default]
    Abort,
    /// Log the failure, leave the tile empty and carry on.
    SkipAndContinue,
}

/// Every knob of one export run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSettings {
    /// Collection to slice. Required before an export can start.
    pub collection: Option<String>,
    /// Manifest `name`; the collection name when unset.
    pub tileset_name: Option<String>,
    pub tile_dimensions: DVec3,
    pub output_dir: PathBuf,
    pub manifest_file_name: String,
    pub output_prefix: String,
    pub origin_mode: TileOriginMode,
    pub tile_format: TileFormat,
    pub swizzle_yz: bool,
    pub skip_colliders: bool,
    pub collider_suffix: String,
    pub compact_json: bool,
    pub failure_policy: FailurePolicy,
    /// Tiles processed per scheduler tick.
    pub tiles_per_tick: usize,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            collection: None,
            tileset_name: None,
            tile_dimensions: DVec3::splat(8.0),
            output_dir: PathBuf::from("tileset"),
            manifest_file_name: "tileset.json".into(),
            output_prefix: "tile".into(),
            origin_mode: TileOriginMode::Center,
            tile_format: TileFormat::Glb,
            swizzle_yz: false,
            skip_colliders: true,
            collider_suffix: "_collider".into(),
            compact_json: false,
            failure_policy: FailurePolicy::Abort,
            tiles_per_tick: 1,
        }
    }
}

impl ExportSettings {
    /// Load settings from a `.yaml`/`.yml` or `.json` file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let settings: Self = match ext.as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&text)?,
            Some("json") => serde_json::from_str(&text)?,
            _ => return Err(SettingsError::UnsupportedFormat(path.to_path_buf())),
        };
        settings.validate()?;
        tracing::debug!(path = %path.display(), "loaded export settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        let d = self.tile_dimensions;
        if !d.is_finite() || !d.cmpgt(DVec3::ZERO).all() {
            return Err(invalid(
                "tile_dimensions",
                format!("must be finite and positive, got {d}"),
            ));
        }
        if self.tiles_per_tick == 0 {
            return Err(invalid("tiles_per_tick", "must be at least 1".into()));
        }
        if self.output_prefix.is_empty() {
            return Err(invalid("output_prefix", "must not be empty".into()));
        }
        if self.manifest_file_name.is_empty() {
            return Err(invalid("manifest_file_name", "must not be empty".into()));
        }
        if self.skip_colliders && self.collider_suffix.is_empty() {
            return Err(invalid(
                "collider_suffix",
                "must not be empty while skip_colliders is on".into(),
            ));
        }
        Ok(())
    }

    pub fn object_filter(&self) -> ObjectFilter {
        ObjectFilter {
            skip_colliders: self.skip_colliders,
            collider_suffix: self.collider_suffix.clone(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_file_name)
    }
}

fn invalid(field: &'static str, reason: String) -> SettingsError {
    SettingsError::Invalid { field, reason }
}
