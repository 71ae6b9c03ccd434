use std::path::PathBuf;

use glam::IVec3;
use tileslicer_grid::PlanError;
use tileslicer_tileset::ManifestError;

use crate::collaborator::ExporterError;
use crate::settings::SettingsError;

/// Why a collection cannot be turned into a tile grid.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DegenerateReason {
    #[error("no exportable mesh objects")]
    NoObjects,
    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// Errors from planning or running an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no target collection selected")]
    NoTargetSelected,
    #[error("collection `{0}` not found in scene")]
    UnknownTarget(String),
    #[error("collection `{collection}` cannot be tiled: {reason}")]
    DegenerateBounds {
        collection: String,
        reason: DegenerateReason,
    },
    #[error("invalid settings: {0}")]
    InvalidSettings(#[from] SettingsError),
    #[error("export of tile {index} failed: {source}")]
    ExternalExportFailure {
        index: IVec3,
        #[source]
        source: ExporterError,
    },
    #[error("writing manifest {} failed: {source}", path.display())]
    ManifestWriteFailure {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },
    #[error("export cancelled")]
    Cancelled,
    #[error("export already failed")]
    Halted,
}
