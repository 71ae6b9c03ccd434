use std::path::Path;

use glam::{DVec3, IVec3};
use tileslicer_common::Aabb;
use tileslicer_grid::TileBounds;

/// Errors an exporter reports for one tile.
#[derive(Debug, thiserror::Error)]
pub enum ExporterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("object {0} has no exportable mesh data")]
    MissingMesh(String),
    #[error("{0}")]
    Failed(String),
}

/// Everything the exporter needs to know about the tile being cut.
#[derive(Debug, Clone, Copy)]
pub struct TileJob<'a, H> {
    pub index: IVec3,
    pub bounds: TileBounds,
    /// File stem for the tile asset.
    pub asset_name: &'a str,
    pub output_dir: &'a Path,
    /// Objects overlapping the tile, in scene order.
    pub objects: &'a [H],
}

/// Per-run state shared by every tile of one export.
///
/// The scheduler moves `cutter` onto the current tile and `cursor` onto the
/// chosen tile origin before each call. `scratch` belongs to the exporter and
/// survives between tiles so buffers can be reused.
#[derive(Debug, Default)]
pub struct TileWorkspace<S> {
    pub cutter: Aabb,
    pub cursor: DVec3,
    pub scratch: S,
}

/// Outcome of exporting one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TileExport {
    /// An asset was written; `asset` is recorded as the tile's `src`.
    Written { asset: String, triangles: usize },
    /// Clipping left no triangles, nothing was written.
    Empty,
}

/// Clips the given objects to the workspace cutter and writes one tile asset.
///
/// Called once per non-empty tile, strictly one tile at a time.
pub trait TileExporter<H> {
    type Scratch: Default;

    fn export_tile(
        &mut self,
        job: &TileJob<'_, H>,
        workspace: &mut TileWorkspace<Self::Scratch>,
    ) -> Result<TileExport, ExporterError>;
}

impl<H, E: TileExporter<H> + ?Sized> TileExporter<H> for &mut E {
    type Scratch = E::Scratch;

    fn export_tile(
        &mut self,
        job: &TileJob<'_, H>,
        workspace: &mut TileWorkspace<Self::Scratch>,
    ) -> Result<TileExport, ExporterError> {
        (**self).export_tile(job, workspace)
    }
}
