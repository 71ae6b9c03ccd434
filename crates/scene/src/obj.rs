use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use glam::DVec3;
use tileslicer_common::{ObjectKind, SwizzleYz};
use tileslicer_export::{ExporterError, TileExport, TileExporter, TileJob, TileWorkspace};

use crate::clip::{ClipScratch, clip_triangle};
use crate::graph::{ObjectId, SceneGraph};

/// Buffers reused from tile to tile.
#[derive(Debug, Default)]
pub struct ObjScratch {
    clip: ClipScratch,
    triangles: Vec<[DVec3; 3]>,
}

/// Reference tile exporter: clips every object of a tile to the cutter and
/// writes the pieces to `<output_dir>/<asset_name>.obj`.
///
/// Vertices are written relative to the workspace cursor. With `y_up` the
/// output is converted from Z-up to Y-up by swapping Y and Z, which also
/// reverses triangle winding.
#[derive(Debug, Clone, Copy)]
pub struct ObjTileExporter<'s> {
    scene: &'s SceneGraph,
    y_up: bool,
}

impl<'s> ObjTileExporter<'s> {
    pub fn new(scene: &'s SceneGraph) -> Self {
        Self { scene, y_up: false }
    }

    pub fn y_up(mut self, y_up: bool) -> Self {
        self.y_up = y_up;
        self
    }
}

impl TileExporter<ObjectId> for ObjTileExporter<'_> {
    type Scratch = ObjScratch;

    fn export_tile(
        &mut self,
        job: &TileJob<'_, ObjectId>,
        workspace: &mut TileWorkspace<ObjScratch>,
    ) -> Result<TileExport, ExporterError> {
        let TileWorkspace {
            cutter,
            cursor,
            scratch,
        } = workspace;
        scratch.triangles.clear();

        for &id in job.objects {
            let object = self
                .scene
                .get(id)
                .ok_or_else(|| ExporterError::Failed(format!("object {id} not in scene")))?;
            if object.kind == ObjectKind::Mesh && object.mesh.is_none() {
                return Err(ExporterError::MissingMesh(object.name.clone()));
            }
            for tri in self.scene.world_triangles(id) {
                clip_triangle(tri, cutter, &mut scratch.clip, &mut scratch.triangles);
            }
        }

        if scratch.triangles.is_empty() {
            return Ok(TileExport::Empty);
        }

        let path = job.output_dir.join(format!("{}.obj", job.asset_name));
        write_obj(&path, job.asset_name, &scratch.triangles, *cursor, self.y_up)?;
        Ok(TileExport::Written {
            asset: job.asset_name.to_string(),
            triangles: scratch.triangles.len(),
        })
    }
}

/// Write world-space triangles as an unindexed OBJ, shifted so `origin` is at 0.
pub fn write_obj(
    path: &Path,
    name: &str,
    triangles: &[[DVec3; 3]],
    origin: DVec3,
    y_up: bool,
) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut w = BufWriter::new(File::create(path)?);
    writeln!(w, "o {name}")?;
    for tri in triangles {
        for p in tri {
            let mut v = *p - origin;
            if y_up {
                v = v.swizzle_yz();
            }
            writeln!(w, "v {} {} {}", v.x, v.y, v.z)?;
        }
    }
    for i in 0..triangles.len() {
        let a = i * 3 + 1;
        if y_up {
            writeln!(w, "f {} {} {}", a, a + 2, a + 1)?;
        } else {
            writeln!(w, "f {} {} {}", a, a + 1, a + 2)?;
        }
    }
    w.flush()
}
