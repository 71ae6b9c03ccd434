//! Scene and exporter doubles shared by the unit tests.

use std::collections::HashMap;

use glam::{DVec3, IVec3};
use tileslicer_common::{Aabb, ObjectKind, SceneSource};

use crate::collaborator::{ExporterError, TileExport, TileExporter, TileJob, TileWorkspace};

pub fn boxed(min: [f64; 3], max: [f64; 3]) -> Aabb {
    Aabb::new(DVec3::from_array(min), DVec3::from_array(max))
}

#[derive(Default)]
pub struct FakeScene {
    objects: Vec<(String, ObjectKind, Aabb)>,
    collections: HashMap<String, Vec<usize>>,
}

impl FakeScene {
    pub fn add(&mut self, collection: &str, name: &str, kind: ObjectKind, bounds: Aabb) -> usize {
        let handle = self.objects.len();
        self.objects.push((name.to_string(), kind, bounds));
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(handle);
        handle
    }
}

impl SceneSource for FakeScene {
    type Handle = usize;

    fn collection_objects(&self, collection: &str) -> Option<Vec<usize>> {
        self.collections.get(collection).cloned()
    }

    fn object_name(&self, handle: usize) -> &str {
        &self.objects[handle].0
    }

    fn object_kind(&self, handle: usize) -> ObjectKind {
        self.objects[handle].1
    }

    fn world_bounds_corners(&self, handle: usize) -> [DVec3; 8] {
        self.objects[handle].2.corners()
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub index: IVec3,
    pub asset_name: String,
    pub objects: Vec<usize>,
    pub cutter: Aabb,
    pub cursor: DVec3,
    pub scratch_before: usize,
}

/// Records every call; returns `Empty` or fails for the listed tiles.
#[derive(Debug, Default)]
pub struct FakeExporter {
    pub calls: Vec<Call>,
    pub empty: Vec<IVec3>,
    pub fail: Vec<IVec3>,
}

impl TileExporter<usize> for FakeExporter {
    type Scratch = usize;

    fn export_tile(
        &mut self,
        job: &TileJob<'_, usize>,
        workspace: &mut TileWorkspace<usize>,
    ) -> Result<TileExport, ExporterError> {
        self.calls.push(Call {
            index: job.index,
            asset_name: job.asset_name.to_string(),
            objects: job.objects.to_vec(),
            cutter: workspace.cutter,
            cursor: workspace.cursor,
            scratch_before: workspace.scratch,
        });
        workspace.scratch += 1;

        if self.fail.contains(&job.index) {
            return Err(ExporterError::Failed(format!("tile {} refused", job.index)));
        }
        if self.empty.contains(&job.index) {
            return Ok(TileExport::Empty);
        }
        Ok(TileExport::Written {
            asset: job.asset_name.to_string(),
            triangles: 12 * job.objects.len(),
        })
    }
}
