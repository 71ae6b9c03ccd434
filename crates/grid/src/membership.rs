use glam::DVec3;
use tileslicer_common::{Aabb, SceneSource};

use crate::bounds::{CollectionBounds, ObjectFilter, object_bounds};

/// World-space bounds of every participating object, computed once per export.
///
/// Entries keep the order the host listed the objects in, so membership results
/// are deterministic for a given scene.
#[derive(Debug, Clone)]
pub struct ObjectBoundsTable<H> {
    entries: Vec<(H, Aabb)>,
}

impl<H> Default for ObjectBoundsTable<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H: Copy + PartialEq> ObjectBoundsTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<(H, Aabb)>) -> Self {
        Self { entries }
    }

    /// Compute bounds for each accepted handle. Rejected handles are left out.
    pub fn build<S>(scene: &S, handles: &[H], filter: &ObjectFilter) -> Self
    where
        S: SceneSource<Handle = H>,
    {
        let mut table = Self::new();
        for &handle in handles {
            if !filter.accepts(scene, handle) {
                tracing::trace!(
                    name = scene.object_name(handle),
                    "object excluded from tiling"
                );
                continue;
            }
            table.insert(handle, object_bounds(scene.world_bounds_corners(handle)));
        }
        table
    }

    /// Insert or replace the bounds for `handle`.
    pub fn insert(&mut self, handle: H, bounds: Aabb) {
        match self.entries.iter_mut().find(|(h, _)| *h == handle) {
            Some(entry) => entry.1 = bounds,
            None => self.entries.push((handle, bounds)),
        }
    }

    pub fn get(&self, handle: H) -> Option<&Aabb> {
        self.entries
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, b)| b)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (H, &Aabb)> {
        self.entries.iter().map(|(h, b)| (*h, b))
    }

    /// Aggregate bounds of all entries.
    pub fn collection_bounds(&self) -> Option<CollectionBounds> {
        CollectionBounds::from_boxes(self.entries.iter().map(|(_, b)| b))
    }

    /// Objects whose bounds strictly overlap the tile `[tile_min, tile_max]`.
    ///
    /// On each axis the test is `tile_max > obj_min && tile_min < obj_max`; an
    /// object that only touches a tile face is not a member of that tile.
    pub fn objects_in_tile(&self, tile_min: DVec3, tile_max: DVec3) -> Vec<H> {
        let tile = Aabb {
            min: tile_min,
            max: tile_max,
        };
        self.entries
            .iter()
            .filter(|(_, b)| tile.overlaps(b))
            .map(|(h, _)| *h)
            .collect()
    }

    /// Number of objects overlapping the tile, without collecting them.
    pub fn count_in_tile(&self, tile_min: DVec3, tile_max: DVec3) -> usize {
        let tile = Aabb {
            min: tile_min,
            max: tile_max,
        };
        self.entries.iter().filter(|(_, b)| tile.overlaps(b)).count()
    }
}
