use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use tileslicer_common::Aabb;

use crate::planner::TilesetGrid;

/// World-space corners of one tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileBounds {
    pub min: DVec3,
    pub center: DVec3,
    pub max: DVec3,
}

impl TileBounds {
    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }
}

impl TilesetGrid {
    /// Minimum corner of tile `index`: `origin + index * tile_dimensions`.
    pub fn tile_min(&self, index: IVec3) -> DVec3 {
        self.origin + index.as_dvec3() * self.tile_dimensions
    }

    /// Maximum corner of tile `index`, computed as the minimum corner of the next
    /// tile on every axis so neighbouring faces compare exactly equal.
    pub fn tile_max(&self, index: IVec3) -> DVec3 {
        self.tile_min(index + IVec3::ONE)
    }

    pub fn tile_center(&self, index: IVec3) -> DVec3 {
        self.tile_min(index) + self.tile_dimensions * 0.5
    }

    pub fn tile_bounds(&self, index: IVec3) -> TileBounds {
        TileBounds {
            min: self.tile_min(index),
            center: self.tile_center(index),
            max: self.tile_max(index),
        }
    }

    pub fn contains_index(&self, index: IVec3) -> bool {
        index.cmpge(IVec3::ZERO).all() && index.cmplt(self.size).all()
    }

    /// Row-major successor of `index`: z fastest, then y, then x.
    /// Returns `None` after the last tile.
    pub fn next_index(&self, index: IVec3) -> Option<IVec3> {
        let mut next = index;
        next.z += 1;
        if next.z >= self.size.z {
            next.z = 0;
            next.y += 1;
            if next.y >= self.size.y {
                next.y = 0;
                next.x += 1;
                if next.x >= self.size.x {
                    return None;
                }
            }
        }
        Some(next)
    }

    /// Row-major position of `index` in a flat tile list.
    pub fn linear_index(&self, index: IVec3) -> usize {
        let (sy, sz) = (self.size.y as usize, self.size.z as usize);
        (index.x as usize * sy + index.y as usize) * sz + index.z as usize
    }

    /// Every tile index in traversal order.
    pub fn indices(&self) -> TileIndices {
        let first = (self.tile_count() > 0).then_some(IVec3::ZERO);
        TileIndices {
            grid: *self,
            next: first,
        }
    }
}

/// Iterator over tile indices in row-major order, x outermost.
#[derive(Debug, Clone)]
pub struct TileIndices {
    grid: TilesetGrid,
    next: Option<IVec3>,
}

impl Iterator for TileIndices {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        let current = self.next?;
        self.next = self.grid.next_index(current);
        Some(current)
    }
}
