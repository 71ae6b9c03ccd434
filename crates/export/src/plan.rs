use glam::IVec3;
use tileslicer_common::SceneSource;
use tileslicer_grid::{CollectionBounds, GridPlanner, ObjectBoundsTable, TilesetGrid};

use crate::error::{DegenerateReason, ExportError};
use crate::settings::ExportSettings;

/// Everything computed once before any tile is visited.
#[derive(Debug, Clone)]
pub struct ExportPlan<H> {
    /// Manifest name.
    pub name: String,
    pub collection: String,
    pub table: ObjectBoundsTable<H>,
    pub bounds: CollectionBounds,
    pub grid: TilesetGrid,
}

impl<H: Copy + PartialEq> ExportPlan<H> {
    /// Resolve the target collection, measure its objects and plan the grid.
    ///
    /// Nothing is written to disk.
    pub fn build<S>(scene: &S, settings: &ExportSettings) -> Result<Self, ExportError>
    where
        S: SceneSource<Handle = H>,
    {
        settings.validate()?;
        let collection = settings
            .collection
            .as_deref()
            .ok_or(ExportError::NoTargetSelected)?;
        let handles = scene
            .collection_objects(collection)
            .ok_or_else(|| ExportError::UnknownTarget(collection.to_string()))?;
        let table = ObjectBoundsTable::build(scene, &handles, &settings.object_filter());
        tracing::debug!(
            collection,
            listed = handles.len(),
            accepted = table.len(),
            "measured collection objects"
        );
        Self::from_table(collection, table, settings)
    }

    /// Plan the grid for an already measured set of objects.
    pub fn from_table(
        collection: &str,
        table: ObjectBoundsTable<H>,
        settings: &ExportSettings,
    ) -> Result<Self, ExportError> {
        let degenerate = |reason| ExportError::DegenerateBounds {
            collection: collection.to_string(),
            reason,
        };
        let bounds = table
            .collection_bounds()
            .ok_or_else(|| degenerate(DegenerateReason::NoObjects))?;
        let grid = GridPlanner::plan(&bounds.aabb(), settings.tile_dimensions)
            .map_err(|e| degenerate(DegenerateReason::Plan(e)))?;

        let name = settings
            .tileset_name
            .clone()
            .unwrap_or_else(|| collection.to_string());
        Ok(Self {
            name,
            collection: collection.to_string(),
            table,
            bounds,
            grid,
        })
    }

    /// Objects overlapping tile `index`.
    pub fn tile_objects(&self, index: IVec3) -> Vec<H> {
        let b = self.grid.tile_bounds(index);
        self.table.objects_in_tile(b.min, b.max)
    }

    /// Object count of every tile, in traversal order.
    pub fn membership_counts(&self) -> Vec<(IVec3, usize)> {
        self.grid
            .indices()
            .map(|index| {
                let b = self.grid.tile_bounds(index);
                (index, self.table.count_in_tile(b.min, b.max))
            })
            .collect()
    }
}
