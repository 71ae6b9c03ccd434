//! Tile grid: bounds calculation, grid planning, tile indexing and membership.
//!
//! # Invariants
//! - The planned grid covers the collection bounds on every axis.
//! - The grid origin sits on a multiple of the tile dimensions from world zero.
//! - Adjacent tiles share a boundary plane with no gap and no overlap.
//! - Membership uses strict overlap: touching a tile face is not membership.

mod bounds;
mod membership;
mod planner;
mod tile;

pub use bounds::{CollectionBounds, ObjectFilter, object_bounds};
pub use membership::ObjectBoundsTable;
pub use planner::{GridPlanner, MAX_TILES, PlanError, TilesetGrid};
pub use tile::{TileBounds, TileIndices};

pub fn crate_info() -> &'static str {
    concat!("tileslicer-grid v", env!("CARGO_PKG_VERSION"))
}
