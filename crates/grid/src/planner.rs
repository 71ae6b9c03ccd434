use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use tileslicer_common::{Aabb, SwizzleYz};

/// Errors from grid planning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("tile dimensions must be finite and positive, got {0}")]
    InvalidTileDimensions(DVec3),
    #[error("bounds are not finite: min {min}, max {max}")]
    NonFiniteBounds { min: DVec3, max: DVec3 },
    #[error("bounds collapse to the single point {0}")]
    ZeroExtent(DVec3),
    #[error("bounds are flat on the tile boundary {axis} = {value}, no tile can hold them")]
    FlatOnTileBoundary { axis: char, value: f64 },
    #[error("grid of {0} tiles is too large to export")]
    TooLarge(f64),
}

/// Upper limit on the total tile count of one grid.
pub const MAX_TILES: usize = 1 << 24;

/// Largest tile index magnitude on one axis.
const MAX_AXIS_INDEX: f64 = i32::MAX as f64;

/// The planned tile grid for one export.
///
/// `origin` is the world-space minimum corner of tile (0,0,0). A grid is never
/// mutated after planning; [`TilesetGrid::swizzled`] returns a new one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TilesetGrid {
    pub size: IVec3,
    pub origin: DVec3,
    pub tile_dimensions: DVec3,
}

impl TilesetGrid {
    /// Total number of tiles in the grid.
    pub fn tile_count(&self) -> usize {
        let s = self.size.max(IVec3::ZERO);
        (s.x as usize)
            .saturating_mul(s.y as usize)
            .saturating_mul(s.z as usize)
    }

    /// The same grid with the Y and Z axes exchanged.
    pub fn swizzled(&self) -> Self {
        Self {
            size: self.size.swizzle_yz(),
            origin: self.origin.swizzle_yz(),
            tile_dimensions: self.tile_dimensions.swizzle_yz(),
        }
    }
}

/// Computes grid extents and origin from collection bounds and a tile size.
pub struct GridPlanner;

impl GridPlanner {
    /// Plan a grid covering `bounds` with tiles of `tile_dimensions`.
    ///
    /// Per axis the origin is `floor(min / d) * d` and the count is
    /// `ceil(max / d) - floor(min / d)`, at least one. Both tile-aligned ends are
    /// then checked against the bounds so rounding in the division can never
    /// leave a sliver of the bounds uncovered.
    ///
    /// Bounds that are flat on an axis must fall strictly inside a tile there,
    /// since membership never counts a box lying on a tile face. The total tile
    /// count is capped at [`MAX_TILES`].
    pub fn plan(bounds: &Aabb, tile_dimensions: DVec3) -> Result<TilesetGrid, PlanError> {
        if !tile_dimensions.is_finite() || !tile_dimensions.cmpgt(DVec3::ZERO).all() {
            return Err(PlanError::InvalidTileDimensions(tile_dimensions));
        }
        if !bounds.is_finite() {
            return Err(PlanError::NonFiniteBounds {
                min: bounds.min,
                max: bounds.max,
            });
        }
        if bounds.extent() == DVec3::ZERO {
            return Err(PlanError::ZeroExtent(bounds.min));
        }

        let x = plan_axis('x', bounds.min.x, bounds.max.x, tile_dimensions.x)?;
        let y = plan_axis('y', bounds.min.y, bounds.max.y, tile_dimensions.y)?;
        let z = plan_axis('z', bounds.min.z, bounds.max.z, tile_dimensions.z)?;

        let tiles = x.0 as f64 * y.0 as f64 * z.0 as f64;
        if tiles > MAX_TILES as f64 {
            return Err(PlanError::TooLarge(tiles));
        }

        let grid = TilesetGrid {
            size: IVec3::new(x.0, y.0, z.0),
            origin: DVec3::new(x.1, y.1, z.1),
            tile_dimensions,
        };
        tracing::debug!(
            size = ?grid.size,
            origin = ?grid.origin,
            tiles = grid.tile_count(),
            "planned tile grid"
        );
        Ok(grid)
    }
}

/// Tile count and origin for one axis.
fn plan_axis(axis: char, min: f64, max: f64, tile: f64) -> Result<(i32, f64), PlanError> {
    let mut first = (min / tile).floor();
    let mut last = (max / tile).ceil().max(first + 1.0);

    // Bail out before the fix-up loops: past 2^53 `first - 1.0 == first`.
    if first.abs() > MAX_AXIS_INDEX || last.abs() > MAX_AXIS_INDEX {
        return Err(PlanError::TooLarge(last - first));
    }
    while first * tile > min {
        first -= 1.0;
    }
    while last * tile < max {
        last += 1.0;
    }

    let count = last - first;
    if count > MAX_AXIS_INDEX {
        return Err(PlanError::TooLarge(count));
    }
    // `+ 0.0` normalises a negative zero origin.
    let origin = first * tile + 0.0;

    // Faces are computed the way `TilesetGrid::tile_min` does.
    if min == max && (0..=count as i64).any(|i| origin + i as f64 * tile == min) {
        return Err(PlanError::FlatOnTileBoundary { axis, value: min });
    }
    Ok((count as i32, origin))
}
