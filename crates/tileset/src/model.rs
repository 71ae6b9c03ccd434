use glam::{DVec3, IVec3};
use serde::{Deserialize, Serialize};
use tileslicer_common::SwizzleYz;
use tileslicer_grid::{TileBounds, TilesetGrid};

use crate::grid3::Grid3;

/// Codec the tile assets were written with, recorded in the manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileFormat {
    #[default]
    #[serde(rename = "GLB")]
    Glb,
    #[serde(rename = "GLTF_SEPARATE")]
    GltfSeparate,
    #[serde(rename = "OBJ")]
    Obj,
}

impl TileFormat {
    /// File extension of one tile asset.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Glb => "glb",
            Self::GltfSeparate => "gltf",
            Self::Obj => "obj",
        }
    }
}

/// Which point of a tile becomes the local origin of its exported asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TileOriginMode {
    #[default]
    #[serde(rename = "CENTER")]
    Center,
    #[serde(rename = "TILE_MIN")]
    TileMin,
    #[serde(rename = "TILE_MAX")]
    TileMax,
}

impl TileOriginMode {
    pub fn pick(self, bounds: &TileBounds) -> DVec3 {
        match self {
            Self::Center => bounds.center,
            Self::TileMin => bounds.min,
            Self::TileMax => bounds.max,
        }
    }
}

/// One cell of the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub index: IVec3,
    /// Asset name, or `None` when the tile holds no exportable geometry.
    pub src: Option<String>,
    pub pos_center: DVec3,
    pub pos_min: DVec3,
    pub pos_max: DVec3,
}

impl Tile {
    pub fn empty(index: IVec3, bounds: &TileBounds) -> Self {
        Self {
            index,
            src: None,
            pos_center: bounds.center,
            pos_min: bounds.min,
            pos_max: bounds.max,
        }
    }

    pub fn bounds(&self) -> TileBounds {
        TileBounds {
            min: self.pos_min,
            center: self.pos_center,
            max: self.pos_max,
        }
    }

    fn swizzle(&mut self) {
        self.index = self.index.swizzle_yz();
        self.pos_center = self.pos_center.swizzle_yz();
        self.pos_min = self.pos_min.swizzle_yz();
        self.pos_max = self.pos_max.swizzle_yz();
    }
}

/// Asset name of the tile at `index`.
///
/// With `swizzle` on, the name carries the indices in the order the swizzled
/// manifest will report them.
pub fn tile_asset_name(prefix: &str, index: IVec3, swizzle: bool) -> String {
    let i = if swizzle { index.swizzle_yz() } else { index };
    format!("{prefix}_{}_{}_{}", i.x, i.y, i.z)
}

/// The tileset manifest written at the end of an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetManifest {
    pub name: String,
    pub tile_dimensions: DVec3,
    pub tileset_size: IVec3,
    pub tileset_origin: DVec3,
    pub tile_format: TileFormat,
    pub tile_origin_mode: TileOriginMode,
    pub axis_up_is_y: bool,
    pub tiles: Grid3<Tile>,
}

impl TilesetManifest {
    /// Allocate every tile of `grid` with its positions filled in and no asset.
    pub fn new(
        name: impl Into<String>,
        grid: &TilesetGrid,
        tile_format: TileFormat,
        tile_origin_mode: TileOriginMode,
    ) -> Self {
        let s = grid.size.max(IVec3::ZERO);
        let dims = [s.x as usize, s.y as usize, s.z as usize];
        let tiles = Grid3::from_fn(dims, |[x, y, z]| {
            let index = IVec3::new(x as i32, y as i32, z as i32);
            Tile::empty(index, &grid.tile_bounds(index))
        });
        Self {
            name: name.into(),
            tile_dimensions: grid.tile_dimensions,
            tileset_size: grid.size,
            tileset_origin: grid.origin,
            tile_format,
            tile_origin_mode,
            axis_up_is_y: false,
            tiles,
        }
    }

    pub fn tile(&self, index: IVec3) -> Option<&Tile> {
        self.tiles.get(cell(index)?)
    }

    pub fn tile_mut(&mut self, index: IVec3) -> Option<&mut Tile> {
        self.tiles.get_mut(cell(index)?)
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Number of tiles with an exported asset.
    pub fn exported_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.src.is_some()).count()
    }

    /// The manifest with Y and Z exchanged on every vector and the tile array
    /// re-indexed so `swizzled.tiles[x][y][z] == tiles[x][z][y]`.
    ///
    /// Applying it twice gives back the original manifest.
    pub fn swizzled(&self) -> Self {
        let mut tiles = self.tiles.swap_yz();
        for tile in tiles.iter_mut() {
            tile.swizzle();
        }
        Self {
            name: self.name.clone(),
            tile_dimensions: self.tile_dimensions.swizzle_yz(),
            tileset_size: self.tileset_size.swizzle_yz(),
            tileset_origin: self.tileset_origin.swizzle_yz(),
            tile_format: self.tile_format,
            tile_origin_mode: self.tile_origin_mode,
            axis_up_is_y: !self.axis_up_is_y,
            tiles,
        }
    }
}

fn cell(index: IVec3) -> Option<[usize; 3]> {
    if index.cmplt(IVec3::ZERO).any() {
        return None;
    }
    Some([index.x as usize, index.y as usize, index.z as usize])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> TilesetGrid {
        TilesetGrid {
            size: IVec3::new(2, 3, 4),
            origin: DVec3::new(-8.0, 0.0, 16.0),
            tile_dimensions: DVec3::new(8.0, 4.0, 2.0),
        }
    }

    fn manifest() -> TilesetManifest {
        TilesetManifest::new("level", &grid(), TileFormat::Obj, TileOriginMode::Center)
    }

    #[test]
    fn new_prepopulates_every_tile() {
        let m = manifest();
        assert_eq!(m.tile_count(), 24);
        assert_eq!(m.exported_count(), 0);
        for (i, index) in grid().indices().enumerate() {
            let tile = m.tile(index).unwrap();
            assert_eq!(tile.index, index);
            assert_eq!(tile.src, None);
            assert_eq!(tile.bounds(), grid().tile_bounds(index));
            assert_eq!(m.tiles.iter().nth(i), Some(tile));
        }
        assert!(m.tile(IVec3::new(2, 0, 0)).is_none());
        assert!(m.tile(IVec3::new(0, -1, 0)).is_none());
    }

    #[test]
    fn swizzle_reindexes_tiles() {
        let mut m = manifest();
        m.tile_mut(IVec3::new(1, 2, 3)).unwrap().src = Some("tile_1_3_2".into());

        let s = m.swizzled();
        assert_eq!(s.tileset_size, IVec3::new(2, 4, 3));
        assert_eq!(s.tileset_origin, DVec3::new(-8.0, 16.0, 0.0));
        assert_eq!(s.tile_dimensions, DVec3::new(8.0, 2.0, 4.0));
        assert!(s.axis_up_is_y);
        assert_eq!(s.tiles.dims(), [2, 4, 3]);

        let moved = s.tile(IVec3::new(1, 3, 2)).unwrap();
        assert_eq!(moved.index, IVec3::new(1, 3, 2));
        assert_eq!(moved.src.as_deref(), Some("tile_1_3_2"));
        let original = m.tile(IVec3::new(1, 2, 3)).unwrap();
        assert_eq!(moved.pos_min, original.pos_min.swizzle_yz());
        assert_eq!(moved.pos_max, original.pos_max.swizzle_yz());
    }

    #[test]
    fn swizzle_is_an_involution() {
        let mut m = manifest();
        m.tile_mut(IVec3::new(0, 1, 2)).unwrap().src = Some("a".into());
        m.tile_mut(IVec3::new(1, 0, 3)).unwrap().src = Some("b".into());
        assert_eq!(m.swizzled().swizzled(), m);
    }

    #[test]
    fn swizzled_tiles_keep_positions_consistent_with_indices() {
        let s = manifest().swizzled();
        let g = grid().swizzled();
        for index in g.indices() {
            let tile = s.tile(index).unwrap();
            assert_eq!(tile.index, index);
            assert_eq!(tile.bounds(), g.tile_bounds(index));
        }
    }

    #[test]
    fn asset_names_follow_swizzle() {
        let index = IVec3::new(1, 2, 3);
        assert_eq!(tile_asset_name("tile", index, false), "tile_1_2_3");
        assert_eq!(tile_asset_name("tile", index, true), "tile_1_3_2");
    }

    #[test]
    fn origin_mode_picks_corner() {
        let b = grid().tile_bounds(IVec3::ZERO);
        assert_eq!(TileOriginMode::Center.pick(&b), DVec3::new(-4.0, 2.0, 17.0));
        assert_eq!(TileOriginMode::TileMin.pick(&b), b.min);
        assert_eq!(TileOriginMode::TileMax.pick(&b), b.max);
    }

    #[test]
    fn enums_use_manifest_names() {
        let format = serde_json::to_string(&TileFormat::GltfSeparate).unwrap();
        assert_eq!(format, "\"GLTF_SEPARATE\"");
        let mode = serde_json::to_string(&TileOriginMode::TileMax).unwrap();
        assert_eq!(mode, "\"TILE_MAX\"");
        let mode: TileOriginMode = serde_json::from_str("\"TILE_MIN\"").unwrap();
        assert_eq!(mode, TileOriginMode::TileMin);
    }

    #[test]
    fn tile_json_shape() {
        let tile = Tile::empty(IVec3::new(0, 1, 0), &grid().tile_bounds(IVec3::new(0, 1, 0)));
        let json = serde_json::to_string(&tile).unwrap();
        assert_eq!(
            json,
            "{\"index\":[0,1,0],\"src\":null,\"pos_center\":[-4.0,6.0,17.0],\
             \"pos_min\":[-8.0,4.0,16.0],\"pos_max\":[0.0,8.0,18.0]}"
        );
    }
}
