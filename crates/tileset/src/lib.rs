//! Tileset manifest: the per-export record of every tile, its position and the
//! asset exported for it.
//!
//! # Invariants
//! - The tile array is allocated once from `tileset_size` and never grows.
//! - Tiles are stored and serialized `[x][y][z]`, x outermost.
//! - Swizzling produces a new manifest; it never edits one in place.
//! - The written JSON carries no timestamps, so identical inputs give identical bytes.

mod grid3;
mod model;
mod writer;

pub use grid3::Grid3;
pub use model::{Tile, TileFormat, TileOriginMode, TilesetManifest, tile_asset_name};
pub use writer::{ManifestError, ManifestWriter, WrittenManifest};

pub fn crate_info() -> &'static str {
    concat!("tileslicer-tileset v", env!("CARGO_PKG_VERSION"))
}
