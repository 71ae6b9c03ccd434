//! Shared types for the tile slicer: bounding boxes, transforms, axis swizzling,
//! and the interface a host scene exposes to the tiling engine.

pub mod scene;
pub mod types;

pub use scene::{ObjectKind, SceneSource};
pub use types::{Aabb, BOUNDS_PRECISION, SwizzleYz, Transform, round_to};
