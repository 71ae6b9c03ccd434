//! Reference host for the tiling engine: an in-memory scene graph loaded from
//! YAML or JSON, a triangle clipper and a Wavefront OBJ tile exporter.
//!
//! # Invariants
//! - Object ids are assigned sequentially and never reused.
//! - Collection traversal visits each nested collection and object once.
//! - Clipped geometry never leaves the cutter box.

mod clip;
mod file;
mod graph;
mod mesh;
mod obj;

pub use clip::{ClipScratch, clip_triangle};
pub use file::{CollectionDesc, MeshDesc, ObjectDesc, SceneFile};
pub use graph::{Collection, ObjectId, SceneError, SceneGraph, SceneObject};
pub use mesh::Mesh;
pub use obj::{ObjScratch, ObjTileExporter, write_obj};

pub fn crate_info() -> &'static str {
    concat!("tileslicer-scene v", env!("CARGO_PKG_VERSION"))
}
