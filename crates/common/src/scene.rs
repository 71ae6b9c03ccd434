use glam::DVec3;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

/// Coarse object type as reported by the host. Only meshes carry exportable geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    #[default]
    Mesh,
    Empty,
    Light,
    Camera,
    Curve,
}

impl ObjectKind {
    pub fn is_mesh(self) -> bool {
        self == Self::Mesh
    }
}

/// Read-only view of the host scene consumed by the tiling engine.
///
/// Handles are opaque references owned by the host. The engine copies handles
/// but never mutates the objects they refer to.
pub trait SceneSource {
    type Handle: Copy + Eq + Hash + Debug;

    /// All objects in the named collection, nested collections included.
    /// Returns `None` when no collection has that name.
    fn collection_objects(&self, collection: &str) -> Option<Vec<Self::Handle>>;

    fn object_name(&self, handle: Self::Handle) -> &str;

    fn object_kind(&self, handle: Self::Handle) -> ObjectKind;

    /// The object's eight local bounding-box corners, in world space.
    fn world_bounds_corners(&self, handle: Self::Handle) -> [DVec3; 8];
}
