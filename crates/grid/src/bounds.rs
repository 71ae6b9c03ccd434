use glam::DVec3;
use serde::{Deserialize, Serialize};
use tileslicer_common::{Aabb, BOUNDS_PRECISION, SceneSource, round_to};

/// World-space bounds of an object from its eight transformed bounding corners.
///
/// Each coordinate is rounded to [`BOUNDS_PRECISION`] places before folding.
pub fn object_bounds(corners: [DVec3; 8]) -> Aabb {
    let rounded = corners.map(|c| {
        DVec3::new(
            round_to(c.x, BOUNDS_PRECISION),
            round_to(c.y, BOUNDS_PRECISION),
            round_to(c.z, BOUNDS_PRECISION),
        )
    });
    let mut aabb = Aabb::new(rounded[0], rounded[0]);
    for c in &rounded[1..] {
        aabb.min = aabb.min.min(*c);
        aabb.max = aabb.max.max(*c);
    }
    aabb
}

/// Aggregate bounds of a set of objects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectionBounds {
    pub min: DVec3,
    pub max: DVec3,
    /// Midpoint of `min` and `max`, not a mass-weighted centroid.
    pub centroid: DVec3,
}

impl CollectionBounds {
    /// Fold object boxes into collection bounds. `None` when there are no boxes.
    pub fn from_boxes<'a>(boxes: impl IntoIterator<Item = &'a Aabb>) -> Option<Self> {
        let folded = boxes
            .into_iter()
            .copied()
            .reduce(|acc, b| acc.union(&b))?;
        let mid = folded.center();
        Some(Self {
            min: folded.min,
            max: folded.max,
            centroid: DVec3::new(
                round_to(mid.x, BOUNDS_PRECISION),
                round_to(mid.y, BOUNDS_PRECISION),
                round_to(mid.z, BOUNDS_PRECISION),
            ),
        })
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(self.min, self.max)
    }
}

/// Decides which scene objects take part in bounds and membership.
///
/// Non-mesh objects never do. Collider objects are identified by a name suffix
/// and dropped when `skip_colliders` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectFilter {
    pub skip_colliders: bool,
    pub collider_suffix: String,
}

impl Default for ObjectFilter {
    fn default() -> Self {
        Self {
            skip_colliders: true,
            collider_suffix: "_collider".into(),
        }
    }
}

impl ObjectFilter {
    pub fn is_collider(&self, name: &str) -> bool {
        !self.collider_suffix.is_empty() && name.ends_with(&self.collider_suffix)
    }

    pub fn accepts<S: SceneSource>(&self, scene: &S, handle: S::Handle) -> bool {
        if !scene.object_kind(handle).is_mesh() {
            return false;
        }
        !(self.skip_colliders && self.is_collider(scene.object_name(handle)))
    }
}
