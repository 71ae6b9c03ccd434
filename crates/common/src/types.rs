use glam::{DMat4, DQuat, DVec3, IVec3};
use serde::{Deserialize, Serialize};

/// Decimal places kept when computing world-space bounds.
///
/// Rounding keeps membership decisions stable between runs when a transform
/// introduces floating-point jitter in the last few bits.
pub const BOUNDS_PRECISION: u32 = 3;

/// Round `value` to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Axis-aligned bounding box in world space.
///
/// `min[i] <= max[i]` on every axis. Zero-volume boxes are legal (flat objects).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    /// Build a box from two corners, ordering each axis.
    pub fn new(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Fold a set of points into the smallest enclosing box.
    /// Returns `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.min(p),
            max: acc.max.max(p),
        }))
    }

    /// Smallest box containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> DVec3 {
        self.max - self.min
    }

    /// Strict overlap: boxes that only share a face, edge or corner do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.max.cmpgt(other.min).all() && self.min.cmplt(other.max).all()
    }

    /// Whether `point` lies inside the box, faces included.
    pub fn contains_point(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Whether `other` lies entirely inside the box, faces included.
    pub fn contains(&self, other: &Self) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// The eight corners, in the same order a host reports local bounding corners.
    pub fn corners(&self) -> [DVec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            DVec3::new(a.x, a.y, a.z),
            DVec3::new(a.x, a.y, b.z),
            DVec3::new(a.x, b.y, b.z),
            DVec3::new(a.x, b.y, a.z),
            DVec3::new(b.x, a.y, a.z),
            DVec3::new(b.x, a.y, b.z),
            DVec3::new(b.x, b.y, b.z),
            DVec3::new(b.x, b.y, a.z),
        ]
    }
}

/// Spatial transform: position, rotation, scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: DVec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Local-to-world matrix.
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.matrix().transform_point3(point)
    }
}

/// Y/Z axis swap, used to convert between Z-up and Y-up conventions.
pub trait SwizzleYz {
    fn swizzle_yz(self) -> Self;
}

impl SwizzleYz for DVec3 {
    fn swizzle_yz(self) -> Self {
        DVec3::new(self.x, self.z, self.y)
    }
}

impl SwizzleYz for IVec3 {
    fn swizzle_yz(self) -> Self {
        IVec3::new(self.x, self.z, self.y)
    }
}
