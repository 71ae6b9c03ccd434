use glam::DVec3;
use serde::{Deserialize, Serialize};
use tileslicer_common::{Aabb, Transform};

/// Indexed triangle mesh in object-local space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<DVec3>,
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Axis-aligned box of `size` centred on the local origin, 12 outward-facing triangles.
    pub fn cuboid(size: DVec3) -> Self {
        let h = size * 0.5;
        let vertices = (0..8)
            .map(|i| {
                DVec3::new(
                    if i & 1 == 0 { -h.x } else { h.x },
                    if i & 2 == 0 { -h.y } else { h.y },
                    if i & 4 == 0 { -h.z } else { h.z },
                )
            })
            .collect();
        let triangles = vec![
            // -z
            [0, 2, 3],
            [0, 3, 1],
            // +z
            [4, 5, 7],
            [4, 7, 6],
            // -y
            [0, 1, 5],
            [0, 5, 4],
            // +y
            [2, 6, 7],
            [2, 7, 3],
            // -x
            [0, 4, 6],
            [0, 6, 2],
            // +x
            [1, 3, 7],
            [1, 7, 5],
        ];
        Self {
            vertices,
            triangles,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// First triangle corner that references a missing vertex.
    pub fn first_bad_index(&self) -> Option<u32> {
        let len = self.vertices.len();
        self.triangles
            .iter()
            .flatten()
            .copied()
            .find(|&i| i as usize >= len)
    }

    pub fn local_bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.vertices.iter().copied())
    }

    /// Triangles transformed to world space. Skips triangles with bad indices.
    pub fn world_triangles<'a>(
        &'a self,
        transform: &Transform,
    ) -> impl Iterator<Item = [DVec3; 3]> + 'a {
        let m = transform.matrix();
        self.triangles.iter().filter_map(move |t| {
            let v = |i: u32| self.vertices.get(i as usize).map(|p| m.transform_point3(*p));
            Some([v(t[0])?, v(t[1])?, v(t[2])?])
        })
    }
}
