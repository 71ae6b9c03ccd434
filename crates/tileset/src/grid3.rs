use serde::de::Error as _;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Fixed-size three-dimensional array stored flat in row-major order.
///
/// Serializes as nested arrays `[x][y][z]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid3<T> {
    dims: [usize; 3],
    cells: Vec<T>,
}

impl<T> Grid3<T> {
    /// Allocate a grid and fill every cell from `f([x, y, z])`, in row-major order.
    pub fn from_fn(dims: [usize; 3], mut f: impl FnMut([usize; 3]) -> T) -> Self {
        let mut cells = Vec::with_capacity(dims[0] * dims[1] * dims[2]);
        for x in 0..dims[0] {
            for y in 0..dims[1] {
                for z in 0..dims[2] {
                    cells.push(f([x, y, z]));
                }
            }
        }
        Self { dims, cells }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn offset(&self, [x, y, z]: [usize; 3]) -> Option<usize> {
        let [dx, dy, dz] = self.dims;
        (x < dx && y < dy && z < dz).then(|| (x * dy + y) * dz + z)
    }

    pub fn get(&self, at: [usize; 3]) -> Option<&T> {
        self.offset(at).map(|i| &self.cells[i])
    }

    pub fn get_mut(&mut self, at: [usize; 3]) -> Option<&mut T> {
        self.offset(at).map(|i| &mut self.cells[i])
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.cells.iter_mut()
    }

    /// A copy with the second and third axes exchanged:
    /// `swapped.get([x, y, z]) == self.get([x, z, y])`.
    pub fn swap_yz(&self) -> Self
    where
        T: Clone,
    {
        let [dx, dy, dz] = self.dims;
        let mut cells = Vec::with_capacity(self.cells.len());
        for x in 0..dx {
            for z in 0..dz {
                for y in 0..dy {
                    cells.push(self.cells[(x * dy + y) * dz + z].clone());
                }
            }
        }
        Self {
            dims: [dx, dz, dy],
            cells,
        }
    }

    fn row(&self, x: usize, y: usize) -> &[T] {
        let start = (x * self.dims[1] + y) * self.dims[2];
        &self.cells[start..start + self.dims[2]]
    }
}

struct Plane<'a, T> {
    grid: &'a Grid3<T>,
    x: usize,
}

impl<T: Serialize> Serialize for Plane<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.grid.dims[1]))?;
        for y in 0..self.grid.dims[1] {
            seq.serialize_element(self.grid.row(self.x, y))?;
        }
        seq.end()
    }
}

impl<T: Serialize> Serialize for Grid3<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.dims[0]))?;
        for x in 0..self.dims[0] {
            seq.serialize_element(&Plane { grid: self, x })?;
        }
        seq.end()
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Grid3<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let nested = Vec::<Vec<Vec<T>>>::deserialize(deserializer)?;
        let dx = nested.len();
        let dy = nested.first().map_or(0, Vec::len);
        let dz = nested
            .first()
            .and_then(|plane| plane.first())
            .map_or(0, Vec::len);

        let mut cells = Vec::with_capacity(dx * dy * dz);
        for (x, plane) in nested.into_iter().enumerate() {
            if plane.len() != dy {
                return Err(D::Error::custom(format!(
                    "tile plane {x} has {} rows, expected {dy}",
                    plane.len()
                )));
            }
            for (y, row) in plane.into_iter().enumerate() {
                if row.len() != dz {
                    return Err(D::Error::custom(format!(
                        "tile row [{x}][{y}] has {} cells, expected {dz}",
                        row.len()
                    )));
                }
                cells.extend(row);
            }
        }
        Ok(Self {
            dims: [dx, dy, dz],
            cells,
        })
    }
}
