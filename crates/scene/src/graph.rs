use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tileslicer_common::{ObjectKind, SceneSource, Transform};

use crate::mesh::Mesh;

/// Errors from building or loading a scene.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported scene file extension: {0}")]
    UnsupportedFormat(String),
    #[error("collection `{0}` not found")]
    UnknownCollection(String),
    #[error("collection `{0}` already exists")]
    DuplicateCollection(String),
    #[error("object `{object}` references vertex {index} but has {vertex_count} vertices")]
    BadVertexIndex {
        object: String,
        index: u32,
        vertex_count: usize,
    },
}

/// Stable handle of an object in a [`SceneGraph`], assigned sequentially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
}

/// Named group of objects and child collections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    pub objects: Vec<ObjectId>,
    pub children: Vec<String>,
}

/// In-memory scene: objects with transforms and meshes, grouped into nested
/// collections.
///
/// BTreeMaps keep iteration order deterministic.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    objects: BTreeMap<ObjectId, SceneObject>,
    collections: BTreeMap<String, Collection>,
    next_id: u32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty collection, optionally nested under `parent`.
    pub fn add_collection(&mut self, name: &str, parent: Option<&str>) -> Result<(), SceneError> {
        if self.collections.contains_key(name) {
            return Err(SceneError::DuplicateCollection(name.to_string()));
        }
        if let Some(parent) = parent {
            self.collections
                .get_mut(parent)
                .ok_or_else(|| SceneError::UnknownCollection(parent.to_string()))?
                .children
                .push(name.to_string());
        }
        self.collections
            .insert(name.to_string(), Collection::default());
        Ok(())
    }

    /// Nest an existing collection under another one.
    pub fn link_collection(&mut self, child: &str, parent: &str) -> Result<(), SceneError> {
        if !self.collections.contains_key(child) {
            return Err(SceneError::UnknownCollection(child.to_string()));
        }
        let parent = self
            .collections
            .get_mut(parent)
            .ok_or_else(|| SceneError::UnknownCollection(parent.to_string()))?;
        if !parent.children.iter().any(|c| c == child) {
            parent.children.push(child.to_string());
        }
        Ok(())
    }

    /// Add an object to `collection`, creating the collection if needed.
    pub fn add_object(
        &mut self,
        collection: &str,
        object: SceneObject,
    ) -> Result<ObjectId, SceneError> {
        if let Some(mesh) = &object.mesh {
            if let Some(index) = mesh.first_bad_index() {
                return Err(SceneError::BadVertexIndex {
                    object: object.name.clone(),
                    index,
                    vertex_count: mesh.vertices.len(),
                });
            }
        }
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .objects
            .push(id);
        tracing::trace!(%id, name = %object.name, collection, "object added");
        self.objects.insert(id, object);
        Ok(id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.collections.keys().map(String::as_str)
    }

    /// Collections that are nobody's child.
    pub fn root_collections(&self) -> Vec<&str> {
        let nested: BTreeSet<&str> = self
            .collections
            .values()
            .flat_map(|c| c.children.iter().map(String::as_str))
            .collect();
        self.collection_names()
            .filter(|name| !nested.contains(name))
            .collect()
    }

    /// Objects of `name` and every collection nested below it, each once, in
    /// depth-first order. Cycles between collections are followed only once.
    pub fn all_objects(&self, name: &str) -> Option<Vec<ObjectId>> {
        self.collections.get(name)?;
        let mut seen_collections = BTreeSet::new();
        let mut seen_objects = BTreeSet::new();
        let mut out = Vec::new();
        let mut stack = vec![name];
        while let Some(current) = stack.pop() {
            if !seen_collections.insert(current) {
                continue;
            }
            let Some(collection) = self.collections.get(current) else {
                continue;
            };
            for id in &collection.objects {
                if seen_objects.insert(*id) {
                    out.push(*id);
                }
            }
            // Reverse so the first child is visited first.
            stack.extend(collection.children.iter().rev().map(String::as_str));
        }
        Some(out)
    }

    /// World-space triangles of an object; empty for objects without a mesh.
    pub fn world_triangles(&self, id: ObjectId) -> impl Iterator<Item = [DVec3; 3]> + '_ {
        self.objects.get(&id).into_iter().flat_map(|object| {
            object
                .mesh
                .iter()
                .flat_map(move |mesh| mesh.world_triangles(&object.transform))
        })
    }
}

impl SceneSource for SceneGraph {
    type Handle = ObjectId;

    fn collection_objects(&self, collection: &str) -> Option<Vec<ObjectId>> {
        self.all_objects(collection)
    }

    fn object_name(&self, handle: ObjectId) -> &str {
        self.objects
            .get(&handle)
            .map_or("", |object| object.name.as_str())
    }

    fn object_kind(&self, handle: ObjectId) -> ObjectKind {
        self.objects
            .get(&handle)
            .map_or(ObjectKind::Empty, |object| object.kind)
    }

    /// Corners of the mesh's local box in world space. Objects without mesh
    /// data collapse to their position.
    fn world_bounds_corners(&self, handle: ObjectId) -> [DVec3; 8] {
        let Some(object) = self.objects.get(&handle) else {
            return [DVec3::ZERO; 8];
        };
        match object.mesh.as_ref().and_then(Mesh::local_bounds) {
            Some(local) => local.corners().map(|c| object.transform.transform_point(c)),
            None => [object.transform.position; 8],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DQuat;

    fn cube(name: &str, position: DVec3) -> SceneObject {
        SceneObject {
            name: name.into(),
            kind: ObjectKind::Mesh,
            transform: Transform::from_position(position),
            mesh: Some(Mesh::cuboid(DVec3::splat(2.0))),
        }
    }

    #[test]
    fn ids_are_sequential() {
        let mut scene = SceneGraph::new();
        let a = scene.add_object("c", cube("a", DVec3::ZERO)).unwrap();
        let b = scene.add_object("c", cube("b", DVec3::ZERO)).unwrap();
        assert_eq!((a, b), (ObjectId(0), ObjectId(1)));
        assert_eq!(scene.object_count(), 2);
        assert_eq!(scene.get(b).unwrap().name, "b");
    }

    #[test]
    fn all_objects_gathers_nested_collections() {
        let mut scene = SceneGraph::new();
        scene.add_collection("city", None).unwrap();
        scene.add_collection("north", Some("city")).unwrap();
        scene.add_collection("south", Some("city")).unwrap();
        scene.add_collection("harbour", Some("south")).unwrap();

        let root = scene.add_object("city", cube("hall", DVec3::ZERO)).unwrap();
        let n = scene.add_object("north", cube("tower", DVec3::ZERO)).unwrap();
        let s = scene.add_object("south", cube("market", DVec3::ZERO)).unwrap();
        let h = scene.add_object("harbour", cube("pier", DVec3::ZERO)).unwrap();

        assert_eq!(scene.all_objects("city").unwrap(), vec![root, n, s, h]);
        assert_eq!(scene.all_objects("south").unwrap(), vec![s, h]);
        assert_eq!(scene.all_objects("missing"), None);
        assert_eq!(scene.root_collections(), vec!["city"]);
    }

    #[test]
    fn collection_cycles_terminate() {
        let mut scene = SceneGraph::new();
        scene.add_collection("a", None).unwrap();
        scene.add_collection("b", Some("a")).unwrap();
        scene.link_collection("a", "b").unwrap();
        let x = scene.add_object("b", cube("x", DVec3::ZERO)).unwrap();

        assert_eq!(scene.all_objects("a").unwrap(), vec![x]);
        // Linking twice does not duplicate the child entry.
        scene.link_collection("b", "a").unwrap();
        assert_eq!(scene.collection("a").unwrap().children, vec!["b".to_string()]);
    }

    #[test]
    fn collection_errors() {
        let mut scene = SceneGraph::new();
        scene.add_collection("a", None).unwrap();
        assert!(matches!(
            scene.add_collection("a", None),
            Err(SceneError::DuplicateCollection(_))
        ));
        assert!(matches!(
            scene.add_collection("b", Some("nope")),
            Err(SceneError::UnknownCollection(_))
        ));
        assert!(matches!(
            scene.link_collection("zzz", "a"),
            Err(SceneError::UnknownCollection(_))
        ));
    }

    #[test]
    fn bad_mesh_is_rejected() {
        let mut scene = SceneGraph::new();
        let object = SceneObject {
            mesh: Some(Mesh {
                vertices: vec![DVec3::ZERO],
                triangles: vec![[0, 0, 3]],
            }),
            ..cube("broken", DVec3::ZERO)
        };
        match scene.add_object("c", object) {
            Err(SceneError::BadVertexIndex { index, vertex_count, .. }) => {
                assert_eq!((index, vertex_count), (3, 1));
            }
            other => panic!("expected BadVertexIndex, got {other:?}"),
        }
        assert_eq!(scene.object_count(), 0);
    }

    #[test]
    fn bounds_corners_follow_transform() {
        let mut scene = SceneGraph::new();
        let mut object = cube("turned", DVec3::new(5.0, 0.0, 0.0));
        object.transform.rotation = DQuat::from_rotation_z(std::f64::consts::FRAC_PI_4);
        let id = scene.add_object("c", object).unwrap();

        let corners = scene.world_bounds_corners(id);
        let bounds = tileslicer_common::Aabb::from_points(corners).unwrap();
        let r = 2f64.sqrt();
        assert!((bounds.max.x - (5.0 + r)).abs() < 1e-9);
        assert!((bounds.min.y + r).abs() < 1e-9);
        assert!((bounds.max.z - 1.0).abs() < 1e-9);
    }

    #[test]
    fn non_mesh_objects_collapse_to_position() {
        let mut scene = SceneGraph::new();
        let lamp = scene
            .add_object(
                "c",
                SceneObject {
                    name: "lamp".into(),
                    kind: ObjectKind::Light,
                    transform: Transform::from_position(DVec3::new(1.0, 2.0, 3.0)),
                    mesh: None,
                },
            )
            .unwrap();
        assert_eq!(scene.object_kind(lamp), ObjectKind::Light);
        assert_eq!(scene.world_bounds_corners(lamp), [DVec3::new(1.0, 2.0, 3.0); 8]);
        assert_eq!(scene.world_triangles(lamp).count(), 0);
    }

    #[test]
    fn world_triangles_of_mesh() {
        let mut scene = SceneGraph::new();
        let id = scene.add_object("c", cube("a", DVec3::splat(4.0))).unwrap();
        assert_eq!(scene.world_triangles(id).count(), 12);
        assert_eq!(scene.world_triangles(ObjectId(99)).count(), 0);
    }
}
