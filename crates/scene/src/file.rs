//! YAML/JSON scene description.
//!
//! ```yaml
//! collections:
//!   - name: city
//!   - name: harbour
//!     parent: city
//! objects:
//!   - name: pier
//!     collection: harbour
//!     transform: { position: [4.0, -2.0, 0.0] }
//!     mesh: { type: cuboid, size: [12.0, 3.0, 1.0] }
//! ```

use std::path::Path;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tileslicer_common::{ObjectKind, Transform};

use crate::graph::{SceneError, SceneGraph, SceneObject};
use crate::mesh::Mesh;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    #[serde(default)]
    pub collections: Vec<CollectionDesc>,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionDesc {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectDesc {
    pub name: String,
    pub collection: String,
    #[serde(default)]
    pub kind: ObjectKind,
    #[serde(default)]
    pub transform: Transform,
    #[serde(default)]
    pub mesh: Option<MeshDesc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshDesc {
    Cuboid {
        size: DVec3,
    },
    Triangles {
        vertices: Vec<DVec3>,
        triangles: Vec<[u32; 3]>,
    },
}

impl From<MeshDesc> for Mesh {
    fn from(desc: MeshDesc) -> Self {
        match desc {
            MeshDesc::Cuboid { size } => Mesh::cuboid(size),
            MeshDesc::Triangles {
                vertices,
                triangles,
            } => Mesh {
                vertices,
                triangles,
            },
        }
    }
}

impl SceneFile {
    pub fn into_graph(self) -> Result<SceneGraph, SceneError> {
        let mut graph = SceneGraph::new();
        // Create every collection first so parents may be listed after children.
        for c in &self.collections {
            graph.add_collection(&c.name, None)?;
        }
        for c in &self.collections {
            if let Some(parent) = &c.parent {
                graph.link_collection(&c.name, parent)?;
            }
        }
        for o in self.objects {
            graph.add_object(
                &o.collection,
                SceneObject {
                    name: o.name,
                    kind: o.kind,
                    transform: o.transform,
                    mesh: o.mesh.map(Mesh::from),
                },
            )?;
        }
        Ok(graph)
    }
}

impl SceneGraph {
    /// Load a scene from a `.yaml`/`.yml` or `.json` file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let file: SceneFile = match ext.as_deref() {
            Some("yaml" | "yml") => serde_yaml::from_str(&text)?,
            Some("json") => serde_json::from_str(&text)?,
            _ => return Err(SceneError::UnsupportedFormat(path.display().to_string())),
        };
        let graph = file.into_graph()?;
        tracing::info!(
            path = %path.display(),
            objects = graph.object_count(),
            collections = graph.collection_names().count(),
            "scene loaded"
        );
        Ok(graph)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SceneError> {
        serde_yaml::from_str::<SceneFile>(text)?.into_graph()
    }
}
