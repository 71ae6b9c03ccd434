use std::path::{Path, PathBuf};

use glam::IVec3;
use serde::Serialize;
use serde_json::ser::{CompactFormatter, PrettyFormatter};
use sha2::{Digest, Sha256};

use crate::model::TilesetManifest;

/// Errors from writing or reading a manifest file.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("tile array is {actual:?} but tileset_size is {expected}")]
    ShapeMismatch { expected: IVec3, actual: [usize; 3] },
}

/// Result of a successful manifest write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenManifest {
    pub path: PathBuf,
    pub bytes: usize,
    /// Hex SHA-256 of the written bytes.
    pub sha256: String,
}

/// Serializes a [`TilesetManifest`] to JSON.
///
/// The default layout indents with tabs; compact mode emits no whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestWriter {
    pub compact: bool,
}

impl ManifestWriter {
    pub fn new(compact: bool) -> Self {
        Self { compact }
    }

    pub fn to_bytes(&self, manifest: &TilesetManifest) -> Result<Vec<u8>, ManifestError> {
        let mut buf = Vec::new();
        if self.compact {
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, CompactFormatter);
            manifest.serialize(&mut ser)?;
        } else {
            let formatter = PrettyFormatter::with_indent(b"\t");
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            manifest.serialize(&mut ser)?;
        }
        Ok(buf)
    }

    pub fn to_string(&self, manifest: &TilesetManifest) -> Result<String, ManifestError> {
        let bytes = self.to_bytes(manifest)?;
        // serde_json only ever emits UTF-8.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Write `manifest` to `path`, creating parent directories as needed.
    pub fn write(
        &self,
        manifest: &TilesetManifest,
        path: impl AsRef<Path>,
    ) -> Result<WrittenManifest, ManifestError> {
        let path = path.as_ref();
        let _span = tracing::info_span!("manifest_write", path = %path.display()).entered();

        let bytes = self.to_bytes(manifest)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &bytes)?;

        let written = WrittenManifest {
            path: path.to_path_buf(),
            bytes: bytes.len(),
            sha256: sha256_hex(&bytes),
        };
        tracing::info!(bytes = written.bytes, sha256 = %written.sha256, "manifest written");
        Ok(written)
    }

    /// Read a manifest back, checking the tile array matches `tileset_size`.
    pub fn read(path: impl AsRef<Path>) -> Result<TilesetManifest, ManifestError> {
        let data = std::fs::read(path.as_ref())?;
        let manifest: TilesetManifest = serde_json::from_slice(&data)?;

        let expected = manifest.tileset_size;
        let actual = manifest.tiles.dims();
        let matches = expected.cmpge(IVec3::ZERO).all()
            && actual == [expected.x as usize, expected.y as usize, expected.z as usize];
        // A manifest with any zero axis deserializes to an all-zero shape.
        let empty = manifest.tiles.is_empty() && expected.cmple(IVec3::ZERO).any();
        if !matches && !empty {
            return Err(ManifestError::ShapeMismatch { expected, actual });
        }
        Ok(manifest)
    }
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TileFormat, TileOriginMode};
    use glam::DVec3;
    use tileslicer_grid::TilesetGrid;

    fn manifest() -> TilesetManifest {
        let grid = TilesetGrid {
            size: IVec3::new(2, 1, 2),
            origin: DVec3::new(-8.0, 0.0, 0.0),
            tile_dimensions: DVec3::splat(8.0),
        };
        let mut m = TilesetManifest::new("demo", &grid, TileFormat::Glb, TileOriginMode::Center);
        m.tile_mut(IVec3::new(1, 0, 1)).unwrap().src = Some("tile_1_0_1".into());
        m
    }

    #[test]
    fn pretty_output_uses_tabs_and_key_order() {
        let text = ManifestWriter::default().to_string(&manifest()).unwrap();
        assert!(text.starts_with("{\n\t\"name\": \"demo\",\n\t\"tile_dimensions\": ["));
        assert!(!text.contains("  "));

        let keys = [
            "\"name\"",
            "\"tile_dimensions\"",
            "\"tileset_size\"",
            "\"tileset_origin\"",
            "\"tile_format\"",
            "\"tile_origin_mode\"",
            "\"axis_up_is_y\"",
            "\"tiles\"",
        ];
        let positions: Vec<usize> = keys.iter().map(|k| text.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(text.contains("\"src\": null"));
        assert!(text.contains("\"src\": \"tile_1_0_1\""));
    }

    #[test]
    fn compact_output_has_no_whitespace() {
        let text = ManifestWriter::new(true).to_string(&manifest()).unwrap();
        assert!(!text.contains(char::is_whitespace));
        assert!(text.starts_with("{\"name\":\"demo\",\"tile_dimensions\":[8.0,8.0,8.0]"));
    }

    #[test]
    fn write_creates_dirs_and_reads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out").join("nested").join("tileset.json");
        let m = manifest();

        let written = ManifestWriter::default().write(&m, &path).unwrap();
        assert!(path.is_file());
        assert_eq!(written.bytes, std::fs::metadata(&path).unwrap().len() as usize);
        assert_eq!(written.sha256.len(), 64);

        let back = ManifestWriter::read(&path).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn compact_manifest_reads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("tileset.json");
        ManifestWriter::new(true).write(&manifest(), &path).unwrap();

        let back = ManifestWriter::read(&path).unwrap();
        let sources: Vec<&str> = back.tiles.iter().filter_map(|t| t.src.as_deref()).collect();
        assert_eq!(sources, vec!["tile_1_0_1"]);
    }

    #[test]
    fn identical_manifests_give_identical_bytes() {
        let tmp = tempfile::tempdir().unwrap();
        let writer = ManifestWriter::default();
        let a = writer.write(&manifest(), tmp.path().join("a.json")).unwrap();
        let b = writer.write(&manifest(), tmp.path().join("b.json")).unwrap();
        assert_eq!(a.sha256, b.sha256);
        assert_eq!(
            std::fs::read(&a.path).unwrap(),
            std::fs::read(&b.path).unwrap()
        );
    }

    #[test]
    fn read_rejects_size_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        let mut m = manifest();
        m.tileset_size = IVec3::new(3, 1, 2);
        ManifestWriter::new(true).write(&m, &path).unwrap();

        match ManifestWriter::read(&path) {
            Err(ManifestError::ShapeMismatch { expected, actual }) => {
                assert_eq!(expected, IVec3::new(3, 1, 2));
                assert_eq!(actual, [2, 1, 2]);
            }
            other => panic!("expected ShapeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn read_rejects_ragged_tiles() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("ragged.json");
        let text = ManifestWriter::new(true).to_string(&manifest()).unwrap();
        // Drop the last tile of the last row.
        let cut = text.rfind(",{\"index\"").unwrap();
        let end = text.rfind("]]]").unwrap();
        let ragged = format!("{}{}", &text[..cut], &text[end..]);
        std::fs::write(&path, ragged).unwrap();

        assert!(matches!(ManifestWriter::read(&path), Err(ManifestError::Json(_))));
    }

    #[test]
    fn write_into_missing_parent_that_is_a_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let err = ManifestWriter::default()
            .write(&manifest(), blocker.join("tileset.json"))
            .unwrap_err();
        assert!(matches!(err, ManifestError::Io(_)));
    }
}
