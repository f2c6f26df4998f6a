//! Conversion settings, loaded from JSON
//!
//! ```
//! use vrmlx::config::Config;
//!
//! let cfg = Config::from_json(r#"{
//!     "ignoreUnknownNode": true,
//!     "parallelism": { "threadLimit": 2 },
//!     "exportFormat": "obj"
//! }"#)?;
//! assert!(cfg.ignore_unknown_node);
//! assert_eq!(cfg.parallelism.thread_limit, 2);
//! assert!(cfg.indexed_face_set.check_range);
//! # Ok::<(), vrmlx::Error>(())
//! ```
use crate::{Error, mesh::output::ExportFormat};
use log::warn;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

/// Top-level configuration
///
/// Every key is optional; missing keys take their default value.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Skip nodes without a descriptor instead of failing
    pub ignore_unknown_node: bool,
    /// JSON file mapping alternate header spellings to canonical names
    pub synonyms_file: Option<PathBuf>,
    /// Executor settings
    pub parallelism: Parallelism,
    /// Settings for `IndexedFaceSet` geometry
    pub indexed_face_set: IndexedFaceSetConfig,
    /// Output file format
    #[serde(deserialize_with = "export_format")]
    pub export_format: ExportFormat,
    /// Write binary rather than ASCII output, where the format allows it
    pub export_binary: bool,
    /// Mesh decimation settings (not implemented; accepted for compatibility)
    pub mesh_simplification: MeshSimplification,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore_unknown_node: false,
            synonyms_file: None,
            parallelism: Parallelism::default(),
            indexed_face_set: IndexedFaceSetConfig::default(),
            export_format: ExportFormat::Stl,
            export_binary: true,
            mesh_simplification: MeshSimplification::default(),
        }
    }
}

/// Executor settings
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Parallelism {
    /// Run tasks on a thread pool
    pub active: bool,
    /// Upper bound on the number of worker threads
    pub thread_limit: usize,
}

impl Default for Parallelism {
    fn default() -> Self {
        Self {
            active: true,
            thread_limit: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Settings for `IndexedFaceSet` geometry
#[derive(Clone, Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexedFaceSetConfig {
    /// Reject coordinate indices outside of the coordinate list
    pub check_range: bool,
    /// Use the fast path for pre-triangulated, stride-4 index lists
    pub only_triangular_faces: bool,
}

impl Default for IndexedFaceSetConfig {
    fn default() -> Self {
        Self {
            check_range: true,
            only_triangular_faces: false,
        }
    }
}

/// Mesh decimation settings
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeshSimplification {
    /// Whether decimation was requested
    pub active: bool,
    /// Share of edges to collapse
    pub percentage_of_all_edges_to_simplify: f32,
}

/// Parses an export format, falling back to STL with a warning
fn export_format<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<ExportFormat, D::Error> {
    let s = String::deserialize(d)?;
    Ok(s.to_lowercase().parse().unwrap_or_else(|_| {
        warn!("unknown export format <{s}>; using <stl> instead");
        ExportFormat::Stl
    }))
}

impl Config {
    /// Parses a configuration from JSON text
    pub fn from_json(text: &str) -> Result<Self, Error> {
        let cfg: Config = serde_json::from_str(text)?;
        cfg.check()?;
        Ok(cfg)
    }

    /// Loads a configuration from a JSON file
    ///
    /// A relative `synonymsFile` is resolved against the file's directory.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut cfg = Self::from_json(&text)?;
        if let (Some(s), Some(dir)) = (&cfg.synonyms_file, path.parent()) {
            if s.is_relative() {
                cfg.synonyms_file = Some(dir.join(s));
            }
        }
        Ok(cfg)
    }

    fn check(&self) -> Result<(), Error> {
        if self.parallelism.thread_limit == 0 {
            return Err(Error::BadConfig(
                "parallelism.threadLimit must be at least 1".to_owned(),
            ));
        }
        if self.mesh_simplification.active {
            warn!("mesh simplification is not supported; ignoring it");
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::from_json("{}").unwrap();
        assert!(!cfg.ignore_unknown_node);
        assert!(cfg.synonyms_file.is_none());
        assert!(cfg.parallelism.active);
        assert!(cfg.parallelism.thread_limit >= 1);
        assert!(cfg.indexed_face_set.check_range);
        assert!(!cfg.indexed_face_set.only_triangular_faces);
        assert_eq!(cfg.export_format, ExportFormat::Stl);
        assert!(cfg.export_binary);
    }

    #[test]
    fn test_full() {
        let cfg = Config::from_json(
            r#"{
                "ignoreUnknownNode": true,
                "synonymsFile": "synonyms.json",
                "parallelism": { "active": false, "threadLimit": 3 },
                "indexedFaceSet": {
                    "checkRange": false,
                    "onlyTriangularFaces": true
                },
                "exportFormat": "PLY",
                "exportBinary": false,
                "meshSimplification": {
                    "active": true,
                    "percentageOfAllEdgesToSimplify": 0.5
                },
                "logFileName": "ignored"
            }"#,
        )
        .unwrap();
        assert!(cfg.ignore_unknown_node);
        assert_eq!(cfg.synonyms_file, Some(PathBuf::from("synonyms.json")));
        assert!(!cfg.parallelism.active);
        assert_eq!(cfg.parallelism.thread_limit, 3);
        assert!(!cfg.indexed_face_set.check_range);
        assert!(cfg.indexed_face_set.only_triangular_faces);
        assert_eq!(cfg.export_format, ExportFormat::Ply);
        assert!(!cfg.export_binary);
        assert_eq!(cfg.mesh_simplification.percentage_of_all_edges_to_simplify, 0.5);
    }

    #[test]
    fn test_bad_values() {
        let cfg = Config::from_json(r#"{ "exportFormat": "dxf" }"#).unwrap();
        assert_eq!(cfg.export_format, ExportFormat::Stl);

        assert!(matches!(
            Config::from_json(r#"{ "parallelism": { "threadLimit": 0 } }"#),
            Err(Error::BadConfig(..))
        ));
        assert!(matches!(
            Config::from_json(r#"{ "ignoreUnknownNode": 3 }"#),
            Err(Error::JsonError(..))
        ));
    }
}
