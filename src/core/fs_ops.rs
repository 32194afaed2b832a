// src/core/fs_ops.rs
//! File system operations shared by every pipeline stage

use crate::error::{PipelineError, PipelineResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

pub struct FsOps;

impl FsOps {
    pub fn ensure_dir_exists(path: &Path) -> PipelineResult<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
            info!("Created directory: {}", path.display());
        }
        Ok(())
    }

    /// Write bytes so that `path` either keeps its previous content or holds
    /// the complete new content. The temp file lives next to the target so the
    /// final rename never crosses file systems.
    pub fn write_atomic(path: &Path, content: &[u8]) -> PipelineResult<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::ensure_dir_exists(&parent)?;

        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(content)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| PipelineError::Io(e.error))?;

        info!("Written file: {}", path.display());
        Ok(())
    }

    pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> PipelineResult<()> {
        let content = serde_json::to_vec_pretty(value)?;
        Self::write_atomic(path, &content)
    }

    /// Read a JSON artifact produced by an earlier stage.
    pub fn read_artifact<T: DeserializeOwned>(
        path: &Path,
        artifact: &'static str,
        stage: &'static str,
    ) -> PipelineResult<T> {
        if !path.exists() {
            return Err(PipelineError::missing(artifact, path, stage));
        }
        let content = fs::read(path)?;
        Ok(serde_json::from_slice(&content)?)
    }

    /// `*.json` files directly under `dir`, sorted by file name.
    pub fn list_json_files(dir: &Path) -> PipelineResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        if !dir.exists() {
            return Ok(files);
        }

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            let is_json = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case("json"))
                .unwrap_or(false);
            if path.is_file() && is_json {
                files.push(path);
            }
        }

        files.sort();
        debug!("Found {} JSON files in {}", files.len(), dir.display());
        Ok(files)
    }

    pub fn normalize_path(base: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            base.join(relative)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_write_atomic_creates_parent_and_replaces_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("artifact.txt");

        FsOps::write_atomic(&path, b"first").unwrap();
        FsOps::write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_read_artifact_reports_missing_stage() {
        let dir = tempdir().unwrap();
        let err = FsOps::read_artifact::<serde_json::Value>(
            &dir.path().join("absent.json"),
            "classifier model",
            "train",
        )
        .unwrap_err();
        assert!(err.is_missing_artifact());
    }

    #[test]
    fn test_list_json_files_is_sorted_and_filtered() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.json"), "{}").unwrap();
        fs::write(dir.path().join("a.JSON"), "{}").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let files = FsOps::list_json_files(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.JSON", "b.json"]);
    }

    #[test]
    fn test_list_json_files_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        assert!(FsOps::list_json_files(&dir.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn test_normalize_path() {
        let base = Path::new("/base");
        assert_eq!(FsOps::normalize_path(base, Path::new("x")), PathBuf::from("/base/x"));
        assert_eq!(FsOps::normalize_path(base, Path::new("/abs")), PathBuf::from("/abs"));
    }
}
