//! Per-run scoped workspace.
//!
//! Every intermediate artifact lives in a directory named by the run ID
//! and carries the run ID in its filename, so no two runs can collide.
//! The directory is removed on drop — success or failure — unless the
//! run asked to keep it.

use std::path::{Path, PathBuf};

use redub_models::{RunId, VideoContainer};

/// Scoped directory holding one run's intermediate artifacts.
#[derive(Debug)]
pub struct RunWorkspace {
    dir: PathBuf,
    run_id: RunId,
    keep: bool,
}

impl RunWorkspace {
    /// Create the workspace directory under `root`.
    pub fn create(root: impl AsRef<Path>, run_id: &RunId, keep: bool) -> std::io::Result<Self> {
        let dir = root.as_ref().join(format!("run-{run_id}"));
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            run_id: run_id.clone(),
            keep,
        })
    }

    /// Workspace directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path for the extracted audio artifact.
    pub fn extracted_audio(&self) -> PathBuf {
        self.dir.join(format!("{}-extracted.mp3", self.run_id))
    }

    /// Path for the synthesized audio artifact.
    pub fn synthesized_audio(&self) -> PathBuf {
        self.dir.join(format!("{}-synthesized.mp3", self.run_id))
    }

    /// Path for the muxed video artifact (before it is persisted out).
    pub fn merged_video(&self, container: VideoContainer) -> PathBuf {
        self.dir
            .join(format!("{}-merged.{}", self.run_id, container.extension()))
    }
}

impl Drop for RunWorkspace {
    fn drop(&mut self) {
        if self.keep {
            tracing::info!("Keeping run workspace: {}", self.dir.display());
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    "Failed to remove run workspace {}: {}",
                    self.dir.display(),
                    e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_artifact_names_embed_run_id() {
        let root = TempDir::new().unwrap();
        let run_id = RunId::from_string("abc123");
        let ws = RunWorkspace::create(root.path(), &run_id, false).unwrap();

        assert!(ws.dir().ends_with("run-abc123"));
        assert!(ws
            .extracted_audio()
            .to_string_lossy()
            .contains("abc123-extracted.mp3"));
        assert!(ws
            .merged_video(VideoContainer::Mp4)
            .to_string_lossy()
            .ends_with("abc123-merged.mp4"));
    }

    #[test]
    fn test_cleanup_on_drop() {
        let root = TempDir::new().unwrap();
        let run_id = RunId::new();
        let dir;
        {
            let ws = RunWorkspace::create(root.path(), &run_id, false).unwrap();
            dir = ws.dir().to_path_buf();
            std::fs::write(ws.extracted_audio(), b"bytes").unwrap();
            assert!(dir.exists());
        }
        assert!(!dir.exists(), "workspace should be removed on drop");
    }

    #[test]
    fn test_keep_workdir() {
        let root = TempDir::new().unwrap();
        let run_id = RunId::new();
        let dir;
        {
            let ws = RunWorkspace::create(root.path(), &run_id, true).unwrap();
            dir = ws.dir().to_path_buf();
        }
        assert!(dir.exists(), "kept workspace should survive drop");
    }
}
