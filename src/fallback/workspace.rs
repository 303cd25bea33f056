use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Base name of the downloaded audio artifact
pub const ARTIFACT_STEM: &str = "output_audio";

/// Per-invocation directory owning the downloaded audio artifact.
///
/// The directory and everything in it is removed when the workspace is
/// dropped, whichever way the invocation ends.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
    artifact: PathBuf,
}

impl Workspace {
    /// Create a fresh workspace under `base`, or under the system temp dir
    pub fn acquire(base: Option<&Path>, audio_format: &str) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("vidscribe-");

        let dir = match base {
            Some(base) => {
                fs_err::create_dir_all(base)?;
                builder.tempdir_in(base)?
            }
            None => builder.tempdir()?,
        };

        let artifact = dir.path().join(format!("{}.{}", ARTIFACT_STEM, audio_format));
        tracing::debug!("Acquired workspace: {}", dir.path().display());

        Ok(Self { dir, artifact })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the downloader must write the audio
    pub fn artifact_path(&self) -> &Path {
        &self.artifact
    }

    pub fn artifact_exists(&self) -> bool {
        self.artifact.is_file()
    }

    /// Remove a leftover artifact. Returns whether one was removed.
    pub fn clear_stale(&self) -> io::Result<bool> {
        match fs_err::remove_file(&self.artifact) {
            Ok(()) => {
                tracing::info!("Cleared previous file: {}", self.artifact.display());
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Copy the artifact into `dest_dir` as `<name>.<ext>`
    pub fn preserve(&self, dest_dir: &Path, name: &str) -> io::Result<PathBuf> {
        let extension = self
            .artifact
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .unwrap_or_default();
        let destination = dest_dir.join(format!("{}.{}", name, extension));

        fs_err::copy(&self.artifact, &destination)?;
        Ok(destination)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_lives_in_workspace() {
        let workspace = Workspace::acquire(None, "mp3").unwrap();
        assert_eq!(workspace.artifact_path().parent(), Some(workspace.path()));
        assert_eq!(
            workspace.artifact_path().file_name().and_then(|n| n.to_str()),
            Some("output_audio.mp3")
        );
        assert!(!workspace.artifact_exists());
    }

    #[test]
    fn test_clear_stale_is_idempotent() {
        let workspace = Workspace::acquire(None, "mp3").unwrap();
        fs_err::write(workspace.artifact_path(), b"stale").unwrap();

        assert!(workspace.clear_stale().unwrap());
        assert!(!workspace.artifact_exists());
        assert!(!workspace.clear_stale().unwrap());
    }

    #[test]
    fn test_workspaces_are_distinct_and_removed_on_drop() {
        let base = tempfile::tempdir().unwrap();
        let first = Workspace::acquire(Some(base.path()), "mp3").unwrap();
        let second = Workspace::acquire(Some(base.path()), "mp3").unwrap();
        assert_ne!(first.artifact_path(), second.artifact_path());

        fs_err::write(first.artifact_path(), b"audio").unwrap();
        let dir = first.path().to_path_buf();
        drop(first);

        assert!(!dir.exists());
        assert!(second.path().exists());
    }

    #[test]
    fn test_acquire_creates_missing_base() {
        let base = tempfile::tempdir().unwrap();
        let nested = base.path().join("a").join("b");
        let workspace = Workspace::acquire(Some(&nested), "wav").unwrap();
        assert!(workspace.path().starts_with(&nested));
    }

    #[test]
    fn test_preserve_copies_artifact() {
        let workspace = Workspace::acquire(None, "mp3").unwrap();
        fs_err::write(workspace.artifact_path(), b"audio").unwrap();
        let dest = tempfile::tempdir().unwrap();

        let saved = workspace.preserve(dest.path(), "abc123").unwrap();
        assert_eq!(saved, dest.path().join("abc123.mp3"));
        assert_eq!(fs_err::read(&saved).unwrap(), b"audio");
    }
}
