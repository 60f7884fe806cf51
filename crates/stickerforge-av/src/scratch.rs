//! Scratch storage for transcoding.
//!
//! A [`ScratchDir`] is a process-wide staging directory, created lazily on
//! first use. Each transcode allocates a [`ScratchFiles`] pair inside it;
//! the pair removes both of its files when dropped, whichever way the
//! transcode exits.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{Error, Result};

/// Process-wide scratch directory.
#[derive(Debug)]
pub struct ScratchDir {
    root: PathBuf,
    ready: OnceCell<()>,
}

impl ScratchDir {
    /// Describe a scratch directory. Nothing is created until first use.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ready: OnceCell::new(),
        }
    }

    /// The scratch directory path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the directory if this is the first use.
    pub async fn ensure(&self) -> Result<&Path> {
        self.ready
            .get_or_try_init(|| async {
                tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
                    Error::Scratch(format!(
                        "failed to create scratch directory {}: {e}",
                        self.root.display()
                    ))
                })
            })
            .await?;
        Ok(&self.root)
    }

    /// Allocate a uniquely named input/output file pair.
    ///
    /// Names come from a random identifier; collisions are not guarded
    /// against beyond that.
    pub async fn allocate(&self, input_ext: &str, output_ext: &str) -> Result<ScratchFiles> {
        let root = self.ensure().await?;
        let id = Uuid::new_v4();
        Ok(ScratchFiles {
            id,
            input: root.join(format!("{id}.{input_ext}")),
            output: root.join(format!("{id}.{output_ext}")),
        })
    }

    /// Remove leftover files with one of `extensions` from a crashed run.
    ///
    /// Returns the number of files removed. A missing directory is not an
    /// error: there is nothing to sweep.
    pub fn sweep(&self, extensions: &[String]) -> Result<usize> {
        let entries = match std::fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type()?.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
                .unwrap_or(false);
            if !matches {
                continue;
            }
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!("Swept stale scratch file {:?}", path);
                    removed += 1;
                }
                Err(e) => tracing::warn!("Failed to sweep scratch file {:?}: {}", path, e),
            }
        }

        Ok(removed)
    }
}

/// An input/output scratch file pair owned by one transcode.
///
/// Both files are removed on drop.
#[derive(Debug)]
pub struct ScratchFiles {
    id: Uuid,
    input: PathBuf,
    output: PathBuf,
}

impl ScratchFiles {
    /// Identifier shared by both file names.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Path the source bytes are written to.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Path the encoder writes to.
    pub fn output(&self) -> &Path {
        &self.output
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for path in [&self.input, &self.output] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => tracing::warn!("Failed to remove scratch file {:?}: {}", path, e),
            }
        }
    }
}
