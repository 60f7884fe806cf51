//! Chat-side collaborators.
//!
//! The pipeline never talks to a chat transport directly. It replies and
//! delivers stickers through a [`Messenger`], and reads message media
//! through [`MediaAccessor`](crate::resolver::MediaAccessor). This module
//! also carries the file-system implementations used by the CLI.

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use stickerforge_common::MediaBlob;

use crate::config::StickerConfig;
use crate::resolver::MediaAccessor;

/// Author and pack name stamped on every sticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StickerMetadata {
    pub author: String,
    pub pack_name: String,
}

impl From<&StickerConfig> for StickerMetadata {
    fn from(config: &StickerConfig) -> Self {
        Self {
            author: config.author.clone(),
            pack_name: config.pack_name.clone(),
        }
    }
}

/// Sends replies and stickers back to the chat the command came from.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver a finished sticker.
    async fn send_sticker(&self, media: &MediaBlob, metadata: &StickerMetadata) -> anyhow::Result<()>;

    /// Send a plain text reply.
    async fn reply(&self, text: &str) -> anyhow::Result<()>;
}

/// Media read from a local file.
#[derive(Debug, Clone)]
pub struct FileMedia {
    path: PathBuf,
}

impl FileMedia {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// MIME type guessed from a file's extension.
pub fn mime_for_path(path: &Path) -> String {
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

#[async_trait]
impl MediaAccessor for FileMedia {
    async fn download(&self) -> anyhow::Result<Option<MediaBlob>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("Failed to read {:?}", self.path))?;

        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "media".to_string());

        Ok(Some(MediaBlob::new(bytes, mime_for_path(&self.path), name)))
    }
}

/// Writes stickers into a directory and prints replies to stdout.
#[derive(Debug, Clone)]
pub struct DirectoryMessenger {
    out_dir: PathBuf,
}

impl DirectoryMessenger {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Destination for a sticker. Names not already marked as stickers get a
    /// `sticker_` prefix so a source file is never overwritten.
    pub fn sticker_path(&self, media: &MediaBlob) -> PathBuf {
        let name = media.suggested_name();
        let name = if name.starts_with("sticker") {
            name.to_string()
        } else {
            format!("sticker_{}", name)
        };
        self.out_dir.join(name)
    }
}

#[async_trait]
impl Messenger for DirectoryMessenger {
    async fn send_sticker(&self, media: &MediaBlob, metadata: &StickerMetadata) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", self.out_dir))?;

        let path = self.sticker_path(media);
        tokio::fs::write(&path, media.bytes())
            .await
            .with_context(|| format!("Failed to write sticker to {:?}", path))?;

        tracing::info!(
            "Wrote {} sticker to {:?} (author: {}, pack: {})",
            media.mime_type(),
            path,
            metadata.author,
            metadata.pack_name
        );
        println!("Sticker written to {}", path.display());
        Ok(())
    }

    async fn reply(&self, text: &str) -> anyhow::Result<()> {
        println!("{}", text);
        Ok(())
    }
}
