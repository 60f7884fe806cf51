//! Animated sticker transcoding.
//!
//! Converts an animated GIF into a 256x256 animated WebP sticker by running
//! ffmpeg over a pair of scratch files. The scratch files belong to a
//! [`TranscodeJob`] and are removed when the job is dropped, on success and
//! on every failure path alike.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use stickerforge_common::media::{GIF_MIME, WEBP_MIME};
use stickerforge_common::{MediaBlob, MediaKind};

use crate::command::{ToolCommand, DEFAULT_TIMEOUT};
use crate::scratch::{ScratchDir, ScratchFiles};
use crate::{Error, Result};

/// Side length of the square sticker canvas, in pixels.
pub const STICKER_CANVAS: u32 = 256;

/// libwebp quality setting passed to the encoder.
pub const STICKER_QUALITY: u32 = 75;

/// File name given to transcoded stickers.
pub const STICKER_FILE_NAME: &str = "sticker.webp";

/// Scale-and-pad filter: fit inside the canvas, keep the aspect ratio and
/// pad the remainder with transparent pixels.
pub fn sticker_filter() -> String {
    let side = STICKER_CANVAS;
    format!(
        "scale={side}:{side}:force_original_aspect_ratio=decrease,\
         pad={side}:{side}:(ow-iw)/2:(oh-ih)/2:color=white@0.0"
    )
}

/// Encoder arguments for one input/output pair.
pub fn encoder_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-hide_banner".to_string(),
        "-i".to_string(),
        input.display().to_string(),
        "-vcodec".to_string(),
        "libwebp".to_string(),
        "-vf".to_string(),
        sticker_filter(),
        "-loop".to_string(),
        "0".to_string(),
        "-preset".to_string(),
        "default".to_string(),
        "-an".to_string(),
        "-vsync".to_string(),
        "0".to_string(),
        "-qscale".to_string(),
        STICKER_QUALITY.to_string(),
        "-f".to_string(),
        "webp".to_string(),
        output.display().to_string(),
    ]
}

/// Lifecycle state of a [`TranscodeJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscodeStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

/// One encoder invocation and the scratch files it owns.
#[derive(Debug)]
pub struct TranscodeJob {
    files: ScratchFiles,
    status: TranscodeStatus,
}

impl TranscodeJob {
    /// Allocate scratch paths for a GIF-to-WebP job.
    pub async fn allocate(scratch: &ScratchDir) -> Result<Self> {
        let files = scratch.allocate("gif", "webp").await?;
        Ok(Self {
            files,
            status: TranscodeStatus::Pending,
        })
    }

    /// Current status.
    pub fn status(&self) -> TranscodeStatus {
        self.status
    }

    /// Source file path.
    pub fn input_path(&self) -> &Path {
        self.files.input()
    }

    /// Encoder output path.
    pub fn output_path(&self) -> &Path {
        self.files.output()
    }

    /// Identifier shared by both scratch file names.
    pub fn id(&self) -> uuid::Uuid {
        self.files.id()
    }

    fn set_status(&mut self, status: TranscodeStatus) {
        tracing::trace!("Transcode job {}: {:?} -> {:?}", self.id(), self.status, status);
        self.status = status;
    }
}

/// Converts animated sources into animated stickers via ffmpeg.
#[derive(Debug, Clone)]
pub struct AnimatedTranscoder {
    ffmpeg: PathBuf,
    scratch: Arc<ScratchDir>,
    timeout: Duration,
}

impl AnimatedTranscoder {
    /// Create a transcoder that runs `ffmpeg` and stages files in `scratch`.
    pub fn new(ffmpeg: PathBuf, scratch: Arc<ScratchDir>) -> Self {
        Self {
            ffmpeg,
            scratch,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the maximum encoder run time.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The scratch directory used by this transcoder.
    pub fn scratch(&self) -> &ScratchDir {
        &self.scratch
    }

    /// Transcode an animated source into an animated WebP sticker.
    ///
    /// Both scratch files are gone by the time this returns, whatever the
    /// outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidInput`] if `media` is not an animated format.
    /// - [`Error::ToolFailed`], [`Error::ToolNotFound`] or [`Error::Timeout`]
    ///   if the encoder cannot produce output.
    /// - [`Error::MissingOutput`] if the encoder exits cleanly without
    ///   writing the output file.
    pub async fn transcode(&self, media: &MediaBlob) -> Result<MediaBlob> {
        if media.kind() != MediaKind::Animated {
            return Err(Error::InvalidInput(format!(
                "expected {}, got {}",
                GIF_MIME,
                media.mime_type()
            )));
        }

        let mut job = TranscodeJob::allocate(&self.scratch).await?;
        tracing::debug!(
            "Transcoding {} ({} bytes) in job {}",
            media.suggested_name(),
            media.len(),
            job.id()
        );

        let result = self.run(&mut job, media).await;
        match &result {
            Ok(blob) => {
                job.set_status(TranscodeStatus::Succeeded);
                tracing::info!("Transcode job {} produced {} bytes", job.id(), blob.len());
            }
            Err(e) => {
                job.set_status(TranscodeStatus::Failed);
                tracing::warn!("Transcode job {} failed: {}", job.id(), e);
            }
        }
        result
    }

    async fn run(&self, job: &mut TranscodeJob, media: &MediaBlob) -> Result<MediaBlob> {
        tokio::fs::write(job.input_path(), media.bytes()).await?;

        job.set_status(TranscodeStatus::Running);
        ToolCommand::new(self.ffmpeg.clone())
            .args(encoder_args(job.input_path(), job.output_path()))
            .timeout(self.timeout)
            .execute()
            .await?;

        let bytes = match tokio::fs::read(job.output_path()).await {
            Ok(bytes) if !bytes.is_empty() => bytes,
            Ok(_) => {
                return Err(Error::MissingOutput {
                    path: job.output_path().to_path_buf(),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::MissingOutput {
                    path: job.output_path().to_path_buf(),
                })
            }
            Err(e) => return Err(e.into()),
        };

        Ok(MediaBlob::new(bytes, WEBP_MIME, STICKER_FILE_NAME))
    }
}
