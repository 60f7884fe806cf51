//! # stickerforge-av
//!
//! External encoder plumbing and animated sticker transcoding.
//!
//! This crate provides:
//!
//! - **Tool discovery** ([`tools`]) -- find ffmpeg on `PATH` or at a
//!   configured location and report its version.
//! - **Command execution** ([`ToolCommand`]) -- async builder with timeout
//!   support for running external processes.
//! - **Scratch storage** ([`ScratchDir`], [`ScratchFiles`]) -- a lazily
//!   created staging directory and self-cleaning file pairs.
//! - **Transcoding** ([`AnimatedTranscoder`]) -- GIF to 256x256 animated WebP.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use stickerforge_av::{AnimatedTranscoder, ScratchDir};
//! use stickerforge_common::MediaBlob;
//!
//! # async fn example(gif: MediaBlob) -> stickerforge_av::Result<()> {
//! let scratch = Arc::new(ScratchDir::new("./temp_media"));
//! let ffmpeg = stickerforge_av::tools::require_tool("ffmpeg")?;
//! let sticker = AnimatedTranscoder::new(ffmpeg, scratch).transcode(&gif).await?;
//! assert_eq!(sticker.mime_type(), "image/webp");
//! # Ok(())
//! # }
//! ```

pub mod command;
mod error;
pub mod scratch;
pub mod tools;
pub mod transcode;

// Re-exports
pub use command::{ToolCommand, ToolOutput};
pub use error::{Error, Result};
pub use scratch::{ScratchDir, ScratchFiles};
pub use tools::{check_tools, get_tool_path, require_tool, ToolInfo};
pub use transcode::{AnimatedTranscoder, TranscodeJob, TranscodeStatus};
