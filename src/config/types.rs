use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub sticker: StickerConfig,

    #[serde(default)]
    pub scratch: ScratchConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub compose: ComposeConfig,
}

/// Metadata attached to every outgoing sticker.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StickerConfig {
    /// Overridden by `STICKER_AUTHOR`.
    #[serde(default = "default_author")]
    pub author: String,

    /// Overridden by `STICKER_PACK_NAME`.
    #[serde(default = "default_pack_name")]
    pub pack_name: String,
}

fn default_author() -> String {
    "WhatsApp Bot".to_string()
}

fn default_pack_name() -> String {
    "Sticker Pack".to_string()
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
            pack_name: default_pack_name(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScratchConfig {
    /// Directory for transcoder scratch files
    #[serde(default = "default_scratch_dir")]
    pub dir: PathBuf,

    /// Remove leftover scratch files when the process starts
    #[serde(default = "default_true")]
    pub sweep_on_startup: bool,

    /// Extensions removed by the startup sweep
    #[serde(default = "default_sweep_extensions")]
    pub extensions: Vec<String>,
}

fn default_scratch_dir() -> PathBuf {
    PathBuf::from("./temp_media")
}

fn default_true() -> bool {
    true
}

fn default_sweep_extensions() -> Vec<String> {
    vec!["gif".to_string(), "webp".to_string()]
}

impl Default for ScratchConfig {
    fn default() -> Self {
        Self {
            dir: default_scratch_dir(),
            sweep_on_startup: true,
            extensions: default_sweep_extensions(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    /// Seconds before a running encoder is killed
    #[serde(default = "default_encoder_timeout")]
    pub encoder_timeout_secs: u64,
}

fn default_encoder_timeout() -> u64 {
    120
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            encoder_timeout_secs: default_encoder_timeout(),
        }
    }
}

impl ToolsConfig {
    pub fn encoder_timeout(&self) -> Duration {
        Duration::from_secs(self.encoder_timeout_secs)
    }
}

/// Settings for downloading media from links.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,

    /// Largest body accepted from a link, in bytes
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    15
}

fn default_max_bytes() -> u64 {
    10 * 1024 * 1024
}

fn default_user_agent() -> String {
    concat!("stickerforge/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_bytes: default_max_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ComposeConfig {
    /// Font used for overlays. Well-known bold system faces are tried when unset.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
}
