mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const AUTHOR_ENV: &str = "STICKER_AUTHOR";
pub const PACK_NAME_ENV: &str = "STICKER_PACK_NAME";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    prepare_config(&mut config, |key| std::env::var(key).ok());
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./config.toml",
        "./stickerforge.toml",
        "~/.config/stickerforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            return load_config(path);
        }
    }

    let mut config = Config::default();
    prepare_config(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Apply environment overrides and expand `~` in paths.
pub fn prepare_config(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
    if let Some(author) = env(AUTHOR_ENV).filter(|v| !v.is_empty()) {
        config.sticker.author = author;
    }
    if let Some(pack_name) = env(PACK_NAME_ENV).filter(|v| !v.is_empty()) {
        config.sticker.pack_name = pack_name;
    }

    config.scratch.dir = expand_path(&config.scratch.dir);
    config.tools.ffmpeg_path = config.tools.ffmpeg_path.as_deref().map(expand_path);
    config.compose.font_path = config.compose.font_path.as_deref().map(expand_path);
}

fn expand_path(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(shellexpand::tilde(s).as_ref()),
        None => path.to_path_buf(),
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.tools.encoder_timeout_secs == 0 {
        anyhow::bail!("tools.encoder_timeout_secs cannot be 0");
    }

    if config.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs cannot be 0");
    }

    if config.fetch.max_bytes == 0 {
        anyhow::bail!("fetch.max_bytes cannot be 0");
    }

    if config.scratch.extensions.is_empty() {
        anyhow::bail!("scratch.extensions cannot be empty");
    }

    if let Some(font) = &config.compose.font_path {
        if !font.exists() {
            tracing::warn!("Configured font does not exist: {:?}", font);
        }
    }

    Ok(())
}
