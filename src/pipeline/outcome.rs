use std::fmt;

use serde::Serialize;
use stickerforge_common::{MediaBlob, MediaKind};

use crate::directive::StyleDirective;

pub const STICKER_READY: &str = "Here's your sticker!";
pub const STICKER_WITH_TEXT_READY: &str = "Here's your sticker with text!";
pub const ANIMATED_STICKER_READY: &str = "Here's your animated sticker!";
pub const ANIMATED_TEXT_UNSUPPORTED: &str = "Adding text to animated GIFs is not supported.";
pub const MISSING_MEDIA: &str =
    "Please send an image/gif, reply to one, or include an image link with `!sticker`.";
pub const UNSUPPORTED_FORMAT: &str = "Sorry, I can only create stickers from images and GIFs.";

/// Terminal status of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineOutcome {
    Sent,
    UserError,
    FetchError,
    ComposeError,
    TranscodeError,
    UnsupportedFormat,
    DeliveryError,
}

impl PipelineOutcome {
    pub fn is_success(self) -> bool {
        self == PipelineOutcome::Sent
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineOutcome::Sent => "sent",
            PipelineOutcome::UserError => "user_error",
            PipelineOutcome::FetchError => "fetch_error",
            PipelineOutcome::ComposeError => "compose_error",
            PipelineOutcome::TranscodeError => "transcode_error",
            PipelineOutcome::UnsupportedFormat => "unsupported_format",
            PipelineOutcome::DeliveryError => "delivery_error",
        }
    }
}

impl fmt::Display for PipelineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Processing route chosen for resolved media.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Still image with overlay text.
    Composite,
    /// Still image without text, forwarded unchanged.
    Passthrough,
    /// Animated source, re-encoded as an animated sticker.
    Transcode,
}

/// Choose how to process media of `kind`. `None` means unsupported.
pub fn route(kind: MediaKind, directive: &StyleDirective) -> Option<Route> {
    match kind {
        MediaKind::Animated => Some(Route::Transcode),
        MediaKind::Static if directive.has_text() => Some(Route::Composite),
        MediaKind::Static => Some(Route::Passthrough),
        MediaKind::Other => None,
    }
}

/// What the pipeline produced, and the status line for the user.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub outcome: PipelineOutcome,
    /// Present only when the outcome is [`PipelineOutcome::Sent`].
    pub media: Option<MediaBlob>,
    pub message: String,
}

impl PipelineResult {
    pub fn sent(media: MediaBlob, message: impl Into<String>) -> Self {
        Self {
            outcome: PipelineOutcome::Sent,
            media: Some(media),
            message: message.into(),
        }
    }

    pub fn failed(outcome: PipelineOutcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            media: None,
            message: message.into(),
        }
    }

    /// JSON summary without the media payload.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "outcome": self.outcome,
            "message": self.message,
            "media": self.media.as_ref().map(|m| serde_json::json!({
                "mime_type": m.mime_type(),
                "name": m.suggested_name(),
                "bytes": m.len(),
            })),
        })
    }
}
