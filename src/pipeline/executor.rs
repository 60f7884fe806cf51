use std::path::PathBuf;
use std::sync::Arc;

use stickerforge_av::tools::FFMPEG;
use stickerforge_av::{get_tool_path, AnimatedTranscoder, ScratchDir};
use stickerforge_common::MediaBlob;

use crate::compose::{ComposeError, Compositor, FontTypeface};
use crate::config::Config;
use crate::directive::{self, StyleDirective};
use crate::messaging::{Messenger, StickerMetadata};
use crate::resolver::MediaResolver;

use super::invocation::Invocation;
use super::outcome::{
    route, PipelineOutcome, PipelineResult, Route, ANIMATED_STICKER_READY,
    ANIMATED_TEXT_UNSUPPORTED, MISSING_MEDIA, STICKER_READY, STICKER_WITH_TEXT_READY,
    UNSUPPORTED_FORMAT,
};

/// Runs `!sticker` invocations end to end.
pub struct StickerPipeline {
    resolver: MediaResolver,
    compositor: Option<Compositor>,
    transcoder: AnimatedTranscoder,
    metadata: StickerMetadata,
}

impl StickerPipeline {
    pub fn new(
        resolver: MediaResolver,
        compositor: Option<Compositor>,
        transcoder: AnimatedTranscoder,
        metadata: StickerMetadata,
    ) -> Self {
        Self {
            resolver,
            compositor,
            transcoder,
            metadata,
        }
    }

    /// Wire up collaborators from configuration.
    ///
    /// A missing font disables text overlays and a missing encoder makes
    /// animated requests fail; neither stops the pipeline from starting.
    pub fn from_config(config: &Config) -> Self {
        let resolver = MediaResolver::new(&config.fetch);

        let compositor = match FontTypeface::discover(config.compose.font_path.as_deref()) {
            Ok(face) => {
                tracing::debug!("Overlay font: {}", face.source());
                Some(Compositor::new(Arc::new(face)))
            }
            Err(e) => {
                tracing::warn!("Text overlays disabled: {}", e);
                None
            }
        };

        let ffmpeg = get_tool_path(FFMPEG, config.tools.ffmpeg_path.as_deref()).unwrap_or_else(|e| {
            tracing::warn!("Animated stickers unavailable until ffmpeg is installed: {}", e);
            PathBuf::from(FFMPEG)
        });

        let scratch = Arc::new(ScratchDir::new(&config.scratch.dir));
        let transcoder =
            AnimatedTranscoder::new(ffmpeg, scratch).with_timeout(config.tools.encoder_timeout());

        Self::new(
            resolver,
            compositor,
            transcoder,
            StickerMetadata::from(&config.sticker),
        )
    }

    pub fn metadata(&self) -> &StickerMetadata {
        &self.metadata
    }

    pub fn transcoder(&self) -> &AnimatedTranscoder {
        &self.transcoder
    }

    /// Remove scratch files left behind by an earlier process.
    pub fn sweep_scratch(&self, extensions: &[String]) -> usize {
        let scratch = self.transcoder.scratch();
        match scratch.sweep(extensions) {
            Ok(0) => 0,
            Ok(removed) => {
                tracing::info!("Removed {} stale file(s) from {:?}", removed, scratch.path());
                removed
            }
            Err(e) => {
                tracing::warn!("Failed to sweep {:?}: {}", scratch.path(), e);
                0
            }
        }
    }

    /// Process an invocation without talking to the chat.
    pub async fn run(&self, invocation: &Invocation) -> PipelineResult {
        let parsed = match directive::parse(invocation.command_tail()) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::debug!("Rejected command tail: {}", e);
                return PipelineResult::failed(PipelineOutcome::UserError, e.user_message());
            }
        };

        let resolved = match self
            .resolver
            .resolve(
                invocation.attachment(),
                invocation.quoted(),
                parsed.url.as_deref(),
            )
            .await
        {
            Ok(Some(resolved)) => resolved,
            Ok(None) => {
                tracing::debug!("No media to make a sticker from");
                return PipelineResult::failed(PipelineOutcome::UserError, MISSING_MEDIA);
            }
            Err(e) => {
                tracing::warn!("Media retrieval failed: {}", e);
                return PipelineResult::failed(PipelineOutcome::FetchError, e.user_message());
            }
        };

        let media = resolved.blob;
        let directive = parsed.directive;

        match route(media.kind(), &directive) {
            None => {
                tracing::debug!("Unsupported media type {}", media.mime_type());
                PipelineResult::failed(PipelineOutcome::UnsupportedFormat, UNSUPPORTED_FORMAT)
            }
            Some(Route::Passthrough) => PipelineResult::sent(media, STICKER_READY),
            Some(Route::Composite) => match self.composite(&media, &directive).await {
                Ok(sticker) => PipelineResult::sent(sticker, STICKER_WITH_TEXT_READY),
                Err(e) => {
                    tracing::warn!("Compositing failed: {}", e);
                    PipelineResult::failed(PipelineOutcome::ComposeError, e.user_message())
                }
            },
            Some(Route::Transcode) => match self.transcoder.transcode(&media).await {
                Ok(sticker) => {
                    let message = if directive.has_text() {
                        format!("{} {}", ANIMATED_TEXT_UNSUPPORTED, ANIMATED_STICKER_READY)
                    } else {
                        ANIMATED_STICKER_READY.to_string()
                    };
                    PipelineResult::sent(sticker, message)
                }
                Err(e) => {
                    tracing::warn!("Transcode failed: {}", e);
                    PipelineResult::failed(
                        PipelineOutcome::TranscodeError,
                        format!(
                            "Sorry, I couldn't create the sticker. (Details: {})",
                            e.diagnostic()
                        ),
                    )
                }
            },
        }
    }

    /// Process an invocation and report back through `messenger`.
    ///
    /// Sends the sticker when one was produced, then exactly one status reply.
    pub async fn handle(&self, invocation: &Invocation, messenger: &dyn Messenger) -> PipelineResult {
        let mut result = self.run(invocation).await;

        if let Some(sticker) = result.media.as_ref() {
            if let Err(e) = messenger.send_sticker(sticker, &self.metadata).await {
                tracing::warn!("Failed to deliver sticker: {:#}", e);
                result = PipelineResult::failed(
                    PipelineOutcome::DeliveryError,
                    format!("Sorry, I couldn't create the sticker. (Details: {})", e),
                );
            }
        }

        if let Err(e) = messenger.reply(&result.message).await {
            tracing::warn!("Failed to send status reply: {:#}", e);
        }

        tracing::info!("Sticker request finished: {}", result.outcome);
        result
    }

    async fn composite(
        &self,
        media: &MediaBlob,
        directive: &StyleDirective,
    ) -> Result<MediaBlob, ComposeError> {
        let compositor = self.compositor.clone().ok_or(ComposeError::Unavailable)?;
        let media = media.clone();
        let directive = directive.clone();

        tokio::task::spawn_blocking(move || compositor.compose(&media, &directive))
            .await
            .map_err(|e| ComposeError::Task(e.to_string()))?
    }
}
