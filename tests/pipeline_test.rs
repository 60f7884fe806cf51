//! Pipeline orchestration tests
//!
//! Stand-in encoder scripts replace ffmpeg so dispatch, status messages and
//! scratch cleanup can be checked without an encoder installed.

#![cfg(unix)]

mod common;

use std::path::PathBuf;

use assert_matches::assert_matches;
use common::*;
use image::Rgba;
use serial_test::serial;
use stickerforge::compose::COMPOSED_FILE_NAME;
use stickerforge::pipeline::{
    Invocation, PipelineOutcome, ANIMATED_STICKER_READY, ANIMATED_TEXT_UNSUPPORTED,
    MISSING_MEDIA, STICKER_READY, STICKER_WITH_TEXT_READY, UNSUPPORTED_FORMAT,
};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    _tools: TempDir,
    scratch: TempDir,
    encoder: PathBuf,
}

impl Fixture {
    fn new(encoder_body: &str) -> Self {
        let tools = TempDir::new().unwrap();
        let encoder = write_encoder(tools.path(), encoder_body);
        Self {
            _tools: tools,
            scratch: TempDir::new().unwrap(),
            encoder,
        }
    }

    fn pipeline(&self) -> stickerforge::pipeline::StickerPipeline {
        pipeline(self.encoder.clone(), &self.scratch_dir())
    }

    fn scratch_dir(&self) -> PathBuf {
        self.scratch.path().join("temp_media")
    }
}

#[tokio::test]
async fn test_static_without_text_passes_through_unchanged() {
    let fixture = Fixture::new(COPY_ENCODER);
    let source = jpeg_blob(40, 30);
    let invocation = Invocation::new("").with_attachment(InMemoryMedia::new(source.clone()));

    let result = fixture.pipeline().run(&invocation).await;

    assert_eq!(result.outcome, PipelineOutcome::Sent);
    assert_eq!(result.message, STICKER_READY);
    let media = result.media.unwrap();
    assert_eq!(media.mime_type(), source.mime_type());
    assert_eq!(media.bytes(), source.bytes());
}

#[tokio::test]
async fn test_static_with_text_is_composited() {
    let fixture = Fixture::new(COPY_ENCODER);
    let invocation = Invocation::new("Hello --color=red --size=20")
        .with_attachment(InMemoryMedia::new(png_blob(100, 100, Rgba([0, 0, 255, 255]))));

    let result = fixture.pipeline().run(&invocation).await;

    assert_eq!(result.outcome, PipelineOutcome::Sent);
    assert_eq!(result.message, STICKER_WITH_TEXT_READY);
    let media = result.media.unwrap();
    assert_eq!(media.mime_type(), "image/png");
    assert_eq!(media.suggested_name(), COMPOSED_FILE_NAME);

    let img = image::load_from_memory(media.bytes()).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (100, 100));
    // "Hello" is 50px wide at 20px, centered; bottom-anchored box spans y 70..90
    assert_eq!(*img.get_pixel(30, 80), Rgba([255, 0, 0, 255]));
    assert_eq!(*img.get_pixel(50, 10), Rgba([0, 0, 255, 255]));
}

#[tokio::test]
async fn test_top_anchor_moves_text() {
    let fixture = Fixture::new(COPY_ENCODER);
    let invocation = Invocation::new("Hi --pos(top) --size(20) --color=#00ff00")
        .with_attachment(InMemoryMedia::new(png_blob(100, 100, Rgba([0, 0, 0, 0]))));

    let result = fixture.pipeline().run(&invocation).await;
    let img = image::load_from_memory(result.media.unwrap().bytes())
        .unwrap()
        .to_rgba8();

    // first line box starts 1.2em from the top: y 24..44
    assert_eq!(*img.get_pixel(47, 30), Rgba([0, 255, 0, 255]));
    assert_eq!(*img.get_pixel(47, 80), Rgba([0, 0, 0, 0]));
}

#[tokio::test]
#[serial]
async fn test_gif_is_transcoded_and_scratch_cleaned() {
    let fixture = Fixture::new(COPY_ENCODER);
    let invocation = Invocation::new("").with_quoted(InMemoryMedia::new(gif_blob()));

    let result = fixture.pipeline().run(&invocation).await;

    assert_eq!(result.outcome, PipelineOutcome::Sent);
    assert_eq!(result.message, ANIMATED_STICKER_READY);
    let media = result.media.unwrap();
    assert_eq!(media.mime_type(), "image/webp");
    assert_eq!(media.suggested_name(), "sticker.webp");
    assert!(scratch_entries(&fixture.scratch_dir()).is_empty());
}

#[tokio::test]
#[serial]
async fn test_gif_with_text_ignores_overlay_and_says_so() {
    let fixture = Fixture::new(COPY_ENCODER);
    let invocation =
        Invocation::new("Party time --size=40").with_attachment(InMemoryMedia::new(gif_blob()));

    let result = fixture.pipeline().run(&invocation).await;

    assert_eq!(result.outcome, PipelineOutcome::Sent);
    assert!(result.message.starts_with(ANIMATED_TEXT_UNSUPPORTED));
    assert!(result.message.ends_with(ANIMATED_STICKER_READY));
    assert_eq!(result.media.unwrap().bytes(), gif_blob().bytes());
}

#[tokio::test]
#[serial]
async fn test_encoder_failure_is_transcode_error_and_cleans_up() {
    let fixture = Fixture::new(FAILING_ENCODER);
    let invocation = Invocation::new("").with_attachment(InMemoryMedia::new(gif_blob()));

    let result = fixture.pipeline().run(&invocation).await;

    assert_eq!(result.outcome, PipelineOutcome::TranscodeError);
    assert!(result.media.is_none());
    assert_eq!(
        result.message,
        "Sorry, I couldn't create the sticker. (Details: Unknown encoder 'libwebp')"
    );
    assert!(scratch_entries(&fixture.scratch_dir()).is_empty());
}

#[tokio::test]
#[serial]
async fn test_missing_encoder_is_transcode_error() {
    let scratch = TempDir::new().unwrap();
    let pipeline = pipeline(
        PathBuf::from("/nonexistent/ffmpeg"),
        &scratch.path().join("temp_media"),
    );
    let invocation = Invocation::new("").with_attachment(InMemoryMedia::new(gif_blob()));

    let result = pipeline.run(&invocation).await;
    assert_eq!(result.outcome, PipelineOutcome::TranscodeError);
}

#[tokio::test]
async fn test_unsupported_media() {
    let fixture = Fixture::new(COPY_ENCODER);
    let invocation = Invocation::new("caption").with_attachment(InMemoryMedia::new(video_blob()));

    let result = fixture.pipeline().run(&invocation).await;

    assert_eq!(result.outcome, PipelineOutcome::UnsupportedFormat);
    assert_eq!(result.message, UNSUPPORTED_FORMAT);
    assert!(result.media.is_none());
}

#[tokio::test]
async fn test_no_media_is_user_error() {
    let fixture = Fixture::new(COPY_ENCODER);
    let result = fixture.pipeline().run(&Invocation::new("just text")).await;

    assert_eq!(result.outcome, PipelineOutcome::UserError);
    assert_eq!(result.message, MISSING_MEDIA);
}

#[tokio::test]
async fn test_invalid_size_is_user_error_before_any_download() {
    let fixture = Fixture::new(COPY_ENCODER);
    let attachment = InMemoryMedia::new(png_blob(10, 10, Rgba([0, 0, 0, 255])));
    let invocation = Invocation::new("Hello --size=abc").with_attachment(attachment.clone());

    let result = fixture.pipeline().run(&invocation).await;

    assert_eq!(result.outcome, PipelineOutcome::UserError);
    assert!(result.message.contains("--size=40"));
    assert_eq!(attachment.downloads(), 0);
}

#[tokio::test]
async fn test_unknown_position_still_succeeds() {
    let fixture = Fixture::new(COPY_ENCODER);
    let invocation = Invocation::new("Hello --pos=sideways")
        .with_attachment(InMemoryMedia::new(png_blob(120, 120, Rgba([0, 0, 0, 255]))));

    let result = fixture.pipeline().run(&invocation).await;
    assert_eq!(result.outcome, PipelineOutcome::Sent);
}

#[tokio::test]
async fn test_accessor_failure_is_fetch_error() {
    let fixture = Fixture::new(COPY_ENCODER);
    let invocation = Invocation::new("").with_attachment(BrokenMedia);

    let result = fixture.pipeline().run(&invocation).await;
    assert_eq!(result.outcome, PipelineOutcome::FetchError);
}

#[tokio::test]
async fn test_link_with_caption() {
    let server = MockServer::start().await;
    let png = png_blob(120, 120, Rgba([200, 200, 200, 255]));
    Mock::given(method("GET"))
        .and(path("/y.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(png.bytes().to_vec(), "image/png"))
        .expect(1)
        .mount(&server)
        .await;

    let fixture = Fixture::new(COPY_ENCODER);
    let tail = format!("{}/y.png Hello --color=red", server.uri());
    let result = fixture.pipeline().run(&Invocation::new(tail)).await;

    assert_eq!(result.outcome, PipelineOutcome::Sent);
    assert_eq!(result.message, STICKER_WITH_TEXT_READY);
    assert_eq!(result.media.unwrap().mime_type(), "image/png");
}

#[tokio::test]
async fn test_link_to_page_is_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"<html/>".to_vec(), "text/html"))
        .mount(&server)
        .await;

    let fixture = Fixture::new(COPY_ENCODER);
    let tail = format!("{}/post/123", server.uri());
    let result = fixture.pipeline().run(&Invocation::new(tail)).await;

    assert_eq!(result.outcome, PipelineOutcome::FetchError);
    assert!(result.message.contains("direct image link"));
}

#[tokio::test]
async fn test_handle_sends_sticker_then_one_status() {
    let fixture = Fixture::new(COPY_ENCODER);
    let messenger = RecordingMessenger::new();
    let invocation = Invocation::new("").with_attachment(InMemoryMedia::new(png_blob(
        16,
        16,
        Rgba([5, 5, 5, 255]),
    )));

    let result = fixture.pipeline().handle(&invocation, &messenger).await;

    assert_eq!(result.outcome, PipelineOutcome::Sent);
    let stickers = messenger.stickers();
    assert_eq!(stickers.len(), 1);
    assert_eq!(stickers[0].1, metadata());
    assert_eq!(messenger.replies(), vec![STICKER_READY.to_string()]);
}

#[tokio::test]
async fn test_handle_failure_sends_only_status() {
    let fixture = Fixture::new(COPY_ENCODER);
    let messenger = RecordingMessenger::new();

    let result = fixture
        .pipeline()
        .handle(&Invocation::new(""), &messenger)
        .await;

    assert_eq!(result.outcome, PipelineOutcome::UserError);
    assert!(messenger.stickers().is_empty());
    assert_eq!(messenger.replies(), vec![MISSING_MEDIA.to_string()]);
}

#[tokio::test]
async fn test_handle_reports_delivery_failure() {
    let fixture = Fixture::new(COPY_ENCODER);
    let messenger = RecordingMessenger::rejecting_stickers();
    let invocation = Invocation::new("").with_attachment(InMemoryMedia::new(png_blob(
        16,
        16,
        Rgba([5, 5, 5, 255]),
    )));

    let result = fixture.pipeline().handle(&invocation, &messenger).await;

    assert_matches!(result.outcome, PipelineOutcome::DeliveryError);
    let replies = messenger.replies();
    assert_eq!(replies.len(), 1);
    assert!(replies[0].starts_with("Sorry, I couldn't create the sticker. (Details:"));
    assert!(replies[0].contains("sticker upload rejected"));
}

#[tokio::test]
async fn test_sweep_removes_only_known_extensions() {
    let fixture = Fixture::new(COPY_ENCODER);
    let dir = fixture.scratch_dir();
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("stale.gif"), b"x").unwrap();
    std::fs::write(dir.join("stale.WEBP"), b"x").unwrap();
    std::fs::write(dir.join("keep.txt"), b"x").unwrap();

    let removed = fixture
        .pipeline()
        .sweep_scratch(&["gif".to_string(), "webp".to_string()]);

    assert_eq!(removed, 2);
    assert_eq!(scratch_entries(&dir), vec![dir.join("keep.txt")]);
}
