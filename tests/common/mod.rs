//! Shared test harness for integration tests.
//!
//! Provides in-memory message media, a [`RecordingMessenger`] that captures
//! everything the pipeline sends, a font-independent [`BlockTypeface`], and
//! builders for small encoded images.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use stickerforge::compose::{Compositor, Typeface};
use stickerforge::config::FetchConfig;
use stickerforge::messaging::{Messenger, StickerMetadata};
use stickerforge::pipeline::StickerPipeline;
use stickerforge::resolver::{MediaAccessor, MediaResolver};
use stickerforge_av::{AnimatedTranscoder, ScratchDir};
use stickerforge_common::MediaBlob;

/// Solid block glyphs, each half an em wide with a one pixel gap either side.
pub struct BlockTypeface;

impl Typeface for BlockTypeface {
    fn measure(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * px * 0.5
    }

    fn rasterize(&self, text: &str, px: f32, origin: (f32, f32), plot: &mut dyn FnMut(i32, i32, f32)) {
        let advance = (px * 0.5) as i32;
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x0 = origin.0 as i32 + i as i32 * advance;
            for y in origin.1 as i32..(origin.1 + px) as i32 {
                for x in x0 + 1..x0 + advance - 1 {
                    plot(x, y, 1.0);
                }
            }
        }
    }
}

/// Message media held in memory. Counts how often it was downloaded.
#[derive(Clone)]
pub struct InMemoryMedia {
    blob: Option<MediaBlob>,
    downloads: Arc<AtomicUsize>,
}

impl InMemoryMedia {
    pub fn new(blob: MediaBlob) -> Self {
        Self {
            blob: Some(blob),
            downloads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A message that turns out to carry no media.
    pub fn empty() -> Self {
        Self {
            blob: None,
            downloads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaAccessor for InMemoryMedia {
    async fn download(&self) -> anyhow::Result<Option<MediaBlob>> {
        self.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(self.blob.clone())
    }
}

/// Message media whose download always fails.
pub struct BrokenMedia;

#[async_trait]
impl MediaAccessor for BrokenMedia {
    async fn download(&self) -> anyhow::Result<Option<MediaBlob>> {
        anyhow::bail!("media server unreachable")
    }
}

/// Captures stickers and replies instead of sending them.
#[derive(Default)]
pub struct RecordingMessenger {
    stickers: Mutex<Vec<(MediaBlob, StickerMetadata)>>,
    replies: Mutex<Vec<String>>,
    fail_stickers: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A messenger whose sticker sends are rejected by the transport.
    pub fn rejecting_stickers() -> Self {
        Self {
            fail_stickers: true,
            ..Self::default()
        }
    }

    pub fn stickers(&self) -> Vec<(MediaBlob, StickerMetadata)> {
        self.stickers.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_sticker(&self, media: &MediaBlob, metadata: &StickerMetadata) -> anyhow::Result<()> {
        if self.fail_stickers {
            anyhow::bail!("sticker upload rejected");
        }
        self.stickers
            .lock()
            .unwrap()
            .push((media.clone(), metadata.clone()));
        Ok(())
    }

    async fn reply(&self, text: &str) -> anyhow::Result<()> {
        self.replies.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

pub fn encode(img: &RgbaImage, format: ImageFormat) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    match format {
        ImageFormat::Jpeg => image::DynamicImage::ImageRgba8(img.clone())
            .to_rgb8()
            .write_to(&mut out, format)
            .unwrap(),
        _ => img.write_to(&mut out, format).unwrap(),
    }
    out.into_inner()
}

pub fn png_blob(width: u32, height: u32, color: Rgba<u8>) -> MediaBlob {
    let img = RgbaImage::from_pixel(width, height, color);
    MediaBlob::new(encode(&img, ImageFormat::Png), "image/png", "photo.png")
}

pub fn jpeg_blob(width: u32, height: u32) -> MediaBlob {
    let img = RgbaImage::from_pixel(width, height, Rgba([30, 90, 200, 255]));
    MediaBlob::new(encode(&img, ImageFormat::Jpeg), "image/jpeg", "photo.jpg")
}

/// Two-frame animated GIF.
pub fn gif_blob() -> MediaBlob {
    use image::codecs::gif::{GifEncoder, Repeat};
    use image::{Delay, Frame};

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder.set_repeat(Repeat::Infinite).unwrap();
        for color in [Rgba([255, 0, 0, 255]), Rgba([0, 0, 255, 255])] {
            let frame = Frame::from_parts(
                RgbaImage::from_pixel(32, 24, color),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            );
            encoder.encode_frame(frame).unwrap();
        }
    }
    MediaBlob::new(bytes, "image/gif", "party.gif")
}

pub fn video_blob() -> MediaBlob {
    MediaBlob::new(b"\x00\x00\x00\x18ftypmp42".to_vec(), "video/mp4", "clip.mp4")
}

/// Copies the `-i` argument to the last argument, like a no-op encoder.
pub const COPY_ENCODER: &str = r#"#!/bin/sh
in=""
while [ "$#" -gt 1 ]; do
  if [ "$1" = "-i" ]; then in="$2"; fi
  shift
done
cp "$in" "$1"
"#;

pub const FAILING_ENCODER: &str = r#"#!/bin/sh
echo "Unknown encoder 'libwebp'" >&2
exit 1
"#;

#[cfg(unix)]
pub fn write_encoder(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg");
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

pub fn metadata() -> StickerMetadata {
    StickerMetadata {
        author: "Test Author".to_string(),
        pack_name: "Test Pack".to_string(),
    }
}

/// A pipeline with block glyphs, the given encoder, and scratch under `scratch_dir`.
pub fn pipeline(encoder: PathBuf, scratch_dir: &Path) -> StickerPipeline {
    let scratch = Arc::new(ScratchDir::new(scratch_dir));
    StickerPipeline::new(
        MediaResolver::new(&FetchConfig::default()),
        Some(Compositor::new(Arc::new(BlockTypeface))),
        AnimatedTranscoder::new(encoder, scratch),
        metadata(),
    )
}

pub fn scratch_entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}
