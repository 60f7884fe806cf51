//! Text compositing for static images.
//!
//! The [`Compositor`] decodes a still image, lays out the directive's text
//! with a [`Typeface`], strokes every line in black and fills it with the
//! requested color, then re-encodes the result as PNG.

pub mod layout;
pub mod paint;
pub mod typeface;

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::{ImageFormat, RgbaImage};
use stickerforge_common::media::PNG_MIME;
use stickerforge_common::MediaBlob;

use crate::directive::StyleDirective;

pub use layout::{layout_text, PlacedLine, TextLayout};
pub use paint::{parse_color, CoverageMask};
pub use typeface::{FontTypeface, Typeface};

/// Name given to composited stickers.
pub const COMPOSED_FILE_NAME: &str = "sticker_with_text.png";

/// Errors raised while compositing.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("no usable font found (searched {} locations)", searched.len())]
    NoFont { searched: Vec<PathBuf> },

    #[error("failed to read font {}: {source}", path.display())]
    FontIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{source_name} is not a valid font")]
    InvalidFont { source_name: String },

    #[error("text overlays are unavailable: no font configured or found")]
    Unavailable,

    #[error("compositing task failed: {0}")]
    Task(String),
}

impl ComposeError {
    /// Message for the chat user.
    pub fn user_message(&self) -> String {
        match self {
            ComposeError::Decode(_) => {
                "Sorry, I couldn't read that image. Is it a valid picture?".to_string()
            }
            other => format!(
                "Sorry, I couldn't add text to that image. (Details: {})",
                other
            ),
        }
    }
}

/// Overlays caption text onto still images.
#[derive(Clone)]
pub struct Compositor {
    face: Arc<dyn Typeface>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor").finish_non_exhaustive()
    }
}

impl Compositor {
    pub fn new(face: Arc<dyn Typeface>) -> Self {
        Self { face }
    }

    /// Draw the directive's text onto `canvas` in place.
    pub fn draw(&self, canvas: &mut RgbaImage, directive: &StyleDirective) -> TextLayout {
        let (width, height) = canvas.dimensions();
        let layout = layout_text(self.face.as_ref(), directive, width, height);

        let mut fill = CoverageMask::new(width, height);
        for line in &layout.lines {
            self.face.rasterize(
                &line.text,
                layout.font_size,
                (line.left, line.top),
                &mut |x, y, c| fill.plot(x, y, c),
            );
        }

        let radius = (layout.outline_width / 2.0).round().max(1.0) as u32;
        let outline = fill.dilate(radius);

        outline.paint_onto(canvas, paint::OUTLINE_COLOR);
        fill.paint_onto(canvas, paint::fill_color(&directive.color));

        layout
    }

    /// Composite the directive's text onto an encoded still image.
    ///
    /// The result is always a PNG named [`COMPOSED_FILE_NAME`] with the
    /// source's dimensions.
    pub fn compose(&self, source: &MediaBlob, directive: &StyleDirective) -> Result<MediaBlob, ComposeError> {
        let decoded = image::load_from_memory(source.bytes()).map_err(ComposeError::Decode)?;
        let mut canvas = decoded.to_rgba8();

        let layout = self.draw(&mut canvas, directive);
        tracing::debug!(
            "Composited {} line(s) at {}px onto {}x{} {}",
            layout.lines.len(),
            layout.font_size,
            canvas.width(),
            canvas.height(),
            source.mime_type()
        );

        let mut encoded = Cursor::new(Vec::new());
        canvas
            .write_to(&mut encoded, ImageFormat::Png)
            .map_err(ComposeError::Encode)?;

        Ok(MediaBlob::new(
            encoded.into_inner(),
            PNG_MIME,
            COMPOSED_FILE_NAME,
        ))
    }
}
