//! Typeface seam between layout and glyph rasterization.

use std::fmt;
use std::path::{Path, PathBuf};

use rusttype::{point, Font, Scale};

use super::ComposeError;

/// Bold sans faces tried, in order, when no font is configured.
pub const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/msttcorefonts/Impact.ttf",
    "/Library/Fonts/Impact.ttf",
    "/System/Library/Fonts/Supplemental/Impact.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\impact.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Measures and rasterizes single lines of text.
///
/// A line box is `px` pixels tall; `rasterize` places the box's top-left
/// corner at `origin` and reports each covered pixel through `plot`.
pub trait Typeface: Send + Sync {
    /// Horizontal advance of `text` at size `px`.
    fn measure(&self, text: &str, px: f32) -> f32;

    fn rasterize(&self, text: &str, px: f32, origin: (f32, f32), plot: &mut dyn FnMut(i32, i32, f32));
}

/// A TrueType/OpenType face loaded through rusttype.
pub struct FontTypeface {
    font: Font<'static>,
    source: String,
}

impl fmt::Debug for FontTypeface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontTypeface")
            .field("source", &self.source)
            .finish()
    }
}

impl FontTypeface {
    pub fn from_bytes(bytes: Vec<u8>, source: impl Into<String>) -> Result<Self, ComposeError> {
        let source = source.into();
        let font = Font::try_from_vec(bytes).ok_or_else(|| ComposeError::InvalidFont {
            source_name: source.clone(),
        })?;
        Ok(Self { font, source })
    }

    pub fn load(path: &Path) -> Result<Self, ComposeError> {
        let bytes = std::fs::read(path).map_err(|e| ComposeError::FontIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_bytes(bytes, path.display().to_string())
    }

    /// Load the configured font, or the first usable well-known face.
    pub fn discover(configured: Option<&Path>) -> Result<Self, ComposeError> {
        if let Some(path) = configured {
            return Self::load(path);
        }

        let mut searched = Vec::with_capacity(FONT_CANDIDATES.len());
        for candidate in FONT_CANDIDATES {
            let path = PathBuf::from(candidate);
            if path.is_file() {
                match Self::load(&path) {
                    Ok(face) => {
                        tracing::debug!("Using font {}", path.display());
                        return Ok(face);
                    }
                    Err(e) => tracing::warn!("Skipping font {}: {}", path.display(), e),
                }
            }
            searched.push(path);
        }

        Err(ComposeError::NoFont { searched })
    }

    /// Where the face was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Typeface for FontTypeface {
    fn measure(&self, text: &str, px: f32) -> f32 {
        let scale = Scale::uniform(px);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn rasterize(&self, text: &str, px: f32, origin: (f32, f32), plot: &mut dyn FnMut(i32, i32, f32)) {
        let scale = Scale::uniform(px);
        let ascent = self.font.v_metrics(scale).ascent;
        let baseline = point(origin.0, origin.1 + ascent);

        for glyph in self.font.layout(text, scale, baseline) {
            if let Some(bb) = glyph.pixel_bounding_box() {
                glyph.draw(|gx, gy, coverage| {
                    plot(bb.min.x + gx as i32, bb.min.y + gy as i32, coverage);
                });
            }
        }
    }
}
