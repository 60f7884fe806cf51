//! Font sizing, word wrapping and line placement.

use crate::directive::{Anchor, StyleDirective};

use super::typeface::Typeface;

/// Smallest automatically derived font size.
pub const MIN_AUTO_FONT_SIZE: f32 = 20.0;
/// Auto font size is the image height divided by this.
pub const AUTO_FONT_DIVISOR: u32 = 12;
/// Share of the image width a line may occupy.
pub const WRAP_WIDTH_RATIO: f32 = 0.9;
/// Line pitch as a multiple of the font size.
pub const LINE_HEIGHT_RATIO: f32 = 1.2;
/// Gap above the first line of top-anchored text, in font sizes.
pub const TOP_MARGIN_RATIO: f32 = 1.2;
/// Gap below the last line of bottom-anchored text, in font sizes.
pub const BOTTOM_MARGIN_RATIO: f32 = 0.5;
/// Outline width is the font size divided by this, at least one pixel.
pub const OUTLINE_DIVISOR: f32 = 18.0;

/// One positioned line of text.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    /// Left edge of the line box.
    pub left: f32,
    /// Top edge of the line box.
    pub top: f32,
    pub width: f32,
}

/// Result of laying out overlay text on a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub font_size: f32,
    pub outline_width: f32,
    pub lines: Vec<PlacedLine>,
}

/// Explicit size if given, otherwise `max(20, floor(height / 12))`.
pub fn font_size_for(explicit: Option<u32>, image_height: u32) -> f32 {
    match explicit {
        Some(px) => px as f32,
        None => ((image_height / AUTO_FONT_DIVISOR) as f32).max(MIN_AUTO_FONT_SIZE),
    }
}

pub fn outline_width_for(font_size: f32) -> f32 {
    (font_size / OUTLINE_DIVISOR).max(1.0)
}

/// Greedy word wrap.
///
/// A word joins the current line while the joined line measures within
/// `max_width`. A single word wider than `max_width` gets a line of its own
/// and is not broken.
pub fn wrap_words(face: &dyn Typeface, text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", current, word);
        if face.measure(&candidate, font_size) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Top edge of each line box for `count` lines.
pub fn line_tops(anchor: Anchor, count: usize, font_size: f32, image_height: u32) -> Vec<f32> {
    let pitch = font_size * LINE_HEIGHT_RATIO;
    let height = image_height as f32;

    let first = match anchor {
        Anchor::Top => font_size * TOP_MARGIN_RATIO,
        Anchor::Center => {
            let block = count.saturating_sub(1) as f32 * pitch + font_size;
            (height - block) / 2.0
        }
        Anchor::Bottom => {
            let last = height - font_size * BOTTOM_MARGIN_RATIO - font_size;
            last - count.saturating_sub(1) as f32 * pitch
        }
    };

    (0..count).map(|i| first + i as f32 * pitch).collect()
}

/// Lay out the directive's text on a `width` x `height` canvas.
pub fn layout_text(face: &dyn Typeface, directive: &StyleDirective, width: u32, height: u32) -> TextLayout {
    let font_size = font_size_for(directive.font_size, height);
    let max_width = width as f32 * WRAP_WIDTH_RATIO;

    let wrapped = wrap_words(face, &directive.text, font_size, max_width);
    let tops = line_tops(directive.anchor, wrapped.len(), font_size, height);

    let lines = wrapped
        .into_iter()
        .zip(tops)
        .map(|(text, top)| {
            let line_width = face.measure(&text, font_size);
            PlacedLine {
                left: (width as f32 - line_width) / 2.0,
                top,
                width: line_width,
                text,
            }
        })
        .collect();

    TextLayout {
        font_size,
        outline_width: outline_width_for(font_size),
        lines,
    }
}
