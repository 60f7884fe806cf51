//! Color parsing and coverage-mask painting.

use image::{Rgba, RgbaImage};

/// Outline color drawn under every line of text.
pub const OUTLINE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fallback fill for colors the renderer cannot interpret.
pub const FALLBACK_FILL: Rgba<u8> = Rgba([255, 255, 255, 255]);

const NAMED_COLORS: &[(&str, [u8; 4])] = &[
    ("white", [255, 255, 255, 255]),
    ("black", [0, 0, 0, 255]),
    ("red", [255, 0, 0, 255]),
    ("green", [0, 128, 0, 255]),
    ("lime", [0, 255, 0, 255]),
    ("blue", [0, 0, 255, 255]),
    ("navy", [0, 0, 128, 255]),
    ("yellow", [255, 255, 0, 255]),
    ("orange", [255, 165, 0, 255]),
    ("purple", [128, 0, 128, 255]),
    ("pink", [255, 192, 203, 255]),
    ("magenta", [255, 0, 255, 255]),
    ("fuchsia", [255, 0, 255, 255]),
    ("cyan", [0, 255, 255, 255]),
    ("aqua", [0, 255, 255, 255]),
    ("teal", [0, 128, 128, 255]),
    ("brown", [165, 42, 42, 255]),
    ("gold", [255, 215, 0, 255]),
    ("silver", [192, 192, 192, 255]),
    ("gray", [128, 128, 128, 255]),
    ("grey", [128, 128, 128, 255]),
];

/// Parse a named color or a `#rgb`, `#rrggbb`, `#rrggbbaa` hex value.
pub fn parse_color(value: &str) -> Option<Rgba<u8>> {
    let value = value.trim().to_lowercase();

    if let Some(hex_digits) = value.strip_prefix('#') {
        return parse_hex(hex_digits);
    }

    NAMED_COLORS
        .iter()
        .find(|(name, _)| *name == value)
        .map(|(_, rgba)| Rgba(*rgba))
}

fn parse_hex(digits: &str) -> Option<Rgba<u8>> {
    let expanded: String = match digits.len() {
        3 | 4 => digits.chars().flat_map(|c| [c, c]).collect(),
        6 | 8 => digits.to_string(),
        _ => return None,
    };

    let bytes = hex::decode(expanded).ok()?;
    let alpha = bytes.get(3).copied().unwrap_or(255);
    Some(Rgba([bytes[0], bytes[1], bytes[2], alpha]))
}

/// Resolve a fill color, falling back to white.
pub fn fill_color(value: &str) -> Rgba<u8> {
    parse_color(value).unwrap_or_else(|| {
        tracing::warn!("Unrecognized color {:?}, using white", value);
        FALLBACK_FILL
    })
}

/// Per-pixel glyph coverage over a whole canvas.
///
/// Tracks the bounding box of touched pixels so dilation and painting only
/// visit the region that holds text.
#[derive(Debug, Clone)]
pub struct CoverageMask {
    width: u32,
    height: u32,
    data: Vec<f32>,
    bounds: Option<Bounds>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Bounds {
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl CoverageMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
            bounds: None,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage at a pixel, zero outside the canvas.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.data[self.index(x, y)]
    }

    /// Whether nothing has been plotted.
    pub fn is_blank(&self) -> bool {
        self.bounds.is_none()
    }

    /// Record coverage at a pixel. Off-canvas pixels are clipped; overlapping
    /// glyphs keep the strongest coverage.
    pub fn plot(&mut self, x: i32, y: i32, coverage: f32) {
        if x < 0 || y < 0 || coverage <= 0.0 {
            return;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return;
        }

        let idx = self.index(x, y);
        self.data[idx] = self.data[idx].max(coverage.min(1.0));

        self.bounds = Some(match self.bounds {
            None => Bounds {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            },
            Some(b) => Bounds {
                min_x: b.min_x.min(x),
                min_y: b.min_y.min(y),
                max_x: b.max_x.max(x),
                max_y: b.max_y.max(y),
            },
        });
    }

    /// Grow coverage outward by `radius` pixels, as a square max filter.
    pub fn dilate(&self, radius: u32) -> CoverageMask {
        let Some(b) = self.bounds else {
            return self.clone();
        };
        if radius == 0 {
            return self.clone();
        }

        let grown = Bounds {
            min_x: b.min_x.saturating_sub(radius),
            min_y: b.min_y.saturating_sub(radius),
            max_x: (b.max_x + radius).min(self.width - 1),
            max_y: (b.max_y + radius).min(self.height - 1),
        };
        let r = radius as i64;

        // Horizontal pass.
        let mut horizontal = CoverageMask::new(self.width, self.height);
        for y in b.min_y..=b.max_y {
            for x in grown.min_x..=grown.max_x {
                let lo = (x as i64 - r).max(b.min_x as i64) as u32;
                let hi = (x as i64 + r).min(b.max_x as i64);
                if (lo as i64) > hi {
                    continue;
                }
                let peak = (lo..=hi as u32)
                    .map(|sx| self.get(sx, y))
                    .fold(0.0f32, f32::max);
                let idx = horizontal.index(x, y);
                horizontal.data[idx] = peak;
            }
        }

        // Vertical pass.
        let mut out = CoverageMask::new(self.width, self.height);
        for y in grown.min_y..=grown.max_y {
            let lo = (y as i64 - r).max(b.min_y as i64) as u32;
            let hi = (y as i64 + r).min(b.max_y as i64);
            if (lo as i64) > hi {
                continue;
            }
            for x in grown.min_x..=grown.max_x {
                let peak = (lo..=hi as u32)
                    .map(|sy| horizontal.get(x, sy))
                    .fold(0.0f32, f32::max);
                let idx = out.index(x, y);
                out.data[idx] = peak;
            }
        }
        out.bounds = Some(grown);
        out
    }

    /// Blend `color` onto `canvas`, weighted by coverage.
    pub fn paint_onto(&self, canvas: &mut RgbaImage, color: Rgba<u8>) {
        let Some(b) = self.bounds else {
            return;
        };
        let max_x = b.max_x.min(canvas.width().saturating_sub(1));
        let max_y = b.max_y.min(canvas.height().saturating_sub(1));

        for y in b.min_y..=max_y {
            for x in b.min_x..=max_x {
                let coverage = self.get(x, y);
                if coverage > 0.0 {
                    let dst = canvas.get_pixel_mut(x, y);
                    *dst = blend_over(*dst, color, coverage);
                }
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Source-over compositing of `src` (scaled by `coverage`) onto `dst`.
pub fn blend_over(dst: Rgba<u8>, src: Rgba<u8>, coverage: f32) -> Rgba<u8> {
    let sa = (src[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= f32::EPSILON {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |i: usize| {
        let sc = src[i] as f32;
        let dc = dst[i] as f32;
        ((sc * sa + dc * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(0),
        channel(1),
        channel(2),
        (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
    ])
}
