use std::f32::consts::{PI, TAU};

use font8x8::legacy::BASIC_LEGACY;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Pixels with alpha strictly above this value count as part of the glyph.
pub const OPAQUE_THRESHOLD: u8 = 128;

/// Logo height when no explicit size is given.
const DEFAULT_LOGO_HEIGHT: f32 = 120.0;
/// Logo height on narrow viewports.
const COMPACT_LOGO_HEIGHT: f32 = 60.0;
/// Viewports narrower than this use the compact logo height.
pub const COMPACT_VIEWPORT_WIDTH: f32 = 768.0;
/// Side of the monogram canvas when no explicit size is given.
const DEFAULT_MONOGRAM_CANVAS: f32 = 200.0;

/// Which logo the particle renderer traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogoVariant {
    /// "nucleus" wordmark with the broken ring around the first letter
    #[default]
    Full,
    /// Single "n" with its ring
    #[serde(rename = "n", alias = "monogram")]
    Monogram,
}

/// Angular opening in the ring around the first letter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGap {
    pub center: f32,
    pub half_width: f32,
}

impl RingGap {
    pub fn contains(&self, angle: f32) -> bool {
        let delta = (angle - self.center).rem_euclid(TAU);
        delta.min(TAU - delta) <= self.half_width
    }
}

/// Every constant that differs between the two logo variants.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantConfig {
    pub text: &'static str,
    /// Logo width as a multiple of logo height
    pub width_ratio: f32,
    /// An explicit size override is divided by this to get the logo height
    pub size_divisor: f32,
    /// Extra upward shift of the whole logo, in logo heights
    pub vertical_lift: f32,
    pub text_x_ratio: f32,
    pub baseline_ratio: f32,
    pub font_ratio: f32,
    /// Ring center offset from the text origin, in font sizes (right, up)
    pub ring_offset: Vec2,
    pub ring_radius_ratio: f32,
    pub ring_stroke_ratio: f32,
    pub gaps: &'static [RingGap],
    /// The indicator dot sits on the ring at this angle
    pub dot_angle: f32,
    pub dot_radius_ratio: f32,
    pub particle_budget: usize,
    /// Canvas area the budget is calibrated for; `None` means the canvas itself
    pub reference_size: Option<Vec2>,
    pub interaction_radius: f32,
    pub push_strength: f32,
}

const FULL_GAPS: [RingGap; 2] = [
    RingGap { center: PI * 1.25, half_width: PI * 0.08 },
    RingGap { center: 0.0, half_width: PI * 0.24 },
];

const MONOGRAM_GAPS: [RingGap; 1] = [RingGap { center: PI * 1.25, half_width: PI * 0.15 }];

static FULL: VariantConfig = VariantConfig {
    text: "nucleus",
    width_ratio: 3.2,
    size_divisor: 1.5,
    vertical_lift: 0.8,
    text_x_ratio: 0.7,
    baseline_ratio: 0.9,
    font_ratio: 0.5,
    ring_offset: Vec2::new(0.3, 0.27),
    ring_radius_ratio: 0.6,
    ring_stroke_ratio: 0.05,
    gaps: &FULL_GAPS,
    dot_angle: PI * 1.25,
    dot_radius_ratio: 0.08,
    particle_budget: 7000,
    reference_size: Some(Vec2::new(1920.0, 1080.0)),
    interaction_radius: 240.0,
    push_strength: 60.0,
};

static MONOGRAM: VariantConfig = VariantConfig {
    text: "n",
    width_ratio: 1.0,
    size_divisor: 3.0,
    vertical_lift: 0.0,
    text_x_ratio: 0.2,
    baseline_ratio: 0.9,
    font_ratio: 0.5,
    ring_offset: Vec2::new(0.3, 0.27),
    ring_radius_ratio: 0.6,
    ring_stroke_ratio: 0.05,
    gaps: &MONOGRAM_GAPS,
    dot_angle: PI * 1.25,
    dot_radius_ratio: 0.08,
    particle_budget: 2000,
    reference_size: None,
    interaction_radius: 100.0,
    push_strength: 30.0,
};

impl LogoVariant {
    pub fn config(self) -> &'static VariantConfig {
        match self {
            LogoVariant::Full => &FULL,
            LogoVariant::Monogram => &MONOGRAM,
        }
    }

    pub fn logo_height(self, size_override: Option<f32>, compact: bool) -> f32 {
        match size_override {
            Some(size) => size / self.config().size_divisor,
            None if compact => COMPACT_LOGO_HEIGHT,
            None => DEFAULT_LOGO_HEIGHT,
        }
    }

    /// Canvas dimensions for a host viewport. The wordmark fills the
    /// viewport; the monogram gets a square of its own.
    pub fn canvas_size(self, viewport: Vec2, size_override: Option<f32>) -> (u32, u32) {
        let (width, height) = match self {
            LogoVariant::Full => (size_override.unwrap_or(viewport.x), viewport.y),
            LogoVariant::Monogram => {
                let side = size_override.unwrap_or(DEFAULT_MONOGRAM_CANVAS);
                (side, side)
            }
        };
        (width.max(1.0).round() as u32, height.max(1.0).round() as u32)
    }
}

/// Options that, together with the canvas size, fully determine the raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphOptions {
    pub variant: LogoVariant,
    pub size_override: Option<f32>,
    pub compact: bool,
}

/// Resolved drawing geometry of a logo on a given canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphLayout {
    pub text_origin: Vec2,
    pub font_size: f32,
    pub ring_center: Vec2,
    pub ring_radius: f32,
    pub ring_stroke: f32,
    pub dot_center: Vec2,
    pub dot_radius: f32,
}

impl GlyphLayout {
    pub fn new(options: &GlyphOptions, width: u32, height: u32) -> Self {
        let config = options.variant.config();
        let logo_height = options.variant.logo_height(options.size_override, options.compact);
        let logo_width = logo_height * config.width_ratio;

        let translate = Vec2::new(
            width as f32 / 2.0 - logo_width / 2.0,
            height as f32 / 2.0 - logo_height / 2.0 - logo_height * config.vertical_lift,
        );

        let font_size = logo_height * config.font_ratio;
        let text_origin = translate
            + Vec2::new(logo_height * config.text_x_ratio, logo_height * config.baseline_ratio);
        let ring_center = text_origin
            + Vec2::new(font_size * config.ring_offset.x, -font_size * config.ring_offset.y);
        let ring_radius = font_size * config.ring_radius_ratio;
        let dot_center =
            ring_center + Vec2::new(config.dot_angle.cos(), config.dot_angle.sin()) * ring_radius;

        Self {
            text_origin,
            font_size,
            ring_center,
            ring_radius,
            ring_stroke: font_size * config.ring_stroke_ratio,
            dot_center,
            dot_radius: font_size * config.dot_radius_ratio,
        }
    }
}

/// Offscreen alpha raster of the logo. Only used to pick particle anchors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphBitmap {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl GlyphBitmap {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width as usize * height as usize],
        }
    }

    #[cfg(test)]
    pub(crate) fn solid(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            alpha: vec![255; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha[(y * self.width + x) as usize]
    }

    pub fn is_opaque(&self, x: u32, y: u32) -> bool {
        self.alpha_at(x, y) > OPAQUE_THRESHOLD
    }

    pub fn opaque_count(&self) -> usize {
        self.alpha.iter().filter(|&&a| a > OPAQUE_THRESHOLD).count()
    }

    /// Set every pixel whose center lies in the box to opaque, if `inside` agrees.
    fn paint_box<F>(&mut self, min: Vec2, max: Vec2, inside: F)
    where
        F: Fn(Vec2) -> bool,
    {
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as u32).min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                let sample = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                if inside(sample) {
                    self.alpha[(y * self.width + x) as usize] = 255;
                }
            }
        }
    }
}

/// 8x8 bitmap for a character, bit 0 being the leftmost column.
pub fn glyph_bits(ch: char) -> [u8; 8] {
    let index = ch as usize;
    if index < BASIC_LEGACY.len() {
        BASIC_LEGACY[index]
    } else {
        BASIC_LEGACY[b'?' as usize]
    }
}

/// Letter pitch in ems. The bitmap cells are condensed so six lit columns and
/// one column of spacing fit in it.
const LETTER_ADVANCE: f32 = 0.55;

/// Draw the logo into a fresh alpha raster of `width` x `height`.
///
/// The result depends only on the arguments. The letters come from the 8x8
/// bitmap font scaled so one em equals the font size vertically, with the
/// baseline under the seventh row; the ring is a stroked circle with the variant's gaps cut
/// out, plus the filled indicator dot.
pub fn rasterize_glyph(options: &GlyphOptions, width: u32, height: u32) -> GlyphBitmap {
    let config = options.variant.config();
    let layout = GlyphLayout::new(options, width, height);
    let mut bitmap = GlyphBitmap::empty(width, height);

    // Letters
    let cell = layout.font_size / 8.0;
    let advance = layout.font_size * LETTER_ADVANCE;
    let column_width = advance / 7.0;
    let top = layout.text_origin.y - 7.0 * cell;
    for (index, ch) in config.text.chars().enumerate() {
        let glyph_x = layout.text_origin.x + index as f32 * advance;
        for (row, &bits) in glyph_bits(ch).iter().enumerate() {
            for column in 0..8u32 {
                if (bits >> column) & 0x01 == 0 {
                    continue;
                }
                let min = Vec2::new(
                    glyph_x + column as f32 * column_width,
                    top + row as f32 * cell,
                );
                let max = min + Vec2::new(column_width, cell);
                bitmap.paint_box(min, max, |p| p.cmpge(min).all() && p.cmplt(max).all());
            }
        }
    }

    // Ring
    let half_stroke = layout.ring_stroke / 2.0;
    let reach = Vec2::splat(layout.ring_radius + half_stroke);
    bitmap.paint_box(layout.ring_center - reach, layout.ring_center + reach, |p| {
        let offset = p - layout.ring_center;
        if (offset.length() - layout.ring_radius).abs() > half_stroke {
            return false;
        }
        let angle = offset.y.atan2(offset.x).rem_euclid(TAU);
        !config.gaps.iter().any(|gap| gap.contains(angle))
    });

    // Indicator dot
    let dot_reach = Vec2::splat(layout.dot_radius);
    bitmap.paint_box(layout.dot_center - dot_reach, layout.dot_center + dot_reach, |p| {
        p.distance(layout.dot_center) <= layout.dot_radius
    });

    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(variant: LogoVariant) -> GlyphOptions {
        GlyphOptions {
            variant,
            size_override: None,
            compact: false,
        }
    }

    #[test]
    fn test_rasterize_is_deterministic() {
        let a = rasterize_glyph(&options(LogoVariant::Full), 800, 600);
        let b = rasterize_glyph(&options(LogoVariant::Full), 800, 600);
        assert_eq!(a, b);
        assert!(a.opaque_count() > 0);
    }

    #[test]
    fn test_variants_differ() {
        let full = rasterize_glyph(&options(LogoVariant::Full), 400, 400);
        let mono = rasterize_glyph(&options(LogoVariant::Monogram), 400, 400);
        assert_ne!(full, mono);
        assert!(full.opaque_count() > mono.opaque_count());
    }

    #[test]
    fn test_wordmark_sits_inside_logo_box() {
        let opts = options(LogoVariant::Full);
        let bitmap = rasterize_glyph(&opts, 1280, 720);
        let logo_width = LogoVariant::Full.logo_height(None, false) * FULL.width_ratio;
        let (left, right) = (640.0 - logo_width / 2.0, 640.0 + logo_width / 2.0);

        let lit: Vec<u32> = (0..bitmap.height())
            .flat_map(|y| (0..bitmap.width()).map(move |x| (x, y)))
            .filter(|&(x, y)| bitmap.is_opaque(x, y))
            .map(|(x, _)| x)
            .collect();
        let min = *lit.iter().min().unwrap() as f32;
        let max = *lit.iter().max().unwrap() as f32 + 1.0;
        assert!(min >= left && max <= right, "{}..{} outside {}..{}", min, max, left, right);
        assert!(((min + max) / 2.0 - 640.0).abs() < 20.0);
    }

    #[test]
    fn test_bitmap_matches_canvas_size() {
        let bitmap = rasterize_glyph(&options(LogoVariant::Monogram), 200, 200);
        assert_eq!((bitmap.width(), bitmap.height()), (200, 200));
        assert_eq!(bitmap.alpha_at(500, 500), 0);
    }

    #[test]
    fn test_ring_gap_is_left_open() {
        let opts = options(LogoVariant::Full);
        let bitmap = rasterize_glyph(&opts, 1200, 800);
        let layout = GlyphLayout::new(&opts, 1200, 800);
        // Angle 0 sits in the middle of the large gap; the opposite side is solid.
        let open = layout.ring_center + Vec2::new(layout.ring_radius, 0.0);
        let solid = layout.ring_center + Vec2::new(0.0, layout.ring_radius);
        assert!(!bitmap.is_opaque(open.x as u32, open.y as u32));
        assert!(bitmap.is_opaque(solid.x as u32, solid.y as u32));
    }

    #[test]
    fn test_dot_is_filled() {
        let opts = options(LogoVariant::Monogram);
        let bitmap = rasterize_glyph(&opts, 200, 200);
        let layout = GlyphLayout::new(&opts, 200, 200);
        assert!(bitmap.is_opaque(layout.dot_center.x as u32, layout.dot_center.y as u32));
    }

    #[test]
    fn test_logo_height_rules() {
        assert_eq!(LogoVariant::Full.logo_height(None, false), 120.0);
        assert_eq!(LogoVariant::Full.logo_height(None, true), 60.0);
        assert_eq!(LogoVariant::Full.logo_height(Some(300.0), true), 200.0);
        assert_eq!(LogoVariant::Monogram.logo_height(Some(32.0), false), 32.0 / 3.0);
    }

    #[test]
    fn test_canvas_size_per_variant() {
        let viewport = Vec2::new(1280.0, 720.0);
        assert_eq!(LogoVariant::Full.canvas_size(viewport, None), (1280, 720));
        assert_eq!(LogoVariant::Monogram.canvas_size(viewport, None), (200, 200));
        assert_eq!(LogoVariant::Monogram.canvas_size(viewport, Some(32.0)), (32, 32));
    }

    #[test]
    fn test_gap_wraps_around_zero() {
        let gap = RingGap { center: 0.0, half_width: 0.1 };
        assert!(gap.contains(0.05));
        assert!(gap.contains(TAU - 0.05));
        assert!(!gap.contains(PI));
    }

    #[test]
    fn test_variant_serde_names() {
        let v: LogoVariant = serde_json::from_str("\"n\"").unwrap();
        assert_eq!(v, LogoVariant::Monogram);
        let v: LogoVariant = serde_json::from_str("\"full\"").unwrap();
        assert_eq!(v, LogoVariant::Full);
    }
}
