use glam::Vec2;

use crate::glyph::glyph_bits;

pub type Color = [f32; 4];

pub const BLACK: Color = [0.0, 0.0, 0.0, 1.0];
pub const WHITE: Color = [1.0, 1.0, 1.0, 1.0];
/// `#00DCFF`, the highlight for particles pushed by the pointer.
pub const SCATTER_CYAN: Color = [0.0, 220.0 / 255.0, 1.0, 1.0];

/// GPU-aligned quad instance, uploaded to the instance buffer as-is
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadInstance {
    pub position: [f32; 2], // Top-left corner in pixels
    pub size: [f32; 2],     // Width, height in pixels
    pub color: [f32; 4],    // RGBA color
}

impl QuadInstance {
    pub fn new(rect: Rect, color: Color) -> Self {
        Self {
            position: [rect.x, rect.y],
            size: [rect.w, rect.h],
            color,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position[0], self.position[1], self.size[0], self.size[1])
    }
}

/// Axis-aligned rectangle in pixels, origin at the top-left.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Shrink by `amount` on every side, never below zero size.
    pub fn inset(&self, amount: f32) -> Rect {
        let w = (self.w - amount * 2.0).max(0.0);
        let h = (self.h - amount * 2.0).max(0.0);
        Rect::new(self.x + (self.w - w) / 2.0, self.y + (self.h - h) / 2.0, w, h)
    }

    /// Scale about an arbitrary anchor point.
    pub fn scaled_about(&self, anchor: Vec2, scale: f32) -> Rect {
        let origin = anchor + (self.origin() - anchor) * scale;
        Rect::new(origin.x, origin.y, self.w * scale, self.h * scale)
    }

    pub fn scaled_about_center(&self, scale: f32) -> Rect {
        self.scaled_about(self.center(), scale)
    }

    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        let rect = Rect::new(x0, y0, x1 - x0, y1 - y0);
        (!rect.is_empty()).then_some(rect)
    }
}

/// CPU-side draw list standing in for a 2D canvas.
///
/// Engines draw into their own canvas in local pixel coordinates; the page
/// composes canvases into one frame with [`Canvas::compose`]. Every call that
/// changes the contents bumps a mutation counter.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: f32,
    height: f32,
    quads: Vec<QuadInstance>,
    mutations: u64,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            quads: Vec::new(),
            mutations: 0,
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.clear();
    }

    pub fn clear(&mut self) {
        self.quads.clear();
        self.mutations += 1;
    }

    /// Clear, then cover the whole canvas with `color`.
    pub fn fill_background(&mut self, color: Color) {
        self.clear();
        self.fill_rect(self.bounds(), color);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        self.quads.push(QuadInstance::new(rect, color));
        self.mutations += 1;
    }

    pub fn fill_rect_clipped(&mut self, rect: Rect, color: Color, clip: &Rect) {
        if let Some(rect) = rect.intersect(clip) {
            self.fill_rect(rect, color);
        }
    }

    /// Draw `text` with the 8x8 bitmap font, each font cell `cell` pixels wide.
    /// Horizontal runs of lit cells collapse into one quad.
    pub fn fill_text(&mut self, text: &str, origin: Vec2, cell: f32, color: Color, clip: &Rect) {
        for (index, ch) in text.chars().enumerate() {
            let glyph_x = origin.x + index as f32 * 8.0 * cell;
            for (row, &bits) in glyph_bits(ch).iter().enumerate() {
                let y = origin.y + row as f32 * cell;
                let mut run_start: Option<u32> = None;
                for bit in 0..=8u32 {
                    let lit = bit < 8 && (bits >> bit) & 0x01 == 1;
                    match (lit, run_start) {
                        (true, None) => run_start = Some(bit),
                        (false, Some(start)) => {
                            let rect = Rect::new(
                                glyph_x + start as f32 * cell,
                                y,
                                (bit - start) as f32 * cell,
                                cell,
                            );
                            self.fill_rect_clipped(rect, color, clip);
                            run_start = None;
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Append `other`'s quads mapped by `local * scale + origin`, clipped.
    pub fn compose(&mut self, other: &Canvas, origin: Vec2, scale: f32, clip: &Rect) {
        for quad in &other.quads {
            let local = quad.rect();
            let mapped = Rect::new(
                origin.x + local.x * scale,
                origin.y + local.y * scale,
                local.w * scale,
                local.h * scale,
            );
            self.fill_rect_clipped(mapped, quad.color, clip);
        }
    }

    pub fn quads(&self) -> &[QuadInstance] {
        &self.quads
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    pub fn mutations(&self) -> u64 {
        self.mutations
    }

    /// Instances as a byte slice for GPU upload (zero-copy)
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.quads)
    }
}

/// Pixel width of `text` drawn with [`Canvas::fill_text`].
pub fn text_width(text: &str, cell: f32) -> f32 {
    text.chars().count() as f32 * 8.0 * cell
}
