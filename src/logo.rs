use glam::Vec2;
use log::info;
use serde::{Deserialize, Serialize};

use crate::canvas::{Canvas, Rect};
use crate::glyph::{GlyphOptions, LogoVariant, COMPACT_VIEWPORT_WIDTH};
use crate::input::{InputHub, PointerSample, SubscriptionId};
use crate::particle_system::ParticleSystem;
use crate::scheduler::{CancellationToken, FrameLoop};

/// Construction parameters of an animated logo.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LogoOptions {
    #[serde(default)]
    pub variant: LogoVariant,
    /// Explicit canvas size in pixels
    #[serde(default)]
    pub size: Option<f32>,
}

/// A mounted particle logo: simulation, its canvas, its frame loop and its
/// input subscription.
pub struct LogoAnimation {
    options: LogoOptions,
    system: ParticleSystem,
    canvas: Canvas,
    frame_loop: FrameLoop,
    subscription: Option<SubscriptionId>,
}

fn glyph_options(options: &LogoOptions, viewport: Vec2) -> GlyphOptions {
    GlyphOptions {
        variant: options.variant,
        size_override: options.size,
        compact: viewport.x < COMPACT_VIEWPORT_WIDTH,
    }
}

impl LogoAnimation {
    pub fn new(options: LogoOptions, viewport: Vec2) -> Self {
        let (width, height) = options.variant.canvas_size(viewport, options.size);
        let system = ParticleSystem::new(glyph_options(&options, viewport), width, height);
        Self::from_system(options, system)
    }

    pub fn with_seed(options: LogoOptions, viewport: Vec2, seed: u64) -> Self {
        let (width, height) = options.variant.canvas_size(viewport, options.size);
        let system =
            ParticleSystem::with_seed(glyph_options(&options, viewport), width, height, seed);
        Self::from_system(options, system)
    }

    fn from_system(options: LogoOptions, system: ParticleSystem) -> Self {
        // The glyph raster never reaches the visible canvas.
        let canvas = Canvas::new(system.width() as f32, system.height() as f32);
        Self {
            options,
            system,
            canvas,
            frame_loop: FrameLoop::new(),
            subscription: None,
        }
    }

    pub fn options(&self) -> &LogoOptions {
        &self.options
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_size(&self) -> Vec2 {
        Vec2::new(self.canvas.width(), self.canvas.height())
    }

    pub fn is_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription
    }

    /// Start animating and listen for pointer input over `region`.
    pub fn mount(&mut self, hub: &mut InputHub, region: Rect, scale: f32) -> CancellationToken {
        if self.subscription.is_none() {
            self.subscription = Some(hub.subscribe(region, scale));
        }
        info!("{:?} logo mounted", self.options.variant);
        self.start()
    }

    /// Cancel pending frames and drop the input subscription.
    pub fn unmount(&mut self, hub: &mut InputHub) {
        self.stop();
        if let Some(id) = self.subscription.take() {
            hub.unsubscribe(id);
        }
        info!("{:?} logo unmounted", self.options.variant);
    }

    pub fn start(&mut self) -> CancellationToken {
        self.frame_loop.start()
    }

    pub fn stop(&mut self) {
        self.frame_loop.stop();
    }

    /// Run one animation frame. A paused logo keeps its last drawing, or
    /// shows its resting pose if it has none yet.
    pub fn frame(&mut self, paused: bool) -> bool {
        let system = &mut self.system;
        let canvas = &mut self.canvas;
        self.frame_loop.run_frame(|| {
            if !paused {
                system.tick(canvas);
            } else if canvas.is_empty() {
                system.draw(canvas);
            }
        })
    }

    pub fn handle_pointer(&mut self, sample: &PointerSample) {
        if self.is_running() {
            self.system.handle_pointer(sample);
        }
    }

    /// Follow a new host viewport: rebuild glyph and pool when the canvas changes.
    pub fn resize(&mut self, viewport: Vec2) -> bool {
        let glyph = glyph_options(&self.options, viewport);
        let (width, height) = self.options.variant.canvas_size(viewport, self.options.size);
        let unchanged = width == self.system.width()
            && height == self.system.height()
            && glyph.compact == self.system.options().compact;
        if unchanged {
            return false;
        }
        self.system.resize(width, height, glyph.compact);
        self.canvas.resize(width as f32, height as f32);
        true
    }

    /// Where the canvas lands when fitted (contain, centered) into `rect`.
    pub fn placement(&self, rect: &Rect) -> (Vec2, f32) {
        let size = self.canvas_size();
        if size.x <= 0.0 || size.y <= 0.0 {
            return (rect.origin(), 1.0);
        }
        let scale = (rect.w / size.x).min(rect.h / size.y).max(0.0);
        let origin = rect.center() - size * scale / 2.0;
        (origin, scale)
    }

    pub fn update_region(&self, hub: &mut InputHub, rect: &Rect) {
        if let Some(id) = self.subscription {
            let (origin, scale) = self.placement(rect);
            let size = self.canvas_size() * scale;
            hub.update_region(id, Rect::new(origin.x, origin.y, size.x, size.y), scale);
        }
    }
}
