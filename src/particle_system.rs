use std::ops::Range;

use glam::Vec2;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::canvas::{Canvas, Color, Rect, BLACK, SCATTER_CYAN, WHITE};
use crate::glyph::{rasterize_glyph, GlyphBitmap, GlyphOptions, VariantConfig};
use crate::input::{PointerSample, PointerState};

/// Random probes per spawn before giving up.
pub const SPAWN_ATTEMPTS: usize = 100;
/// Fraction of the remaining distance to its anchor a particle covers per tick.
const RELAX_RATE: f32 = 0.1;
pub const LIFE_RANGE: Range<u32> = 50..150;
const SIZE_RANGE: Range<f32> = 0.5..1.5;

/// A single animated point anchored to an opaque pixel of the glyph
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub base: Vec2, // Never moves after spawn
    pub size: f32,
    pub life: u32,
    pub color: Color,
    pub scattered_color: Color,
    pub scattered: bool,
}

impl Particle {
    pub fn current_color(&self) -> Color {
        if self.scattered {
            self.scattered_color
        } else {
            self.color
        }
    }
}

/// Particle cloud tracing a logo glyph.
///
/// Owns the glyph bitmap, the live pool and the pointer state; everything the
/// per-frame simulation reads lives here rather than in the caller.
pub struct ParticleSystem {
    options: GlyphOptions,
    bitmap: GlyphBitmap,
    particles: Vec<Particle>,
    pointer: PointerState,
    rng: StdRng,
}

impl ParticleSystem {
    /// Rasterize the glyph for a `width` x `height` canvas and seed a full pool.
    pub fn new(options: GlyphOptions, width: u32, height: u32) -> Self {
        Self::with_rng(options, width, height, StdRng::from_entropy())
    }

    /// Same as [`ParticleSystem::new`] with reproducible sampling.
    pub fn with_seed(options: GlyphOptions, width: u32, height: u32, seed: u64) -> Self {
        Self::with_rng(options, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(options: GlyphOptions, width: u32, height: u32, rng: StdRng) -> Self {
        let bitmap = rasterize_glyph(&options, width, height);
        let mut system = Self::from_bitmap(options, bitmap, rng);
        system.seed_pool(system.target_count());
        info!(
            "{:?} logo: {}x{} canvas, {} particles",
            options.variant,
            width,
            height,
            system.particles.len()
        );
        system
    }

    fn from_bitmap(options: GlyphOptions, bitmap: GlyphBitmap, rng: StdRng) -> Self {
        let center = Vec2::new(bitmap.width() as f32, bitmap.height() as f32) / 2.0;
        Self {
            options,
            bitmap,
            particles: Vec::new(),
            pointer: PointerState::centered(center),
            rng,
        }
    }

    pub fn config(&self) -> &'static VariantConfig {
        self.options.variant.config()
    }

    pub fn options(&self) -> &GlyphOptions {
        &self.options
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }

    pub fn canvas_center(&self) -> Vec2 {
        Vec2::new(self.width() as f32, self.height() as f32) / 2.0
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bitmap(&self) -> &GlyphBitmap {
        &self.bitmap
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    /// Pool size that keeps density constant relative to the variant's
    /// reference canvas.
    pub fn target_count(&self) -> usize {
        let config = self.config();
        let area = self.width() as f32 * self.height() as f32;
        let reference = config
            .reference_size
            .unwrap_or(Vec2::new(self.width() as f32, self.height() as f32));
        let reference_area = reference.x * reference.y;
        if reference_area <= 0.0 {
            return 0;
        }
        (config.particle_budget as f32 * (area / reference_area).sqrt()).floor() as usize
    }

    /// Rejection-sample an opaque pixel; `None` once the attempt budget is spent.
    pub fn spawn_particle(&mut self) -> Option<Particle> {
        let (width, height) = (self.bitmap.width(), self.bitmap.height());
        if width == 0 || height == 0 {
            return None;
        }
        for _ in 0..SPAWN_ATTEMPTS {
            let x = self.rng.gen_range(0..width);
            let y = self.rng.gen_range(0..height);
            if self.bitmap.is_opaque(x, y) {
                let anchor = Vec2::new(x as f32, y as f32);
                return Some(Particle {
                    position: anchor,
                    base: anchor,
                    size: self.rng.gen_range(SIZE_RANGE),
                    life: self.rng.gen_range(LIFE_RANGE),
                    color: WHITE,
                    scattered_color: SCATTER_CYAN,
                    scattered: false,
                });
            }
        }
        None
    }

    /// One spawn attempt per missing particle; failed attempts are dropped.
    pub fn seed_pool(&mut self, target: usize) {
        let missing = target.saturating_sub(self.particles.len());
        for _ in 0..missing {
            if let Some(particle) = self.spawn_particle() {
                self.particles.push(particle);
            }
        }
    }

    /// Feed a canvas-local pointer sample.
    pub fn handle_pointer(&mut self, sample: &PointerSample) {
        let center = self.canvas_center();
        self.pointer.apply(sample, center);
    }

    /// Advance every particle by one frame, then top the pool up.
    pub fn step(&mut self, pointer: Vec2, interacting: bool) {
        let config = self.config();
        let radius = config.interaction_radius;
        let strength = config.push_strength;

        let mut index = 0;
        while index < self.particles.len() {
            let particle = &mut self.particles[index];
            let delta = pointer - particle.position;
            let distance = delta.length();

            if interacting && distance < radius {
                let force = (radius - distance) / radius;
                let angle = delta.y.atan2(delta.x);
                let push = Vec2::new(angle.cos(), angle.sin()) * force * strength;
                particle.position = particle.base - push;
                particle.scattered = true;
            } else {
                particle.position += (particle.base - particle.position) * RELAX_RATE;
                particle.scattered = false;
            }

            particle.life = particle.life.saturating_sub(1);
            if particle.life == 0 {
                match self.spawn_particle() {
                    Some(fresh) => self.particles[index] = fresh,
                    None => {
                        self.particles.remove(index);
                        continue;
                    }
                }
            }
            index += 1;
        }

        // Recomputed every frame so density tracks the current canvas area.
        let target = self.target_count();
        self.seed_pool(target);
    }

    /// Paint the background and every particle as a filled square.
    pub fn draw(&self, canvas: &mut Canvas) {
        canvas.fill_background(BLACK);
        for particle in &self.particles {
            let rect = Rect::new(
                particle.position.x,
                particle.position.y,
                particle.size,
                particle.size,
            );
            canvas.fill_rect(rect, particle.current_color());
        }
    }

    /// Step with the tracked pointer, then draw.
    pub fn tick(&mut self, canvas: &mut Canvas) {
        let pointer = self.pointer;
        self.step(pointer.target(), pointer.is_interacting());
        self.draw(canvas);
    }

    /// Re-rasterize for the new canvas and replace the whole pool.
    pub fn resize(&mut self, width: u32, height: u32, compact: bool) {
        self.options.compact = compact;
        self.bitmap = rasterize_glyph(&self.options, width, height);
        self.particles.clear();
        self.pointer = PointerState::centered(self.canvas_center());
        self.seed_pool(self.target_count());
        debug!(
            "{:?} logo resized to {}x{}, reseeded {} particles",
            self.options.variant,
            width,
            height,
            self.particles.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::{LogoVariant, OPAQUE_THRESHOLD};

    fn options(variant: LogoVariant) -> GlyphOptions {
        GlyphOptions {
            variant,
            size_override: None,
            compact: false,
        }
    }

    fn solid_system(variant: LogoVariant, width: u32, height: u32) -> ParticleSystem {
        let bitmap = GlyphBitmap::solid(width, height);
        ParticleSystem::from_bitmap(options(variant), bitmap, StdRng::seed_from_u64(7))
    }

    #[test]
    fn test_spawn_only_on_opaque_pixels() {
        let mut system = ParticleSystem::with_seed(options(LogoVariant::Full), 800, 600, 1);
        for _ in 0..2000 {
            if let Some(p) = system.spawn_particle() {
                let alpha = system.bitmap().alpha_at(p.base.x as u32, p.base.y as u32);
                assert!(alpha > OPAQUE_THRESHOLD);
                assert!(LIFE_RANGE.contains(&p.life));
            }
        }
        for p in system.particles() {
            assert!(system.bitmap().is_opaque(p.base.x as u32, p.base.y as u32));
        }
    }

    #[test]
    fn test_spawn_gives_up_on_empty_glyph() {
        let bitmap = GlyphBitmap::empty(50, 50);
        let mut system = ParticleSystem::from_bitmap(
            options(LogoVariant::Monogram),
            bitmap,
            StdRng::seed_from_u64(3),
        );
        assert!(system.spawn_particle().is_none());
        system.seed_pool(500);
        assert!(system.particles().is_empty());
        // Top-up on an empty glyph must terminate too
        system.step(Vec2::ZERO, false);
        assert!(system.particles().is_empty());
    }

    #[test]
    fn test_target_count_scales_with_area() {
        let full = solid_system(LogoVariant::Full, 1920, 1080);
        assert_eq!(full.target_count(), 7000);
        let half = solid_system(LogoVariant::Full, 960, 540);
        assert_eq!(half.target_count(), 3500);
        let mono = solid_system(LogoVariant::Monogram, 32, 32);
        assert_eq!(mono.target_count(), 2000);
    }

    #[test]
    fn test_step_decrements_life_or_replaces() {
        let mut system = solid_system(LogoVariant::Monogram, 64, 64);
        system.seed_pool(system.target_count());
        system.particles[0].life = 1;
        let before: Vec<u32> = system.particles().iter().map(|p| p.life).collect();

        system.step(Vec2::new(32.0, 32.0), false);

        for (old, new) in before.iter().zip(system.particles()) {
            if *old == 1 {
                assert!(LIFE_RANGE.contains(&new.life));
            } else {
                assert_eq!(new.life, old - 1);
            }
        }
    }

    #[test]
    fn test_pointer_pushes_particle_away() {
        let mut system = solid_system(LogoVariant::Full, 500, 500);
        let anchor = Vec2::new(100.0, 100.0);
        system.particles.push(Particle {
            position: anchor,
            base: anchor,
            size: 1.0,
            life: 100,
            color: WHITE,
            scattered_color: SCATTER_CYAN,
            scattered: false,
        });

        system.step(Vec2::new(110.0, 100.0), true);
        let p = system.particles()[0];
        let expected = 100.0 - 60.0 * (230.0 / 240.0);
        assert!((p.position.x - expected).abs() < 1e-3);
        assert!((p.position.y - 100.0).abs() < 1e-3);
        assert!(p.scattered);
        assert_eq!(p.current_color(), SCATTER_CYAN);
    }

    #[test]
    fn test_particle_relaxes_without_interaction() {
        let mut system = solid_system(LogoVariant::Full, 500, 500);
        system.particles.push(Particle {
            position: Vec2::ZERO,
            base: Vec2::new(100.0, 50.0),
            size: 1.0,
            life: 100,
            color: WHITE,
            scattered_color: SCATTER_CYAN,
            scattered: true,
        });

        // Close to the pointer, but the pointer is not interacting
        system.step(Vec2::new(1.0, 1.0), false);
        let p = system.particles()[0];
        assert!((p.position - Vec2::new(10.0, 5.0)).length() < 1e-4);
        assert!(!p.scattered);
        assert_eq!(p.current_color(), WHITE);
    }

    #[test]
    fn test_step_tops_up_pool() {
        let mut system = solid_system(LogoVariant::Monogram, 40, 40);
        assert!(system.particles().is_empty());
        system.step(Vec2::ZERO, false);
        assert_eq!(system.particles().len(), system.target_count());
    }

    #[test]
    fn test_resize_replaces_pool() {
        let mut system = ParticleSystem::with_seed(options(LogoVariant::Full), 1280, 720, 11);
        assert!(!system.particles().is_empty());

        system.resize(320, 240, true);
        assert_eq!((system.bitmap().width(), system.bitmap().height()), (320, 240));
        assert!(!system.particles().is_empty());
        for p in system.particles() {
            assert!(p.base.x < 320.0 && p.base.y < 240.0);
            assert!(system.bitmap().is_opaque(p.base.x as u32, p.base.y as u32));
        }
        assert_eq!(system.pointer().target(), Vec2::new(160.0, 120.0));
    }

    #[test]
    fn test_draw_paints_background_then_particles() {
        let mut system = solid_system(LogoVariant::Monogram, 20, 20);
        system.seed_pool(10);
        let mut canvas = Canvas::new(20.0, 20.0);
        system.draw(&mut canvas);
        assert_eq!(canvas.len(), 11);
        assert_eq!(canvas.quads()[0].color, BLACK);
        assert_eq!(canvas.quads()[0].rect(), canvas.bounds());
    }

    #[test]
    fn test_same_seed_same_pool() {
        let a = ParticleSystem::with_seed(options(LogoVariant::Monogram), 200, 200, 5);
        let b = ParticleSystem::with_seed(options(LogoVariant::Monogram), 200, 200, 5);
        assert_eq!(a.particles(), b.particles());
    }
}
