// Library exports for WebAssembly and library usage
pub mod canvas;
pub mod config;
pub mod controls;
pub mod frame;
pub mod glyph;
pub mod input;
pub mod layout_engine;
pub mod logo;
pub mod page;
pub mod particle_system;
pub mod renderer;
pub mod scheduler;

// Re-export main types
pub use canvas::{Canvas, QuadInstance, Rect};
pub use config::{ConfigError, PageConfig};
pub use glyph::LogoVariant;
pub use layout_engine::{compute_track_sizes, GridLayout, GridView, LayoutError};
pub use logo::{LogoAnimation, LogoOptions};
pub use page::Page;
pub use particle_system::{Particle, ParticleSystem};
pub use renderer::{RenderError, Renderer};
