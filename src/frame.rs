use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::canvas::Rect;
use crate::logo::LogoOptions;

/// Side of the square corner artwork, and thickness of edge strips, in pixels.
pub const BORDER_ASSET_SIZE: f32 = 64.0;
/// Units in the frame coordinate space along each axis.
pub const GRID_UNITS: f32 = 12.0;

pub const DEFAULT_CONTENT_SCALE: f32 = 1.0;
pub const DEFAULT_BORDER_THICKNESS: f32 = 0.0;
pub const DEFAULT_BORDER_SIZE: f32 = 80.0;

/// Position and extent in grid units (12 per axis).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl GridRect {
    /// Default position of the pane at `index` in a 3x3 arrangement.
    pub fn for_index(index: usize) -> Self {
        let cell = GRID_UNITS / 3.0;
        Self {
            x: (index % 3) as f32 * cell,
            y: (index / 3) as f32 * cell,
            w: cell,
            h: cell,
        }
    }

    /// (row, col) of the 3x3 cell this position falls in.
    pub fn cell(&self) -> (usize, usize) {
        let cell = GRID_UNITS / 3.0;
        let clamp = |v: f32| ((v / cell).floor().max(0.0) as usize).min(2);
        (clamp(self.y), clamp(self.x))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameAssets {
    pub corner: String,
    pub edge_horizontal: String,
    pub edge_vertical: String,
}

/// Per-pane visual parameters, adjustable at runtime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameVisuals {
    /// Scale factor applied to the content
    pub content_scale: f32,
    /// Padding between border area and content, in pixels
    pub border_thickness: f32,
    /// Share of the pane taken by border plus content, in percent
    pub border_size: f32,
}

impl Default for FrameVisuals {
    fn default() -> Self {
        Self {
            content_scale: DEFAULT_CONTENT_SCALE,
            border_thickness: DEFAULT_BORDER_THICKNESS,
            border_size: DEFAULT_BORDER_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub href: String,
}

/// What a pane shows. The layout never looks inside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaneContent {
    Text {
        #[serde(default)]
        badge: Option<String>,
        heading: String,
        #[serde(default)]
        body: Vec<String>,
        #[serde(default)]
        links: Vec<Link>,
    },
    Logo(LogoOptions),
}

/// Pane descriptor as supplied by the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameConfig {
    pub id: u32,
    pub content: PaneContent,
    pub default_pos: GridRect,
    pub assets: FrameAssets,
    #[serde(default)]
    pub initial_media_size: Option<f32>,
    #[serde(default)]
    pub initial_border_thickness: Option<f32>,
    #[serde(default)]
    pub initial_border_size: Option<f32>,
}

/// Live pane state owned by the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub id: u32,
    pub content: PaneContent,
    pub default_pos: GridRect,
    pub assets: FrameAssets,
    pub visuals: FrameVisuals,
    pub hovered: bool,
}

impl From<FrameConfig> for Frame {
    fn from(config: FrameConfig) -> Self {
        let defaults = FrameVisuals::default();
        Self {
            id: config.id,
            content: config.content,
            default_pos: config.default_pos,
            assets: config.assets,
            visuals: FrameVisuals {
                content_scale: config.initial_media_size.unwrap_or(defaults.content_scale),
                border_thickness: config
                    .initial_border_thickness
                    .unwrap_or(defaults.border_thickness),
                border_size: config.initial_border_size.unwrap_or(defaults.border_size),
            },
            hovered: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Center,
    End,
}

impl Anchor {
    fn from_index(index: usize) -> Self {
        match index {
            0 => Anchor::Start,
            2 => Anchor::End,
            _ => Anchor::Center,
        }
    }

    fn offset(self, length: f32) -> f32 {
        match self {
            Anchor::Start => 0.0,
            Anchor::Center => length / 2.0,
            Anchor::End => length,
        }
    }
}

/// Point a pane grows from when it pops: top/center/bottom x left/center/right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOrigin {
    pub vertical: Anchor,
    pub horizontal: Anchor,
}

impl TransformOrigin {
    pub fn for_position(pos: &GridRect) -> Self {
        let (row, col) = pos.cell();
        Self {
            vertical: Anchor::from_index(row),
            horizontal: Anchor::from_index(col),
        }
    }

    pub fn point_in(&self, rect: &Rect) -> Vec2 {
        Vec2::new(
            rect.x + self.horizontal.offset(rect.w),
            rect.y + self.vertical.offset(rect.h),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Corner,
    EdgeHorizontal,
    EdgeVertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tiling {
    None,
    RepeatX,
    RepeatY,
}

/// One piece of border artwork placed on a pane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderSprite {
    pub kind: SpriteKind,
    pub rect: Rect,
    pub flip_x: bool,
    pub flip_y: bool,
    pub tiling: Tiling,
}

impl BorderSprite {
    pub fn asset<'a>(&self, assets: &'a FrameAssets) -> &'a str {
        match self.kind {
            SpriteKind::Corner => &assets.corner,
            SpriteKind::EdgeHorizontal => &assets.edge_horizontal,
            SpriteKind::EdgeVertical => &assets.edge_vertical,
        }
    }
}

/// Resolved geometry of one pane.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneGeometry {
    pub pane: Rect,
    /// Border-plus-content box
    pub border_box: Rect,
    /// Where content is drawn, after padding and content scale
    pub content: Rect,
    pub sprites: Vec<BorderSprite>,
}

/// Lay out a pane's content box and border artwork inside `pane`.
pub fn pane_geometry(pane: Rect, visuals: &FrameVisuals, show_frame: bool) -> PaneGeometry {
    let (border_box, padding) = if show_frame {
        let share = visuals.border_size / 100.0;
        let offset = (1.0 - share) / 2.0;
        let rect = Rect::new(
            pane.x + pane.w * offset,
            pane.y + pane.h * offset,
            pane.w * share,
            pane.h * share,
        );
        (rect, visuals.border_thickness)
    } else {
        (pane, 0.0)
    };
    let content = border_box.inset(padding).scaled_about_center(visuals.content_scale);
    let sprites = if show_frame {
        border_sprites(&pane)
    } else {
        Vec::new()
    };

    PaneGeometry {
        pane,
        border_box,
        content,
        sprites,
    }
}

fn border_sprites(pane: &Rect) -> Vec<BorderSprite> {
    let s = BORDER_ASSET_SIZE;
    let corner = |x: f32, y: f32, flip_x: bool, flip_y: bool| BorderSprite {
        kind: SpriteKind::Corner,
        rect: Rect::new(x, y, s, s),
        flip_x,
        flip_y,
        tiling: Tiling::None,
    };
    let span_w = (pane.w - 2.0 * s).max(0.0);
    let span_h = (pane.h - 2.0 * s).max(0.0);

    vec![
        corner(pane.x, pane.y, false, false),
        corner(pane.right() - s, pane.y, true, false),
        corner(pane.x, pane.bottom() - s, false, true),
        corner(pane.right() - s, pane.bottom() - s, true, true),
        BorderSprite {
            kind: SpriteKind::EdgeHorizontal,
            rect: Rect::new(pane.x + s, pane.y, span_w, s),
            flip_x: false,
            flip_y: false,
            tiling: Tiling::RepeatX,
        },
        BorderSprite {
            kind: SpriteKind::EdgeHorizontal,
            rect: Rect::new(pane.x + s, pane.bottom() - s, span_w, s),
            flip_x: false,
            flip_y: true,
            tiling: Tiling::RepeatX,
        },
        BorderSprite {
            kind: SpriteKind::EdgeVertical,
            rect: Rect::new(pane.x, pane.y + s, s, span_h),
            flip_x: false,
            flip_y: false,
            tiling: Tiling::RepeatY,
        },
        BorderSprite {
            kind: SpriteKind::EdgeVertical,
            rect: Rect::new(pane.right() - s, pane.y + s, s, span_h),
            flip_x: true,
            flip_y: false,
            tiling: Tiling::RepeatY,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assets() -> FrameAssets {
        FrameAssets {
            corner: "corner.png".into(),
            edge_horizontal: "hori.png".into(),
            edge_vertical: "vert.png".into(),
        }
    }

    fn config() -> FrameConfig {
        FrameConfig {
            id: 5,
            content: PaneContent::Logo(LogoOptions::default()),
            default_pos: GridRect::for_index(4),
            assets: assets(),
            initial_media_size: Some(0.8),
            initial_border_thickness: None,
            initial_border_size: None,
        }
    }

    #[test]
    fn test_missing_visuals_fall_back_to_defaults() {
        let frame = Frame::from(config());
        assert_eq!(frame.visuals.content_scale, 0.8);
        assert_eq!(frame.visuals.border_thickness, DEFAULT_BORDER_THICKNESS);
        assert_eq!(frame.visuals.border_size, DEFAULT_BORDER_SIZE);
        assert!(!frame.hovered);
    }

    #[test]
    fn test_cell_from_default_position() {
        assert_eq!(GridRect::for_index(0).cell(), (0, 0));
        assert_eq!(GridRect::for_index(5).cell(), (1, 2));
        assert_eq!(GridRect::for_index(7).cell(), (2, 1));
        let odd = GridRect { x: 13.0, y: -2.0, w: 4.0, h: 4.0 };
        assert_eq!(odd.cell(), (0, 2));
    }

    #[test]
    fn test_transform_origin_follows_cell() {
        let pane = Rect::new(0.0, 0.0, 90.0, 60.0);
        let top_left = TransformOrigin::for_position(&GridRect::for_index(0));
        assert_eq!(top_left.point_in(&pane), Vec2::new(0.0, 0.0));
        let center = TransformOrigin::for_position(&GridRect::for_index(4));
        assert_eq!(center.point_in(&pane), Vec2::new(45.0, 30.0));
        let bottom_right = TransformOrigin::for_position(&GridRect::for_index(8));
        assert_eq!(bottom_right.point_in(&pane), Vec2::new(90.0, 60.0));
    }

    #[test]
    fn test_content_box_with_frame() {
        let visuals = FrameVisuals {
            content_scale: 0.5,
            border_thickness: 10.0,
            border_size: 50.0,
        };
        let geometry = pane_geometry(Rect::new(0.0, 0.0, 400.0, 200.0), &visuals, true);
        assert_eq!(geometry.border_box, Rect::new(100.0, 50.0, 200.0, 100.0));
        // padded to 180x80, then halved about the center (200, 100)
        assert_eq!(geometry.content, Rect::new(155.0, 80.0, 90.0, 40.0));
        assert_eq!(geometry.sprites.len(), 8);
    }

    #[test]
    fn test_content_fills_pane_without_frame() {
        let visuals = FrameVisuals {
            border_thickness: 10.0,
            ..FrameVisuals::default()
        };
        let pane = Rect::new(5.0, 5.0, 100.0, 100.0);
        let geometry = pane_geometry(pane, &visuals, false);
        assert_eq!(geometry.border_box, pane);
        assert_eq!(geometry.content, pane);
        assert!(geometry.sprites.is_empty());
    }

    #[test]
    fn test_corner_sprites_are_mirrored_per_corner() {
        let geometry = pane_geometry(Rect::new(0.0, 0.0, 300.0, 200.0), &FrameVisuals::default(), true);
        let corners: Vec<_> = geometry
            .sprites
            .iter()
            .filter(|s| s.kind == SpriteKind::Corner)
            .map(|s| (s.rect.x, s.rect.y, s.flip_x, s.flip_y))
            .collect();
        assert_eq!(
            corners,
            vec![
                (0.0, 0.0, false, false),
                (236.0, 0.0, true, false),
                (0.0, 136.0, false, true),
                (236.0, 136.0, true, true),
            ]
        );
    }

    #[test]
    fn test_edges_span_between_corners() {
        let geometry = pane_geometry(Rect::new(0.0, 0.0, 300.0, 200.0), &FrameVisuals::default(), true);
        let top = geometry
            .sprites
            .iter()
            .find(|s| s.kind == SpriteKind::EdgeHorizontal && !s.flip_y)
            .unwrap();
        assert_eq!(top.rect, Rect::new(64.0, 0.0, 172.0, 64.0));
        assert_eq!(top.tiling, Tiling::RepeatX);
        assert_eq!(top.asset(&assets()), "hori.png");

        let right = geometry
            .sprites
            .iter()
            .find(|s| s.kind == SpriteKind::EdgeVertical && s.flip_x)
            .unwrap();
        assert_eq!(right.rect, Rect::new(236.0, 64.0, 64.0, 72.0));
        assert_eq!(right.asset(&assets()), "vert.png");
    }

    #[test]
    fn test_edges_collapse_on_small_pane() {
        let geometry = pane_geometry(Rect::new(0.0, 0.0, 100.0, 100.0), &FrameVisuals::default(), true);
        for sprite in geometry.sprites.iter().filter(|s| s.kind != SpriteKind::Corner) {
            assert!(sprite.rect.is_empty());
        }
    }

    #[test]
    fn test_content_serde_tagging() {
        let json = r#"{"kind": "text", "heading": "Pricing Plans", "body": ["$29/mo"]}"#;
        let content: PaneContent = serde_json::from_str(json).unwrap();
        assert_eq!(
            content,
            PaneContent::Text {
                badge: None,
                heading: "Pricing Plans".into(),
                body: vec!["$29/mo".into()],
                links: vec![],
            }
        );
        let json = r#"{"kind": "logo", "variant": "n", "size": 32.0}"#;
        let content: PaneContent = serde_json::from_str(json).unwrap();
        assert!(matches!(content, PaneContent::Logo(LogoOptions { size: Some(_), .. })));
    }
}
