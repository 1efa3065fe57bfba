use std::ops::RangeInclusive;

use glam::Vec2;
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::canvas::Rect;
use crate::frame::{pane_geometry, Frame, FrameConfig, PaneGeometry, TransformOrigin, GRID_UNITS};

pub const PANE_COUNT: usize = 9;
pub const DEFAULT_HOVER_UNITS: f32 = 6.0;
pub const DEFAULT_GAP: f32 = 4.0;

pub const HOVER_UNITS_RANGE: RangeInclusive<f32> = 3.0..=9.0;
pub const GAP_RANGE: RangeInclusive<f32> = 0.0..=20.0;
pub const CONTENT_SCALE_RANGE: RangeInclusive<f32> = 0.1..=2.0;
pub const BORDER_THICKNESS_RANGE: RangeInclusive<f32> = 0.0..=16.0;
pub const BORDER_SIZE_RANGE: RangeInclusive<f32> = 60.0..=100.0;

const TRACK_TRANSITION_SECONDS: f32 = 0.3;
/// Scale of the hovered pane once its pop settles.
pub const HOVER_SCALE: f32 = 1.03;
const POP_STIFFNESS: f32 = 260.0;
const POP_DAMPING: f32 = 20.0;
const SPRING_STEP: f32 = 1.0 / 240.0;

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("grid layout requires {expected} frame configurations, received {found}")]
    PaneCount { expected: usize, found: usize },
}

/// How embedded media should play. Handed to pane content untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoplayMode {
    #[default]
    All,
    Hover,
}

fn default_hover_size() -> f32 {
    DEFAULT_HOVER_UNITS
}

fn default_gap_size() -> f32 {
    DEFAULT_GAP
}

fn default_true() -> bool {
    true
}

/// Grid-wide construction options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    /// Grid units given to the hovered row and column
    #[serde(default = "default_hover_size")]
    pub hover_size: f32,
    /// Pixels between panes
    #[serde(default = "default_gap_size")]
    pub gap_size: f32,
    #[serde(default = "default_true")]
    pub show_frame_visuals: bool,
    #[serde(default)]
    pub autoplay_mode: AutoplayMode,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            hover_size: DEFAULT_HOVER_UNITS,
            gap_size: DEFAULT_GAP,
            show_frame_visuals: true,
            autoplay_mode: AutoplayMode::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub fn of_index(index: usize) -> Self {
        Self {
            row: index / 3,
            col: index % 3,
        }
    }
}

/// Fractional weights of the three rows and three columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSizes {
    pub rows: [f32; 3],
    pub cols: [f32; 3],
}

impl TrackSizes {
    pub fn equal(total_units: f32) -> Self {
        let third = total_units / 3.0;
        Self {
            rows: [third; 3],
            cols: [third; 3],
        }
    }

    fn lerp(&self, other: &TrackSizes, t: f32) -> TrackSizes {
        let mix = |a: [f32; 3], b: [f32; 3]| {
            [
                a[0] + (b[0] - a[0]) * t,
                a[1] + (b[1] - a[1]) * t,
                a[2] + (b[2] - a[2]) * t,
            ]
        };
        TrackSizes {
            rows: mix(self.rows, other.rows),
            cols: mix(self.cols, other.cols),
        }
    }
}

/// Row and column weights for a hover state.
///
/// The hovered row and column get `hover_units`; the other two split what is
/// left of `total_units`. When that split would go negative, or `hover_units`
/// is negative or not finite, the tracks stay equal.
pub fn compute_track_sizes(hovered: Option<Cell>, hover_units: f32, total_units: f32) -> TrackSizes {
    let Some(cell) = hovered else {
        return TrackSizes::equal(total_units);
    };
    let rest = (total_units - hover_units) / 2.0;
    if !hover_units.is_finite() || hover_units < 0.0 || rest < 0.0 {
        return TrackSizes::equal(total_units);
    }
    let weights = |hot: usize| {
        let mut tracks = [rest; 3];
        tracks[hot] = hover_units;
        tracks
    };
    TrackSizes {
        rows: weights(cell.row),
        cols: weights(cell.col),
    }
}

/// Split `length` into three spans proportional to `weights`, `gap` apart.
/// Returns (offset, size) pairs starting at `start`.
pub fn track_spans(weights: &[f32; 3], start: f32, length: f32, gap: f32) -> [(f32, f32); 3] {
    let available = (length - 2.0 * gap).max(0.0);
    let total: f32 = weights.iter().sum();
    let mut spans = [(0.0, 0.0); 3];
    let mut cursor = start;
    for (span, weight) in spans.iter_mut().zip(weights) {
        let size = if total > 0.0 {
            available * weight / total
        } else {
            available / 3.0
        };
        *span = (cursor, size);
        cursor += size + gap;
    }
    spans
}

fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone)]
struct TrackTransition {
    from: TrackSizes,
    to: TrackSizes,
    elapsed: f32,
}

impl TrackTransition {
    fn settled(tracks: TrackSizes) -> Self {
        Self {
            from: tracks,
            to: tracks,
            elapsed: TRACK_TRANSITION_SECONDS,
        }
    }

    fn current(&self) -> TrackSizes {
        let t = ease_in_out(self.elapsed / TRACK_TRANSITION_SECONDS);
        self.from.lerp(&self.to, t)
    }

    fn retarget(&mut self, to: TrackSizes) {
        if to == self.to {
            return;
        }
        self.from = self.current();
        self.to = to;
        self.elapsed = 0.0;
    }

    fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(TRACK_TRANSITION_SECONDS);
    }

    fn is_done(&self) -> bool {
        self.elapsed >= TRACK_TRANSITION_SECONDS
    }
}

/// Damped spring driving a pane's pop scale.
#[derive(Debug, Clone, Copy)]
struct Spring {
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    fn at_rest(value: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
        }
    }

    fn advance(&mut self, dt: f32) {
        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(SPRING_STEP);
            let force = -POP_STIFFNESS * (self.value - self.target) - POP_DAMPING * self.velocity;
            self.velocity += force * h;
            self.value += self.velocity * h;
            remaining -= h;
        }
        if self.is_settled() {
            self.value = self.target;
            self.velocity = 0.0;
        }
    }

    fn is_settled(&self) -> bool {
        (self.value - self.target).abs() < 1e-4 && self.velocity.abs() < 1e-3
    }
}

/// Where and how one pane is drawn this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PaneLayout {
    pub index: usize,
    pub cell: Cell,
    pub hovered: bool,
    /// 0 at rest, 1 when fully popped; drives the glow
    pub lift: f32,
    pub geometry: PaneGeometry,
}

/// 3x3 grid whose hovered row and column grow at the expense of the others.
#[derive(Debug, Clone)]
pub struct GridLayout {
    frames: Vec<Frame>,
    hovered: Option<Cell>,
    hover_units: f32,
    gap: f32,
    show_frame_visuals: bool,
    autoplay_mode: AutoplayMode,
    transition: TrackTransition,
    pops: Vec<Spring>,
}

impl GridLayout {
    pub fn new(configs: Vec<FrameConfig>, options: GridOptions) -> Result<Self, LayoutError> {
        if configs.len() != PANE_COUNT {
            return Err(LayoutError::PaneCount {
                expected: PANE_COUNT,
                found: configs.len(),
            });
        }
        let frames: Vec<Frame> = configs.into_iter().map(Frame::from).collect();
        Ok(Self {
            pops: vec![Spring::at_rest(1.0); frames.len()],
            frames,
            hovered: None,
            hover_units: options.hover_size,
            gap: options.gap_size,
            show_frame_visuals: options.show_frame_visuals,
            autoplay_mode: options.autoplay_mode,
            transition: TrackTransition::settled(TrackSizes::equal(GRID_UNITS)),
        })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn hovered(&self) -> Option<Cell> {
        self.hovered
    }

    pub fn hovered_index(&self) -> Option<usize> {
        self.frames.iter().position(|f| f.hovered)
    }

    pub fn hover_units(&self) -> f32 {
        self.hover_units
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn show_frame_visuals(&self) -> bool {
        self.show_frame_visuals
    }

    pub fn autoplay_mode(&self) -> AutoplayMode {
        self.autoplay_mode
    }

    pub fn target_tracks(&self) -> TrackSizes {
        compute_track_sizes(self.hovered, self.hover_units, GRID_UNITS)
    }

    pub fn current_tracks(&self) -> TrackSizes {
        self.transition.current()
    }

    pub fn on_pane_enter(&mut self, index: usize) {
        if index >= self.frames.len() {
            return;
        }
        let cell = Cell::of_index(index);
        if self.hovered == Some(cell) {
            return;
        }
        self.hovered = Some(cell);
        for (i, (frame, pop)) in self.frames.iter_mut().zip(&mut self.pops).enumerate() {
            frame.hovered = i == index;
            pop.target = if frame.hovered { HOVER_SCALE } else { 1.0 };
        }
        debug!("pane {} hovered at {:?}", self.frames[index].id, cell);
        self.retarget();
    }

    pub fn on_pane_leave(&mut self) {
        if self.hovered.is_none() {
            return;
        }
        self.hovered = None;
        for (frame, pop) in self.frames.iter_mut().zip(&mut self.pops) {
            frame.hovered = false;
            pop.target = 1.0;
        }
        debug!("grid hover cleared");
        self.retarget();
    }

    fn retarget(&mut self) {
        let target = self.target_tracks();
        self.transition.retarget(target);
    }

    /// Advance transitions by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.transition.advance(dt);
        for pop in &mut self.pops {
            pop.advance(dt);
        }
    }

    pub fn is_animating(&self) -> bool {
        !self.transition.is_done() || self.pops.iter().any(|p| !p.is_settled())
    }

    pub fn set_hover_units(&mut self, units: f32) {
        self.hover_units = units.clamp(*HOVER_UNITS_RANGE.start(), *HOVER_UNITS_RANGE.end());
        self.retarget();
    }

    pub fn set_gap(&mut self, gap: f32) {
        self.gap = gap.clamp(*GAP_RANGE.start(), *GAP_RANGE.end());
    }

    pub fn set_show_frame_visuals(&mut self, show: bool) {
        self.show_frame_visuals = show;
    }

    pub fn set_autoplay_mode(&mut self, mode: AutoplayMode) {
        self.autoplay_mode = mode;
    }

    fn frame_mut(&mut self, id: u32) -> Option<&mut Frame> {
        self.frames.iter_mut().find(|f| f.id == id)
    }

    pub fn set_content_scale(&mut self, id: u32, scale: f32) -> bool {
        let range = CONTENT_SCALE_RANGE;
        self.frame_mut(id)
            .map(|f| f.visuals.content_scale = scale.clamp(*range.start(), *range.end()))
            .is_some()
    }

    pub fn set_border_thickness(&mut self, id: u32, thickness: f32) -> bool {
        let range = BORDER_THICKNESS_RANGE;
        self.frame_mut(id)
            .map(|f| f.visuals.border_thickness = thickness.clamp(*range.start(), *range.end()))
            .is_some()
    }

    pub fn set_border_size(&mut self, id: u32, size: f32) -> bool {
        let range = BORDER_SIZE_RANGE;
        self.frame_mut(id)
            .map(|f| f.visuals.border_size = size.clamp(*range.start(), *range.end()))
            .is_some()
    }

    /// Untransformed pane rectangles for the current (animated) tracks.
    pub fn pane_rects(&self, bounds: &Rect) -> Vec<Rect> {
        let tracks = self.current_tracks();
        let rows = track_spans(&tracks.rows, bounds.y, bounds.h, self.gap);
        let cols = track_spans(&tracks.cols, bounds.x, bounds.w, self.gap);
        (0..self.frames.len())
            .map(|index| {
                let cell = Cell::of_index(index);
                let (y, h) = rows[cell.row];
                let (x, w) = cols[cell.col];
                Rect::new(x, y, w, h)
            })
            .collect()
    }

    pub fn pane_at(&self, bounds: &Rect, point: Vec2) -> Option<usize> {
        self.pane_rects(bounds).iter().position(|r| r.contains(point))
    }

    /// Pane layouts in draw order: the hovered pane comes last so it sits on top.
    pub fn pane_layouts(&self, bounds: &Rect) -> Vec<PaneLayout> {
        let mut layouts: Vec<PaneLayout> = self
            .pane_rects(bounds)
            .into_iter()
            .zip(self.frames.iter().zip(&self.pops))
            .enumerate()
            .map(|(index, (rect, (frame, pop)))| {
                let origin = TransformOrigin::for_position(&frame.default_pos).point_in(&rect);
                let popped = rect.scaled_about(origin, pop.value);
                PaneLayout {
                    index,
                    cell: Cell::of_index(index),
                    hovered: frame.hovered,
                    lift: ((pop.value - 1.0) / (HOVER_SCALE - 1.0)).clamp(0.0, 1.0),
                    geometry: pane_geometry(popped, &frame.visuals, self.show_frame_visuals),
                }
            })
            .collect();
        layouts.sort_by_key(|l| l.hovered);
        layouts
    }
}

/// The grid, or the reason it cannot be shown.
#[derive(Debug, Clone)]
pub enum GridView {
    Ready(GridLayout),
    Failed(LayoutError),
}

impl GridView {
    pub fn build(configs: Vec<FrameConfig>, options: GridOptions) -> Self {
        match GridLayout::new(configs, options) {
            Ok(layout) => GridView::Ready(layout),
            Err(err) => {
                error!("{}", err);
                GridView::Failed(err)
            }
        }
    }

    pub fn pane_count(&self) -> usize {
        match self {
            GridView::Ready(layout) => layout.frames().len(),
            GridView::Failed(_) => 0,
        }
    }

    pub fn layout(&self) -> Option<&GridLayout> {
        match self {
            GridView::Ready(layout) => Some(layout),
            GridView::Failed(_) => None,
        }
    }

    pub fn layout_mut(&mut self) -> Option<&mut GridLayout> {
        match self {
            GridView::Ready(layout) => Some(layout),
            GridView::Failed(_) => None,
        }
    }
}
