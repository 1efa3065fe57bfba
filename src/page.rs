use glam::Vec2;
use log::{debug, info};

use crate::canvas::{text_width, Canvas, Color, Rect, BLACK, WHITE};
use crate::config::PageConfig;
use crate::controls::ControlAction;
use crate::frame::{BorderSprite, Link, PaneContent, SpriteKind, BORDER_ASSET_SIZE};
use crate::input::{InputHub, PointerPhase, PointerSample};
use crate::layout_engine::{AutoplayMode, GridLayout, GridView, PaneLayout};
use crate::logo::{LogoAnimation, LogoOptions};

/// Height of the band above the grid that carries the mark.
pub const HEADER_HEIGHT: f32 = 64.0;
const HEADER_PADDING: f32 = 16.0;
const ERROR_PADDING: f32 = 40.0;
const TEXT_PADDING: f32 = 12.0;
/// Thickness of the stand-in bars drawn where border artwork goes
const SPRITE_BAR: f32 = BORDER_ASSET_SIZE / 8.0;
const GLOW_SPREAD: f32 = 12.0;

const HEADER_BACKGROUND: Color = [0.04, 0.04, 0.05, 1.0];
const PANE_BACKGROUND: Color = [0.09, 0.09, 0.11, 1.0];
const CONTENT_BACKGROUND: Color = [0.12, 0.12, 0.15, 1.0];
const BORDER_COLOR: Color = [0.55, 0.55, 0.6, 1.0];
const GLOW_COLOR: Color = [0.0, 0.86, 1.0, 0.25];
const BADGE_BACKGROUND: Color = [0.22, 0.22, 0.27, 1.0];
const MUTED_TEXT: Color = [0.65, 0.65, 0.7, 1.0];
const LINK_COLOR: Color = [0.0, 0.86, 1.0, 1.0];
const ERROR_TEXT: Color = [0.94, 0.27, 0.27, 1.0];

struct PaneLogo {
    index: usize,
    animation: LogoAnimation,
}

/// The landing surface: a header band with the mark, and the hover grid below.
pub struct Page {
    viewport: Vec2,
    canvas: Canvas,
    hub: InputHub,
    header: LogoAnimation,
    grid: GridView,
    logos: Vec<PaneLogo>,
}

impl Page {
    pub fn new(config: PageConfig, viewport: Vec2) -> Self {
        Self::build(config, viewport, LogoAnimation::new)
    }

    pub fn with_seed(config: PageConfig, viewport: Vec2, seed: u64) -> Self {
        let mut next = seed;
        Self::build(config, viewport, move |options, viewport| {
            next += 1;
            LogoAnimation::with_seed(options, viewport, next)
        })
    }

    fn build<F>(config: PageConfig, viewport: Vec2, mut make_logo: F) -> Self
    where
        F: FnMut(LogoOptions, Vec2) -> LogoAnimation,
    {
        let grid = GridView::build(config.grid.frames, config.grid.options);
        // A failed grid hosts nothing, so no pane logo is built for it
        let frames = grid.layout().map_or(&[][..], GridLayout::frames);
        let logos: Vec<PaneLogo> = frames
            .iter()
            .enumerate()
            .filter_map(|(index, frame)| match frame.content {
                PaneContent::Logo(options) => Some(PaneLogo {
                    index,
                    animation: make_logo(options, viewport),
                }),
                PaneContent::Text { .. } => None,
            })
            .collect();
        let header = make_logo(config.header, viewport);

        let mut page = Self {
            viewport,
            canvas: Canvas::new(viewport.x, viewport.y),
            hub: InputHub::new(),
            header,
            grid,
            logos,
        };
        page.mount();
        page
    }

    fn mount(&mut self) {
        let mark = self.header_mark_rect();
        let (_, scale) = self.header.placement(&mark);
        self.header.mount(&mut self.hub, mark, scale);
        // Pane regions are placeholders until the first layout pass
        for logo in &mut self.logos {
            logo.animation.mount(&mut self.hub, Rect::default(), 1.0);
        }
        self.sync_regions();
        info!(
            "Page mounted: {}x{}, {} panes, {} input subscriptions",
            self.viewport.x,
            self.viewport.y,
            self.grid.pane_count(),
            self.hub.len()
        );
    }

    /// Stop every animation and drop every input subscription.
    pub fn unmount(&mut self) {
        self.header.unmount(&mut self.hub);
        for logo in &mut self.logos {
            logo.animation.unmount(&mut self.hub);
        }
        info!("Page unmounted");
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn grid(&self) -> &GridView {
        &self.grid
    }

    pub fn hub(&self) -> &InputHub {
        &self.hub
    }

    pub fn header(&self) -> &LogoAnimation {
        &self.header
    }

    /// Logo animation hosted by the pane at `index`, if any.
    pub fn pane_logo(&self, index: usize) -> Option<&LogoAnimation> {
        self.logos
            .iter()
            .find(|logo| logo.index == index)
            .map(|logo| &logo.animation)
    }

    pub fn grid_bounds(&self) -> Rect {
        Rect::new(
            0.0,
            HEADER_HEIGHT,
            self.viewport.x,
            (self.viewport.y - HEADER_HEIGHT).max(0.0),
        )
    }

    fn header_mark_rect(&self) -> Rect {
        let size = self.header.canvas_size();
        Rect::new(
            HEADER_PADDING,
            ((HEADER_HEIGHT - size.y) / 2.0).max(0.0),
            size.x,
            size.y.min(HEADER_HEIGHT),
        )
    }

    /// Whether anything still needs frames.
    pub fn is_active(&self) -> bool {
        self.header.is_running()
            || self.logos.iter().any(|logo| logo.animation.is_running())
            || self.grid.layout().map_or(false, GridLayout::is_animating)
    }

    pub fn resize(&mut self, viewport: Vec2) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        self.canvas.resize(viewport.x, viewport.y);
        self.header.resize(viewport);
        for logo in &mut self.logos {
            logo.animation.resize(viewport);
        }
        let mark = self.header_mark_rect();
        self.header.update_region(&mut self.hub, &mark);
        self.sync_regions();
        debug!("Page resized to {}x{}", viewport.x, viewport.y);
    }

    fn sync_regions(&mut self) {
        let Some(layout) = self.grid.layout() else {
            return;
        };
        for pane in layout.pane_layouts(&self.grid_bounds()) {
            if let Some(logo) = self.logos.iter().find(|logo| logo.index == pane.index) {
                logo.animation.update_region(&mut self.hub, &pane.geometry.content);
            }
        }
    }

    pub fn handle_pointer(&mut self, sample: &PointerSample) {
        for (id, local) in self.hub.route(sample) {
            if self.header.subscription() == Some(id) {
                self.header.handle_pointer(&local);
            } else if let Some(logo) = self
                .logos
                .iter_mut()
                .find(|logo| logo.animation.subscription() == Some(id))
            {
                logo.animation.handle_pointer(&local);
            }
        }

        let bounds = self.grid_bounds();
        if let Some(layout) = self.grid.layout_mut() {
            // Touch counts as hover, so a tap expands the pane under it
            let hit = match sample.phase {
                PointerPhase::End => None,
                PointerPhase::Start | PointerPhase::Move => layout.pane_at(&bounds, sample.position),
            };
            match hit {
                Some(index) => layout.on_pane_enter(index),
                None => layout.on_pane_leave(),
            }
        }
    }

    /// Apply a keyboard control. Returns whether anything changed.
    pub fn apply(&mut self, action: ControlAction) -> bool {
        let Some(layout) = self.grid.layout_mut() else {
            return false;
        };
        let changed = if action.targets_pane() {
            adjust_hovered_pane(layout, action)
        } else {
            match action {
                ControlAction::ToggleBorders => {
                    layout.set_show_frame_visuals(!layout.show_frame_visuals());
                    true
                }
                ControlAction::ToggleAutoplay => {
                    let mode = match layout.autoplay_mode() {
                        AutoplayMode::All => AutoplayMode::Hover,
                        AutoplayMode::Hover => AutoplayMode::All,
                    };
                    layout.set_autoplay_mode(mode);
                    true
                }
                ControlAction::HoverUnits(delta) => {
                    layout.set_hover_units(layout.hover_units() + delta);
                    true
                }
                ControlAction::Gap(delta) => {
                    layout.set_gap(layout.gap() + delta);
                    true
                }
                _ => false,
            }
        };
        if changed {
            info!("Control applied: {:?}", action);
        }
        changed
    }

    /// Advance everything by `dt` seconds and draw the page.
    pub fn frame(&mut self, dt: f32) -> &Canvas {
        if let Some(layout) = self.grid.layout_mut() {
            layout.update(dt);
        }
        self.header.frame(false);
        let (hovered, autoplay) = match self.grid.layout() {
            Some(layout) => (layout.hovered_index(), layout.autoplay_mode()),
            None => (None, AutoplayMode::All),
        };
        for logo in &mut self.logos {
            let paused = autoplay == AutoplayMode::Hover && hovered != Some(logo.index);
            logo.animation.frame(paused);
        }
        self.sync_regions();

        self.canvas.fill_background(BLACK);
        self.draw_header();
        let bounds = self.grid_bounds();
        match &self.grid {
            GridView::Ready(layout) => {
                for pane in layout.pane_layouts(&bounds) {
                    draw_pane(&mut self.canvas, layout, &pane, &self.logos);
                }
            }
            GridView::Failed(err) => {
                let message = format!("Error: {}.", err);
                let origin = Vec2::new(bounds.x + ERROR_PADDING, bounds.y + ERROR_PADDING);
                let clip = bounds.inset(ERROR_PADDING / 2.0);
                for (row, line) in wrap_text(&message, chars_fitting(clip.w, 3.0)).iter().enumerate() {
                    let y = origin.y + row as f32 * 3.0 * 10.0;
                    self.canvas
                        .fill_text(line, Vec2::new(origin.x, y), 3.0, ERROR_TEXT, &clip);
                }
            }
        }
        &self.canvas
    }

    fn draw_header(&mut self) {
        let band = Rect::new(0.0, 0.0, self.viewport.x, HEADER_HEIGHT);
        self.canvas.fill_rect(band, HEADER_BACKGROUND);
        let mark = self.header_mark_rect();
        let (origin, scale) = self.header.placement(&mark);
        self.canvas.compose(self.header.canvas(), origin, scale, &band);
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

/// Nudge a visual of the hovered pane; nothing happens without a hover.
fn adjust_hovered_pane(layout: &mut GridLayout, action: ControlAction) -> bool {
    let Some(index) = layout.hovered_index() else {
        return false;
    };
    let frame = &layout.frames()[index];
    let (id, visuals) = (frame.id, frame.visuals);
    match action {
        ControlAction::ContentScale(delta) => layout.set_content_scale(id, visuals.content_scale + delta),
        ControlAction::BorderThickness(delta) => {
            layout.set_border_thickness(id, visuals.border_thickness + delta)
        }
        ControlAction::BorderSize(delta) => layout.set_border_size(id, visuals.border_size + delta),
        _ => false,
    }
}

fn draw_pane(canvas: &mut Canvas, layout: &GridLayout, pane: &PaneLayout, logos: &[PaneLogo]) {
    let geometry = &pane.geometry;
    if pane.lift > 0.0 {
        let glow = [
            GLOW_COLOR[0],
            GLOW_COLOR[1],
            GLOW_COLOR[2],
            GLOW_COLOR[3] * pane.lift,
        ];
        canvas.fill_rect(geometry.pane.inset(-GLOW_SPREAD * pane.lift), glow);
    }
    canvas.fill_rect(geometry.pane, PANE_BACKGROUND);
    for sprite in &geometry.sprites {
        draw_sprite(canvas, sprite, &geometry.pane);
    }

    let Some(clip) = geometry.content.intersect(&geometry.pane) else {
        return;
    };
    canvas.fill_rect(clip, CONTENT_BACKGROUND);
    match &layout.frames()[pane.index].content {
        PaneContent::Text {
            badge,
            heading,
            body,
            links,
        } => draw_text_block(canvas, badge.as_deref(), heading, body, links, &geometry.content, &clip),
        PaneContent::Logo(_) => {
            if let Some(logo) = logos.iter().find(|logo| logo.index == pane.index) {
                let (origin, scale) = logo.animation.placement(&geometry.content);
                canvas.compose(logo.animation.canvas(), origin, scale, &clip);
            }
        }
    }
}

/// Border artwork is not fetched; each sprite becomes a bar along its outer side.
fn draw_sprite(canvas: &mut Canvas, sprite: &BorderSprite, clip: &Rect) {
    let r = sprite.rect;
    let top = Rect::new(r.x, r.y, r.w, SPRITE_BAR);
    let bottom = Rect::new(r.x, r.bottom() - SPRITE_BAR, r.w, SPRITE_BAR);
    let left = Rect::new(r.x, r.y, SPRITE_BAR, r.h);
    let right = Rect::new(r.right() - SPRITE_BAR, r.y, SPRITE_BAR, r.h);
    let horizontal = if sprite.flip_y { bottom } else { top };
    let vertical = if sprite.flip_x { right } else { left };
    match sprite.kind {
        SpriteKind::Corner => {
            canvas.fill_rect_clipped(horizontal, BORDER_COLOR, clip);
            canvas.fill_rect_clipped(vertical, BORDER_COLOR, clip);
        }
        SpriteKind::EdgeHorizontal => canvas.fill_rect_clipped(horizontal, BORDER_COLOR, clip),
        SpriteKind::EdgeVertical => canvas.fill_rect_clipped(vertical, BORDER_COLOR, clip),
    }
}

fn chars_fitting(width: f32, cell: f32) -> usize {
    ((width / (8.0 * cell)).floor() as usize).max(1)
}

/// Greedy word wrap to at most `max_chars` per line; longer words are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            let rest = word.split_off(max_chars);
            lines.push(word.into_iter().collect());
            word = rest;
        }
        let needed = if line.is_empty() {
            word.len()
        } else {
            line.chars().count() + 1 + word.len()
        };
        if needed > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.extend(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

fn draw_text_block(
    canvas: &mut Canvas,
    badge: Option<&str>,
    heading: &str,
    body: &[String],
    links: &[Link],
    content: &Rect,
    clip: &Rect,
) {
    let cell = (content.w / 320.0).clamp(1.0, 2.0);
    let heading_cell = cell * 1.5;
    let inner = content.inset(TEXT_PADDING);
    let mut y = inner.y;

    let centered = |canvas: &mut Canvas, text: &str, y: f32, cell: f32, color: Color| {
        let x = inner.center().x - text_width(text, cell) / 2.0;
        canvas.fill_text(text, Vec2::new(x, y), cell, color, clip);
    };

    if let Some(badge) = badge {
        let width = text_width(badge, cell) + 4.0 * cell;
        let pill = Rect::new(inner.center().x - width / 2.0, y, width, 12.0 * cell);
        canvas.fill_rect_clipped(pill, BADGE_BACKGROUND, clip);
        centered(canvas, badge, y + 2.0 * cell, cell, WHITE);
        y += 16.0 * cell;
    }
    for line in wrap_text(heading, chars_fitting(inner.w, heading_cell)) {
        centered(canvas, &line, y, heading_cell, WHITE);
        y += 10.0 * heading_cell;
    }
    y += 4.0 * cell;
    for paragraph in body {
        for line in wrap_text(paragraph, chars_fitting(inner.w, cell)) {
            centered(canvas, &line, y, cell, MUTED_TEXT);
            y += 10.0 * cell;
        }
    }
    for link in links {
        y += 4.0 * cell;
        centered(canvas, &link.label, y, cell, LINK_COLOR);
        let width = text_width(&link.label, cell);
        let underline = Rect::new(inner.center().x - width / 2.0, y + 9.0 * cell, width, cell);
        canvas.fill_rect_clipped(underline, LINK_COLOR, clip);
        y += 12.0 * cell;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Vec2 = Vec2::new(480.0, 360.0);

    fn page() -> Page {
        Page::with_seed(PageConfig::default(), VIEWPORT, 11)
    }

    fn pane_center(page: &Page, index: usize) -> Vec2 {
        let layout = page.grid().layout().unwrap();
        layout.pane_rects(&page.grid_bounds())[index].center()
    }

    #[test]
    fn test_default_page_mounts_header_and_pane_logo() {
        let page = page();
        assert_eq!(page.grid().pane_count(), 9);
        assert_eq!(page.hub().len(), 2);
        assert!(page.pane_logo(4).is_some());
        assert!(page.pane_logo(0).is_none());
        assert!(page.is_active());
    }

    #[test]
    fn test_frame_draws_grid_and_header() {
        let mut page = page();
        let canvas = page.frame(1.0 / 60.0);
        assert!(canvas.len() > 9);
        assert_eq!(canvas.quads()[0].rect(), Rect::new(0.0, 0.0, 480.0, 360.0));
        assert!(page.header().canvas().mutations() > 0);
    }

    #[test]
    fn test_unmount_releases_everything() {
        let mut page = page();
        page.apply(ControlAction::ToggleAutoplay);
        page.frame(0.016);
        page.unmount();
        assert!(page.hub().is_empty());
        assert!(!page.header().is_running());

        let logo_mutations = page.pane_logo(4).unwrap().canvas().mutations();
        let header_mutations = page.header().canvas().mutations();
        page.frame(0.016);
        page.frame(0.016);
        assert_eq!(page.pane_logo(4).unwrap().canvas().mutations(), logo_mutations);
        assert_eq!(page.header().canvas().mutations(), header_mutations);
        assert!(!page.is_active());
    }

    #[test]
    fn test_pointer_hovers_pane_under_it() {
        let mut page = page();
        let point = pane_center(&page, 2);
        page.handle_pointer(&PointerSample::mouse_move(point));
        assert_eq!(page.grid().layout().unwrap().hovered_index(), Some(2));

        page.handle_pointer(&PointerSample::mouse_move(Vec2::new(10.0, 10.0)));
        assert_eq!(page.grid().layout().unwrap().hovered_index(), None);

        page.handle_pointer(&PointerSample::touch_start(pane_center(&page, 6)));
        assert_eq!(page.grid().layout().unwrap().hovered_index(), Some(6));
        page.handle_pointer(&PointerSample::mouse_leave());
        assert_eq!(page.grid().layout().unwrap().hovered_index(), None);
    }

    #[test]
    fn test_hover_autoplay_runs_logo_only_when_hovered() {
        let mut page = page();
        assert_eq!(page.grid().layout().unwrap().autoplay_mode(), AutoplayMode::Hover);
        page.frame(0.016);
        let resting = page.pane_logo(4).unwrap().canvas().mutations();
        assert!(resting > 0);
        page.frame(0.016);
        assert_eq!(page.pane_logo(4).unwrap().canvas().mutations(), resting);

        let point = pane_center(&page, 4);
        page.handle_pointer(&PointerSample::mouse_move(point));
        page.frame(0.016);
        assert!(page.pane_logo(4).unwrap().canvas().mutations() > resting);
    }

    #[test]
    fn test_autoplay_all_runs_logo_unhovered() {
        let mut page = page();
        assert!(page.apply(ControlAction::ToggleAutoplay));
        page.frame(0.016);
        let first = page.pane_logo(4).unwrap().canvas().mutations();
        page.frame(0.016);
        assert!(page.pane_logo(4).unwrap().canvas().mutations() > first);
    }

    #[test]
    fn test_wrong_pane_count_shows_error_and_keeps_header() {
        let mut config = PageConfig::default();
        config.grid.frames.truncate(8);
        let mut page = Page::with_seed(config, VIEWPORT, 13);
        assert_eq!(page.grid().pane_count(), 0);
        assert!(!page.apply(ControlAction::ToggleBorders));
        // Only the header listens for input; no pane logo exists
        assert!(page.pane_logo(4).is_none());
        assert_eq!(page.hub().len(), 1);

        let canvas = page.frame(0.016);
        assert!(canvas.quads().iter().any(|q| q.color == ERROR_TEXT));
        page.frame(0.016);
        assert!(page.header().canvas().mutations() > 0);
        assert!((0..9).all(|index| page.pane_logo(index).is_none()));
    }

    #[test]
    fn test_pane_controls_need_a_hovered_pane() {
        let mut page = page();
        assert!(!page.apply(ControlAction::ContentScale(0.1)));

        let point = pane_center(&page, 0);
        page.handle_pointer(&PointerSample::mouse_move(point));
        assert!(page.apply(ControlAction::ContentScale(0.1)));
        assert!(page.apply(ControlAction::BorderSize(50.0)));
        let frame = &page.grid().layout().unwrap().frames()[0];
        assert!((frame.visuals.content_scale - 1.1).abs() < 1e-6);
        assert_eq!(frame.visuals.border_size, 100.0);

        assert!(page.apply(ControlAction::ToggleBorders));
        assert!(!page.grid().layout().unwrap().show_frame_visuals());
    }

    #[test]
    fn test_resize_follows_viewport() {
        let mut page = page();
        page.resize(Vec2::new(800.0, 600.0));
        assert_eq!(page.canvas().width(), 800.0);
        assert_eq!(page.pane_logo(4).unwrap().canvas_size(), Vec2::new(800.0, 600.0));
        assert_eq!(page.grid_bounds(), Rect::new(0.0, 64.0, 800.0, 536.0));
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(
            wrap_text("Get A Free AI Receptionist", 13),
            vec!["Get A Free AI", "Receptionist"]
        );
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("abcdefgh", 3), vec!["abc", "def", "gh"]);
        assert!(wrap_text("   ", 5).is_empty());
    }
}
