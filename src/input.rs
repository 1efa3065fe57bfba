use glam::Vec2;
use log::debug;

use crate::canvas::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerDevice {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    /// Touch pressed (or a mouse entered)
    Start,
    Move,
    /// Touch released or cancelled, mouse left the surface
    End,
}

/// One normalized pointer event. Mouse and touch input both arrive as these,
/// so consumers never see device-specific events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub phase: PointerPhase,
    pub device: PointerDevice,
    pub position: Vec2,
}

impl PointerSample {
    pub fn mouse_move(position: Vec2) -> Self {
        Self {
            phase: PointerPhase::Move,
            device: PointerDevice::Mouse,
            position,
        }
    }

    pub fn mouse_leave() -> Self {
        Self {
            phase: PointerPhase::End,
            device: PointerDevice::Mouse,
            position: Vec2::ZERO,
        }
    }

    pub fn touch_start(position: Vec2) -> Self {
        Self {
            phase: PointerPhase::Start,
            device: PointerDevice::Touch,
            position,
        }
    }

    pub fn touch_move(position: Vec2) -> Self {
        Self {
            phase: PointerPhase::Move,
            device: PointerDevice::Touch,
            position,
        }
    }

    pub fn touch_end(position: Vec2) -> Self {
        Self {
            phase: PointerPhase::End,
            device: PointerDevice::Touch,
            position,
        }
    }

    fn ended(&self) -> Self {
        Self {
            phase: PointerPhase::End,
            ..*self
        }
    }
}

/// Pointer target as seen by one particle canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    target: Vec2,
    hovering: bool,
    touching: bool,
}

impl PointerState {
    pub fn centered(center: Vec2) -> Self {
        Self {
            target: center,
            hovering: false,
            touching: false,
        }
    }

    /// Fold a canvas-local sample into the state. Ending an interaction parks
    /// the target at `center` so scattered particles relax.
    pub fn apply(&mut self, sample: &PointerSample, center: Vec2) {
        match (sample.phase, sample.device) {
            (PointerPhase::Start, PointerDevice::Touch) => {
                self.touching = true;
                self.target = sample.position;
            }
            (PointerPhase::Start, PointerDevice::Mouse) | (PointerPhase::Move, PointerDevice::Mouse) => {
                self.hovering = true;
                self.target = sample.position;
            }
            (PointerPhase::Move, PointerDevice::Touch) => {
                self.target = sample.position;
            }
            (PointerPhase::End, _) => {
                self.touching = false;
                self.hovering = false;
                self.target = center;
            }
        }
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// A mouse over the canvas always interacts; touch only while pressed.
    pub fn is_interacting(&self) -> bool {
        self.hovering || self.touching
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug)]
struct Subscription {
    id: SubscriptionId,
    region: Rect,
    scale: f32,
    inside: bool,
}

/// Fans window-space pointer samples out to the surfaces under the pointer,
/// in each surface's local coordinates. A surface the pointer leaves gets a
/// synthesized `End`.
#[derive(Debug, Default)]
pub struct InputHub {
    next_id: u64,
    subscriptions: Vec<Subscription>,
}

impl InputHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for pointer samples over `region`, whose content is drawn at `scale`.
    pub fn subscribe(&mut self, region: Rect, scale: f32) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription {
            id,
            region,
            scale,
            inside: false,
        });
        debug!("input subscription {:?} over {:?}", id, region);
        id
    }

    pub fn update_region(&mut self, id: SubscriptionId, region: Rect, scale: f32) {
        if let Some(sub) = self.subscriptions.iter_mut().find(|s| s.id == id) {
            sub.region = region;
            sub.scale = scale;
        }
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        let removed = self.subscriptions.len() != before;
        if removed {
            debug!("input subscription {:?} removed", id);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    pub fn route(&mut self, sample: &PointerSample) -> Vec<(SubscriptionId, PointerSample)> {
        let mut delivered = Vec::new();
        for sub in &mut self.subscriptions {
            let hit = sample.phase != PointerPhase::End && sub.region.contains(sample.position);
            let scale = if sub.scale > 0.0 { sub.scale } else { 1.0 };
            let local = PointerSample {
                position: (sample.position - sub.region.origin()) / scale,
                ..*sample
            };
            if hit {
                sub.inside = true;
                delivered.push((sub.id, local));
            } else if sub.inside {
                sub.inside = false;
                delivered.push((sub.id, local.ended()));
            }
        }
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mouse_move_interacts_and_leave_recenters() {
        let center = Vec2::new(50.0, 50.0);
        let mut state = PointerState::centered(center);
        assert!(!state.is_interacting());

        state.apply(&PointerSample::mouse_move(Vec2::new(10.0, 20.0)), center);
        assert!(state.is_interacting());
        assert_eq!(state.target(), Vec2::new(10.0, 20.0));

        state.apply(&PointerSample::mouse_leave(), center);
        assert!(!state.is_interacting());
        assert_eq!(state.target(), center);
    }

    #[test]
    fn test_touch_interacts_only_while_pressed() {
        let center = Vec2::new(16.0, 16.0);
        let mut state = PointerState::centered(center);
        state.apply(&PointerSample::touch_move(Vec2::new(3.0, 4.0)), center);
        assert!(!state.is_interacting());

        state.apply(&PointerSample::touch_start(Vec2::new(5.0, 5.0)), center);
        assert!(state.is_interacting());
        state.apply(&PointerSample::touch_move(Vec2::new(6.0, 7.0)), center);
        assert_eq!(state.target(), Vec2::new(6.0, 7.0));

        state.apply(&PointerSample::touch_end(Vec2::new(6.0, 7.0)), center);
        assert!(!state.is_interacting());
        assert_eq!(state.target(), center);
    }

    #[test]
    fn test_hub_routes_in_local_coordinates() {
        let mut hub = InputHub::new();
        let id = hub.subscribe(Rect::new(100.0, 100.0, 50.0, 50.0), 0.5);
        let routed = hub.route(&PointerSample::mouse_move(Vec2::new(110.0, 120.0)));
        assert_eq!(routed.len(), 1);
        assert_eq!(routed[0].0, id);
        assert_eq!(routed[0].1.position, Vec2::new(20.0, 40.0));
    }

    #[test]
    fn test_hub_synthesizes_leave() {
        let mut hub = InputHub::new();
        let id = hub.subscribe(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0);
        assert!(hub.route(&PointerSample::mouse_move(Vec2::new(50.0, 50.0))).is_empty());

        hub.route(&PointerSample::mouse_move(Vec2::new(5.0, 5.0)));
        let routed = hub.route(&PointerSample::mouse_move(Vec2::new(50.0, 50.0)));
        assert_eq!(routed, vec![(id, PointerSample {
            phase: PointerPhase::End,
            device: PointerDevice::Mouse,
            position: Vec2::new(50.0, 50.0),
        })]);
        // Already outside: nothing more to say
        assert!(hub.route(&PointerSample::mouse_leave()).is_empty());
    }

    #[test]
    fn test_unsubscribe_removes_listener() {
        let mut hub = InputHub::new();
        let a = hub.subscribe(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0);
        let b = hub.subscribe(Rect::new(0.0, 0.0, 10.0, 10.0), 1.0);
        assert_eq!(hub.len(), 2);
        assert!(hub.unsubscribe(a));
        assert!(!hub.unsubscribe(a));
        assert_eq!(hub.len(), 1);
        let routed = hub.route(&PointerSample::mouse_move(Vec2::new(1.0, 1.0)));
        assert_eq!(routed.len(), 1);
        assert_eq!(routed[0].0, b);
    }
}
