use winit::keyboard::KeyCode;

pub const HOVER_UNITS_STEP: f32 = 0.5;
pub const GAP_STEP: f32 = 1.0;
pub const CONTENT_SCALE_STEP: f32 = 0.1;
pub const BORDER_THICKNESS_STEP: f32 = 1.0;
pub const BORDER_SIZE_STEP: f32 = 5.0;

/// Runtime adjustments to the grid, bound to the keyboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlAction {
    ToggleBorders,
    ToggleAutoplay,
    HoverUnits(f32),
    Gap(f32),
    /// Applied to the hovered pane only
    ContentScale(f32),
    BorderThickness(f32),
    BorderSize(f32),
}

impl ControlAction {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        let action = match key {
            KeyCode::KeyB => ControlAction::ToggleBorders,
            KeyCode::KeyA => ControlAction::ToggleAutoplay,
            KeyCode::Equal => ControlAction::HoverUnits(HOVER_UNITS_STEP),
            KeyCode::Minus => ControlAction::HoverUnits(-HOVER_UNITS_STEP),
            KeyCode::BracketRight => ControlAction::Gap(GAP_STEP),
            KeyCode::BracketLeft => ControlAction::Gap(-GAP_STEP),
            KeyCode::KeyW => ControlAction::ContentScale(CONTENT_SCALE_STEP),
            KeyCode::KeyQ => ControlAction::ContentScale(-CONTENT_SCALE_STEP),
            KeyCode::KeyE => ControlAction::BorderThickness(BORDER_THICKNESS_STEP),
            KeyCode::KeyD => ControlAction::BorderThickness(-BORDER_THICKNESS_STEP),
            KeyCode::KeyR => ControlAction::BorderSize(BORDER_SIZE_STEP),
            KeyCode::KeyF => ControlAction::BorderSize(-BORDER_SIZE_STEP),
            _ => return None,
        };
        Some(action)
    }

    /// Whether the action needs a hovered pane to act on.
    pub fn targets_pane(&self) -> bool {
        matches!(
            self,
            ControlAction::ContentScale(_)
                | ControlAction::BorderThickness(_)
                | ControlAction::BorderSize(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        assert_eq!(ControlAction::from_key(KeyCode::KeyB), Some(ControlAction::ToggleBorders));
        assert_eq!(
            ControlAction::from_key(KeyCode::Minus),
            Some(ControlAction::HoverUnits(-HOVER_UNITS_STEP))
        );
        assert_eq!(ControlAction::from_key(KeyCode::BracketRight), Some(ControlAction::Gap(1.0)));
        assert_eq!(ControlAction::from_key(KeyCode::KeyZ), None);
        assert_eq!(ControlAction::from_key(KeyCode::Escape), None);
    }

    #[test]
    fn test_pane_actions() {
        assert!(ControlAction::ContentScale(0.1).targets_pane());
        assert!(ControlAction::BorderSize(5.0).targets_pane());
        assert!(!ControlAction::Gap(1.0).targets_pane());
        assert!(!ControlAction::ToggleAutoplay.targets_pane());
    }
}
