//! Pointer input tracking
//!
//! The host forwards raw browser events; the tracker keeps the latest
//! pointer position, the interaction flags and the shot rate limit.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Input events the cursor understands (viewport coordinates)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Pointer moved
    PointerMove { x: f32, y: f32 },
    /// Button pressed (fires a laser if the cooldown allows)
    PointerDown { x: f32, y: f32 },
    /// Button released
    PointerUp,
    /// Pointer left the window
    PointerLeave,
    /// Pointer came back into the window
    PointerEnter,
    /// Pointer entered an interactive element (link, button, card)
    HoverStart,
    /// Pointer left an interactive element
    HoverEnd,
    /// Press started a drag on a draggable widget
    DragStart,
    /// Drag released
    DragEnd,
}

/// Latest raw input state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputTracker {
    /// Raw pointer position (unsmoothed)
    pub raw: Vec2,
    pub hovering: bool,
    pub dragging: bool,
    pub clicking: bool,
    /// Pointer is inside the window
    pub visible: bool,
    /// Clock time (µs) of the last accepted shot
    pub last_shot_us: Option<u64>,
}

impl Default for InputTracker {
    fn default() -> Self {
        Self {
            raw: Vec2::ZERO,
            hovering: false,
            dragging: false,
            clicking: false,
            visible: true,
            last_shot_us: None,
        }
    }
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept a shot if at least `cooldown_us` passed since the last one
    ///
    /// Rejected presses are dropped, not queued.
    pub fn try_fire(&mut self, now_us: u64, cooldown_us: u64) -> bool {
        if let Some(last) = self.last_shot_us {
            if now_us.saturating_sub(last) < cooldown_us {
                return false;
            }
        }
        self.last_shot_us = Some(now_us);
        true
    }

    /// Apply one event. Returns the shot origin when a press is accepted.
    pub fn apply(&mut self, event: InputEvent, now_us: u64, cooldown_us: u64) -> Option<Vec2> {
        match event {
            InputEvent::PointerMove { x, y } => {
                self.raw = Vec2::new(x, y);
                None
            }
            InputEvent::PointerDown { x, y } => {
                if !self.try_fire(now_us, cooldown_us) {
                    return None;
                }
                self.clicking = true;
                Some(Vec2::new(x, y))
            }
            InputEvent::PointerUp => {
                self.clicking = false;
                self.dragging = false;
                None
            }
            InputEvent::PointerLeave => {
                self.visible = false;
                None
            }
            InputEvent::PointerEnter => {
                self.visible = true;
                None
            }
            InputEvent::HoverStart => {
                self.hovering = true;
                None
            }
            InputEvent::HoverEnd => {
                self.hovering = false;
                None
            }
            InputEvent::DragStart => {
                self.dragging = true;
                None
            }
            InputEvent::DragEnd => {
                self.dragging = false;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: u64 = 200_000;

    #[test]
    fn test_move_updates_raw() {
        let mut input = InputTracker::new();
        input.apply(InputEvent::PointerMove { x: 12.0, y: 34.0 }, 0, COOLDOWN);
        assert_eq!(input.raw, Vec2::new(12.0, 34.0));
    }

    #[test]
    fn test_cooldown() {
        let mut input = InputTracker::new();
        let down = InputEvent::PointerDown { x: 1.0, y: 2.0 };

        assert_eq!(input.apply(down, 1_000_000, COOLDOWN), Some(Vec2::new(1.0, 2.0)));
        assert!(input.clicking);
        input.apply(InputEvent::PointerUp, 1_010_000, COOLDOWN);
        assert!(!input.clicking);

        // 50 ms later: dropped, and does not restart the cooldown
        assert_eq!(input.apply(down, 1_050_000, COOLDOWN), None);
        assert!(!input.clicking);
        assert_eq!(input.last_shot_us, Some(1_000_000));

        // Exactly at the cooldown: accepted
        assert!(input.apply(down, 1_200_000, COOLDOWN).is_some());
    }

    #[test]
    fn test_first_shot_always_accepted() {
        let mut input = InputTracker::new();
        assert!(input.try_fire(0, COOLDOWN));
        assert!(!input.try_fire(199_999, COOLDOWN));
        assert!(input.try_fire(250_000, COOLDOWN));
    }

    #[test]
    fn test_flags() {
        let mut input = InputTracker::new();
        assert!(input.visible);

        input.apply(InputEvent::PointerLeave, 0, COOLDOWN);
        assert!(!input.visible);
        input.apply(InputEvent::PointerEnter, 0, COOLDOWN);
        assert!(input.visible);

        input.apply(InputEvent::HoverStart, 0, COOLDOWN);
        assert!(input.hovering);
        input.apply(InputEvent::HoverEnd, 0, COOLDOWN);
        assert!(!input.hovering);

        input.apply(InputEvent::DragStart, 0, COOLDOWN);
        assert!(input.dragging);
        input.apply(InputEvent::PointerUp, 0, COOLDOWN);
        assert!(!input.dragging);

        input.apply(InputEvent::DragStart, 0, COOLDOWN);
        input.apply(InputEvent::DragEnd, 0, COOLDOWN);
        assert!(!input.dragging);
    }
}
