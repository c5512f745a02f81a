use glam::Vec2;

/// Pointer buttons the camera controls react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left button: orbit.
    Primary,
    /// Wheel button: dolly.
    Middle,
    /// Right button: pan.
    Secondary,
}

/// An input event delivered by the host to the camera controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    PointerDown { button: PointerButton, position: Vec2 },
    PointerMove { position: Vec2 },
    PointerUp { button: PointerButton },
    /// Scroll wheel. Negative `delta_y` scrolls up (towards the target).
    Wheel { delta_y: f32 },
    /// Pointer left the element or focus was lost; ends any drag.
    Cancel,
}

impl ControlEvent {
    pub fn down(button: PointerButton, x: f32, y: f32) -> Self {
        Self::PointerDown {
            button,
            position: Vec2::new(x, y),
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self::PointerMove {
            position: Vec2::new(x, y),
        }
    }
}
