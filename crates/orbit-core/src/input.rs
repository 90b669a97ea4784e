use crate::camera::Screen;

/// Horizontal travel, in pixels, below which a press/release is a tap.
pub const DRAG_THRESHOLD_PX: f32 = 6.0;

pub(crate) const WHEEL_STEP: f32 = 0.2;
pub(crate) const DRAG_STEP: f32 = 0.025;

/// Everything a host may feed a carousel. Pointer coordinates are relative
/// to the carousel's own container, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Resize(Screen),
    /// Positive deltas scroll forward, as a browser `deltaY` does.
    Wheel { delta: f32 },
    PointerDown { x: f32 },
    PointerMove { x: f32 },
    /// Touch releases carry no position; the last seen one is used.
    PointerUp { x: Option<f32> },
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct DragState {
    pub is_down: bool,
    pub start: f32,
    pub last_x: f32,
    pub distance: f32,
}

impl DragState {
    pub fn press(&mut self, x: f32) {
        self.is_down = true;
        self.start = x;
        self.last_x = x;
        self.distance = 0.0;
    }

    /// Returns the signed pixel travel since the press.
    pub fn track(&mut self, x: f32) -> f32 {
        self.last_x = x;
        let travel = self.start - x;
        self.distance = self.distance.max(travel.abs());
        travel
    }

    /// Returns whether the gesture moved far enough to count as a drag.
    pub fn release(&mut self, x: Option<f32>) -> bool {
        if let Some(x) = x {
            self.track(x);
        }
        self.is_down = false;
        self.distance >= DRAG_THRESHOLD_PX
    }
}
