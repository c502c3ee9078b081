use crate::action::Action;
use glam::Vec2;

/// Mouse state the camera controller reads once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    /// Middle mouse button held.
    pub drag: bool,
    /// Pan modifier held.
    pub modifier: bool,
    /// Pointer motion since the previous frame, in pixels (+y is down).
    pub mouse_delta: Vec2,
    /// Wheel motion since the previous frame, in lines (+ is away from the user).
    pub wheel: f32,
}

/// Everything the frame loop needs from input for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSnapshot {
    pub camera: CameraInput,
    /// Cursor position in window pixels, if the cursor is inside the window.
    pub cursor: Option<Vec2>,
    /// Actions in the order their keys were pressed.
    pub actions: Vec<Action>,
}

/// Accumulates input events between frames.
///
/// Held-button state persists across frames; deltas and actions are
/// drained by [`FrameInput::take`].
#[derive(Debug, Default)]
pub struct FrameInput {
    drag: bool,
    modifier: bool,
    mouse_delta: Vec2,
    wheel: f32,
    cursor: Option<Vec2>,
    actions: Vec<Action>,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_drag(&mut self, down: bool) {
        self.drag = down;
    }

    pub fn set_modifier(&mut self, down: bool) {
        self.modifier = down;
    }

    pub fn add_motion(&mut self, dx: f32, dy: f32) {
        self.mouse_delta += Vec2::new(dx, dy);
    }

    pub fn add_wheel(&mut self, lines: f32) {
        self.wheel += lines;
    }

    pub fn set_cursor(&mut self, position: Option<Vec2>) {
        self.cursor = position;
    }

    pub fn push_action(&mut self, action: Action) {
        self.actions.push(action);
    }

    /// Snapshot this frame's input and reset the per-frame accumulators.
    pub fn take(&mut self) -> FrameSnapshot {
        let snapshot = FrameSnapshot {
            camera: CameraInput {
                drag: self.drag,
                modifier: self.modifier,
                mouse_delta: self.mouse_delta,
                wheel: self.wheel,
            },
            cursor: self.cursor,
            actions: std::mem::take(&mut self.actions),
        };
        self.mouse_delta = Vec2::ZERO;
        self.wheel = 0.0;
        snapshot
    }
}
