use shadeview_common::AspectMode;
use shadeview_input::Action;
use winit::event::{MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Held to orbit (or pan, with the modifier).
pub const DRAG_BUTTON: MouseButton = MouseButton::Middle;
/// Turns a drag into a pan.
pub const PAN_MODIFIER: KeyCode = KeyCode::ShiftLeft;
/// Pixel-precise scroll (touchpads) is converted to wheel lines at this rate.
const PIXELS_PER_LINE: f32 = 50.0;

pub fn action_for_key(key: KeyCode) -> Option<Action> {
    match key {
        KeyCode::KeyR => Some(Action::ResetCamera),
        KeyCode::Digit1 => Some(Action::SetAspect(AspectMode::Square)),
        KeyCode::Digit2 => Some(Action::SetAspect(AspectMode::Widescreen)),
        KeyCode::Escape => Some(Action::Exit),
        _ => None,
    }
}

/// Scroll amount in wheel lines, positive away from the user.
pub fn wheel_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
    }
}
