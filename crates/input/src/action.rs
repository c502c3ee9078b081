use shadeview_common::AspectMode;

/// A discrete, high-level action produced by a key press.
///
/// The frame loop consumes actions, never raw key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Restore the default camera pose for the current aspect.
    ResetCamera,
    /// Switch the quad aspect and reset the camera to match.
    SetAspect(AspectMode),
    /// Close the window.
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_aspect_carries_mode() {
        let a = Action::SetAspect(AspectMode::Widescreen);
        assert!(matches!(a, Action::SetAspect(AspectMode::Widescreen)));
        assert_ne!(a, Action::SetAspect(AspectMode::Square));
    }

    #[test]
    fn reset_and_exit_are_distinct() {
        assert_ne!(Action::ResetCamera, Action::Exit);
    }
}
