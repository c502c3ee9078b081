/// Seconds a message takes to fade out completely.
pub const MESSAGE_DURATION: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

impl MessageKind {
    /// Display color as sRGB bytes.
    pub fn color(self) -> [u8; 3] {
        match self {
            MessageKind::Info => [230, 230, 230],
            MessageKind::Success => [0, 228, 48],
            MessageKind::Error => [230, 41, 55],
        }
    }
}

/// A status line that fades out linearly after it is posted.
///
/// Fully faded messages are kept (and simply not drawn) until replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct TransientMessage {
    pub text: String,
    pub kind: MessageKind,
    /// Clock time, in seconds, when the message was posted.
    pub created_at: f64,
}

impl TransientMessage {
    pub fn new(text: impl Into<String>, kind: MessageKind, now: f64) -> Self {
        let text = text.into();
        match kind {
            MessageKind::Error => tracing::warn!("{text}"),
            _ => tracing::info!("{text}"),
        }
        Self {
            text,
            kind,
            created_at: now,
        }
    }

    pub fn color(&self) -> [u8; 3] {
        self.kind.color()
    }

    /// Opacity at clock time `now`: 1 when posted, 0 from [`MESSAGE_DURATION`] on.
    pub fn alpha(&self, now: f64) -> f32 {
        let age = (now - self.created_at).max(0.0);
        (1.0 - age / MESSAGE_DURATION).clamp(0.0, 1.0) as f32
    }

    pub fn is_visible(&self, now: f64) -> bool {
        self.alpha(now) > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_message_is_opaque() {
        let msg = TransientMessage::new("Shader reloaded", MessageKind::Success, 3.0);
        assert_eq!(msg.alpha(3.0), 1.0);
        assert!(msg.is_visible(3.0));
    }

    #[test]
    fn fades_linearly() {
        let msg = TransientMessage::new("Camera reset", MessageKind::Info, 0.0);
        assert!((msg.alpha(2.5) - 0.75).abs() < 1e-6);
        assert!((msg.alpha(5.0) - 0.5).abs() < 1e-6);
        assert!(msg.alpha(9.0) > msg.alpha(9.5));
    }

    #[test]
    fn invisible_after_duration() {
        let msg = TransientMessage::new("Failed to load shader", MessageKind::Error, 1.0);
        assert_eq!(msg.alpha(11.0), 0.0);
        assert_eq!(msg.alpha(500.0), 0.0);
        assert!(!msg.is_visible(11.0));
    }

    #[test]
    fn clock_before_creation_is_opaque() {
        let msg = TransientMessage::new("x", MessageKind::Info, 5.0);
        assert_eq!(msg.alpha(4.0), 1.0);
    }

    #[test]
    fn error_styling_differs() {
        assert_ne!(MessageKind::Error.color(), MessageKind::Success.color());
    }
}
