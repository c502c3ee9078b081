use std::collections::VecDeque;

/// Frames averaged by [`FrameStats::fps`].
const WINDOW: usize = 30;

/// Rolling frame-time statistics for the FPS overlay.
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frame_times: VecDeque<f32>,
    frames: u64,
}

impl FrameStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the duration of one frame, in seconds.
    pub fn record(&mut self, dt: f32) {
        if self.frame_times.len() == WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(dt);
        self.frames += 1;
    }

    /// Frames per second averaged over the last frames; 0 before any frame.
    pub fn fps(&self) -> f32 {
        let total: f32 = self.frame_times.iter().sum();
        if total <= 0.0 {
            return 0.0;
        }
        self.frame_times.len() as f32 / total
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

impl std::fmt::Display for FrameStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.0} FPS", self.fps())
    }
}
