use crate::loader::SourceStamps;
use std::time::{Duration, Instant};

/// Polling cadence and settle interval for hot-reload.
#[derive(Debug, Clone)]
pub struct ReloadConfig {
    /// Stamps are read on every Nth frame.
    pub interval_frames: u64,
    /// A detected change must stay unchanged this long before it is reloaded,
    /// so editors that write in several steps are not read half-way.
    pub settle: Duration,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            interval_frames: 10,
            settle: Duration::from_millis(150),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Sources match the loaded program.
    Stable,
    /// A change was seen and is waiting out the settle interval.
    Settling,
}

#[derive(Debug, Clone, Copy)]
struct PendingChange {
    since: Instant,
    observed: SourceStamps,
}

/// Decides, frame by frame, when the tracked sources should be reloaded.
///
/// The monitor never blocks: a change is recorded when first seen and
/// reported on a later frame once the settle interval has elapsed with the
/// stamps unchanged.
#[derive(Debug)]
pub struct ReloadMonitor {
    config: ReloadConfig,
    frame: u64,
    pending: Option<PendingChange>,
}

impl ReloadMonitor {
    pub fn new(config: ReloadConfig) -> Self {
        Self {
            config,
            frame: 0,
            pending: None,
        }
    }

    pub fn state(&self) -> MonitorState {
        if self.pending.is_some() {
            MonitorState::Settling
        } else {
            MonitorState::Stable
        }
    }

    /// Advance one frame. Returns true when the caller should reload now.
    ///
    /// `loaded` are the stamps recorded for the currently installed program;
    /// `observe` reads the stamps on disk and is called at most once.
    pub fn poll(
        &mut self,
        now: Instant,
        loaded: &SourceStamps,
        observe: impl FnOnce() -> SourceStamps,
    ) -> bool {
        self.frame += 1;

        match self.pending {
            Some(pending) => {
                if now.duration_since(pending.since) < self.config.settle {
                    return false;
                }
                let observed = observe();
                if observed != pending.observed {
                    tracing::debug!("shader source still changing, restarting settle interval");
                    self.pending = Some(PendingChange {
                        since: now,
                        observed,
                    });
                    return false;
                }
                self.pending = None;
                observed.is_newer_than(loaded)
            }
            None => {
                if self.frame % self.config.interval_frames.max(1) != 0 {
                    return false;
                }
                let observed = observe();
                if observed.is_newer_than(loaded) {
                    tracing::debug!("shader source change detected");
                    self.pending = Some(PendingChange {
                        since: now,
                        observed,
                    });
                }
                false
            }
        }
    }
}

impl Default for ReloadMonitor {
    fn default() -> Self {
        Self::new(ReloadConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::SystemTime;

    fn stamps(secs: u64) -> SourceStamps {
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(secs);
        SourceStamps {
            vertex: Some(SystemTime::UNIX_EPOCH),
            fragment: Some(t),
        }
    }

    /// Runs `frames` frames 16ms apart, returning how many reloads fired.
    /// A fired reload installs the observed stamps, like the frame loop does.
    fn run(
        monitor: &mut ReloadMonitor,
        start: Instant,
        frames: u64,
        loaded: &mut SourceStamps,
        disk: SourceStamps,
    ) -> usize {
        let mut reloads = 0;
        for i in 0..frames {
            let now = start + Duration::from_millis(16 * i);
            if monitor.poll(now, loaded, || disk) {
                *loaded = disk;
                reloads += 1;
            }
        }
        reloads
    }

    #[test]
    fn unchanged_sources_never_reload() {
        let mut monitor = ReloadMonitor::default();
        let mut loaded = stamps(1);
        assert_eq!(run(&mut monitor, Instant::now(), 200, &mut loaded, stamps(1)), 0);
        assert_eq!(monitor.state(), MonitorState::Stable);
    }

    #[test]
    fn one_reload_per_change() {
        let mut monitor = ReloadMonitor::default();
        let mut loaded = stamps(1);
        let start = Instant::now();

        assert_eq!(run(&mut monitor, start, 200, &mut loaded, stamps(2)), 1);
        assert_eq!(loaded, stamps(2));

        let later = start + Duration::from_secs(10);
        assert_eq!(run(&mut monitor, later, 200, &mut loaded, stamps(3)), 1);
        assert_eq!(monitor.state(), MonitorState::Stable);
    }

    #[test]
    fn reads_only_on_cadence_ticks() {
        let mut monitor = ReloadMonitor::default();
        let start = Instant::now();
        let mut reads = 0;
        for i in 0..30 {
            monitor.poll(start + Duration::from_millis(i), &stamps(1), || {
                reads += 1;
                stamps(1)
            });
        }
        assert_eq!(reads, 3);
    }

    #[test]
    fn waits_for_settle_interval() {
        let mut monitor = ReloadMonitor::new(ReloadConfig {
            interval_frames: 1,
            settle: Duration::from_millis(150),
        });
        let start = Instant::now();
        let loaded = stamps(1);

        assert!(!monitor.poll(start, &loaded, || stamps(2)));
        assert_eq!(monitor.state(), MonitorState::Settling);
        assert!(!monitor.poll(start + Duration::from_millis(100), &loaded, || stamps(2)));
        assert!(monitor.poll(start + Duration::from_millis(150), &loaded, || stamps(2)));
        assert_eq!(monitor.state(), MonitorState::Stable);
    }

    #[test]
    fn change_during_settle_restarts_interval() {
        let mut monitor = ReloadMonitor::new(ReloadConfig {
            interval_frames: 1,
            settle: Duration::from_millis(150),
        });
        let start = Instant::now();
        let loaded = stamps(1);

        assert!(!monitor.poll(start, &loaded, || stamps(2)));
        // Still being written when the interval runs out.
        assert!(!monitor.poll(start + Duration::from_millis(160), &loaded, || stamps(3)));
        assert!(!monitor.poll(start + Duration::from_millis(200), &loaded, || stamps(3)));
        assert!(monitor.poll(start + Duration::from_millis(310), &loaded, || stamps(3)));
    }
}
