use chrono::{DateTime, Duration, Utc};

/// Half-open `[start, end)` span sent to the usage API as epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn start_ts(&self) -> i64 {
        self.start.timestamp()
    }

    pub fn end_ts(&self) -> i64 {
        self.end.timestamp()
    }

    pub fn width(&self) -> Duration {
        self.end - self.start
    }
}

/// Windows of at most `max_width`, newest first, from `now` back to `now - horizon`.
///
/// The oldest window is clamped to the horizon boundary, so it may be narrower.
/// A zero horizon or zero width produces no windows.
#[derive(Debug, Clone)]
pub struct BackwardWindows {
    stop: DateTime<Utc>,
    cursor: DateTime<Utc>,
    max_width: Duration,
}

impl BackwardWindows {
    pub fn new(now: DateTime<Utc>, horizon: Duration, max_width: Duration) -> Self {
        let max_width = if max_width > Duration::zero() {
            max_width
        } else {
            Duration::zero()
        };
        Self {
            stop: now - horizon,
            cursor: now,
            max_width,
        }
    }

    pub fn days(now: DateTime<Utc>, horizon_days: u32, window_days: u32) -> Self {
        Self::new(
            now,
            Duration::days(i64::from(horizon_days)),
            Duration::days(i64::from(window_days)),
        )
    }
}

impl Iterator for BackwardWindows {
    type Item = TimeWindow;

    fn next(&mut self) -> Option<TimeWindow> {
        if self.cursor <= self.stop || self.max_width.is_zero() {
            return None;
        }
        let end = self.cursor;
        let start = (end - self.max_width).max(self.stop);
        self.cursor = start;
        Some(TimeWindow { start, end })
    }
}
