// SPDX-License-Identifier: GPL-3.0-only

//! Debug console
//!
//! A short, newest-first log shown in an overlay, and the hidden tap
//! gesture that toggles it.

use crate::constants::debug as consts;
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub text: String,
}

impl std::fmt::Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.at.format("%H:%M:%S"), self.text)
    }
}

/// Bounded console log, newest first
///
/// Every line is also emitted as a `tracing` debug event.
#[derive(Debug, Clone)]
pub struct DebugLog {
    lines: VecDeque<LogLine>,
    capacity: usize,
}

impl DebugLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.push_at(Local::now(), text);
    }

    pub fn push_at(&mut self, at: DateTime<Local>, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(target: "retrocam::console", "{}", text);
        self.lines.push_front(LogLine { at, text });
        self.lines.truncate(self.capacity);
    }

    /// Lines, newest first
    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new(consts::LOG_CAPACITY)
    }
}

/// Rapid-tap counter
///
/// Each tap restarts a flat reset window. Reaching the threshold before a
/// window runs out fires once and starts counting from zero again.
#[derive(Debug, Clone)]
pub struct TapCounter {
    threshold: u32,
    window: Duration,
    count: u32,
    reset_at: Option<Instant>,
}

impl TapCounter {
    pub fn new(threshold: u32, window: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            window,
            count: 0,
            reset_at: None,
        }
    }

    /// Register a tap at `now`. Returns true when the threshold is reached.
    pub fn tap(&mut self, now: Instant) -> bool {
        self.expire(now);
        self.count += 1;
        if self.count >= self.threshold {
            self.count = 0;
            self.reset_at = None;
            return true;
        }
        self.reset_at = Some(now + self.window);
        false
    }

    /// Drop the count if the window ran out before `now`
    pub fn expire(&mut self, now: Instant) {
        if self.reset_at.is_some_and(|deadline| now >= deadline) {
            self.count = 0;
            self.reset_at = None;
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.reset_at
    }
}

impl Default for TapCounter {
    fn default() -> Self {
        Self::new(consts::TAP_THRESHOLD, consts::TAP_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_newest_first_and_bounded() {
        let mut log = DebugLog::new(3);
        for i in 0..5 {
            log.push(format!("line {}", i));
        }
        let texts: Vec<_> = log.lines().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, ["line 4", "line 3", "line 2"]);
    }

    #[test]
    fn test_five_quick_taps_fire() {
        let t0 = Instant::now();
        let mut taps = TapCounter::default();
        for i in 0..4 {
            assert!(!taps.tap(t0 + Duration::from_millis(900 * i)));
        }
        assert!(taps.tap(t0 + Duration::from_millis(3600)));
        assert_eq!(taps.count(), 0);
    }

    #[test]
    fn test_gap_resets_count() {
        let t0 = Instant::now();
        let mut taps = TapCounter::default();
        for i in 0..4 {
            taps.tap(t0 + Duration::from_millis(100 * i));
        }
        // Window restarts on the last tap at 300ms, so 1300ms is a reset
        assert!(!taps.tap(t0 + Duration::from_millis(1300)));
        assert_eq!(taps.count(), 1);
    }
}
