// SPDX-License-Identifier: GPL-3.0-only

//! Shutter state machine
//!
//! ```text
//!            press (budget > 0)
//!   ┌──────┐ ─────────────────▶ ┌────────────┐
//!   │ Idle │                    │ Developing │
//!   └──────┘ ◀───────────────── └────────────┘
//!            delay elapsed (always)
//! ```
//!
//! All transitions are driven by the caller's clock, so the machine has no
//! timers of its own. The caller snapshots the live frame when [`poll`]
//! reports the development is due.
//!
//! [`poll`]: ShotPipeline::poll

use crate::constants::timing;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShotState {
    #[default]
    Idle,
    /// Waiting for the mechanical delay to elapse
    Developing { ready_at: Instant },
}

/// Why a shutter press was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutterRejection {
    /// No exposures left on the roll
    OutOfFilm,
    /// A shot is still developing
    Busy,
}

/// Result of a shutter press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutterOutcome {
    Accepted { flash: bool },
    Ignored(ShutterRejection),
}

/// Durations used by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotTiming {
    pub develop_delay: Duration,
    pub shutter_pulse: Duration,
    pub flash_pulse: Duration,
}

impl Default for ShotTiming {
    fn default() -> Self {
        Self {
            develop_delay: timing::DEVELOP_DELAY,
            shutter_pulse: timing::SHUTTER_PULSE,
            flash_pulse: timing::FLASH_PULSE,
        }
    }
}

/// Shot pipeline
#[derive(Debug, Clone, Default)]
pub struct ShotPipeline {
    timing: ShotTiming,
    state: ShotState,
    shutter_until: Option<Instant>,
    flash_until: Option<Instant>,
}

impl ShotPipeline {
    pub fn new(timing: ShotTiming) -> Self {
        Self {
            timing,
            ..Self::default()
        }
    }

    pub fn state(&self) -> ShotState {
        self.state
    }

    pub fn is_developing(&self) -> bool {
        matches!(self.state, ShotState::Developing { .. })
    }

    /// Press the shutter
    ///
    /// Presses while developing or with an empty roll are dropped; nothing is
    /// queued.
    pub fn press(&mut self, now: Instant, remaining: u32, flash_enabled: bool) -> ShutterOutcome {
        if remaining == 0 {
            debug!("Shutter ignored: out of film");
            return ShutterOutcome::Ignored(ShutterRejection::OutOfFilm);
        }
        if self.is_developing() {
            debug!("Shutter ignored: still developing");
            return ShutterOutcome::Ignored(ShutterRejection::Busy);
        }

        self.state = ShotState::Developing {
            ready_at: now + self.timing.develop_delay,
        };
        self.shutter_until = Some(now + self.timing.shutter_pulse);
        self.flash_until = flash_enabled.then(|| now + self.timing.flash_pulse);
        info!(remaining, flash = flash_enabled, "Shutter released");
        ShutterOutcome::Accepted {
            flash: flash_enabled,
        }
    }

    /// Advance to `now`
    ///
    /// Returns true exactly once per accepted press, when the development
    /// delay has elapsed; the pipeline is Idle again afterwards.
    pub fn poll(&mut self, now: Instant) -> bool {
        if self.shutter_until.is_some_and(|t| now >= t) {
            self.shutter_until = None;
        }
        if self.flash_until.is_some_and(|t| now >= t) {
            self.flash_until = None;
        }
        match self.state {
            ShotState::Developing { ready_at } if now >= ready_at => {
                self.state = ShotState::Idle;
                true
            }
            _ => false,
        }
    }

    /// True while the shutter-release pulse is showing
    pub fn shutter_active(&self, now: Instant) -> bool {
        self.shutter_until.is_some_and(|t| now < t)
    }

    /// True while the flash pulse is showing
    pub fn flash_active(&self, now: Instant) -> bool {
        self.flash_until.is_some_and(|t| now < t)
    }

    /// Earliest pending deadline, for scheduling the next tick
    pub fn next_deadline(&self) -> Option<Instant> {
        let developing = match self.state {
            ShotState::Developing { ready_at } => Some(ready_at),
            ShotState::Idle => None,
        };
        [developing, self.shutter_until, self.flash_until]
            .into_iter()
            .flatten()
            .min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_develops_after_delay() {
        let t0 = Instant::now();
        let mut shot = ShotPipeline::default();
        assert_eq!(
            shot.press(t0, 24, false),
            ShutterOutcome::Accepted { flash: false }
        );
        assert!(shot.shutter_active(t0));
        assert!(!shot.flash_active(t0));

        assert!(!shot.poll(t0 + Duration::from_millis(599)));
        assert!(shot.poll(t0 + timing::DEVELOP_DELAY));
        assert_eq!(shot.state(), ShotState::Idle);
        assert!(!shot.poll(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_reentrant_press_is_ignored() {
        let t0 = Instant::now();
        let mut shot = ShotPipeline::default();
        shot.press(t0, 24, false);
        assert_eq!(
            shot.press(t0 + Duration::from_millis(100), 23, false),
            ShutterOutcome::Ignored(ShutterRejection::Busy)
        );
    }

    #[test]
    fn test_empty_roll_is_ignored() {
        let mut shot = ShotPipeline::default();
        assert_eq!(
            shot.press(Instant::now(), 0, true),
            ShutterOutcome::Ignored(ShutterRejection::OutOfFilm)
        );
        assert!(!shot.is_developing());
        assert!(shot.next_deadline().is_none());
    }

    #[test]
    fn test_flash_pulse_ends() {
        let t0 = Instant::now();
        let mut shot = ShotPipeline::default();
        shot.press(t0, 1, true);
        assert!(shot.flash_active(t0));
        assert_eq!(shot.next_deadline(), Some(t0 + timing::FLASH_PULSE));
        shot.poll(t0 + timing::FLASH_PULSE);
        assert!(!shot.flash_active(t0 + timing::FLASH_PULSE));
    }
}
