//! Delayed visibility: a boolean request signal turned into a render state
//! that follows the request immediately on show and lags it by a fixed grace
//! delay on hide.
//!
//! The unit owns exactly one [`HideTimer`]. Every request cancels whatever
//! is pending before acting, so a stale hide can never land after a newer
//! show. Firing is observed through [`DelayedVisibility::fired`], which the
//! owning event loop polls alongside its other inputs.

use crate::timer::HideTimer;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grace delay must be >= 0 ms, got {0}")]
    NegativeDelay(i64),
    #[error("grace delay is not a whole number of milliseconds: {0:?}")]
    NonNumericDelay(String),
    #[error("{0} token must not be empty")]
    EmptyToken(&'static str),
}

/// How long content stays rendered after a hide request. Always >= 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GraceDelay(Duration);

impl GraceDelay {
    pub const DEFAULT: GraceDelay = GraceDelay(Duration::from_millis(1000));

    pub fn from_millis(ms: i64) -> Result<Self, ConfigError> {
        u64::try_from(ms)
            .map(|ms| Self(Duration::from_millis(ms)))
            .map_err(|_| ConfigError::NegativeDelay(ms))
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }
}

impl Default for GraceDelay {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for GraceDelay {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let ms: i64 = trimmed
            .parse()
            .map_err(|_| ConfigError::NonNumericDelay(trimmed.to_string()))?;
        Self::from_millis(ms)
    }
}

impl fmt::Display for GraceDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0.as_millis())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityState {
    Hidden,
    Visible,
    /// Hide requested; still rendered until the timer fires.
    VisibleGraceful,
}

/// What the rendered content should present as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Mount,
    Unmount,
}

#[derive(Debug)]
pub struct DelayedVisibility {
    delay: GraceDelay,
    requested: bool,
    rendered: bool,
    timer: HideTimer,
}

impl DelayedVisibility {
    pub fn new(delay: GraceDelay, initial: bool) -> Self {
        Self {
            delay,
            requested: initial,
            rendered: initial,
            timer: HideTimer::default(),
        }
    }

    /// Apply a visibility request and return the render state right after it.
    ///
    /// A show takes effect now. A hide keeps the content rendered and (re)arms
    /// the grace timer; hiding something that is not rendered arms nothing.
    pub fn observe(&mut self, requested: bool) -> bool {
        let from = self.state();
        self.requested = requested;
        self.timer.cancel();
        if requested {
            self.rendered = true;
        } else if self.rendered {
            self.timer.schedule(self.delay.as_duration());
        }
        tracing::debug!(requested, ?from, to = ?self.state(), "visibility request");
        self.rendered
    }

    pub fn toggle(&mut self) -> bool {
        self.observe(!self.requested)
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn is_requested(&self) -> bool {
        self.requested
    }

    pub fn delay(&self) -> GraceDelay {
        self.delay
    }

    pub fn state(&self) -> VisibilityState {
        match (self.rendered, self.timer.is_pending()) {
            (false, _) => VisibilityState::Hidden,
            (true, false) => VisibilityState::Visible,
            (true, true) => VisibilityState::VisibleGraceful,
        }
    }

    pub fn phase(&self) -> Option<Phase> {
        match self.state() {
            VisibilityState::Hidden => None,
            VisibilityState::Visible => Some(Phase::Mount),
            VisibilityState::VisibleGraceful => Some(Phase::Unmount),
        }
    }

    /// Time left in the grace window, if one is running.
    pub fn remaining(&self) -> Option<Duration> {
        self.timer.remaining()
    }

    /// Wait for the pending hide and apply it. Pends forever when no hide is
    /// pending; safe to drop mid-wait (e.g. as a `select!` branch).
    pub async fn fired(&mut self) {
        self.timer.fired().await;
        self.rendered = false;
        tracing::debug!(delay = %self.delay, "grace delay elapsed, hidden");
    }

    /// Release the unit. Returns whether a hide was still pending; it will
    /// never be applied.
    pub fn teardown(mut self) -> bool {
        let pending = self.timer.cancel();
        if pending {
            tracing::debug!("teardown released pending hide timer");
        }
        pending
    }
}
