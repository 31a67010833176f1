// state.rs: Demo state for the wrapper and hook panels

use crate::visibility::{DelayedVisibility, GraceDelay, VisibilityState};
use crate::wrapper::{DelayMount, DelayProps, PhaseTokens};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

pub const WRAPPER_TEXT: &str = "This component is using the Delay wrapper";
pub const HOOK_TEXT: &str = "This component is using Custom Hook method";

/// Which of the two demo mechanisms an event or snapshot refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Wrapper,
    Hook,
}

/// The card rendered inside each panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemoCard {
    pub text: &'static str,
}

/// Point-in-time view of one panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub target: Target,
    pub requested: bool,
    pub rendered: bool,
    pub state: VisibilityState,
    pub class: Option<String>,
    pub remaining_ms: Option<u64>,
    #[serde(skip)]
    pub text: &'static str,
    #[serde(skip)]
    pub delay: GraceDelay,
}

impl PanelSnapshot {
    /// Fields that matter for change detection; ignores the countdown.
    pub fn key(&self) -> (bool, bool, VisibilityState) {
        (self.requested, self.rendered, self.state)
    }
}

/// Represents a UI update for both panels.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub wrapper: PanelSnapshot,
    pub hook: PanelSnapshot,
    pub elapsed: Duration,
    pub version: u64, // Incremented on any state change
}

impl Update {
    pub fn panel(&self, target: Target) -> &PanelSnapshot {
        match target {
            Target::Wrapper => &self.wrapper,
            Target::Hook => &self.hook,
        }
    }

    /// True while either panel is counting down a grace window.
    pub fn any_graceful(&self) -> bool {
        [&self.wrapper, &self.hook]
            .iter()
            .any(|p| p.state == VisibilityState::VisibleGraceful)
    }
}

/// Owns both delayed-visibility mechanisms, plus versioning.
pub struct DemoState {
    pub wrapper: DelayMount<DemoCard>,
    pub hook: DelayedVisibility,
    pub version: u64,
    started: Instant,
}

impl DemoState {
    pub fn new(delay: GraceDelay, initial: bool, tokens: PhaseTokens) -> Self {
        let props = DelayProps {
            dependency: initial,
            delay,
            tokens,
        };
        Self {
            wrapper: DelayMount::new(DemoCard { text: WRAPPER_TEXT }, props),
            hook: DelayedVisibility::new(delay, initial),
            version: 0,
            started: Instant::now(),
        }
    }

    pub fn request(&mut self, target: Target, requested: bool) {
        match target {
            Target::Wrapper => self.wrapper.set_dependency(requested),
            Target::Hook => self.hook.observe(requested),
        };
        self.version += 1;
    }

    pub fn toggle(&mut self, target: Target) {
        match target {
            Target::Wrapper => self.wrapper.toggle(),
            Target::Hook => self.hook.toggle(),
        };
        self.version += 1;
    }

    pub fn mark_fired(&mut self, target: Target) {
        tracing::debug!(?target, "panel unmounted");
        self.version += 1;
    }

    /// No grace window is running on either panel.
    pub fn is_idle(&self) -> bool {
        self.wrapper.state() != VisibilityState::VisibleGraceful
            && self.hook.state() != VisibilityState::VisibleGraceful
    }

    pub fn snapshot(&self) -> Update {
        Update {
            wrapper: self.wrapper_snapshot(),
            hook: self.hook_snapshot(),
            elapsed: self.started.elapsed(),
            version: self.version,
        }
    }

    fn wrapper_snapshot(&self) -> PanelSnapshot {
        let mounted = self.wrapper.render();
        PanelSnapshot {
            target: Target::Wrapper,
            requested: self.wrapper.dependency(),
            rendered: self.wrapper.is_rendered(),
            state: self.wrapper.state(),
            class: mounted.as_ref().map(|m| m.class.to_string()),
            remaining_ms: self.wrapper.remaining().map(|d| d.as_millis() as u64),
            text: mounted.map(|m| m.component.text).unwrap_or(WRAPPER_TEXT),
            delay: self.wrapper.delay(),
        }
    }

    fn hook_snapshot(&self) -> PanelSnapshot {
        // The hook caller picks its own class: leaving while shown but no
        // longer requested, entering otherwise.
        let show = self.hook.is_rendered();
        let visible = self.hook.is_requested();
        let class = show.then(|| if !visible { "unmount" } else { "mount" }.to_string());
        PanelSnapshot {
            target: Target::Hook,
            requested: visible,
            rendered: show,
            state: self.hook.state(),
            class,
            remaining_ms: self.hook.remaining().map(|d| d.as_millis() as u64),
            text: HOOK_TEXT,
            delay: self.hook.delay(),
        }
    }

    /// Release both timers. Returns how many hides were still pending.
    pub fn teardown(self) -> usize {
        usize::from(self.wrapper.teardown()) + usize::from(self.hook.teardown())
    }
}
