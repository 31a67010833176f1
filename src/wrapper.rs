//! Wrapper-component flavour of delayed visibility.
//!
//! `DelayMount` owns the wrapped component and a dependency flag. While the
//! dependency is set it renders the component with the mount token; after the
//! dependency clears it keeps rendering it with the unmount token for the grace
//! delay, then stops rendering it.

use crate::visibility::{ConfigError, DelayedVisibility, GraceDelay, Phase, VisibilityState};
use std::time::Duration;

/// Class tokens handed to the wrapped component for each phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTokens {
    mount: String,
    unmount: String,
}

impl PhaseTokens {
    pub fn new(mount: impl Into<String>, unmount: impl Into<String>) -> Result<Self, ConfigError> {
        let mount = mount.into().trim().to_string();
        let unmount = unmount.into().trim().to_string();
        if mount.is_empty() {
            return Err(ConfigError::EmptyToken("mount"));
        }
        if unmount.is_empty() {
            return Err(ConfigError::EmptyToken("unmount"));
        }
        Ok(Self { mount, unmount })
    }

    pub fn token(&self, phase: Phase) -> &str {
        match phase {
            Phase::Mount => &self.mount,
            Phase::Unmount => &self.unmount,
        }
    }
}

impl Default for PhaseTokens {
    fn default() -> Self {
        Self {
            mount: "mount".to_string(),
            unmount: "unmount".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DelayProps {
    pub dependency: bool,
    pub delay: GraceDelay,
    pub tokens: PhaseTokens,
}

/// A rendered wrapper: the component plus the class it should present with.
#[derive(Debug, PartialEq)]
pub struct Mounted<'a, C> {
    pub component: &'a C,
    pub phase: Phase,
    pub class: &'a str,
}

#[derive(Debug)]
pub struct DelayMount<C> {
    component: C,
    tokens: PhaseTokens,
    visibility: DelayedVisibility,
}

impl<C> DelayMount<C> {
    pub fn new(component: C, props: DelayProps) -> Self {
        Self {
            component,
            tokens: props.tokens,
            visibility: DelayedVisibility::new(props.delay, props.dependency),
        }
    }

    pub fn set_dependency(&mut self, dependency: bool) -> bool {
        self.visibility.observe(dependency)
    }

    pub fn toggle(&mut self) -> bool {
        self.visibility.toggle()
    }

    pub fn dependency(&self) -> bool {
        self.visibility.is_requested()
    }

    pub fn is_rendered(&self) -> bool {
        self.visibility.is_rendered()
    }

    pub fn state(&self) -> VisibilityState {
        self.visibility.state()
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.visibility.remaining()
    }

    pub fn delay(&self) -> GraceDelay {
        self.visibility.delay()
    }

    pub fn render(&self) -> Option<Mounted<'_, C>> {
        let phase = self.visibility.phase()?;
        Some(Mounted {
            component: &self.component,
            phase,
            class: self.tokens.token(phase),
        })
    }

    pub async fn fired(&mut self) {
        self.visibility.fired().await
    }

    pub fn teardown(self) -> bool {
        self.visibility.teardown()
    }
}
