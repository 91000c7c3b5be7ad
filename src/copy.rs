//! Copy-to-clipboard button state.
//!
//! Each rendered code block carries a copy button. The button is purely
//! client-side: it moves to `copied` or `failed` after a copy attempt and
//! falls back to `idle` after [`COPY_RESET_DELAY`]. [`CopyFeedback`] models
//! that state machine for hosts that drive the button themselves, and
//! [`COPY_SCRIPT`] implements it in the browser.

use std::time::{Duration, Instant};

use serde::Serialize;

/// How long a `copied`/`failed` state is shown before resetting.
pub const COPY_RESET_DELAY: Duration = Duration::from_secs(2);

/// Browser-side implementation of the copy button, for embedding in pages.
pub const COPY_SCRIPT: &str = include_str!("../assets/copy.js");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyState {
    #[default]
    Idle,
    Copied,
    Failed,
}

impl CopyState {
    /// Button label for this state.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Copy",
            Self::Copied => "Copied!",
            Self::Failed => "Failed",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Copied => "copied",
            Self::Failed => "failed",
        }
    }
}

/// Transient copy state of a single code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CopyFeedback {
    state: CopyState,
    changed_at: Option<Instant>,
}

impl CopyFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a copy attempt at `now`.
    pub fn record<E>(&mut self, outcome: Result<(), E>, now: Instant) {
        self.state = if outcome.is_ok() { CopyState::Copied } else { CopyState::Failed };
        self.changed_at = Some(now);
    }

    /// State as seen at `now`; anything older than [`COPY_RESET_DELAY`] reads as idle.
    pub fn state_at(&self, now: Instant) -> CopyState {
        match self.changed_at {
            Some(at) if now.saturating_duration_since(at) < COPY_RESET_DELAY => self.state,
            _ => CopyState::Idle,
        }
    }
}
