//! Intro overlay and its session flag.
//!
//! The home overlay covers the page on every load. Revealing the gallery
//! starts a fade; once the fade has run for `fade_ms` the overlay leaves the
//! layout, the page scrolls again, and `overlay-hidden = "true"` is written to
//! the session store.
//!
//! The flag is cleared on every load, so it never actually suppresses the
//! overlay. It is kept for parity with what is stored, not for gating.
//!
//! Time is passed in by the caller, which keeps the controller deterministic.

use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const OVERLAY_HIDDEN_KEY: &str = "overlay-hidden";

/// Per-session key/value storage.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Session storage that lives as long as the value does.
#[derive(Debug, Default, Clone)]
pub struct MemorySession {
    entries: HashMap<String, String>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Covering the page; scrolling is blocked.
    Shown,
    /// Fade in progress since the given instant.
    Fading(Instant),
    /// Removed from the layout.
    Hidden,
}

pub struct OverlayController<S: SessionStore> {
    session: S,
    state: OverlayState,
    fade: Duration,
}

impl<S: SessionStore> OverlayController<S> {
    /// Page load: clear any previous flag and show the overlay.
    pub fn on_load(mut session: S, fade: Duration) -> Self {
        if session.get(OVERLAY_HIDDEN_KEY).is_some() {
            log::debug!("clearing stale {OVERLAY_HIDDEN_KEY} flag");
        }
        session.remove(OVERLAY_HIDDEN_KEY);
        Self {
            session,
            state: OverlayState::Shown,
            fade,
        }
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    /// Scrolling is blocked until the fade completes.
    pub fn is_page_locked(&self) -> bool {
        self.state != OverlayState::Hidden
    }

    /// Start the fade. Ignored unless the overlay is fully shown.
    pub fn reveal(&mut self, now: Instant) {
        if self.state == OverlayState::Shown {
            self.state = OverlayState::Fading(now);
        }
    }

    /// Advance time. Completes the fade once `fade` has elapsed.
    pub fn tick(&mut self, now: Instant) {
        let OverlayState::Fading(started) = self.state else {
            return;
        };
        if now.saturating_duration_since(started) >= self.fade {
            self.state = OverlayState::Hidden;
            self.session.set(OVERLAY_HIDDEN_KEY, "true");
            log::debug!("overlay hidden");
        }
    }

    /// Bring the overlay back and clear the flag.
    pub fn show_again(&mut self) {
        self.state = OverlayState::Shown;
        self.session.remove(OVERLAY_HIDDEN_KEY);
    }
}
