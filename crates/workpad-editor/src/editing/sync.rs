//! # Two-way Sync
//!
//! Keeps the surface and the externally owned markup value in step without
//! echo loops. Three states:
//!
//! - **Idle**: nothing in flight.
//! - **ApplyingExternal**: the surface was just replaced from the external
//!   value. Local edits reported before the next [`SyncBridge::tick`] belong
//!   to that rewrite and are not emitted.
//! - **EmittingLocal**: a local change was handed to the callback and the
//!   store may echo it back. An echo matching what we emitted is absorbed
//!   instead of replacing the surface. Also closed by `tick`.

use std::fmt;

use crate::markup::normalize;
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Idle,
    ApplyingExternal,
    EmittingLocal,
}

/// Receives the raw surface markup after a local change.
pub type ChangeCallback = Box<dyn FnMut(&str)>;

#[derive(Default)]
pub struct SyncBridge {
    external: String,
    last_emitted: Option<String>,
    state: SyncState,
    on_change: Option<ChangeCallback>,
}

impl fmt::Debug for SyncBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncBridge")
            .field("external", &self.external)
            .field("last_emitted", &self.last_emitted)
            .field("state", &self.state)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl SyncBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(on_change: impl FnMut(&str) + 'static) -> Self {
        Self {
            on_change: Some(Box::new(on_change)),
            ..Self::default()
        }
    }

    pub fn set_callback(&mut self, on_change: impl FnMut(&str) + 'static) {
        self.on_change = Some(Box::new(on_change));
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    /// The value the store is known to hold: the last one it pushed or the
    /// last one we emitted, whichever is newer.
    pub fn external_value(&self) -> &str {
        &self.external
    }

    pub fn last_emitted(&self) -> Option<&str> {
        self.last_emitted.as_deref()
    }

    /// The store pushed a value. Returns `true` when the surface content was
    /// replaced.
    ///
    /// While the surface has focus the value is recorded but not applied, so
    /// an in-progress edit is never clobbered.
    pub fn external_changed(&mut self, surface: &mut Surface, value: &str, focused: bool) -> bool {
        self.external = value.to_string();

        let incoming = normalize(value);
        if self.state == SyncState::EmittingLocal
            && self
                .last_emitted
                .as_deref()
                .is_some_and(|emitted| normalize(emitted) == incoming)
        {
            log::debug!("absorbed echo of local change");
            self.state = SyncState::Idle;
            return false;
        }
        if focused {
            log::debug!("surface focused; deferring external value");
            return false;
        }
        if incoming == normalize(&surface.to_markup()) {
            return false;
        }

        log::debug!("applying external value ({} bytes)", value.len());
        surface.replace_content(value);
        self.state = SyncState::ApplyingExternal;
        true
    }

    /// The surface settled after a local change. Returns `true` when the
    /// callback fired.
    pub fn local_edit(&mut self, surface: &Surface) -> bool {
        if self.state == SyncState::ApplyingExternal {
            log::debug!("local edit attributed to external rewrite");
            return false;
        }

        let raw = surface.to_markup();
        // `external` tracks the last value either side saw, so an edit back to
        // an older emitted value after a newer store push still emits.
        if normalize(&raw) == normalize(&self.external) {
            return false;
        }

        self.state = SyncState::EmittingLocal;
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(&raw);
        }
        self.external.clone_from(&raw);
        self.last_emitted = Some(raw);
        true
    }

    /// One render tick passed; close any suppression window.
    pub fn tick(&mut self) {
        self.state = SyncState::Idle;
    }
}
