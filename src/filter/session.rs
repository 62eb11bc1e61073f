//! Filter state carried between commands.

use super::visibility::DisplayMode;
use std::collections::HashSet;

/// The accumulated shown-set and the active display mode.
///
/// Non-additive commands call [`FilterSession::replace_shown`]; additive ones
/// call [`FilterSession::accumulate`]. The mode is independent of both and only
/// changes through [`FilterSession::toggle_mode`].
#[derive(Debug, Clone, Default)]
pub struct FilterSession {
    shown: HashSet<String>,
    mode: DisplayMode,
}

impl FilterSession {
    pub fn new(mode: DisplayMode) -> Self {
        Self {
            shown: HashSet::new(),
            mode,
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn toggle_mode(&mut self) -> DisplayMode {
        self.mode = self.mode.toggled();
        self.mode
    }

    pub fn shown(&self) -> &HashSet<String> {
        &self.shown
    }

    /// Drop prior accumulation and start over from `ids`.
    pub fn replace_shown(&mut self, ids: HashSet<String>) {
        self.shown = ids;
    }

    /// Union `ids` into the shown-set and return the whole accumulation.
    pub fn accumulate(&mut self, ids: impl IntoIterator<Item = String>) -> &HashSet<String> {
        self.shown.extend(ids);
        &self.shown
    }

    pub fn clear_shown(&mut self) {
        self.shown.clear();
    }
}
