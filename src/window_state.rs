//! Window presentation states of the call's media streams.

use std::cell::RefCell;

use futures::{stream::LocalBoxStream, StreamExt as _};
use medea_reactive::collections::ObservableHashMap;

use crate::media::StreamKey;

/// Presentation mode of a stream window.
///
/// Being an enum, it makes a minimized and maximized window unrepresentable.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WindowMode {
    /// Window is shown as usual.
    Default,

    /// Window is collapsed.
    Minimized,

    /// Window takes the main area.
    Maximized,
}

impl Default for WindowMode {
    #[inline]
    fn default() -> Self {
        Self::Default
    }
}

/// Presentation state of a single stream window.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WindowState {
    /// Key of the stream this window shows.
    pub key: StreamKey,

    /// Current [`WindowMode`].
    pub mode: WindowMode,
}

impl WindowState {
    /// Indicates whether this window is minimized.
    #[inline]
    pub fn minimized(&self) -> bool {
        self.mode == WindowMode::Minimized
    }

    /// Indicates whether this window is maximized.
    #[inline]
    pub fn maximized(&self) -> bool {
        self.mode == WindowMode::Maximized
    }
}

/// Registry of [`WindowState`]s keyed by [`StreamKey`].
///
/// Independent of the streams liveness: a state is created on the first
/// mutation of its key and may outlive the stream. Such stale states are
/// harmless and pruned with [`WindowStates::clear`] or
/// [`WindowStates::retain`].
#[derive(Default)]
pub struct WindowStates {
    /// Modes of the windows that were mutated at least once.
    modes: RefCell<ObservableHashMap<StreamKey, WindowMode>>,
}

impl WindowStates {
    /// Creates a new empty [`WindowStates`] registry.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns current [`WindowState`] of the provided `key`.
    ///
    /// Unknown keys are reported in the [`WindowMode::Default`] without being
    /// stored.
    pub fn get(&self, key: &StreamKey) -> WindowState {
        WindowState {
            key: key.clone(),
            mode: self.modes.borrow().get(key).copied().unwrap_or_default(),
        }
    }

    /// Maximizes the window of the provided `key`, un-minimizing it.
    pub fn maximize(&self, key: StreamKey) {
        self.set(key, WindowMode::Maximized);
    }

    /// Toggles minimization of the window of the provided `key`.
    ///
    /// Minimizing a maximized window un-maximizes it. The first toggle of an
    /// unknown key minimizes it.
    pub fn minimize_toggle(&self, key: StreamKey) {
        let mode = match self.get(&key).mode {
            WindowMode::Minimized => WindowMode::Default,
            WindowMode::Default | WindowMode::Maximized => {
                WindowMode::Minimized
            }
        };
        self.set(key, mode);
    }

    /// Forgets the state of the provided `key`.
    pub fn clear(&self, key: &StreamKey) {
        self.modes.borrow_mut().remove(key);
    }

    /// Forgets the states of all the keys not satisfying the `predicate`.
    pub fn retain<F>(&self, mut predicate: F)
    where
        F: FnMut(&StreamKey) -> bool,
    {
        let mut modes = self.modes.borrow_mut();
        let stale: Vec<_> = modes
            .iter()
            .map(|(key, _)| key)
            .filter(|key| !predicate(*key))
            .cloned()
            .collect();
        for key in stale {
            modes.remove(&key);
        }
    }

    /// Returns snapshot of all the stored [`WindowState`]s.
    pub fn all(&self) -> Vec<WindowState> {
        self.modes
            .borrow()
            .iter()
            .map(|(key, mode)| WindowState {
                key: key.clone(),
                mode: *mode,
            })
            .collect()
    }

    /// Returns [`LocalBoxStream`] of the updated [`WindowState`]s.
    pub fn on_update(&self) -> LocalBoxStream<'static, WindowState> {
        self.modes
            .borrow()
            .on_insert()
            .map(|(key, mode)| WindowState { key, mode })
            .boxed_local()
    }

    /// Returns [`LocalBoxStream`] of the [`StreamKey`]s whose states were
    /// forgotten.
    pub fn on_clear(&self) -> LocalBoxStream<'static, StreamKey> {
        self.modes
            .borrow()
            .on_remove()
            .map(|(key, _)| key)
            .boxed_local()
    }

    /// Stores the `mode` of the `key` window.
    fn set(&self, key: StreamKey, mode: WindowMode) {
        self.modes.borrow_mut().insert(key, mode);
    }
}
