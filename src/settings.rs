//! Presentation settings of a call.

use futures::stream::LocalBoxStream;
use medea_reactive::ObservableCell;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;

/// Presentation settings, as persisted by the settings storage.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize, SmartDefault,
)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Whether a toolbar is shown on the minimized stream windows. Defaults
    /// to `true`.
    #[default = true]
    pub show_minimized_toolbar: bool,

    /// Whether the stream windows are laid out with a flexible layout.
    /// Defaults to `false`.
    #[default = false]
    pub use_flex_layout: bool,
}

impl Settings {
    /// Parses [`Settings`] from the provided JSON.
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// If the provided `json` is not a valid [`Settings`] object.
    #[inline]
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serializes these [`Settings`] into JSON.
    ///
    /// # Errors
    ///
    /// Never in practice, as [`Settings`] contains only booleans.
    #[inline]
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Observable storage of the [`Settings`].
#[derive(Debug)]
pub struct SettingsStore(ObservableCell<Settings>);

impl SettingsStore {
    /// Creates a new [`SettingsStore`] with the provided initial [`Settings`].
    #[inline]
    pub fn new(settings: Settings) -> Self {
        Self(ObservableCell::new(settings))
    }

    /// Returns current [`Settings`].
    #[inline]
    pub fn get(&self) -> Settings {
        self.0.get()
    }

    /// Replaces current [`Settings`] with the provided ones.
    #[inline]
    pub fn set(&self, settings: Settings) {
        self.0.set(settings);
    }

    /// Toggles [`Settings::show_minimized_toolbar`] flag.
    pub fn show_minimized_toolbar_toggle(&self) {
        let mut settings = self.get();
        settings.show_minimized_toolbar = !settings.show_minimized_toolbar;
        self.set(settings);
    }

    /// Toggles [`Settings::use_flex_layout`] flag.
    pub fn use_flex_layout_toggle(&self) {
        let mut settings = self.get();
        settings.use_flex_layout = !settings.use_flex_layout;
        self.set(settings);
    }

    /// Returns [`LocalBoxStream`] of the current [`Settings`] followed by all
    /// their further changes.
    #[inline]
    pub fn subscribe(&self) -> LocalBoxStream<'static, Settings> {
        self.0.subscribe()
    }
}

impl Default for SettingsStore {
    #[inline]
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
