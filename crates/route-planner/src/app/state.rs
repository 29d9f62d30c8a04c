//! UI state that outlives a frame
//!
//! Route data lives in `RoutePlanner`; this module only covers how the
//! window looks: sidebar, tiles, walking pace, and the subset of it kept in
//! eframe's storage between runs.

use route_planner_lib::format::DEFAULT_PACE_MIN_PER_KM;
use serde::{Deserialize, Serialize};

/// eframe storage key for [`PersistedSettings`]
pub const PERSISTED_SETTINGS_KEY: &str = "persisted_settings";

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone, Debug, PartialEq)]
pub struct UiSettings {
    /// Map tiles provider
    pub tiles_provider: TilesProvider,

    /// Whether sidebar is open
    pub sidebar_open: bool,

    /// Current active tab in sidebar
    pub active_tab: SidebarTab,

    /// Minutes per kilometer used for the walking estimate
    pub pace: f64,

    /// Whether to show profiling in settings
    pub show_profiling: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tiles_provider: TilesProvider::OpenStreetMap,
            sidebar_open: true,
            active_tab: SidebarTab::Route,
            pace: DEFAULT_PACE_MIN_PER_KM,
            show_profiling: false,
        }
    }
}

/// Sidebar tabs
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SidebarTab {
    Route,
    Saved,
    Settings,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenCycleMap,
}

impl TilesProvider {
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenCycleMap => "© OpenCycleMap, Thunderforest & OpenStreetMap contributors",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::OpenStreetMap, Self::OpenCycleMap]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "Open Street Map",
            Self::OpenCycleMap => "Open Cycle Map",
        }
    }
}

/// Persisted settings (lightweight, no route data)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedSettings {
    pub sidebar_open: bool,
    pub active_tab: SidebarTab,
    pub tiles_provider: TilesProvider,
    pub pace: f64,
    pub show_profiling: bool,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self::from(&UiSettings::default())
    }
}

impl From<&UiSettings> for PersistedSettings {
    fn from(ui: &UiSettings) -> Self {
        Self {
            sidebar_open: ui.sidebar_open,
            active_tab: ui.active_tab,
            tiles_provider: ui.tiles_provider,
            pace: ui.pace,
            show_profiling: ui.show_profiling,
        }
    }
}

impl PersistedSettings {
    /// Restore from eframe storage; `None` when absent or unreadable
    pub fn load(storage: &dyn eframe::Storage) -> Option<Self> {
        let json = storage.get_string(PERSISTED_SETTINGS_KEY)?;
        match serde_json::from_str::<Self>(&json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                tracing::warn!("Ignoring unreadable persisted settings: {}", e);
                None
            }
        }
    }

    pub fn save(&self, storage: &mut dyn eframe::Storage) {
        match serde_json::to_string(self) {
            Ok(json) => {
                storage.set_string(PERSISTED_SETTINGS_KEY, json);
                tracing::debug!("Saved UI settings");
            }
            Err(e) => tracing::error!("Failed to serialize UI settings: {}", e),
        }
    }

    pub fn into_ui_settings(self) -> UiSettings {
        UiSettings {
            tiles_provider: self.tiles_provider,
            sidebar_open: self.sidebar_open,
            active_tab: self.active_tab,
            pace: if self.pace.is_finite() && self.pace > 0.0 {
                self.pace
            } else {
                DEFAULT_PACE_MIN_PER_KM
            },
            show_profiling: self.show_profiling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use eframe::Storage as _;

    #[derive(Default)]
    struct TestStorage(HashMap<String, String>);

    impl eframe::Storage for TestStorage {
        fn get_string(&self, key: &str) -> Option<String> {
            self.0.get(key).cloned()
        }

        fn set_string(&mut self, key: &str, value: String) {
            self.0.insert(key.to_string(), value);
        }

        fn flush(&mut self) {}
    }

    #[test]
    fn test_settings_survive_storage() {
        let ui = UiSettings {
            tiles_provider: TilesProvider::OpenCycleMap,
            sidebar_open: false,
            active_tab: SidebarTab::Saved,
            pace: 6.0,
            show_profiling: true,
        };
        let mut storage = TestStorage::default();
        PersistedSettings::from(&ui).save(&mut storage);

        let restored = PersistedSettings::load(&storage).map(PersistedSettings::into_ui_settings);
        assert_eq!(restored, Some(ui));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut storage = TestStorage::default();
        storage.set_string(PERSISTED_SETTINGS_KEY, r#"{"sidebar_open": false}"#.to_string());

        let restored = PersistedSettings::load(&storage).map(PersistedSettings::into_ui_settings);
        let ui = restored.unwrap();
        assert!(!ui.sidebar_open);
        assert_eq!(ui.tiles_provider, TilesProvider::OpenStreetMap);
        assert_eq!(ui.pace, DEFAULT_PACE_MIN_PER_KM);
    }

    #[test]
    fn test_garbage_is_ignored() {
        let mut storage = TestStorage::default();
        storage.set_string(PERSISTED_SETTINGS_KEY, "not json".to_string());
        assert!(PersistedSettings::load(&storage).is_none());
    }

    #[test]
    fn test_invalid_pace_falls_back() {
        let persisted = PersistedSettings {
            pace: -1.0,
            ..Default::default()
        };
        assert_eq!(persisted.into_ui_settings().pace, DEFAULT_PACE_MIN_PER_KM);
    }
}
