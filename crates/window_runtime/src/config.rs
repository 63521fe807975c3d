//! Window-manager tuning loaded from host preferences at boot.

use leptos::logging;
use platform_host::{load_pref_with, PrefsStore};
use serde::{Deserialize, Serialize};

use crate::{
    model::{WindowPosition, WindowSize},
    window_manager::{ShellChrome, MIN_VISIBLE_PX, MIN_WINDOW_HEIGHT, MIN_WINDOW_WIDTH},
};

/// Preference key holding a serialized [`WindowManagerConfig`].
pub const WINDOW_MANAGER_CONFIG_KEY: &str = "shell.window_manager.v1";
/// Upper bound on windows rehydrated from a persisted layout.
pub const DEFAULT_MAX_RESTORE_WINDOWS: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Tunables for registration defaults, geometry clamping and layout persistence.
///
/// Every field has a default, so a stored config may name only the fields it overrides.
pub struct WindowManagerConfig {
    /// Position given to windows registered without one.
    pub default_position: WindowPosition,
    /// Size given to windows registered without one.
    pub default_size: WindowSize,
    /// Smallest size an interactive resize may produce.
    pub min_size: WindowSize,
    /// Pixels of a dragged window that must stay inside the work area.
    pub min_visible_px: i32,
    /// Reserved shell chrome around the work area.
    pub chrome: ShellChrome,
    /// Whether settled mutations write a layout snapshot.
    pub persist_layout: bool,
    /// Whether the provider rehydrates the last snapshot at boot.
    pub restore_on_boot: bool,
    /// Cap on rehydrated windows, most recently active kept first.
    pub max_restore_windows: usize,
}

impl Default for WindowManagerConfig {
    fn default() -> Self {
        Self {
            default_position: WindowPosition::default(),
            default_size: WindowSize::default(),
            min_size: WindowSize {
                width: MIN_WINDOW_WIDTH,
                height: MIN_WINDOW_HEIGHT,
            },
            min_visible_px: MIN_VISIBLE_PX,
            chrome: ShellChrome::default(),
            persist_layout: true,
            restore_on_boot: true,
            max_restore_windows: DEFAULT_MAX_RESTORE_WINDOWS,
        }
    }
}

impl WindowManagerConfig {
    /// Returns a copy with nonsensical values pulled back into range.
    pub fn sanitized(mut self) -> Self {
        self.min_size.width = self.min_size.width.max(1);
        self.min_size.height = self.min_size.height.max(1);
        self.default_size.width = self.default_size.width.max(self.min_size.width);
        self.default_size.height = self.default_size.height.max(self.min_size.height);
        self.min_visible_px = self.min_visible_px.max(0);
        self.chrome = self.chrome.sanitized();
        self
    }
}

/// Loads the window-manager config from `prefs`.
///
/// A missing key yields the defaults. Read or decode failures are logged and also yield the
/// defaults; a bad preference never blocks the shell from booting.
pub async fn load_window_manager_config<S: PrefsStore + ?Sized>(prefs: &S) -> WindowManagerConfig {
    match load_pref_with::<_, WindowManagerConfig>(prefs, WINDOW_MANAGER_CONFIG_KEY).await {
        Ok(Some(config)) => config.sanitized(),
        Ok(None) => WindowManagerConfig::default(),
        Err(err) => {
            logging::warn!("window manager config load failed, using defaults: {err}");
            WindowManagerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::{save_pref_with, MemoryPrefsStore};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn missing_config_uses_defaults() {
        let prefs = MemoryPrefsStore::default();
        let config = block_on(load_window_manager_config(&prefs));
        assert_eq!(config, WindowManagerConfig::default());
        assert_eq!(config.default_position, WindowPosition { x: 100, y: 100 });
        assert_eq!(
            config.default_size,
            WindowSize {
                width: 800,
                height: 600
            }
        );
    }

    #[test]
    fn partial_config_keeps_unnamed_defaults() {
        let prefs = MemoryPrefsStore::default();
        block_on(prefs.save_pref(
            WINDOW_MANAGER_CONFIG_KEY,
            r#"{"persist_layout":false,"max_restore_windows":4}"#,
        ))
        .expect("save raw pref");

        let config = block_on(load_window_manager_config(&prefs));
        assert!(!config.persist_layout);
        assert_eq!(config.max_restore_windows, 4);
        assert_eq!(config.chrome, ShellChrome::default());
        assert!(config.restore_on_boot);
    }

    #[test]
    fn malformed_config_falls_back_to_defaults() {
        let prefs = MemoryPrefsStore::default();
        block_on(prefs.save_pref(WINDOW_MANAGER_CONFIG_KEY, "{not json"))
            .expect("save raw pref");
        let config = block_on(load_window_manager_config(&prefs));
        assert_eq!(config, WindowManagerConfig::default());
    }

    #[test]
    fn stored_config_is_sanitized() {
        let prefs = MemoryPrefsStore::default();
        let mut stored = WindowManagerConfig::default();
        stored.min_size = WindowSize {
            width: -5,
            height: 0,
        };
        stored.default_size = WindowSize {
            width: 0,
            height: 0,
        };
        stored.min_visible_px = -1;
        block_on(save_pref_with(&prefs, WINDOW_MANAGER_CONFIG_KEY, &stored)).expect("save");

        let config = block_on(load_window_manager_config(&prefs));
        assert_eq!(
            config.min_size,
            WindowSize {
                width: 1,
                height: 1
            }
        );
        assert_eq!(config.default_size, config.min_size);
        assert_eq!(config.min_visible_px, 0);
    }
}
