//! Injected host services and runtime-effect execution for the window registry.

use std::rc::Rc;

use leptos::{logging, spawn_local, Callable, Callback};
use platform_host::{AppStateStore, PrefsStore, ViewportProvider, ViewportSize};
use platform_host_web::{app_state_store, host_strategy_name, prefs_store, viewport_provider};

use crate::{
    config::{load_window_manager_config, WindowManagerConfig},
    model::{WindowRect, WindowStoreState},
    persistence,
    reducer::{RuntimeEffect, WindowAction},
    window_manager::{maximized_bounds, work_area, ShellChrome},
};

#[derive(Clone)]
/// Host service bundle for window-runtime side effects.
pub struct WindowHostContext {
    app_state: Rc<dyn AppStateStore>,
    prefs: Rc<dyn PrefsStore>,
    viewport: Rc<dyn ViewportProvider>,
    host_strategy_name: &'static str,
}

impl Default for WindowHostContext {
    fn default() -> Self {
        Self {
            app_state: Rc::new(app_state_store()),
            prefs: Rc::new(prefs_store()),
            viewport: Rc::new(viewport_provider()),
            host_strategy_name: host_strategy_name(),
        }
    }
}

impl WindowHostContext {
    /// Builds a bundle from explicit services, for tests and embedders.
    pub fn new(
        app_state: Rc<dyn AppStateStore>,
        prefs: Rc<dyn PrefsStore>,
        viewport: Rc<dyn ViewportProvider>,
    ) -> Self {
        Self {
            app_state,
            prefs,
            viewport,
            host_strategy_name: "custom",
        }
    }

    /// Returns the configured layout persistence service.
    pub fn app_state_store(&self) -> Rc<dyn AppStateStore> {
        self.app_state.clone()
    }

    /// Returns the configured preference service.
    pub fn prefs_store(&self) -> Rc<dyn PrefsStore> {
        self.prefs.clone()
    }

    /// Returns the stable name of the selected host strategy.
    pub fn host_strategy_name(&self) -> &'static str {
        self.host_strategy_name
    }

    /// Current viewport dimensions.
    pub fn viewport_size(&self) -> ViewportSize {
        self.viewport.viewport_size()
    }

    /// Area windows may occupy under the given chrome.
    pub fn work_area(&self, chrome: ShellChrome) -> WindowRect {
        work_area(self.viewport_size(), chrome)
    }

    /// Bounding box for maximized windows under the given chrome.
    pub fn maximized_bounds(&self, chrome: ShellChrome) -> WindowRect {
        maximized_bounds(self.viewport_size(), chrome)
    }

    /// Loads config, then the persisted layout when enabled, dispatching what it finds.
    ///
    /// Returns the loaded config. Every failure is logged and degrades to defaults or an empty
    /// restore.
    pub async fn boot(
        &self,
        apply_config: impl Fn(WindowManagerConfig),
        dispatch: Callback<WindowAction>,
    ) -> WindowManagerConfig {
        let config = load_window_manager_config(self.prefs.as_ref()).await;
        apply_config(config.clone());
        if !config.restore_on_boot {
            return config;
        }
        match persistence::load_layout_snapshot(self.app_state.as_ref()).await {
            Ok(Some(snapshot)) => dispatch.call(WindowAction::HydrateSnapshot { snapshot }),
            Ok(None) => {}
            Err(err) => logging::warn!("window layout restore failed: {err}"),
        }
        config
    }

    /// Executes a single [`RuntimeEffect`] emitted by the reducer.
    pub fn run_runtime_effect(&self, state: &WindowStoreState, effect: RuntimeEffect) {
        match effect {
            RuntimeEffect::PersistLayout => self.persist_layout(state.clone()),
        }
    }

    fn persist_layout(&self, state: WindowStoreState) {
        let store = self.app_state.clone();
        spawn_local(async move {
            if let Err(err) = persistence::persist_layout_snapshot(store.as_ref(), &state).await {
                logging::warn!("persist window layout failed: {err}");
            }
        });
    }
}
