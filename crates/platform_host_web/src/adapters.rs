use platform_host::{
    AppStateEnvelope, AppStateStore, AppStateStoreFuture, NoopAppStateStore, NoopPrefsStore,
    PrefsStore, PrefsStoreFuture,
};

use crate::{BrowserViewport, WebAppStateStore, WebPrefsStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Compile-time selected host strategy for `platform_host_web` adapters.
pub enum HostStrategy {
    /// Browser-backed adapters (`localStorage`, `window` dimensions).
    Browser,
    /// Headless adapters that keep the shell purely in-memory.
    Headless,
}

/// Returns the compile-time selected host strategy for the active build.
pub const fn selected_host_strategy() -> HostStrategy {
    #[cfg(feature = "headless-host")]
    {
        HostStrategy::Headless
    }

    #[cfg(not(feature = "headless-host"))]
    {
        HostStrategy::Browser
    }
}

/// Returns the selected host strategy as a stable string token.
pub fn host_strategy_name() -> &'static str {
    match selected_host_strategy() {
        HostStrategy::Browser => "browser",
        HostStrategy::Headless => "headless",
    }
}

/// Adapter enum that erases the concrete state backend behind [`AppStateStore`].
#[derive(Debug, Clone, Copy)]
pub enum AppStateStoreAdapter {
    /// Browser `localStorage` persistence.
    Browser(WebAppStateStore),
    /// No persistence.
    Headless(NoopAppStateStore),
}

impl AppStateStore for AppStateStoreAdapter {
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        match self {
            Self::Browser(store) => store.load_app_state_envelope(namespace),
            Self::Headless(store) => store.load_app_state_envelope(namespace),
        }
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.save_app_state_envelope(envelope),
            Self::Headless(store) => store.save_app_state_envelope(envelope),
        }
    }
}

/// Adapter enum that erases the concrete preference backend behind [`PrefsStore`].
#[derive(Debug, Clone, Copy)]
pub enum PrefsStoreAdapter {
    /// Browser `localStorage` preferences.
    Browser(WebPrefsStore),
    /// No persistence.
    Headless(NoopPrefsStore),
}

impl PrefsStore for PrefsStoreAdapter {
    fn load_pref<'a>(
        &'a self,
        key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        match self {
            Self::Browser(store) => store.load_pref(key),
            Self::Headless(store) => store.load_pref(key),
        }
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        match self {
            Self::Browser(store) => store.save_pref(key, raw_json),
            Self::Headless(store) => store.save_pref(key, raw_json),
        }
    }
}

/// Returns the state store for the selected host strategy.
pub fn app_state_store() -> AppStateStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => AppStateStoreAdapter::Browser(WebAppStateStore),
        HostStrategy::Headless => AppStateStoreAdapter::Headless(NoopAppStateStore),
    }
}

/// Returns the preference store for the selected host strategy.
pub fn prefs_store() -> PrefsStoreAdapter {
    match selected_host_strategy() {
        HostStrategy::Browser => PrefsStoreAdapter::Browser(WebPrefsStore),
        HostStrategy::Headless => PrefsStoreAdapter::Headless(NoopPrefsStore),
    }
}

/// Returns the viewport provider; the browser provider already degrades off-browser.
pub fn viewport_provider() -> BrowserViewport {
    BrowserViewport
}
