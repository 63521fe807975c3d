//! `localStorage`-backed persistence adapters.

pub mod local_app_state;
pub mod local_prefs;

#[cfg(target_arch = "wasm32")]
pub(crate) fn local_storage() -> Result<web_sys::Storage, String> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or_else(|| "localStorage unavailable".to_string())
}
