//! `localStorage`-backed state-envelope store.
//!
//! Each namespace is written as one JSON envelope under `shell.state.<namespace>`. Layout
//! snapshots are small (tens of windows), so the synchronous storage API is sufficient.

use platform_host::{AppStateEnvelope, AppStateStore, AppStateStoreFuture};

/// Key prefix applied to every namespace written by [`WebAppStateStore`].
pub const STATE_KEY_PREFIX: &str = "shell.state.";

/// Returns the `localStorage` key used for `namespace`.
pub fn storage_key(namespace: &str) -> String {
    format!("{STATE_KEY_PREFIX}{namespace}")
}

/// Decodes a raw stored envelope, rejecting payloads written under a different namespace.
///
/// # Errors
///
/// Returns an error when the JSON is malformed or the namespace does not match.
pub fn decode_envelope(namespace: &str, raw: &str) -> Result<AppStateEnvelope, String> {
    let envelope: AppStateEnvelope = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    if envelope.namespace != namespace {
        return Err(format!(
            "envelope namespace mismatch: expected `{namespace}` found `{}`",
            envelope.namespace
        ));
    }
    Ok(envelope)
}

#[derive(Debug, Clone, Copy, Default)]
/// Browser state store backed by `window.localStorage`.
pub struct WebAppStateStore;

impl WebAppStateStore {
    fn load(self, namespace: &str) -> Result<Option<AppStateEnvelope>, String> {
        #[cfg(target_arch = "wasm32")]
        {
            let raw = super::local_storage()?
                .get_item(&storage_key(namespace))
                .map_err(|e| format!("localStorage get_item failed: {e:?}"))?;
            raw.map(|raw| decode_envelope(namespace, &raw)).transpose()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = namespace;
            Ok(None)
        }
    }

    fn save(self, envelope: &AppStateEnvelope) -> Result<(), String> {
        let raw = serde_json::to_string(envelope).map_err(|e| e.to_string())?;

        #[cfg(target_arch = "wasm32")]
        {
            super::local_storage()?
                .set_item(&storage_key(&envelope.namespace), &raw)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = raw;
            Ok(())
        }
    }
}

impl AppStateStore for WebAppStateStore {
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        let store = *self;
        Box::pin(async move { store.load(namespace) })
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.save(envelope) })
    }
}
