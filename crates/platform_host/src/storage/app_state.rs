//! Versioned state envelopes and the async store contract used for layout snapshots.

use std::{
    cell::RefCell,
    collections::HashMap,
    future::Future,
    pin::Pin,
    rc::Rc,
};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

/// Version for [`AppStateEnvelope`] metadata serialization.
pub const APP_STATE_ENVELOPE_VERSION: u32 = 1;
/// Namespace used by the window manager's layout snapshot.
pub const WINDOW_LAYOUT_NAMESPACE: &str = "shell.windows";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Versioned envelope for persisted app state payloads.
pub struct AppStateEnvelope {
    /// Envelope schema version.
    pub envelope_version: u32,
    /// Namespace identifying the owning shell component.
    pub namespace: String,
    /// Owner-defined schema version for the payload.
    pub schema_version: u32,
    /// Last update time in unix milliseconds.
    pub updated_at_unix_ms: u64,
    /// Serialized payload.
    pub payload: Value,
}

impl AppStateEnvelope {
    /// Creates a new envelope and stamps it with a monotonic timestamp.
    pub fn new(namespace: impl Into<String>, schema_version: u32, payload: Value) -> Self {
        Self {
            envelope_version: APP_STATE_ENVELOPE_VERSION,
            namespace: namespace.into(),
            schema_version,
            updated_at_unix_ms: crate::time::next_monotonic_timestamp_ms(),
            payload,
        }
    }
}

/// Object-safe boxed future used by [`AppStateStore`] async methods.
pub type AppStateStoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Storage service for loading and saving state envelopes by namespace.
pub trait AppStateStore {
    /// Loads a persisted envelope by namespace.
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>>;

    /// Saves a full app-state envelope.
    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Copy, Default)]
/// No-op store for unsupported targets and baseline tests.
pub struct NoopAppStateStore;

impl AppStateStore for NoopAppStateStore {
    fn load_app_state_envelope<'a>(
        &'a self,
        _namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        Box::pin(async { Ok(None) })
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        _envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

#[derive(Debug, Clone)]
/// In-memory store keyed by namespace.
pub struct MemoryAppStateStore {
    inner: Rc<RefCell<HashMap<String, AppStateEnvelope>>>,
}

impl Default for MemoryAppStateStore {
    fn default() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HashMap::new())),
        }
    }
}

impl AppStateStore for MemoryAppStateStore {
    fn load_app_state_envelope<'a>(
        &'a self,
        namespace: &'a str,
    ) -> AppStateStoreFuture<'a, Result<Option<AppStateEnvelope>, String>> {
        Box::pin(async move { Ok(self.inner.borrow().get(namespace).cloned()) })
    }

    fn save_app_state_envelope<'a>(
        &'a self,
        envelope: &'a AppStateEnvelope,
    ) -> AppStateStoreFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner
                .borrow_mut()
                .insert(envelope.namespace.clone(), envelope.clone());
            Ok(())
        })
    }
}

/// Builds a versioned [`AppStateEnvelope`] from a serializable payload.
///
/// # Errors
///
/// Returns an error when `payload` cannot be converted to JSON.
pub fn build_app_state_envelope<T: Serialize>(
    namespace: &str,
    schema_version: u32,
    payload: &T,
) -> Result<AppStateEnvelope, String> {
    let payload = serde_json::to_value(payload).map_err(|e| e.to_string())?;
    Ok(AppStateEnvelope::new(
        namespace.to_string(),
        schema_version,
        payload,
    ))
}

/// Deserializes an envelope payload into a target type.
///
/// # Errors
///
/// Returns an error when deserialization fails.
pub fn migrate_envelope_payload<T: DeserializeOwned>(
    envelope: &AppStateEnvelope,
) -> Result<T, String> {
    serde_json::from_value(envelope.payload.clone()).map_err(|e| e.to_string())
}

/// Serializes `payload` into an envelope and saves it through `store`.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_app_state_with<S: AppStateStore + ?Sized, T: Serialize>(
    store: &S,
    namespace: &str,
    schema_version: u32,
    payload: &T,
) -> Result<(), String> {
    let envelope = build_app_state_envelope(namespace, schema_version, payload)?;
    store.save_app_state_envelope(&envelope).await
}

/// Loads a typed payload for `namespace`, migrating older schema versions through `migrate`.
///
/// Envelopes at `current_schema_version` decode directly. Older envelopes are handed to
/// `migrate`, which may return `Ok(None)` to discard them. Envelopes written by a newer schema
/// are ignored.
///
/// # Errors
///
/// Returns an error when the store read, decoding, or the migration fails.
pub async fn load_app_state_with_migration<S, T, F>(
    store: &S,
    namespace: &str,
    current_schema_version: u32,
    migrate: F,
) -> Result<Option<T>, String>
where
    S: AppStateStore + ?Sized,
    T: DeserializeOwned,
    F: FnOnce(u32, &AppStateEnvelope) -> Result<Option<T>, String>,
{
    let Some(envelope) = store.load_app_state_envelope(namespace).await? else {
        return Ok(None);
    };
    if envelope.envelope_version != APP_STATE_ENVELOPE_VERSION {
        return Err(format!(
            "unsupported envelope version {} for `{namespace}`",
            envelope.envelope_version
        ));
    }
    match envelope.schema_version.cmp(&current_schema_version) {
        std::cmp::Ordering::Equal => migrate_envelope_payload(&envelope).map(Some),
        std::cmp::Ordering::Less => migrate(envelope.schema_version, &envelope),
        std::cmp::Ordering::Greater => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use pretty_assertions::assert_eq;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Layout {
        windows: Vec<String>,
    }

    fn envelope(schema_version: u32, payload: Value) -> AppStateEnvelope {
        AppStateEnvelope {
            envelope_version: APP_STATE_ENVELOPE_VERSION,
            namespace: WINDOW_LAYOUT_NAMESPACE.to_string(),
            schema_version,
            updated_at_unix_ms: 1,
            payload,
        }
    }

    #[test]
    fn envelope_serializes_with_snake_case_keys() {
        let value = serde_json::to_value(envelope(3, json!({"ok": true}))).expect("serialize");
        let object = value.as_object().expect("object");
        assert_eq!(object.get("namespace"), Some(&json!("shell.windows")));
        assert_eq!(object.get("schema_version"), Some(&json!(3)));
        assert_eq!(object.get("payload"), Some(&json!({"ok": true})));
        assert!(!object.contains_key("updatedAtUnixMs"));
    }

    #[test]
    fn envelopes_are_stamped_monotonically() {
        let first = AppStateEnvelope::new(WINDOW_LAYOUT_NAMESPACE, 1, json!({}));
        let second = AppStateEnvelope::new(WINDOW_LAYOUT_NAMESPACE, 1, json!({}));
        assert!(second.updated_at_unix_ms > first.updated_at_unix_ms);
    }

    #[derive(Debug)]
    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
        where
            S: serde::Serializer,
        {
            Err(serde::ser::Error::custom("cyclic layout"))
        }
    }

    #[test]
    fn build_envelope_reports_serialization_failures() {
        let err = build_app_state_envelope(WINDOW_LAYOUT_NAMESPACE, 1, &Unserializable)
            .expect_err("serialization should fail");
        assert!(err.contains("cyclic layout"));
    }

    #[test]
    fn save_then_load_current_schema_decodes_payload() {
        let store = MemoryAppStateStore::default();
        let layout = Layout {
            windows: vec!["w1".to_string()],
        };
        block_on(save_app_state_with(&store, WINDOW_LAYOUT_NAMESPACE, 2, &layout)).expect("save");

        let loaded: Option<Layout> = block_on(load_app_state_with_migration(
            &store,
            WINDOW_LAYOUT_NAMESPACE,
            2,
            |_, _| Err("migration must not run".to_string()),
        ))
        .expect("load");
        assert_eq!(loaded, Some(layout));
    }

    #[test]
    fn older_schema_goes_through_migration() {
        let store = MemoryAppStateStore::default();
        block_on(store.save_app_state_envelope(&envelope(0, json!(["legacy"])))).expect("save");

        let loaded: Option<Layout> = block_on(load_app_state_with_migration(
            &store,
            WINDOW_LAYOUT_NAMESPACE,
            1,
            |schema, env| {
                assert_eq!(schema, 0);
                let windows: Vec<String> = migrate_envelope_payload(env)?;
                Ok(Some(Layout { windows }))
            },
        ))
        .expect("load");
        assert_eq!(
            loaded,
            Some(Layout {
                windows: vec!["legacy".to_string()]
            })
        );
    }

    #[test]
    fn newer_schema_is_ignored() {
        let store = MemoryAppStateStore::default();
        block_on(store.save_app_state_envelope(&envelope(9, json!({"windows": []}))))
            .expect("save");

        let loaded: Option<Layout> = block_on(load_app_state_with_migration(
            &store,
            WINDOW_LAYOUT_NAMESPACE,
            1,
            |_, _| Ok(None),
        ))
        .expect("load");
        assert_eq!(loaded, None);
    }

    #[test]
    fn type_mismatch_surfaces_as_error() {
        let err = migrate_envelope_payload::<Layout>(&envelope(1, json!({"windows": 7})))
            .expect_err("decode should fail");
        assert!(!err.is_empty());
    }

    #[test]
    fn memory_store_keeps_namespaces_apart_and_overwrites() {
        let store = MemoryAppStateStore::default();
        let store_obj: &dyn AppStateStore = &store;
        let other = AppStateEnvelope {
            namespace: "shell.prefs".to_string(),
            ..envelope(1, json!({"other": true}))
        };

        block_on(store_obj.save_app_state_envelope(&envelope(1, json!({"v": 1})))).expect("save");
        block_on(store_obj.save_app_state_envelope(&other)).expect("save other");
        block_on(store_obj.save_app_state_envelope(&envelope(1, json!({"v": 2})))).expect("save");

        let loaded = block_on(store_obj.load_app_state_envelope(WINDOW_LAYOUT_NAMESPACE))
            .expect("load")
            .expect("present");
        assert_eq!(loaded.payload, json!({"v": 2}));
        let other_loaded = block_on(store_obj.load_app_state_envelope("shell.prefs"))
            .expect("load")
            .expect("present");
        assert_eq!(other_loaded.payload, json!({"other": true}));
    }

    #[test]
    fn noop_store_never_returns_state() {
        let store = NoopAppStateStore;
        block_on(store.save_app_state_envelope(&envelope(1, json!({})))).expect("save");
        assert_eq!(
            block_on(store.load_app_state_envelope(WINDOW_LAYOUT_NAMESPACE)).expect("load"),
            None
        );
    }
}
