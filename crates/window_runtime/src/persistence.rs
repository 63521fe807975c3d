//! Layout snapshot persistence and the load-time reconciliation rules.

use std::collections::BTreeMap;

use platform_host::{
    load_app_state_with_migration, save_app_state_with, AppStateEnvelope, AppStateStore,
    WINDOW_LAYOUT_NAMESPACE,
};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::WindowManagerConfig,
    model::{
        WindowId, WindowLayoutSnapshot, WindowPosition, WindowRecord, WindowSize, WindowState,
        WindowStoreState, WINDOW_LAYOUT_SCHEMA_VERSION,
    },
};

/// Turns a persisted snapshot into a registry state that is safe to merge into a live session.
///
/// Focus never survives a reload: every record comes back inactive and no window is active.
/// Maximized bounds depend on the viewport that wrote them, so maximized windows come back
/// normal. At most `config.max_restore_windows` records are kept, most recently active first.
pub fn reconcile_restored_windows(
    snapshot: WindowLayoutSnapshot,
    config: &WindowManagerConfig,
) -> WindowStoreState {
    let mut records = snapshot
        .windows
        .into_iter()
        .map(|(window_id, mut record)| {
            record.id = window_id;
            record.is_active = false;
            if record.state == WindowState::Maximized {
                record.state = WindowState::Normal;
            }
            record
        })
        .collect::<Vec<_>>();

    if records.len() > config.max_restore_windows {
        records.sort_by(|a, b| {
            b.last_active_time
                .cmp(&a.last_active_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        records.truncate(config.max_restore_windows);
    }

    let z_high_water = records.iter().map(|r| r.z_index).max().unwrap_or(0);
    WindowStoreState {
        windows: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
        active_window_id: None,
        z_high_water,
    }
}

#[derive(Debug, Default, Deserialize)]
struct LegacyLayout {
    #[serde(default)]
    windows: BTreeMap<String, LegacyWindow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyWindow {
    #[serde(default)]
    title: String,
    #[serde(default)]
    state: Option<WindowState>,
    #[serde(default)]
    position: Option<WindowPosition>,
    #[serde(default)]
    size: Option<WindowSize>,
    #[serde(default)]
    z_index: Option<u32>,
    #[serde(default)]
    is_always_on_top: Option<bool>,
    #[serde(default)]
    last_active_time: Option<u64>,
}

impl LegacyWindow {
    fn into_record(self, id: WindowId) -> WindowRecord {
        WindowRecord {
            id,
            title: self.title,
            is_active: false,
            state: self.state.unwrap_or_default(),
            position: self.position.unwrap_or_default(),
            size: self.size.unwrap_or_default(),
            z_index: self.z_index.unwrap_or(0),
            is_always_on_top: self.is_always_on_top.unwrap_or(false),
            last_active_time: self.last_active_time.unwrap_or(0),
        }
    }
}

fn migrate_legacy_payload(payload: &Value) -> Result<WindowLayoutSnapshot, String> {
    // Unversioned layouts were written either bare or wrapped in a `state` object.
    let body = match payload.get("state") {
        Some(inner) if inner.get("windows").is_some() => inner,
        _ => payload,
    };
    let legacy: LegacyLayout = serde_json::from_value(body.clone()).map_err(|e| e.to_string())?;
    let windows = legacy
        .windows
        .into_iter()
        .map(|(raw_id, window)| {
            let id = WindowId::from(raw_id);
            (id.clone(), window.into_record(id))
        })
        .collect();
    Ok(WindowLayoutSnapshot {
        schema_version: WINDOW_LAYOUT_SCHEMA_VERSION,
        windows,
    })
}

fn migrate_window_layout(
    schema_version: u32,
    envelope: &AppStateEnvelope,
) -> Result<Option<WindowLayoutSnapshot>, String> {
    match schema_version {
        0 => migrate_legacy_payload(&envelope.payload).map(Some),
        _ => Ok(None),
    }
}

/// Loads the persisted window layout, migrating older schema versions.
///
/// # Errors
///
/// Returns an error when the store read, decoding, or migration fails. Callers log it and boot
/// with an empty window set.
pub async fn load_layout_snapshot<S: AppStateStore + ?Sized>(
    store: &S,
) -> Result<Option<WindowLayoutSnapshot>, String> {
    load_app_state_with_migration(
        store,
        WINDOW_LAYOUT_NAMESPACE,
        WINDOW_LAYOUT_SCHEMA_VERSION,
        migrate_window_layout,
    )
    .await
}

/// Persists the current window layout snapshot.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails. The in-memory registry is
/// unaffected either way.
pub async fn persist_layout_snapshot<S: AppStateStore + ?Sized>(
    store: &S,
    state: &WindowStoreState,
) -> Result<(), String> {
    save_app_state_with(
        store,
        WINDOW_LAYOUT_NAMESPACE,
        WINDOW_LAYOUT_SCHEMA_VERSION,
        &state.snapshot(),
    )
    .await
}
