//! Typed host-domain contracts shared by the window runtime and browser adapters.
//!
//! This crate is the API-first boundary for platform services the window manager consumes but
//! does not implement: durable app-state envelopes, lightweight preferences, wall-clock time and
//! viewport dimensions. Concrete browser adapters live in `platform_host_web`.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod storage;
pub mod time;
pub mod viewport;

pub use storage::app_state::{
    build_app_state_envelope, load_app_state_with_migration, migrate_envelope_payload,
    save_app_state_with, AppStateEnvelope, AppStateStore, AppStateStoreFuture,
    MemoryAppStateStore, NoopAppStateStore, APP_STATE_ENVELOPE_VERSION, WINDOW_LAYOUT_NAMESPACE,
};
pub use storage::prefs::{
    load_pref_with, save_pref_with, MemoryPrefsStore, NoopPrefsStore, PrefsStore, PrefsStoreFuture,
};
pub use time::{next_monotonic_timestamp_ms, unix_time_ms_now};
pub use viewport::{FixedViewport, ViewportProvider, ViewportSize};
