//! Browser (`wasm32`) implementations of [`platform_host`] service contracts.
//!
//! This crate is the concrete browser-side wiring layer for the window runtime: `localStorage`
//! persistence for layout snapshots and preferences, viewport dimensions from the browser
//! window, and document-level pointer listeners for drag/resize sessions. Every adapter compiles
//! on native targets with an inert fallback so the workspace can be tested without a browser.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

/// Compile-time host-strategy selection and concrete adapter factories for runtime wiring.
pub mod adapters;
pub mod pointer;
pub mod storage;
pub mod viewport;

pub use adapters::{
    app_state_store, host_strategy_name, prefs_store, selected_host_strategy, viewport_provider,
    AppStateStoreAdapter, HostStrategy, PrefsStoreAdapter,
};
pub use pointer::{attach_pointer_session, PointerEnd, PointerListenerGuard, PointerSample};
pub use storage::local_app_state::WebAppStateStore;
pub use storage::local_prefs::WebPrefsStore;
pub use viewport::BrowserViewport;
