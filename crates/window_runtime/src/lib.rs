//! Window registry and focus manager for the browser desktop shell.
//!
//! [`reduce_windows`] is the single transition engine. [`WindowStore`] wraps it for headless
//! callers, and [`WindowStoreProvider`] exposes it to Leptos components through
//! [`WindowStoreContext`] and the memoized hooks in [`selectors`].

pub mod config;
pub mod effect_executor;
pub mod host;
pub mod model;
pub mod persistence;
pub mod reducer;
pub mod runtime_context;
pub mod selectors;
pub mod store;
pub mod window_manager;

pub use config::{load_window_manager_config, WindowManagerConfig, WINDOW_MANAGER_CONFIG_KEY};
pub use host::WindowHostContext;
pub use model::*;
pub use persistence::{load_layout_snapshot, persist_layout_snapshot, reconcile_restored_windows};
pub use reducer::{apply_silently, reduce_windows, ReducerError, RuntimeEffect, WindowAction};
pub use runtime_context::{use_window_store, WindowStoreContext, WindowStoreProvider};
pub use selectors::{
    use_active_window, use_active_window_title, use_all_windows, use_minimized_windows,
    use_overview_windows, use_paint_order, use_visible_windows, use_window,
};
pub use store::WindowStore;
pub use window_manager::{
    display_rect, effective_z_index, maximized_bounds, paint_order, work_area, ShellChrome,
};
