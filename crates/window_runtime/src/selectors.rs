//! Memoized projections of the window registry for chrome components.
//!
//! Each selector recomputes when the registry changes but only notifies subscribers when its own
//! projection differs, so a title change in one window does not re-render unrelated chrome.

use leptos::*;

use crate::{
    model::{WindowId, WindowRecord},
    runtime_context::{use_window_store, WindowStoreContext},
    window_manager::{effective_z_index, paint_order},
};

fn cloned(windows: Vec<&WindowRecord>) -> Vec<WindowRecord> {
    windows.into_iter().cloned().collect()
}

pub fn window_memo(
    runtime: WindowStoreContext,
    window_id: WindowId,
) -> Memo<Option<WindowRecord>> {
    create_memo(move |_| runtime.state.with(|state| state.window(&window_id).cloned()))
}

pub fn active_window_memo(runtime: WindowStoreContext) -> Memo<Option<WindowRecord>> {
    create_memo(move |_| runtime.state.with(|state| state.active_window().cloned()))
}

pub fn all_windows_memo(runtime: WindowStoreContext) -> Memo<Vec<WindowRecord>> {
    create_memo(move |_| runtime.state.with(|state| cloned(state.all_windows())))
}

pub fn visible_windows_memo(runtime: WindowStoreContext) -> Memo<Vec<WindowRecord>> {
    create_memo(move |_| runtime.state.with(|state| cloned(state.visible_windows())))
}

pub fn minimized_windows_memo(runtime: WindowStoreContext) -> Memo<Vec<WindowRecord>> {
    create_memo(move |_| runtime.state.with(|state| cloned(state.minimized_windows())))
}

/// Overview cards for `query`, most recently activated first.
pub fn overview_windows_memo(
    runtime: WindowStoreContext,
    query: MaybeSignal<String>,
) -> Memo<Vec<WindowRecord>> {
    create_memo(move |_| {
        query.with(|query| runtime.state.with(|state| cloned(state.overview_windows(query))))
    })
}

/// Visible windows paired with the CSS z-index their chrome should use, ordered by that value.
///
/// The active-window boost can lift a window above one with a higher stored z-index, so this
/// order may differ from [`paint_order`].
pub fn paint_order_memo(runtime: WindowStoreContext) -> Memo<Vec<(WindowId, u32)>> {
    create_memo(move |_| {
        runtime.state.with(|state| {
            let mut order = paint_order(state)
                .into_iter()
                .map(|w| (w.id.clone(), effective_z_index(w)))
                .collect::<Vec<_>>();
            order.sort_by(|(a_id, a_z), (b_id, b_z)| a_z.cmp(b_z).then_with(|| a_id.cmp(b_id)));
            order
        })
    })
}

/// Title shown in the top bar.
pub fn active_window_title_memo(runtime: WindowStoreContext) -> Memo<Option<String>> {
    create_memo(move |_| {
        runtime
            .state
            .with(|state| state.active_window().map(|w| w.title.clone()))
    })
}

pub fn use_window(window_id: WindowId) -> Memo<Option<WindowRecord>> {
    window_memo(use_window_store(), window_id)
}

pub fn use_active_window() -> Memo<Option<WindowRecord>> {
    active_window_memo(use_window_store())
}

pub fn use_all_windows() -> Memo<Vec<WindowRecord>> {
    all_windows_memo(use_window_store())
}

pub fn use_visible_windows() -> Memo<Vec<WindowRecord>> {
    visible_windows_memo(use_window_store())
}

pub fn use_minimized_windows() -> Memo<Vec<WindowRecord>> {
    minimized_windows_memo(use_window_store())
}

pub fn use_overview_windows(query: impl Into<MaybeSignal<String>>) -> Memo<Vec<WindowRecord>> {
    overview_windows_memo(use_window_store(), query.into())
}

pub fn use_paint_order() -> Memo<Vec<(WindowId, u32)>> {
    paint_order_memo(use_window_store())
}

pub fn use_active_window_title() -> Memo<Option<String>> {
    active_window_title_memo(use_window_store())
}
