//! Headless window registry with the named operation surface used by window chrome.

use crate::{
    config::WindowManagerConfig,
    model::{
        InteractionState, PointerPosition, ResizeEdge, WindowId, WindowLayoutSnapshot,
        WindowOptions, WindowPatch, WindowPosition, WindowRecord, WindowRect, WindowSize,
        WindowState, WindowStoreState,
    },
    reducer::{apply_silently, RuntimeEffect, WindowAction},
    window_manager::{issue_z_index, paint_order},
};

/// Owned window registry.
///
/// Every mutation goes through [`reduce_windows`](crate::reducer::reduce_windows); operations on
/// unknown ids are silent no-ops. Effects accumulate until [`WindowStore::take_effects`] drains
/// them.
#[derive(Debug, Clone, Default)]
pub struct WindowStore {
    state: WindowStoreState,
    interaction: InteractionState,
    config: WindowManagerConfig,
    effects: Vec<RuntimeEffect>,
}

impl WindowStore {
    pub fn new(config: WindowManagerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &WindowStoreState {
        &self.state
    }

    pub fn interaction(&self) -> &InteractionState {
        &self.interaction
    }

    pub fn config(&self) -> &WindowManagerConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: WindowManagerConfig) {
        self.config = config;
    }

    pub fn dispatch(&mut self, action: WindowAction) {
        let effects = apply_silently(&mut self.state, &mut self.interaction, &self.config, action);
        if self.config.persist_layout {
            self.effects.extend(effects);
        }
    }

    /// Drains the effects queued since the last call.
    pub fn take_effects(&mut self) -> Vec<RuntimeEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn register_window(&mut self, window_id: WindowId, title: impl Into<String>) {
        self.register_window_with(window_id, title, WindowOptions::default());
    }

    pub fn register_window_with(
        &mut self,
        window_id: WindowId,
        title: impl Into<String>,
        options: WindowOptions,
    ) {
        self.dispatch(WindowAction::Register {
            window_id,
            title: title.into(),
            options,
        });
    }

    pub fn unregister_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::Unregister {
            window_id: window_id.clone(),
        });
    }

    pub fn close_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::Close {
            window_id: window_id.clone(),
        });
    }

    pub fn activate_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::Activate {
            window_id: window_id.clone(),
        });
    }

    pub fn deactivate_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::Deactivate {
            window_id: window_id.clone(),
        });
    }

    pub fn clear_active_window(&mut self) {
        self.dispatch(WindowAction::ClearActive);
    }

    pub fn update_window(&mut self, window_id: &WindowId, patch: WindowPatch) {
        if patch.is_empty() {
            return;
        }
        self.dispatch(WindowAction::Update {
            window_id: window_id.clone(),
            patch,
        });
    }

    pub fn update_window_title(&mut self, window_id: &WindowId, title: impl Into<String>) {
        self.update_window(window_id, WindowPatch::title(title));
    }

    pub fn update_window_position(&mut self, window_id: &WindowId, position: WindowPosition) {
        self.update_window(window_id, WindowPatch::position(position));
    }

    pub fn update_window_size(&mut self, window_id: &WindowId, size: WindowSize) {
        self.update_window(window_id, WindowPatch::size(size));
    }

    pub fn update_window_state(&mut self, window_id: &WindowId, state: WindowState) {
        self.update_window(window_id, WindowPatch::state(state));
    }

    pub fn set_window_always_on_top(&mut self, window_id: &WindowId, enabled: bool) {
        self.update_window(window_id, WindowPatch::always_on_top(enabled));
    }

    pub fn minimize_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::Minimize {
            window_id: window_id.clone(),
        });
    }

    pub fn maximize_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::Maximize {
            window_id: window_id.clone(),
        });
    }

    pub fn restore_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::Restore {
            window_id: window_id.clone(),
        });
    }

    pub fn bring_to_front(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::BringToFront {
            window_id: window_id.clone(),
        });
    }

    pub fn toggle_dock_window(&mut self, window_id: &WindowId) {
        self.dispatch(WindowAction::ToggleDockWindow {
            window_id: window_id.clone(),
        });
    }

    /// Issues the next top-most z-index. Successive calls return strictly increasing values.
    pub fn get_next_z_index(&mut self) -> u32 {
        issue_z_index(&mut self.state)
    }

    pub fn begin_move(&mut self, window_id: &WindowId, pointer: PointerPosition) {
        self.dispatch(WindowAction::BeginMove {
            window_id: window_id.clone(),
            pointer,
        });
    }

    pub fn update_move(&mut self, pointer: PointerPosition, work_area: WindowRect) {
        self.dispatch(WindowAction::UpdateMove { pointer, work_area });
    }

    pub fn end_move(&mut self) {
        self.dispatch(WindowAction::EndMove);
    }

    pub fn begin_resize(
        &mut self,
        window_id: &WindowId,
        edge: ResizeEdge,
        pointer: PointerPosition,
    ) {
        self.dispatch(WindowAction::BeginResize {
            window_id: window_id.clone(),
            edge,
            pointer,
        });
    }

    pub fn update_resize(&mut self, pointer: PointerPosition, work_area: WindowRect) {
        self.dispatch(WindowAction::UpdateResize { pointer, work_area });
    }

    pub fn end_resize(&mut self) {
        self.dispatch(WindowAction::EndResize);
    }

    pub fn cancel_interaction(&mut self) {
        self.dispatch(WindowAction::CancelInteraction);
    }

    pub fn hydrate(&mut self, snapshot: WindowLayoutSnapshot) {
        self.dispatch(WindowAction::HydrateSnapshot { snapshot });
    }

    pub fn get_window(&self, window_id: &WindowId) -> Option<&WindowRecord> {
        self.state.window(window_id)
    }

    pub fn get_active_window(&self) -> Option<&WindowRecord> {
        self.state.active_window()
    }

    pub fn get_all_windows(&self) -> Vec<&WindowRecord> {
        self.state.all_windows()
    }

    pub fn get_visible_windows(&self) -> Vec<&WindowRecord> {
        self.state.visible_windows()
    }

    pub fn get_minimized_windows(&self) -> Vec<&WindowRecord> {
        self.state.minimized_windows()
    }

    pub fn get_overview_windows(&self, query: &str) -> Vec<&WindowRecord> {
        self.state.overview_windows(query)
    }

    pub fn get_paint_order(&self) -> Vec<&WindowRecord> {
        paint_order(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn id(raw: &str) -> WindowId {
        WindowId::from(raw)
    }

    fn ids(windows: Vec<&WindowRecord>) -> Vec<&str> {
        windows.into_iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn scenario_register_single_window() {
        let mut store = WindowStore::default();
        store.register_window(id("w1"), "Terminal");

        assert_eq!(store.get_all_windows().len(), 1);
        let w1 = store.get_window(&id("w1")).expect("registered");
        assert_eq!(w1.title, "Terminal");
        assert_eq!(w1.state, WindowState::Normal);
        assert!(!w1.is_active);
    }

    #[test]
    fn scenario_second_activation_takes_focus() {
        let mut store = WindowStore::default();
        store.register_window(id("w1"), "One");
        store.register_window(id("w2"), "Two");
        store.activate_window(&id("w1"));
        store.activate_window(&id("w2"));

        assert_eq!(
            store.get_active_window().map(|w| w.id.as_str()),
            Some("w2")
        );
        assert!(!store.get_window(&id("w1")).expect("w1").is_active);
    }

    #[test]
    fn scenario_minimize_active_window_leaves_no_focus() {
        let mut store = WindowStore::default();
        store.register_window(id("w1"), "One");
        store.activate_window(&id("w1"));
        store.minimize_window(&id("w1"));

        assert_eq!(store.get_active_window(), None);
        assert_eq!(ids(store.get_minimized_windows()), vec!["w1"]);
    }

    #[test]
    fn scenario_later_registration_stacks_higher() {
        let mut store = WindowStore::default();
        store.register_window(id("w1"), "One");
        store.register_window(id("w2"), "Two");
        let w1 = store.get_window(&id("w1")).expect("w1").z_index;
        let w2 = store.get_window(&id("w2")).expect("w2").z_index;
        assert!(w2 > w1);
    }

    #[test]
    fn scenario_close_maximized_window() {
        let mut store = WindowStore::default();
        store.register_window(id("w1"), "One");
        store.maximize_window(&id("w1"));
        store.close_window(&id("w1"));

        assert!(store.get_all_windows().is_empty());
        assert_eq!(store.get_active_window(), None);
        store.close_window(&id("w1"));
    }

    #[test]
    fn named_setters_update_single_fields() {
        let mut store = WindowStore::default();
        let w1 = id("w1");
        store.register_window(w1.clone(), "Draft");
        store.update_window_title(&w1, "Final");
        store.update_window_position(&w1, WindowPosition { x: 7, y: 8 });
        store.update_window_size(
            &w1,
            WindowSize {
                width: 300,
                height: 200,
            },
        );
        store.set_window_always_on_top(&w1, true);
        store.update_window_state(&w1, WindowState::Maximized);

        let record = store.get_window(&w1).expect("w1");
        assert_eq!(record.title, "Final");
        assert_eq!(record.position, WindowPosition { x: 7, y: 8 });
        assert_eq!(record.size.width, 300);
        assert!(record.is_always_on_top);
        assert_eq!(record.state, WindowState::Maximized);
        assert!(!record.is_active);
    }

    #[test]
    fn next_z_index_is_strictly_increasing_across_closes() {
        let mut store = WindowStore::default();
        store.register_window(id("w1"), "One");
        let first = store.get_next_z_index();
        store.close_window(&id("w1"));
        let second = store.get_next_z_index();
        store.register_window(id("w2"), "Two");
        let third = store.get_next_z_index();
        assert!(first < second && second < third);
        assert!(store.get_window(&id("w2")).expect("w2").z_index > second);
    }

    #[test]
    fn effects_queue_until_drained() {
        let mut store = WindowStore::default();
        store.register_window(id("w1"), "One");
        store.activate_window(&id("ghost"));
        assert_eq!(store.take_effects(), vec![RuntimeEffect::PersistLayout]);
        assert!(store.take_effects().is_empty());
    }

    #[test]
    fn disabled_persistence_queues_no_effects() {
        let mut store = WindowStore::new(WindowManagerConfig {
            persist_layout: false,
            ..WindowManagerConfig::default()
        });
        store.register_window(id("w1"), "One");
        assert!(store.take_effects().is_empty());
    }

    #[test]
    fn empty_patch_is_not_dispatched() {
        let mut store = WindowStore::default();
        store.register_window(id("w1"), "One");
        store.take_effects();
        store.update_window(&id("w1"), WindowPatch::default());
        assert!(store.take_effects().is_empty());
    }

    #[test]
    fn overview_and_paint_order_reads() {
        let mut store = WindowStore::default();
        store.register_window(id("files"), "Files");
        store.register_window(id("term"), "Terminal");
        store.register_window(id("notes"), "Notes");
        store.activate_window(&id("files"));
        store.minimize_window(&id("notes"));

        assert_eq!(ids(store.get_overview_windows("")).first().copied(), Some("files"));
        assert_eq!(ids(store.get_overview_windows("term")), vec!["term"]);
        assert_eq!(ids(store.get_paint_order()), vec!["term", "files"]);
    }

    #[test]
    fn drag_through_the_store() {
        let mut store = WindowStore::default();
        let w1 = id("w1");
        store.register_window(w1.clone(), "One");
        store.begin_move(&w1, PointerPosition { x: 0, y: 0 });
        store.update_move(
            PointerPosition { x: 25, y: 15 },
            WindowRect {
                x: 0,
                y: 32,
                w: 1280,
                h: 678,
            },
        );
        store.end_move();
        assert_eq!(
            store.get_window(&w1).expect("w1").position,
            WindowPosition { x: 125, y: 115 }
        );
        assert!(!store.interaction().is_active());
    }
}
