//! Runtime provider and context wiring for the window registry.
//!
//! This module owns the long-lived reducer container, the runtime effect queue, boot hydration
//! and the pointer-listener lifetime of drag/resize sessions. Read-side projections live in
//! [`crate::selectors`].
#![allow(clippy::clone_on_copy)]

use leptos::*;
use platform_host_web::{attach_pointer_session, PointerEnd, PointerListenerGuard, PointerSample};

use crate::{
    config::WindowManagerConfig,
    effect_executor,
    host::WindowHostContext,
    model::{
        InteractionState, PointerPosition, ResizeEdge, WindowId, WindowOptions, WindowPatch,
        WindowPosition, WindowRecord, WindowRect, WindowSize, WindowState, WindowStoreState,
    },
    reducer::{apply_silently, RuntimeEffect, WindowAction},
    window_manager::issue_z_index,
};

#[derive(Clone, Copy)]
/// Leptos context for reading window state and dispatching [`WindowAction`] values.
pub struct WindowStoreContext {
    /// Host service bundle for executing runtime side effects and viewport queries.
    pub host: StoredValue<WindowHostContext>,
    /// Reactive registry state signal.
    pub state: RwSignal<WindowStoreState>,
    /// Reactive drag/resize interaction state signal.
    pub interaction: RwSignal<InteractionState>,
    /// Active window-manager configuration.
    pub config: RwSignal<WindowManagerConfig>,
    /// Queue of runtime effects emitted by the reducer and drained by the executor.
    pub effects: RwSignal<Vec<RuntimeEffect>>,
    /// Reducer dispatch callback.
    pub dispatch: Callback<WindowAction>,
    pointer_session: StoredValue<Option<PointerListenerGuard>>,
}

impl WindowStoreContext {
    /// Creates the signals and dispatch callback under the current reactive owner.
    ///
    /// Does not provide the context or install boot hydration; [`WindowStoreProvider`] does both.
    pub fn new(host: WindowHostContext) -> Self {
        let host = store_value(host);
        let state = create_rw_signal(WindowStoreState::default());
        let interaction = create_rw_signal(InteractionState::default());
        let config = create_rw_signal(WindowManagerConfig::default());
        let effects = create_rw_signal(Vec::<RuntimeEffect>::new());
        let pointer_session = store_value(None::<PointerListenerGuard>);

        let dispatch = Callback::new(move |action: WindowAction| {
            let mut registry = state.get_untracked();
            let mut ui = interaction.get_untracked();
            let previous_registry = registry.clone();
            let previous_ui = ui.clone();

            let (new_effects, persist) = config.with_untracked(|config| {
                (
                    apply_silently(&mut registry, &mut ui, config, action),
                    config.persist_layout,
                )
            });

            if registry != previous_registry {
                state.set(registry);
            }
            if ui != previous_ui {
                if !ui.is_active() {
                    pointer_session.update_value(|guard| {
                        guard.take();
                    });
                }
                interaction.set(ui);
            }
            if persist && !new_effects.is_empty() {
                effects.update(|queue| queue.extend(new_effects));
            }
        });

        Self {
            host,
            state,
            interaction,
            config,
            effects,
            dispatch,
            pointer_session,
        }
    }

    /// Dispatches a reducer action through the runtime context callback.
    pub fn dispatch_action(&self, action: WindowAction) {
        self.dispatch.call(action);
    }

    pub fn register_window(&self, window_id: WindowId, title: impl Into<String>) {
        self.register_window_with(window_id, title, WindowOptions::default());
    }

    pub fn register_window_with(
        &self,
        window_id: WindowId,
        title: impl Into<String>,
        options: WindowOptions,
    ) {
        self.dispatch_action(WindowAction::Register {
            window_id,
            title: title.into(),
            options,
        });
    }

    pub fn unregister_window(&self, window_id: WindowId) {
        self.dispatch_action(WindowAction::Unregister { window_id });
    }

    pub fn close_window(&self, window_id: WindowId) {
        self.dispatch_action(WindowAction::Close { window_id });
    }

    pub fn activate_window(&self, window_id: WindowId) {
        self.dispatch_action(WindowAction::Activate { window_id });
    }

    pub fn deactivate_window(&self, window_id: WindowId) {
        self.dispatch_action(WindowAction::Deactivate { window_id });
    }

    pub fn clear_active_window(&self) {
        self.dispatch_action(WindowAction::ClearActive);
    }

    pub fn update_window(&self, window_id: WindowId, patch: WindowPatch) {
        if !patch.is_empty() {
            self.dispatch_action(WindowAction::Update { window_id, patch });
        }
    }

    pub fn update_window_title(&self, window_id: WindowId, title: impl Into<String>) {
        self.update_window(window_id, WindowPatch::title(title));
    }

    pub fn update_window_position(&self, window_id: WindowId, position: WindowPosition) {
        self.update_window(window_id, WindowPatch::position(position));
    }

    pub fn update_window_size(&self, window_id: WindowId, size: WindowSize) {
        self.update_window(window_id, WindowPatch::size(size));
    }

    pub fn update_window_state(&self, window_id: WindowId, state: WindowState) {
        self.update_window(window_id, WindowPatch::state(state));
    }

    pub fn set_window_always_on_top(&self, window_id: WindowId, enabled: bool) {
        self.update_window(window_id, WindowPatch::always_on_top(enabled));
    }

    pub fn minimize_window(&self, window_id: WindowId) {
        self.dispatch_action(WindowAction::Minimize { window_id });
    }

    pub fn maximize_window(&self, window_id: WindowId) {
        self.dispatch_action(WindowAction::Maximize { window_id });
    }

    pub fn restore_window(&self, window_id: WindowId) {
        self.dispatch_action(WindowAction::Restore { window_id });
    }

    pub fn bring_to_front(&self, window_id: WindowId) {
        self.dispatch_action(WindowAction::BringToFront { window_id });
    }

    pub fn toggle_dock_window(&self, window_id: WindowId) {
        self.dispatch_action(WindowAction::ToggleDockWindow { window_id });
    }

    /// Issues the next top-most z-index. Successive calls return strictly increasing values.
    pub fn get_next_z_index(&self) -> u32 {
        self.state.try_update(issue_z_index).unwrap_or_default()
    }

    /// Area windows may occupy in the current viewport.
    pub fn work_area(&self) -> WindowRect {
        let chrome = self.config.with_untracked(|config| config.chrome);
        self.host.with_value(|host| host.work_area(chrome))
    }

    /// Bounding box a maximized window fills in the current viewport.
    pub fn maximized_bounds(&self) -> WindowRect {
        let chrome = self.config.with_untracked(|config| config.chrome);
        self.host.with_value(|host| host.maximized_bounds(chrome))
    }

    /// Starts a title-bar drag and routes document pointer events into it until release.
    pub fn begin_move(&self, window_id: WindowId, pointer: PointerPosition) {
        self.dispatch_action(WindowAction::BeginMove { window_id, pointer });
        if self.interaction.with_untracked(|ui| ui.dragging.is_some()) {
            let runtime = *self;
            self.attach_pointer_listeners(
                move |pointer| runtime.update_move(pointer),
                move || runtime.end_move(),
            );
        }
    }

    pub fn update_move(&self, pointer: PointerPosition) {
        let work_area = self.work_area();
        self.dispatch_action(WindowAction::UpdateMove { pointer, work_area });
    }

    pub fn end_move(&self) {
        self.dispatch_action(WindowAction::EndMove);
    }

    /// Starts an edge/corner resize and routes document pointer events into it until release.
    pub fn begin_resize(&self, window_id: WindowId, edge: ResizeEdge, pointer: PointerPosition) {
        self.dispatch_action(WindowAction::BeginResize {
            window_id,
            edge,
            pointer,
        });
        if self.interaction.with_untracked(|ui| ui.resizing.is_some()) {
            let runtime = *self;
            self.attach_pointer_listeners(
                move |pointer| runtime.update_resize(pointer),
                move || runtime.end_resize(),
            );
        }
    }

    pub fn update_resize(&self, pointer: PointerPosition) {
        let work_area = self.work_area();
        self.dispatch_action(WindowAction::UpdateResize { pointer, work_area });
    }

    pub fn end_resize(&self) {
        self.dispatch_action(WindowAction::EndResize);
    }

    /// Aborts the running drag or resize, putting the window back where it started.
    pub fn cancel_interaction(&self) {
        self.dispatch_action(WindowAction::CancelInteraction);
    }

    /// Returns whether document pointer listeners are currently attached.
    pub fn pointer_session_attached(&self) -> bool {
        self.pointer_session
            .with_value(|guard| guard.as_ref().is_some_and(PointerListenerGuard::is_attached))
    }

    pub(crate) fn release_pointer_session(&self) {
        self.pointer_session.update_value(|guard| {
            guard.take();
        });
    }

    fn attach_pointer_listeners(
        &self,
        on_move: impl Fn(PointerPosition) + 'static,
        on_release: impl Fn() + 'static,
    ) {
        let runtime = *self;
        let guard = attach_pointer_session(
            move |sample| on_move(pointer_from(sample)),
            move |end| match end {
                PointerEnd::Released(_) => on_release(),
                PointerEnd::Cancelled => runtime.cancel_interaction(),
            },
        );
        self.pointer_session.set_value(Some(guard));
    }

    pub fn get_window(&self, window_id: &WindowId) -> Option<WindowRecord> {
        self.state.with(|state| state.window(window_id).cloned())
    }

    pub fn get_active_window(&self) -> Option<WindowRecord> {
        self.state.with(|state| state.active_window().cloned())
    }

    pub fn get_all_windows(&self) -> Vec<WindowRecord> {
        self.state
            .with(|state| state.all_windows().into_iter().cloned().collect())
    }

    pub fn get_visible_windows(&self) -> Vec<WindowRecord> {
        self.state
            .with(|state| state.visible_windows().into_iter().cloned().collect())
    }

    pub fn get_minimized_windows(&self) -> Vec<WindowRecord> {
        self.state
            .with(|state| state.minimized_windows().into_iter().cloned().collect())
    }
}

fn pointer_from(sample: PointerSample) -> PointerPosition {
    PointerPosition {
        x: sample.x,
        y: sample.y,
    }
}

fn install_runtime_orchestration(runtime: WindowStoreContext) {
    install_boot_hydration(runtime);
    effect_executor::install(runtime);
}

fn install_boot_hydration(runtime: WindowStoreContext) {
    create_effect(move |_| {
        let host = runtime.host.get_value();
        spawn_local(async move {
            let config = host
                .boot(move |config| runtime.config.set(config), runtime.dispatch)
                .await;
            logging::log!(
                "window runtime booted on {} host (restore_on_boot={})",
                host.host_strategy_name(),
                config.restore_on_boot
            );
        });
    });
}

#[component]
/// Provides [`WindowStoreContext`] to descendant components and restores the persisted layout.
pub fn WindowStoreProvider(
    /// Host services; browser adapters selected at compile time when omitted.
    #[prop(optional)]
    host: Option<WindowHostContext>,
    children: Children,
) -> impl IntoView {
    let runtime = WindowStoreContext::new(host.unwrap_or_default());
    provide_context(runtime.clone());
    install_runtime_orchestration(runtime);
    on_cleanup(move || runtime.release_pointer_session());

    children().into_view()
}

/// Returns the current [`WindowStoreContext`].
///
/// # Panics
///
/// Panics if called outside [`WindowStoreProvider`].
pub fn use_window_store() -> WindowStoreContext {
    use_context::<WindowStoreContext>().expect("WindowStoreContext not provided")
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use platform_host::{FixedViewport, MemoryPrefsStore, NoopAppStateStore};
    use pretty_assertions::assert_eq;

    use super::*;

    fn runtime() -> WindowStoreContext {
        WindowStoreContext::new(WindowHostContext::new(
            Rc::new(NoopAppStateStore),
            Rc::new(MemoryPrefsStore::default()),
            Rc::new(FixedViewport::new(1280, 800)),
        ))
    }

    fn id(raw: &str) -> WindowId {
        WindowId::from(raw)
    }

    #[test]
    fn dispatch_applies_actions_and_queues_effects() {
        let _ = create_runtime();
        let runtime = runtime();
        runtime.register_window(id("w1"), "Terminal");
        runtime.activate_window(id("w1"));

        let active = runtime.get_active_window().expect("active window");
        assert_eq!(active.id, id("w1"));
        assert_eq!(runtime.get_all_windows().len(), 1);
        assert_eq!(
            runtime.effects.get_untracked(),
            vec![RuntimeEffect::PersistLayout, RuntimeEffect::PersistLayout]
        );
    }

    #[test]
    fn unknown_ids_leave_signals_untouched() {
        let _ = create_runtime();
        let runtime = runtime();
        runtime.register_window(id("w1"), "Terminal");
        runtime.effects.set(Vec::new());
        let before = runtime.state.get_untracked();

        runtime.minimize_window(id("ghost"));
        runtime.close_window(id("ghost"));
        assert_eq!(runtime.state.get_untracked(), before);
        assert!(runtime.effects.get_untracked().is_empty());
    }

    #[test]
    fn persistence_toggle_suppresses_effects() {
        let _ = create_runtime();
        let runtime = runtime();
        runtime.config.update(|config| config.persist_layout = false);
        runtime.register_window(id("w1"), "Terminal");
        assert!(runtime.effects.get_untracked().is_empty());
        assert_eq!(runtime.get_visible_windows().len(), 1);
    }

    #[test]
    fn next_z_index_stays_above_registered_windows() {
        let _ = create_runtime();
        let runtime = runtime();
        runtime.register_window(id("w1"), "One");
        let first = runtime.get_next_z_index();
        let second = runtime.get_next_z_index();
        let w1 = runtime.get_window(&id("w1")).expect("w1");
        assert!(w1.z_index < first && first < second);
    }

    #[test]
    fn drag_updates_clamp_against_the_host_work_area() {
        let _ = create_runtime();
        let runtime = runtime();
        runtime.register_window(id("w1"), "One");
        runtime.begin_move(id("w1"), PointerPosition { x: 0, y: 0 });
        assert!(runtime.interaction.get_untracked().dragging.is_some());
        assert!(!runtime.pointer_session_attached());

        runtime.update_move(PointerPosition { x: 0, y: -500 });
        assert_eq!(
            runtime.get_window(&id("w1")).map(|w| w.position),
            Some(WindowPosition { x: 100, y: 32 })
        );

        runtime.end_move();
        assert!(!runtime.interaction.get_untracked().is_active());
    }

    #[test]
    fn cancel_puts_a_resized_window_back() {
        let _ = create_runtime();
        let runtime = runtime();
        runtime.register_window(id("w1"), "One");
        runtime.begin_resize(id("w1"), ResizeEdge::East, PointerPosition { x: 900, y: 0 });
        runtime.update_resize(PointerPosition { x: 1000, y: 0 });
        assert_eq!(runtime.get_window(&id("w1")).map(|w| w.size.width), Some(900));

        runtime.cancel_interaction();
        assert_eq!(runtime.get_window(&id("w1")).map(|w| w.size.width), Some(800));
        assert!(!runtime.interaction.get_untracked().is_active());
    }

    #[test]
    fn maximized_bounds_track_configured_chrome() {
        let _ = create_runtime();
        let runtime = runtime();
        assert_eq!(runtime.maximized_bounds().y, 32);
        runtime
            .config
            .update(|config| config.chrome.topbar_height = 0);
        assert_eq!(
            runtime.maximized_bounds(),
            WindowRect {
                x: 0,
                y: 0,
                w: 1280,
                h: 800 - 74 - 16,
            }
        );
    }
}
