//! Reducer actions, side-effect intents, and transition logic for the window registry.

use leptos::logging;
use platform_host::next_monotonic_timestamp_ms;
use thiserror::Error;

use crate::{
    config::WindowManagerConfig,
    model::{
        DragSession, InteractionState, PointerPosition, ResizeEdge, ResizeSession, WindowId,
        WindowLayoutSnapshot, WindowOptions, WindowPatch, WindowRecord, WindowRect, WindowState,
        WindowStoreState,
    },
    persistence::reconcile_restored_windows,
    window_manager::{
        claim_z_index, drag_position, focus_window_internal, issue_z_index, release_focus,
        resize_rect,
    },
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_windows`] to mutate [`WindowStoreState`].
pub enum WindowAction {
    /// Insert a window, replacing any record already registered under the same id.
    Register {
        /// Caller-assigned window id.
        window_id: WindowId,
        /// Initial title.
        title: String,
        /// Overrides for the registration defaults.
        options: WindowOptions,
    },
    /// Remove a window because its component unmounted.
    Unregister {
        /// Window to remove.
        window_id: WindowId,
    },
    /// Remove a window because the user closed it.
    Close {
        /// Window to close.
        window_id: WindowId,
    },
    /// Focus and raise a window, restoring it if minimized.
    Activate {
        /// Window to activate.
        window_id: WindowId,
    },
    /// Drop focus from a window if it holds it.
    Deactivate {
        /// Window to deactivate.
        window_id: WindowId,
    },
    /// Drop focus from whichever window holds it.
    ClearActive,
    /// Merge a partial update into a window.
    Update {
        /// Window to update.
        window_id: WindowId,
        /// Fields to merge.
        patch: WindowPatch,
    },
    /// Minimize a window and drop its focus.
    Minimize {
        /// Window to minimize.
        window_id: WindowId,
    },
    /// Maximize and focus a window.
    Maximize {
        /// Window to maximize.
        window_id: WindowId,
    },
    /// Return a window to the normal state and focus it.
    Restore {
        /// Window to restore.
        window_id: WindowId,
    },
    /// Raise a window without changing focus.
    BringToFront {
        /// Window to raise.
        window_id: WindowId,
    },
    /// Dock or overview click: restore, minimize, or focus depending on current state.
    ToggleDockWindow {
        /// Window associated with the dock button.
        window_id: WindowId,
    },
    /// Begin dragging a window by its title bar.
    BeginMove {
        /// Window being dragged.
        window_id: WindowId,
        /// Pointer position at drag start.
        pointer: PointerPosition,
    },
    /// Update an in-progress window drag.
    UpdateMove {
        /// Current pointer position.
        pointer: PointerPosition,
        /// Area the window must stay reachable in.
        work_area: WindowRect,
    },
    /// End the active window drag.
    EndMove,
    /// Begin resizing a window.
    BeginResize {
        /// Window being resized.
        window_id: WindowId,
        /// Edge or corner being dragged.
        edge: ResizeEdge,
        /// Pointer position at resize start.
        pointer: PointerPosition,
    },
    /// Update an in-progress window resize.
    UpdateResize {
        /// Current pointer position.
        pointer: PointerPosition,
        /// Area the window may not grow past.
        work_area: WindowRect,
    },
    /// End the active window resize.
    EndResize,
    /// Abort the active drag or resize and put the window back where it started.
    CancelInteraction,
    /// Merge a persisted layout under the live registrations.
    HydrateSnapshot {
        /// Snapshot payload to restore.
        snapshot: WindowLayoutSnapshot,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_windows`] for the runtime to execute.
pub enum RuntimeEffect {
    /// Persist the current window layout snapshot.
    PersistLayout,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reducer errors for actions that reference a missing window.
pub enum ReducerError {
    /// The target window id was not found in the current state.
    #[error("window `{0}` not found")]
    WindowNotFound(WindowId),
}

/// Applies a [`WindowAction`] to the window registry and collects resulting side effects.
///
/// This function is the authoritative state transition engine for window focus, stacking,
/// lifecycle state and interactive geometry.
///
/// # Errors
///
/// Returns [`ReducerError::WindowNotFound`] when an action references a window that is not
/// present. State is left untouched in that case.
pub fn reduce_windows(
    state: &mut WindowStoreState,
    interaction: &mut InteractionState,
    config: &WindowManagerConfig,
    action: WindowAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        WindowAction::Register {
            window_id,
            title,
            options,
        } => {
            if let Some(previous) = state.windows.remove(&window_id) {
                end_session_for(interaction, &window_id);
                if previous.is_active {
                    state.active_window_id = None;
                }
            }
            let z_index = match options.z_index {
                Some(z_index) => claim_z_index(state, &window_id, z_index),
                None => issue_z_index(state),
            };
            let record = WindowRecord {
                id: window_id.clone(),
                title,
                is_active: false,
                state: options.state.unwrap_or_default(),
                position: options.position.unwrap_or(config.default_position),
                size: options.size.unwrap_or(config.default_size),
                z_index,
                is_always_on_top: options.is_always_on_top.unwrap_or(false),
                last_active_time: options
                    .last_active_time
                    .unwrap_or_else(next_monotonic_timestamp_ms),
            };
            state.windows.insert(window_id, record);
            effects.push(RuntimeEffect::PersistLayout);
        }
        WindowAction::Unregister { window_id } | WindowAction::Close { window_id } => {
            if state.windows.remove(&window_id).is_none() {
                return Err(ReducerError::WindowNotFound(window_id));
            }
            if state.active_window_id.as_ref() == Some(&window_id) {
                state.active_window_id = None;
            }
            end_session_for(interaction, &window_id);
            effects.push(RuntimeEffect::PersistLayout);
        }
        WindowAction::Activate { window_id } => {
            activate(state, &window_id)?;
            effects.push(RuntimeEffect::PersistLayout);
        }
        WindowAction::Deactivate { window_id } => {
            ensure_window(state, &window_id)?;
            release_focus(state, &window_id);
        }
        WindowAction::ClearActive => {
            if let Some(window_id) = state.active_window_id.take() {
                if let Some(window) = state.windows.get_mut(&window_id) {
                    window.is_active = false;
                }
            }
        }
        WindowAction::Update { window_id, patch } => {
            patch.apply_fields(find_window_mut(state, &window_id)?);
            if let Some(z_index) = patch.z_index {
                let z_index = claim_z_index(state, &window_id, z_index);
                find_window_mut(state, &window_id)?.z_index = z_index;
            }
            if let Some(next) = patch.state {
                set_window_state(state, interaction, &window_id, next);
            }
            effects.push(RuntimeEffect::PersistLayout);
        }
        WindowAction::Minimize { window_id } => {
            ensure_window(state, &window_id)?;
            set_window_state(state, interaction, &window_id, WindowState::Minimized);
            effects.push(RuntimeEffect::PersistLayout);
        }
        WindowAction::Maximize { window_id } => {
            find_window_mut(state, &window_id)?.state = WindowState::Maximized;
            activate(state, &window_id)?;
            effects.push(RuntimeEffect::PersistLayout);
        }
        WindowAction::Restore { window_id } => {
            find_window_mut(state, &window_id)?.state = WindowState::Normal;
            activate(state, &window_id)?;
            effects.push(RuntimeEffect::PersistLayout);
        }
        WindowAction::BringToFront { window_id } => {
            ensure_window(state, &window_id)?;
            let z_index = issue_z_index(state);
            find_window_mut(state, &window_id)?.z_index = z_index;
            effects.push(RuntimeEffect::PersistLayout);
        }
        WindowAction::ToggleDockWindow { window_id } => {
            let (minimized, active) = state
                .windows
                .get(&window_id)
                .map(|w| (w.state == WindowState::Minimized, w.is_active))
                .ok_or_else(|| ReducerError::WindowNotFound(window_id.clone()))?;
            let next = if minimized {
                WindowAction::Restore { window_id }
            } else if active {
                WindowAction::Minimize { window_id }
            } else {
                WindowAction::Activate { window_id }
            };
            effects.extend(reduce_windows(state, interaction, config, next)?);
        }
        WindowAction::BeginMove { window_id, pointer } => {
            let was_normal = find_window_mut(state, &window_id)?.state == WindowState::Normal;
            activate(state, &window_id)?;
            if was_normal {
                let position_start = find_window_mut(state, &window_id)?.position;
                interaction.resizing = None;
                interaction.dragging = Some(DragSession {
                    window_id,
                    pointer_start: pointer,
                    position_start,
                });
            } else {
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        WindowAction::UpdateMove { pointer, work_area } => {
            if let Some(session) = interaction.dragging.clone() {
                match state.windows.get_mut(&session.window_id) {
                    Some(window) if window.state == WindowState::Normal => {
                        window.position = drag_position(
                            session.position_start,
                            session.pointer_start,
                            pointer,
                            window.size,
                            work_area,
                            config.min_visible_px,
                        );
                    }
                    Some(_) => {}
                    None => interaction.dragging = None,
                }
            }
        }
        WindowAction::EndMove => {
            if interaction.dragging.take().is_some() {
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        WindowAction::BeginResize {
            window_id,
            edge,
            pointer,
        } => {
            let window = find_window_mut(state, &window_id)?;
            let was_normal = window.state == WindowState::Normal;
            let rect_start = window.rect();
            activate(state, &window_id)?;
            if was_normal {
                interaction.dragging = None;
                interaction.resizing = Some(ResizeSession {
                    window_id,
                    edge,
                    pointer_start: pointer,
                    rect_start,
                });
            } else {
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        WindowAction::UpdateResize { pointer, work_area } => {
            if let Some(session) = interaction.resizing.clone() {
                match state.windows.get_mut(&session.window_id) {
                    Some(window) if window.state == WindowState::Normal => {
                        let rect = resize_rect(
                            session.rect_start,
                            session.edge,
                            pointer.x - session.pointer_start.x,
                            pointer.y - session.pointer_start.y,
                            config.min_size,
                            work_area,
                        );
                        window.position = rect.position();
                        window.size = rect.size();
                    }
                    Some(_) => {}
                    None => interaction.resizing = None,
                }
            }
        }
        WindowAction::EndResize => {
            if interaction.resizing.take().is_some() {
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        WindowAction::CancelInteraction => {
            let mut ended = false;
            if let Some(session) = interaction.dragging.take() {
                if let Some(window) = state.windows.get_mut(&session.window_id) {
                    window.position = session.position_start;
                }
                ended = true;
            }
            if let Some(session) = interaction.resizing.take() {
                if let Some(window) = state.windows.get_mut(&session.window_id) {
                    window.position = session.rect_start.position();
                    window.size = session.rect_start.size();
                }
                ended = true;
            }
            if ended {
                effects.push(RuntimeEffect::PersistLayout);
            }
        }
        WindowAction::HydrateSnapshot { snapshot } => {
            let restored = reconcile_restored_windows(snapshot, config);
            let mut incoming = restored
                .windows
                .into_values()
                .filter(|record| !state.windows.contains_key(&record.id))
                .collect::<Vec<_>>();
            incoming.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
            // Restored z-indices come from another session; reissue them in their saved order.
            for mut record in incoming {
                record.z_index = issue_z_index(state);
                state.windows.insert(record.id.clone(), record);
            }
        }
    }

    debug_assert_eq!(state.check_invariants(), Ok(()));
    debug_assert!(interaction.dragging.is_none() || interaction.resizing.is_none());
    Ok(effects)
}

/// Applies `action`, treating an unknown window id as a no-op.
///
/// Stale references from unmounted components are expected, so the error is only logged in
/// debug builds.
pub fn apply_silently(
    state: &mut WindowStoreState,
    interaction: &mut InteractionState,
    config: &WindowManagerConfig,
    action: WindowAction,
) -> Vec<RuntimeEffect> {
    match reduce_windows(state, interaction, config, action) {
        Ok(effects) => effects,
        Err(err) => {
            logging::debug_warn!("window action ignored: {err}");
            Vec::new()
        }
    }
}

fn find_window_mut<'a>(
    state: &'a mut WindowStoreState,
    window_id: &WindowId,
) -> Result<&'a mut WindowRecord, ReducerError> {
    state
        .windows
        .get_mut(window_id)
        .ok_or_else(|| ReducerError::WindowNotFound(window_id.clone()))
}

fn ensure_window(state: &WindowStoreState, window_id: &WindowId) -> Result<(), ReducerError> {
    if state.windows.contains_key(window_id) {
        Ok(())
    } else {
        Err(ReducerError::WindowNotFound(window_id.clone()))
    }
}

fn activate(state: &mut WindowStoreState, window_id: &WindowId) -> Result<(), ReducerError> {
    if focus_window_internal(state, window_id, next_monotonic_timestamp_ms()) {
        Ok(())
    } else {
        Err(ReducerError::WindowNotFound(window_id.clone()))
    }
}

/// Generic state setter. Minimizing always drops focus; other transitions leave focus alone.
fn set_window_state(
    state: &mut WindowStoreState,
    interaction: &mut InteractionState,
    window_id: &WindowId,
    next: WindowState,
) {
    let Some(window) = state.windows.get_mut(window_id) else {
        return;
    };
    window.state = next;
    if next == WindowState::Minimized {
        release_focus(state, window_id);
        end_session_for(interaction, window_id);
    }
}

fn end_session_for(interaction: &mut InteractionState, window_id: &WindowId) {
    if interaction
        .dragging
        .as_ref()
        .is_some_and(|s| &s.window_id == window_id)
    {
        interaction.dragging = None;
    }
    if interaction
        .resizing
        .as_ref()
        .is_some_and(|s| &s.window_id == window_id)
    {
        interaction.resizing = None;
    }
}
