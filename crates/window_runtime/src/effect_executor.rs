//! Explicit runtime effect-queue executor for reducer-emitted side effects.

use leptos::*;

use crate::runtime_context::WindowStoreContext;

/// Installs the effect executor that drains reducer-emitted runtime effects in order.
pub fn install(runtime: WindowStoreContext) {
    create_effect(move |_| {
        if runtime.effects.with(Vec::is_empty) {
            return;
        }
        drain(runtime);
    });
}

/// Runs every queued effect once against the current registry state.
///
/// The queue is cleared before running so nested dispatches enqueue a fresh batch. Consecutive
/// duplicates collapse into one run.
pub fn drain(runtime: WindowStoreContext) {
    let mut queued = runtime.effects.get_untracked();
    if queued.is_empty() {
        return;
    }
    runtime.effects.set(Vec::new());
    queued.dedup();

    let state = runtime.state.get_untracked();
    runtime.host.with_value(|host| {
        for effect in queued {
            host.run_runtime_effect(&state, effect);
        }
    });
}
