//! Document-level pointer listeners for drag and resize sessions.
//!
//! A session attaches `pointermove`/`pointerup`/`pointercancel` listeners to the document when
//! it starts and must detach them on every exit path. [`PointerListenerGuard`] owns the
//! registration: dropping it (session end, component unmount, provider teardown) detaches the
//! listeners exactly once.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Client-space pointer coordinates delivered to session callbacks.
pub struct PointerSample {
    /// Client x coordinate.
    pub x: i32,
    /// Client y coordinate.
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a pointer session finished.
pub enum PointerEnd {
    /// `pointerup`: the gesture completed at this position.
    Released(PointerSample),
    /// `pointercancel`: the platform took the pointer away mid-gesture.
    Cancelled,
}

/// Scoped registration of document pointer listeners.
#[must_use = "dropping the guard detaches the listeners immediately"]
pub struct PointerListenerGuard {
    detach: Option<Box<dyn FnOnce()>>,
}

impl PointerListenerGuard {
    /// Wraps a detach routine that runs once when the guard is dropped or detached.
    pub fn from_detach(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    /// Guard with nothing attached (no document available).
    pub fn inert() -> Self {
        Self { detach: None }
    }

    /// Returns whether listeners are still attached.
    pub fn is_attached(&self) -> bool {
        self.detach.is_some()
    }

    /// Detaches the listeners now. Later calls and the eventual drop are no-ops.
    pub fn detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for PointerListenerGuard {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for PointerListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerListenerGuard")
            .field("attached", &self.is_attached())
            .finish()
    }
}

/// Attaches document pointer listeners for one interaction session.
///
/// `on_move` receives every `pointermove`; `on_end` receives the final `pointerup` or
/// `pointercancel` as a [`PointerEnd`]. On native targets nothing is attached and an inert
/// guard is returned.
pub fn attach_pointer_session(
    on_move: impl FnMut(PointerSample) + 'static,
    on_end: impl FnMut(PointerEnd) + 'static,
) -> PointerListenerGuard {
    #[cfg(target_arch = "wasm32")]
    {
        attach_document_listeners(on_move, on_end)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = (on_move, on_end);
        PointerListenerGuard::inert()
    }
}

#[cfg(target_arch = "wasm32")]
fn attach_document_listeners(
    mut on_move: impl FnMut(PointerSample) + 'static,
    on_end: impl FnMut(PointerEnd) + 'static,
) -> PointerListenerGuard {
    use std::{cell::RefCell, rc::Rc};

    use wasm_bindgen::{closure::Closure, JsCast};

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return PointerListenerGuard::inert();
    };
    let target: web_sys::EventTarget = document.into();

    let sample = |ev: &web_sys::PointerEvent| PointerSample {
        x: ev.client_x(),
        y: ev.client_y(),
    };
    let on_end = Rc::new(RefCell::new(on_end));

    let move_listener = Closure::<dyn FnMut(web_sys::PointerEvent)>::new(
        move |ev: web_sys::PointerEvent| on_move(sample(&ev)),
    );
    let up_end = on_end.clone();
    let up_listener =
        Closure::<dyn FnMut(web_sys::PointerEvent)>::new(move |ev: web_sys::PointerEvent| {
            (&mut *up_end.borrow_mut())(PointerEnd::Released(sample(&ev)))
        });
    let cancel_listener = Closure::<dyn FnMut(web_sys::PointerEvent)>::new(
        move |_ev: web_sys::PointerEvent| (&mut *on_end.borrow_mut())(PointerEnd::Cancelled),
    );

    let listeners = [
        ("pointermove", move_listener),
        ("pointerup", up_listener),
        ("pointercancel", cancel_listener),
    ];
    for (event, listener) in &listeners {
        let _ = target.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
    }

    PointerListenerGuard::from_detach(move || {
        for (event, listener) in &listeners {
            let _ = target
                .remove_event_listener_with_callback(event, listener.as_ref().unchecked_ref());
        }
        // The guard is usually dropped from inside `on_end`; free the closures after the
        // current event dispatch returns.
        wasm_bindgen_futures::spawn_local(async move {
            drop(listeners);
        });
    })
}
