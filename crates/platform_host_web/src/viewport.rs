//! Browser viewport provider reading `window.innerWidth` / `window.innerHeight`.

use platform_host::{
    viewport::{FALLBACK_VIEWPORT_HEIGHT, FALLBACK_VIEWPORT_WIDTH},
    ViewportProvider, ViewportSize,
};

/// Smallest viewport width reported to the window manager.
pub const MIN_VIEWPORT_WIDTH: i32 = 320;
/// Smallest viewport height reported to the window manager.
pub const MIN_VIEWPORT_HEIGHT: i32 = 240;

#[derive(Debug, Clone, Copy, Default)]
/// Viewport provider backed by the browser window.
///
/// Falls back to 1024x768 when the browser window is unavailable (native targets, workers).
pub struct BrowserViewport;

impl ViewportProvider for BrowserViewport {
    fn viewport_size(&self) -> ViewportSize {
        #[cfg(target_arch = "wasm32")]
        {
            if let Some(window) = web_sys::window() {
                let width = window
                    .inner_width()
                    .ok()
                    .and_then(|value| value.as_f64())
                    .map(|value| value as i32)
                    .unwrap_or(FALLBACK_VIEWPORT_WIDTH);
                let height = window
                    .inner_height()
                    .ok()
                    .and_then(|value| value.as_f64())
                    .map(|value| value as i32)
                    .unwrap_or(FALLBACK_VIEWPORT_HEIGHT);
                return ViewportSize {
                    width: width.max(MIN_VIEWPORT_WIDTH),
                    height: height.max(MIN_VIEWPORT_HEIGHT),
                };
            }
        }

        ViewportSize {
            width: FALLBACK_VIEWPORT_WIDTH,
            height: FALLBACK_VIEWPORT_HEIGHT,
        }
    }
}
