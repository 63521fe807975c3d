//! Viewport-dimension contract consumed by maximize bounds and drag/resize clamping.

use serde::{Deserialize, Serialize};

/// Fallback viewport width when the host cannot report one.
pub const FALLBACK_VIEWPORT_WIDTH: i32 = 1024;
/// Fallback viewport height when the host cannot report one.
pub const FALLBACK_VIEWPORT_HEIGHT: i32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Inner dimensions of the surface the shell renders into, in CSS pixels.
pub struct ViewportSize {
    /// Viewport width.
    pub width: i32,
    /// Viewport height.
    pub height: i32,
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self {
            width: FALLBACK_VIEWPORT_WIDTH,
            height: FALLBACK_VIEWPORT_HEIGHT,
        }
    }
}

/// Host service reporting the current viewport size.
///
/// Queried on demand; implementations must not cache across browser resizes.
pub trait ViewportProvider {
    /// Returns the current viewport size.
    fn viewport_size(&self) -> ViewportSize;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Viewport provider with a fixed size, for headless hosts and tests.
pub struct FixedViewport(pub ViewportSize);

impl FixedViewport {
    /// Creates a fixed viewport of `width` x `height`.
    pub const fn new(width: i32, height: i32) -> Self {
        Self(ViewportSize { width, height })
    }
}

impl ViewportProvider for FixedViewport {
    fn viewport_size(&self) -> ViewportSize {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_viewport_reports_its_size_through_the_trait_object() {
        let provider: &dyn ViewportProvider = &FixedViewport::new(1920, 1080);
        assert_eq!(
            provider.viewport_size(),
            ViewportSize {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn default_viewport_uses_fallback_dimensions() {
        assert_eq!(FixedViewport::default().viewport_size().width, FALLBACK_VIEWPORT_WIDTH);
        assert_eq!(FixedViewport::default().viewport_size().height, FALLBACK_VIEWPORT_HEIGHT);
    }
}
