//! Stacking, focus and geometry helpers shared by the window reducer and the chrome.

use platform_host::ViewportSize;
use serde::{Deserialize, Serialize};

use crate::model::{
    PointerPosition, ResizeEdge, WindowId, WindowPosition, WindowRecord, WindowRect, WindowSize,
    WindowState, WindowStoreState,
};

/// Minimum allowed managed window width.
pub const MIN_WINDOW_WIDTH: i32 = 220;
/// Minimum allowed managed window height.
pub const MIN_WINDOW_HEIGHT: i32 = 140;
/// Pixels of a dragged window that must stay inside the work area.
pub const MIN_VISIBLE_PX: i32 = 48;
/// Style z-index boost applied to the active window's chrome.
pub const ACTIVE_STACK_BOOST: u32 = 10;
/// Style z-index offset separating pinned windows from the regular stack.
pub const ALWAYS_ON_TOP_BAND: u32 = 1_000_000;

/// Issues a fresh top-most z-index and records it as the high-water mark.
///
/// Values are never reused, even after the window holding the previous maximum closes.
pub fn issue_z_index(state: &mut WindowStoreState) -> u32 {
    let max_existing = state
        .windows
        .values()
        .map(|w| w.z_index)
        .max()
        .unwrap_or(0);
    let next = max_existing.max(state.z_high_water).saturating_add(1);
    state.z_high_water = next;
    next
}

/// Raises the high-water mark to cover an externally supplied z-index.
pub fn note_z_index(state: &mut WindowStoreState, z_index: u32) {
    state.z_high_water = state.z_high_water.max(z_index);
}

/// Resolves a caller-requested z-index for `window_id`.
///
/// The requested value is kept unless another window already holds it, in which case a fresh
/// top-most value is issued instead.
pub fn claim_z_index(state: &mut WindowStoreState, window_id: &WindowId, requested: u32) -> u32 {
    let taken = state
        .windows
        .values()
        .any(|w| &w.id != window_id && w.z_index == requested);
    if taken {
        return issue_z_index(state);
    }
    note_z_index(state, requested);
    requested
}

/// Focuses and raises `window_id`, un-minimizing it if needed.
///
/// Returns `false` when the window does not exist.
pub fn focus_window_internal(state: &mut WindowStoreState, window_id: &WindowId, now: u64) -> bool {
    if !state.windows.contains_key(window_id) {
        return false;
    }

    for window in state.windows.values_mut() {
        window.is_active = false;
    }
    let z_index = issue_z_index(state);
    if let Some(window) = state.windows.get_mut(window_id) {
        window.is_active = true;
        window.last_active_time = now;
        window.z_index = z_index;
        if window.state == WindowState::Minimized {
            window.state = WindowState::Normal;
        }
    }
    state.active_window_id = Some(window_id.clone());
    true
}

/// Drops focus from `window_id` if it holds it. Other windows are untouched.
pub fn release_focus(state: &mut WindowStoreState, window_id: &WindowId) {
    if let Some(window) = state.windows.get_mut(window_id) {
        window.is_active = false;
    }
    if state.active_window_id.as_ref() == Some(window_id) {
        state.active_window_id = None;
    }
}

/// Ordering key for painting: pinned windows above unpinned ones, then by z-index.
pub fn stack_priority(window: &WindowRecord) -> (bool, u32) {
    (window.is_always_on_top, window.z_index)
}

/// CSS z-index for a window's chrome.
pub fn effective_z_index(window: &WindowRecord) -> u32 {
    let mut z_index = window.z_index;
    if window.is_always_on_top {
        z_index = z_index.saturating_add(ALWAYS_ON_TOP_BAND);
    }
    if window.is_active {
        z_index = z_index.saturating_add(ACTIVE_STACK_BOOST);
    }
    z_index
}

/// Visible windows from bottom to top.
pub fn paint_order(state: &WindowStoreState) -> Vec<&WindowRecord> {
    let mut windows = state.visible_windows();
    windows.sort_by(|a, b| {
        stack_priority(a)
            .cmp(&stack_priority(b))
            .then_with(|| a.id.cmp(&b.id))
    });
    windows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Screen space reserved by the shell around managed windows.
pub struct ShellChrome {
    /// Height of the top bar.
    pub topbar_height: i32,
    /// Height of the dock.
    pub dock_height: i32,
    /// Gap between the dock and the bottom screen edge.
    pub dock_margin: i32,
}

impl Default for ShellChrome {
    fn default() -> Self {
        Self {
            topbar_height: 32,
            dock_height: 74,
            dock_margin: 16,
        }
    }
}

impl ShellChrome {
    pub(crate) fn sanitized(self) -> Self {
        Self {
            topbar_height: self.topbar_height.max(0),
            dock_height: self.dock_height.max(0),
            dock_margin: self.dock_margin.max(0),
        }
    }

    fn reserved_bottom(self) -> i32 {
        self.dock_height + self.dock_margin
    }
}

/// Area between the top bar and the dock where windows live.
pub fn work_area(viewport: ViewportSize, chrome: ShellChrome) -> WindowRect {
    let height = viewport.height - chrome.topbar_height - chrome.reserved_bottom();
    WindowRect {
        x: 0,
        y: chrome.topbar_height,
        w: viewport.width.max(1),
        h: height.max(1),
    }
}

/// Bounding box a maximized window fills.
pub fn maximized_bounds(viewport: ViewportSize, chrome: ShellChrome) -> WindowRect {
    work_area(viewport, chrome)
}

/// Geometry the chrome should render for `window`.
///
/// Minimized windows render nothing and return `None`.
pub fn display_rect(
    window: &WindowRecord,
    viewport: ViewportSize,
    chrome: ShellChrome,
) -> Option<WindowRect> {
    match window.state {
        WindowState::Normal => Some(window.rect()),
        WindowState::Maximized => Some(maximized_bounds(viewport, chrome)),
        WindowState::Minimized => None,
    }
}

/// Computes a dragged window position from the session start snapshot.
///
/// The result keeps at least `min_visible` pixels of the window horizontally inside the work
/// area and never lets the title bar leave its vertical range.
pub fn drag_position(
    position_start: WindowPosition,
    pointer_start: PointerPosition,
    pointer: PointerPosition,
    size: WindowSize,
    work_area: WindowRect,
    min_visible: i32,
) -> WindowPosition {
    let raw_x = position_start.x + (pointer.x - pointer_start.x);
    let raw_y = position_start.y + (pointer.y - pointer_start.y);

    let min_x = work_area.x - size.width + min_visible;
    let max_x = (work_area.right() - min_visible).max(min_x);
    let min_y = work_area.y;
    let max_y = (work_area.bottom() - min_visible).max(min_y);

    WindowPosition {
        x: raw_x.clamp(min_x, max_x),
        y: raw_y.clamp(min_y, max_y),
    }
}

/// Applies a resize drag on `edge` to the session start rect.
///
/// The edge opposite the one being dragged stays anchored. The result is at least `min_size`
/// and never extends past the work area further than the start rect already did.
pub fn resize_rect(
    start: WindowRect,
    edge: ResizeEdge,
    dx: i32,
    dy: i32,
    min_size: WindowSize,
    work_area: WindowRect,
) -> WindowRect {
    let mut left = start.x;
    let mut right = start.right();
    let mut top = start.y;
    let mut bottom = start.bottom();

    if edge.moves_left() {
        left = (start.x + dx)
            .max(work_area.x.min(start.x))
            .min(right - min_size.width);
    }
    if edge.moves_right() {
        right = (start.right() + dx)
            .min(work_area.right().max(start.right()))
            .max(left + min_size.width);
    }
    if edge.moves_top() {
        top = (start.y + dy)
            .max(work_area.y.min(start.y))
            .min(bottom - min_size.height);
    }
    if edge.moves_bottom() {
        bottom = (start.bottom() + dy)
            .min(work_area.bottom().max(start.bottom()))
            .max(top + min_size.height);
    }

    WindowRect {
        x: left,
        y: top,
        w: right - left,
        h: bottom - top,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const MIN: WindowSize = WindowSize {
        width: MIN_WINDOW_WIDTH,
        height: MIN_WINDOW_HEIGHT,
    };

    fn viewport() -> ViewportSize {
        ViewportSize {
            width: 1280,
            height: 800,
        }
    }

    fn area() -> WindowRect {
        work_area(viewport(), ShellChrome::default())
    }

    fn record(id: &str, z_index: u32) -> WindowRecord {
        WindowRecord {
            id: WindowId::from(id),
            title: id.to_string(),
            is_active: false,
            state: WindowState::Normal,
            position: WindowPosition::default(),
            size: WindowSize::default(),
            z_index,
            is_always_on_top: false,
            last_active_time: 0,
        }
    }

    fn state_with(records: Vec<WindowRecord>) -> WindowStoreState {
        let z_high_water = records.iter().map(|r| r.z_index).max().unwrap_or(0);
        WindowStoreState {
            windows: records.into_iter().map(|r| (r.id.clone(), r)).collect(),
            active_window_id: None,
            z_high_water,
        }
    }

    #[test]
    fn issued_z_indices_skip_values_freed_by_closes() {
        let mut state = state_with(vec![record("a", 1), record("b", 2)]);
        assert_eq!(issue_z_index(&mut state), 3);
        state.windows.clear();
        assert_eq!(issue_z_index(&mut state), 4);
    }

    #[test]
    fn claimed_z_index_is_kept_unless_another_window_holds_it() {
        let mut state = state_with(vec![record("a", 1), record("b", 2)]);
        let b = WindowId::from("b");
        assert_eq!(claim_z_index(&mut state, &b, 2), 2);
        assert_eq!(claim_z_index(&mut state, &b, 20), 20);
        assert_eq!(state.z_high_water, 20);
        assert_eq!(claim_z_index(&mut state, &b, 1), 21);
    }

    #[test]
    fn focus_deactivates_others_and_unminimizes() {
        let mut state = state_with(vec![record("a", 1), record("b", 2)]);
        let a = WindowId::from("a");
        let b = WindowId::from("b");
        assert!(focus_window_internal(&mut state, &a, 10));
        state.windows.get_mut(&b).unwrap().state = WindowState::Minimized;
        assert!(focus_window_internal(&mut state, &b, 20));

        let a_rec = state.window(&a).unwrap();
        let b_rec = state.window(&b).unwrap();
        assert!(!a_rec.is_active);
        assert!(b_rec.is_active);
        assert_eq!(b_rec.state, WindowState::Normal);
        assert_eq!(b_rec.last_active_time, 20);
        assert!(b_rec.z_index > a_rec.z_index);
        assert_eq!(state.active_window_id, Some(b));
        assert!(!focus_window_internal(&mut state, &WindowId::from("ghost"), 30));
    }

    #[test]
    fn refocusing_the_top_window_issues_a_fresh_z_index() {
        let mut state = state_with(vec![record("a", 1)]);
        let a = WindowId::from("a");
        assert!(focus_window_internal(&mut state, &a, 1));
        let z_index = state.window(&a).unwrap().z_index;
        assert!(focus_window_internal(&mut state, &a, 2));

        let a_rec = state.window(&a).unwrap();
        assert!(a_rec.z_index > z_index);
        assert_eq!(a_rec.z_index, state.z_high_water);
        assert_eq!(a_rec.last_active_time, 2);
        assert!(a_rec.is_active);
        assert_eq!(state.active_window_id, Some(a));
    }

    #[test]
    fn pinned_windows_paint_above_higher_z_indices() {
        let mut pinned = record("pinned", 1);
        pinned.is_always_on_top = true;
        let mut hidden = record("hidden", 9);
        hidden.state = WindowState::Minimized;
        let state = state_with(vec![pinned, record("top", 5), hidden]);

        let order = paint_order(&state)
            .into_iter()
            .map(|w| w.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["top", "pinned"]);
    }

    #[test]
    fn effective_z_index_layers_pin_band_and_active_boost() {
        let mut win = record("a", 7);
        assert_eq!(effective_z_index(&win), 7);
        win.is_active = true;
        assert_eq!(effective_z_index(&win), 17);
        win.is_always_on_top = true;
        assert_eq!(effective_z_index(&win), ALWAYS_ON_TOP_BAND + 17);
    }

    #[test]
    fn work_area_excludes_top_bar_and_dock() {
        assert_eq!(
            area(),
            WindowRect {
                x: 0,
                y: 32,
                w: 1280,
                h: 800 - 32 - 74 - 16,
            }
        );
        let tiny = work_area(
            ViewportSize {
                width: 0,
                height: 50,
            },
            ShellChrome::default(),
        );
        assert_eq!((tiny.w, tiny.h), (1, 1));
    }

    #[test]
    fn display_rect_follows_window_state() {
        let mut win = record("a", 1);
        assert_eq!(
            display_rect(&win, viewport(), ShellChrome::default()),
            Some(win.rect())
        );
        win.state = WindowState::Maximized;
        assert_eq!(
            display_rect(&win, viewport(), ShellChrome::default()),
            Some(area())
        );
        win.state = WindowState::Minimized;
        assert_eq!(display_rect(&win, viewport(), ShellChrome::default()), None);
    }

    #[test]
    fn drag_is_absolute_from_the_start_snapshot() {
        let start = WindowPosition { x: 100, y: 100 };
        let pointer_start = PointerPosition { x: 150, y: 110 };
        let moved = drag_position(
            start,
            pointer_start,
            PointerPosition { x: 180, y: 150 },
            WindowSize::default(),
            area(),
            MIN_VISIBLE_PX,
        );
        assert_eq!(moved, WindowPosition { x: 130, y: 140 });
    }

    #[test]
    fn drag_keeps_a_grab_strip_inside_the_work_area() {
        let size = WindowSize::default();
        let start = WindowPosition { x: 100, y: 100 };
        let origin = PointerPosition { x: 0, y: 0 };

        let far_left = drag_position(
            start,
            origin,
            PointerPosition { x: -5000, y: -5000 },
            size,
            area(),
            MIN_VISIBLE_PX,
        );
        assert_eq!(
            far_left,
            WindowPosition {
                x: -size.width + MIN_VISIBLE_PX,
                y: 32,
            }
        );

        let far_right = drag_position(
            start,
            origin,
            PointerPosition { x: 5000, y: 5000 },
            size,
            area(),
            MIN_VISIBLE_PX,
        );
        assert_eq!(far_right.x, 1280 - MIN_VISIBLE_PX);
        assert_eq!(far_right.y, area().bottom() - MIN_VISIBLE_PX);
    }

    #[test]
    fn resize_east_and_south_grow_from_anchored_origin() {
        let start = WindowRect {
            x: 100,
            y: 100,
            w: 400,
            h: 300,
        };
        let grown = resize_rect(start, ResizeEdge::SouthEast, 50, 40, MIN, area());
        assert_eq!(
            grown,
            WindowRect {
                x: 100,
                y: 100,
                w: 450,
                h: 340,
            }
        );
    }

    #[test]
    fn resize_clamps_to_minimum_with_opposite_edge_anchored() {
        let start = WindowRect {
            x: 100,
            y: 100,
            w: 400,
            h: 300,
        };
        let shrunk = resize_rect(start, ResizeEdge::NorthWest, 1000, 1000, MIN, area());
        assert_eq!(shrunk.right(), start.right());
        assert_eq!(shrunk.bottom(), start.bottom());
        assert_eq!((shrunk.w, shrunk.h), (MIN_WINDOW_WIDTH, MIN_WINDOW_HEIGHT));
    }

    #[test]
    fn resize_never_grows_past_the_work_area() {
        let start = WindowRect {
            x: 100,
            y: 100,
            w: 400,
            h: 300,
        };
        let wa = area();
        for edge in ResizeEdge::ALL {
            let rect = resize_rect(start, edge, 5000, 5000, MIN, wa);
            assert!(rect.right() <= wa.right(), "{edge:?} right edge escaped");
            assert!(rect.bottom() <= wa.bottom(), "{edge:?} bottom edge escaped");
            let rect = resize_rect(start, edge, -5000, -5000, MIN, wa);
            assert!(rect.x >= wa.x, "{edge:?} left edge escaped");
            assert!(rect.y >= wa.y, "{edge:?} top edge escaped");
            assert!(rect.w >= MIN_WINDOW_WIDTH && rect.h >= MIN_WINDOW_HEIGHT);
        }
    }
}
