use std::{cell::Cell, collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const WINDOW_LAYOUT_SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_WINDOW_X: i32 = 100;
pub const DEFAULT_WINDOW_Y: i32 = 100;
pub const DEFAULT_WINDOW_WIDTH: i32 = 800;
pub const DEFAULT_WINDOW_HEIGHT: i32 = 600;

thread_local! {
    static NEXT_GENERATED_WINDOW_ID: Cell<u64> = const { Cell::new(1) };
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub String);

impl WindowId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns a fresh id that no other call in this process has returned.
    ///
    /// For window components that have no identity scheme of their own.
    pub fn generate() -> Self {
        let seq = NEXT_GENERATED_WINDOW_ID.with(|next| {
            let seq = next.get();
            next.set(seq.saturating_add(1));
            seq
        });
        Self(format!("window-{seq}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for WindowId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowState {
    #[default]
    Normal,
    Maximized,
    Minimized,
}

impl WindowState {
    pub fn is_visible(self) -> bool {
        !matches!(self, Self::Minimized)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Maximized => "Maximized",
            Self::Minimized => "Minimized",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPosition {
    pub x: i32,
    pub y: i32,
}

impl Default for WindowPosition {
    fn default() -> Self {
        Self {
            x: DEFAULT_WINDOW_X,
            y: DEFAULT_WINDOW_Y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: i32,
    pub height: i32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: DEFAULT_WINDOW_WIDTH,
            height: DEFAULT_WINDOW_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl WindowRect {
    pub fn from_parts(position: WindowPosition, size: WindowSize) -> Self {
        Self {
            x: position.x,
            y: position.y,
            w: size.width,
            h: size.height,
        }
    }

    pub fn position(self) -> WindowPosition {
        WindowPosition {
            x: self.x,
            y: self.y,
        }
    }

    pub fn size(self) -> WindowSize {
        WindowSize {
            width: self.w,
            height: self.h,
        }
    }

    pub fn right(self) -> i32 {
        self.x + self.w
    }

    pub fn bottom(self) -> i32 {
        self.y + self.h
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRecord {
    pub id: WindowId,
    pub title: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub state: WindowState,
    #[serde(default)]
    pub position: WindowPosition,
    #[serde(default)]
    pub size: WindowSize,
    #[serde(default)]
    pub z_index: u32,
    #[serde(default)]
    pub is_always_on_top: bool,
    #[serde(default)]
    pub last_active_time: u64,
}

impl WindowRecord {
    /// Geometry stored for the normal state.
    pub fn rect(&self) -> WindowRect {
        WindowRect::from_parts(self.position, self.size)
    }

    /// Short status shown on overview cards.
    pub fn status_label(&self) -> &'static str {
        match self.state {
            WindowState::Minimized | WindowState::Maximized => self.state.label(),
            WindowState::Normal if self.is_active => "Active",
            WindowState::Normal => "Background",
        }
    }
}

/// Overrides applied on top of the registration defaults.
///
/// Unset fields fall back to: state `Normal`, position (100, 100), size 800x600, a freshly
/// issued z-index, not pinned, last activation now. Focus is not an option; windows register
/// inactive and gain focus through activation only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowOptions {
    pub state: Option<WindowState>,
    pub position: Option<WindowPosition>,
    pub size: Option<WindowSize>,
    pub z_index: Option<u32>,
    pub is_always_on_top: Option<bool>,
    pub last_active_time: Option<u64>,
}

impl WindowOptions {
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = Some(WindowPosition { x, y });
        self
    }

    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.size = Some(WindowSize { width, height });
        self
    }

    pub fn with_state(mut self, state: WindowState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_z_index(mut self, z_index: u32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn always_on_top(mut self) -> Self {
        self.is_always_on_top = Some(true);
        self
    }
}

/// Partial update merged into an existing record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowPatch {
    pub title: Option<String>,
    pub state: Option<WindowState>,
    pub position: Option<WindowPosition>,
    pub size: Option<WindowSize>,
    pub z_index: Option<u32>,
    pub is_always_on_top: Option<bool>,
    pub last_active_time: Option<u64>,
}

impl WindowPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn state(state: WindowState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    pub fn position(position: WindowPosition) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn size(size: WindowSize) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn always_on_top(enabled: bool) -> Self {
        Self {
            is_always_on_top: Some(enabled),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges every set field except `state` and `z_index`, which the reducer routes through
    /// the focus-aware transition path and z-index issuance.
    pub(crate) fn apply_fields(&self, record: &mut WindowRecord) {
        if let Some(title) = &self.title {
            record.title.clone_from(title);
        }
        if let Some(position) = self.position {
            record.position = position;
        }
        if let Some(size) = self.size {
            record.size = size;
        }
        if let Some(pinned) = self.is_always_on_top {
            record.is_always_on_top = pinned;
        }
        if let Some(at) = self.last_active_time {
            record.last_active_time = at;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WindowStoreState {
    pub windows: BTreeMap<WindowId, WindowRecord>,
    pub active_window_id: Option<WindowId>,
    /// Highest z-index ever issued or observed. Never decreases, so closing the top window does
    /// not free its stacking slot for reuse.
    pub z_high_water: u32,
}

impl WindowStoreState {
    pub fn window(&self, window_id: &WindowId) -> Option<&WindowRecord> {
        self.windows.get(window_id)
    }

    pub fn active_window(&self) -> Option<&WindowRecord> {
        self.active_window_id
            .as_ref()
            .and_then(|id| self.windows.get(id))
    }

    pub fn all_windows(&self) -> Vec<&WindowRecord> {
        self.windows.values().collect()
    }

    pub fn visible_windows(&self) -> Vec<&WindowRecord> {
        self.windows
            .values()
            .filter(|w| w.state.is_visible())
            .collect()
    }

    pub fn minimized_windows(&self) -> Vec<&WindowRecord> {
        self.windows
            .values()
            .filter(|w| !w.state.is_visible())
            .collect()
    }

    /// Windows whose title contains `query` (case-insensitive), most recently activated first.
    pub fn overview_windows(&self, query: &str) -> Vec<&WindowRecord> {
        let needle = query.trim().to_lowercase();
        let mut windows = self
            .windows
            .values()
            .filter(|w| needle.is_empty() || w.title.to_lowercase().contains(&needle))
            .collect::<Vec<_>>();
        windows.sort_by(|a, b| {
            b.last_active_time
                .cmp(&a.last_active_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        windows
    }

    /// Visible windows from bottom to top.
    pub fn paint_order(&self) -> Vec<&WindowRecord> {
        crate::window_manager::paint_order(self)
    }

    /// Persistable layout. Focus is session state and is written cleared.
    pub fn snapshot(&self) -> WindowLayoutSnapshot {
        let windows = self
            .windows
            .iter()
            .map(|(window_id, window)| {
                let mut window = window.clone();
                window.is_active = false;
                (window_id.clone(), window)
            })
            .collect();
        WindowLayoutSnapshot {
            schema_version: WINDOW_LAYOUT_SCHEMA_VERSION,
            windows,
        }
    }

    /// Validates the focus and stacking invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violation found. Any violation is a reducer bug, not a runtime
    /// condition callers should handle.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if let Some(active_id) = &self.active_window_id {
            let Some(active) = self.windows.get(active_id) else {
                return Err(InvariantViolation::DanglingActiveWindow(active_id.clone()));
            };
            if !active.is_active {
                return Err(InvariantViolation::ActiveFlagMismatch(active_id.clone()));
            }
        }

        let mut holders = BTreeMap::new();
        for window in self.windows.values() {
            if let Some(holder) = holders.insert(window.z_index, &window.id) {
                return Err(InvariantViolation::DuplicateZIndex {
                    window_id: window.id.clone(),
                    other: holder.clone(),
                    z_index: window.z_index,
                });
            }
            if window.is_active && self.active_window_id.as_ref() != Some(&window.id) {
                return Err(InvariantViolation::ActiveFlagMismatch(window.id.clone()));
            }
            if window.is_active && window.state == WindowState::Minimized {
                return Err(InvariantViolation::MinimizedWindowActive(window.id.clone()));
            }
            if window.z_index > self.z_high_water {
                return Err(InvariantViolation::ZIndexAboveHighWater {
                    window_id: window.id.clone(),
                    z_index: window.z_index,
                    high_water: self.z_high_water,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    #[error("active window `{0}` is not registered")]
    DanglingActiveWindow(WindowId),
    #[error("window `{0}` active flag disagrees with the active window id")]
    ActiveFlagMismatch(WindowId),
    #[error("minimized window `{0}` is marked active")]
    MinimizedWindowActive(WindowId),
    #[error("window `{window_id}` has z-index {z_index} above the issued maximum {high_water}")]
    ZIndexAboveHighWater {
        window_id: WindowId,
        z_index: u32,
        high_water: u32,
    },
    #[error("windows `{other}` and `{window_id}` share z-index {z_index}")]
    DuplicateZIndex {
        window_id: WindowId,
        other: WindowId,
        z_index: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowLayoutSnapshot {
    pub schema_version: u32,
    pub windows: BTreeMap<WindowId, WindowRecord>,
}

impl Default for WindowLayoutSnapshot {
    fn default() -> Self {
        Self {
            schema_version: WINDOW_LAYOUT_SCHEMA_VERSION,
            windows: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeEdge {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeEdge {
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::South,
        Self::East,
        Self::West,
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    pub fn moves_left(self) -> bool {
        matches!(self, Self::West | Self::NorthWest | Self::SouthWest)
    }

    pub fn moves_right(self) -> bool {
        matches!(self, Self::East | Self::NorthEast | Self::SouthEast)
    }

    pub fn moves_top(self) -> bool {
        matches!(self, Self::North | Self::NorthEast | Self::NorthWest)
    }

    pub fn moves_bottom(self) -> bool {
        matches!(self, Self::South | Self::SouthEast | Self::SouthWest)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub window_id: WindowId,
    pub pointer_start: PointerPosition,
    pub position_start: WindowPosition,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeSession {
    pub window_id: WindowId,
    pub edge: ResizeEdge,
    pub pointer_start: PointerPosition,
    pub rect_start: WindowRect,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub dragging: Option<DragSession>,
    pub resizing: Option<ResizeSession>,
}

impl InteractionState {
    pub fn is_active(&self) -> bool {
        self.dragging.is_some() || self.resizing.is_some()
    }

    pub fn session_window(&self) -> Option<&WindowId> {
        self.dragging
            .as_ref()
            .map(|s| &s.window_id)
            .or_else(|| self.resizing.as_ref().map(|s| &s.window_id))
    }
}
