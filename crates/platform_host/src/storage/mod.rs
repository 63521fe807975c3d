//! Persistence contracts for window layout snapshots and preferences.

pub mod app_state;
pub mod prefs;
