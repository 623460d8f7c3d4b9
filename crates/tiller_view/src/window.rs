//! Window manager
//!
//! Tracks open windows and the view each one hosts. Window ids are
//! allocated from a per-manager counter, never reused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use tiller_core::{ViewId, WindowId};

use crate::view::ViewError;

#[derive(Default)]
struct WindowState {
    hosted: Option<ViewId>,
}

/// Tracks open windows and their hosted views
pub struct WindowManager {
    next_id: AtomicU64,
    windows: RwLock<HashMap<WindowId, WindowState>>,
}

impl WindowManager {
    /// Create a new manager with no open windows
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            windows: RwLock::new(HashMap::new()),
        }
    }

    /// Open a fresh, empty window
    pub fn open_window(&self) -> WindowId {
        let id = WindowId::from_raw(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.windows.write().insert(id, WindowState::default());
        log::debug!("opened {}", id);
        id
    }

    /// Host `view` in `window`, replacing any previous occupant
    pub fn host(&self, window: WindowId, view: ViewId) -> Result<(), ViewError> {
        let mut windows = self.windows.write();
        let state = windows
            .get_mut(&window)
            .ok_or(ViewError::UnknownWindow(window))?;
        if let Some(previous) = state.hosted.replace(view) {
            log::debug!("{} replaced view '{}'", window, previous);
        }
        Ok(())
    }

    /// The view currently hosted in `window`
    pub fn hosted_view(&self, window: WindowId) -> Option<ViewId> {
        self.windows
            .read()
            .get(&window)
            .and_then(|state| state.hosted.clone())
    }

    /// Close a window, dropping whatever it hosted
    pub fn close_window(&self, window: WindowId) -> Result<(), ViewError> {
        self.windows
            .write()
            .remove(&window)
            .map(|_| ())
            .ok_or(ViewError::UnknownWindow(window))
    }

    /// Whether `window` is open
    pub fn contains(&self, window: WindowId) -> bool {
        self.windows.read().contains_key(&window)
    }

    /// Number of open windows
    pub fn window_count(&self) -> usize {
        self.windows.read().len()
    }
}

impl Default for WindowManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_windows_get_distinct_ids() {
        let manager = WindowManager::new();
        let first = manager.open_window();
        let second = manager.open_window();
        assert_ne!(first, second);
        assert_eq!(manager.window_count(), 2);
    }

    #[test]
    fn test_host_and_replace() {
        let manager = WindowManager::new();
        let window = manager.open_window();

        manager.host(window, ViewId::new("a")).unwrap();
        assert_eq!(manager.hosted_view(window), Some(ViewId::new("a")));

        manager.host(window, ViewId::new("b")).unwrap();
        assert_eq!(manager.hosted_view(window), Some(ViewId::new("b")));
    }

    #[test]
    fn test_host_in_unknown_window_fails() {
        let manager = WindowManager::new();
        let bogus = WindowId::from_raw(999);
        assert!(matches!(
            manager.host(bogus, ViewId::new("a")),
            Err(ViewError::UnknownWindow(_))
        ));
    }

    #[test]
    fn test_close_window() {
        let manager = WindowManager::new();
        let window = manager.open_window();
        manager.close_window(window).unwrap();
        assert!(!manager.contains(window));
        assert!(manager.close_window(window).is_err());
    }
}
