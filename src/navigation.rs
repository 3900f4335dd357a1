use std::sync::Mutex;

use tracing::debug;

/// Whatever moves the user between views (a browser router, a TUI screen
/// stack, a test recorder).
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// In-memory navigation history. The last entry is the current location.
#[derive(Debug, Default)]
pub struct NavigationHistory {
    entries: Mutex<Vec<String>>,
}

impl NavigationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Navigator for NavigationHistory {
    fn navigate(&self, path: &str) {
        debug!("Navigating to {}", path);
        self.lock().push(path.to_string());
    }
}
