//! Application state for the API server

use crate::WallpaperBrowser;
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// Cloned for each request (cheap Arc clone).
#[derive(Clone)]
pub struct AppState {
    /// The browser every handler drives
    pub browser: Arc<WallpaperBrowser>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(browser: Arc<WallpaperBrowser>) -> Self {
        Self { browser }
    }
}
