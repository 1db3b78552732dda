use crate::monitor::Monitor;

/// Shared application state accessible by all route handlers.
pub struct AppState {
    pub monitor: Monitor,
    /// Base URL of the info API, shown in the page footer.
    pub api_url: String,
}

impl AppState {
    pub fn new(monitor: Monitor, api_url: impl Into<String>) -> Self {
        Self {
            monitor,
            api_url: api_url.into(),
        }
    }
}
