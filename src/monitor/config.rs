//! Dashboard configuration.

use serde::{Deserialize, Serialize};

pub const MIN_FILLS: u32 = 10;
pub const MAX_FILLS: u32 = 2000;
pub const FILLS_STEP: u32 = 10;

pub const MIN_WINDOW_HOURS: u32 = 1;
pub const MAX_WINDOW_HOURS: u32 = 24;

/// Auto refresh intervals offered in the sidebar, in seconds.
pub const REFRESH_INTERVALS: [u64; 6] = [5, 10, 15, 30, 60, 120];

/// Sidebar settings controlling what each render fetches and shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSettings {
    /// Maximum fills shown per trader
    pub max_fills: u32,

    /// Fill window ending now, in hours
    pub window_hours: u32,

    /// Combine partial fills of one crossing order
    pub aggregate_by_time: bool,

    /// Reload the page periodically
    pub auto_refresh: bool,

    /// Reload period in seconds
    pub refresh_secs: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            max_fills: 200,
            window_hours: 24,
            aggregate_by_time: false,
            auto_refresh: true,
            refresh_secs: 30,
        }
    }
}

impl DashboardSettings {
    /// Clamp every field into its allowed range.
    ///
    /// `max_fills` is rounded to the nearest step and `refresh_secs` snaps to
    /// the closest offered interval.
    pub fn normalized(mut self) -> Self {
        let stepped = self.max_fills.saturating_add(FILLS_STEP / 2) / FILLS_STEP * FILLS_STEP;
        self.max_fills = stepped.clamp(MIN_FILLS, MAX_FILLS);
        self.window_hours = self.window_hours.clamp(MIN_WINDOW_HOURS, MAX_WINDOW_HOURS);
        self.refresh_secs = REFRESH_INTERVALS
            .iter()
            .copied()
            .min_by_key(|interval| interval.abs_diff(self.refresh_secs))
            .unwrap_or(30);
        self
    }
}
