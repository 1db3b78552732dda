//! Dashboard data assembly: settings, response cache, and the per-render snapshot.

mod cache;
mod config;
mod engine;

pub use cache::TtlCache;
pub use config::{DashboardSettings, REFRESH_INTERVALS};
pub use engine::{DashboardSnapshot, Monitor, TraderReport, Window};
