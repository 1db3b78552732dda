//! Monitor: fetches fills and positions for every tracked trader and
//! assembles the dashboard snapshot for one render.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::{InfoSource, TraderState};
use crate::models::{filter_window, AccountSummary, Address, Fill, Position, TrackedTrader};

use super::{DashboardSettings, TtlCache};

/// How many traders are fetched at once. Output order always follows input order.
const FETCH_CONCURRENCY: usize = 4;

/// Time range fills must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub hours: u32,
}

impl Window {
    /// Window of `hours` hours ending at `end`.
    pub fn ending_at(end: DateTime<Utc>, hours: u32) -> Self {
        Self {
            start: end - ChronoDuration::hours(i64::from(hours)),
            end,
            hours,
        }
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

/// Everything shown for one trader. Failed fetches leave their table empty
/// and add a message to `errors`.
#[derive(Debug, Clone, Serialize)]
pub struct TraderReport {
    pub trader: TrackedTrader,
    pub fills: Vec<Fill>,
    pub positions: Vec<Position>,
    pub summary: Option<AccountSummary>,
    pub errors: Vec<String>,
}

impl TraderReport {
    fn empty(trader: TrackedTrader) -> Self {
        Self {
            trader,
            fills: Vec::new(),
            positions: Vec::new(),
            summary: None,
            errors: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Data for one full dashboard render.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub window: Window,
    pub settings: DashboardSettings,
    pub reports: Vec<TraderReport>,
}

impl DashboardSnapshot {
    pub fn total_fills(&self) -> usize {
        self.reports.iter().map(|r| r.fills.len()).sum()
    }

    pub fn total_positions(&self) -> usize {
        self.reports.iter().map(|r| r.positions.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FillsKey {
    address: Address,
    window_hours: u32,
    aggregate_by_time: bool,
}

/// Read-only monitor over an info source, with a short response cache.
pub struct Monitor {
    source: Arc<dyn InfoSource>,
    fills_cache: TtlCache<FillsKey, Vec<Fill>>,
    state_cache: TtlCache<Address, TraderState>,
}

impl Monitor {
    /// Create a new monitor. A zero `cache_ttl` disables caching.
    pub fn new(source: Arc<dyn InfoSource>, cache_ttl: Duration) -> Self {
        Self {
            source,
            fills_cache: TtlCache::new(cache_ttl),
            state_cache: TtlCache::new(cache_ttl),
        }
    }

    /// Drop all cached responses so the next render refetches everything.
    pub async fn clear_cache(&self) {
        self.fills_cache.clear().await;
        self.state_cache.clear().await;
        info!("Response cache cleared");
    }

    /// Build the snapshot for `traders` with a window ending now.
    pub async fn snapshot(
        &self,
        traders: &[TrackedTrader],
        settings: &DashboardSettings,
    ) -> DashboardSnapshot {
        let window = Window::ending_at(Utc::now(), settings.window_hours);
        self.snapshot_at(traders, settings, window).await
    }

    /// Build the snapshot for `traders` over an explicit window.
    pub async fn snapshot_at(
        &self,
        traders: &[TrackedTrader],
        settings: &DashboardSettings,
        window: Window,
    ) -> DashboardSnapshot {
        debug!(
            traders = traders.len(),
            window_hours = window.hours,
            "Building dashboard snapshot"
        );

        let reports: Vec<TraderReport> = stream::iter(traders.iter().cloned())
            .map(|trader| self.trader_report(trader, settings, window))
            .buffered(FETCH_CONCURRENCY)
            .collect()
            .await;

        DashboardSnapshot {
            window,
            settings: settings.clone(),
            reports,
        }
    }

    /// Fetch and shape fills and positions for a single trader.
    ///
    /// Never fails: every problem is recorded in the report's `errors`.
    pub async fn trader_report(
        &self,
        trader: TrackedTrader,
        settings: &DashboardSettings,
        window: Window,
    ) -> TraderReport {
        let mut report = TraderReport::empty(trader);

        let address = match Address::parse(&report.trader.address) {
            Ok(address) => address,
            Err(e) => {
                warn!(address = %report.trader.address, error = %e, "Skipping malformed address");
                report
                    .errors
                    .push(format!("Invalid address {}: {:#}", report.trader.address, e));
                return report;
            }
        };

        match self.fills(&address, settings, window).await {
            Ok(fills) => {
                // The cap applies in API order, before the newest-first sort.
                let mut fills = filter_window(fills, window.start, window.end);
                fills.truncate(settings.max_fills as usize);
                fills.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                report.fills = fills;
            }
            Err(e) => {
                warn!(address = %address, error = %e, "Failed to load fills");
                report
                    .errors
                    .push(format!("Failed to load fills for {}: {:#}", address, e));
            }
        }

        match self.state(&address).await {
            Ok(state) => {
                let mut positions = state.positions;
                positions.sort_by(|a, b| a.coin.cmp(&b.coin));
                report.positions = positions;
                report.summary = Some(state.summary);
            }
            Err(e) => {
                warn!(address = %address, error = %e, "Failed to load positions");
                report
                    .errors
                    .push(format!("Failed to load positions for {}: {:#}", address, e));
            }
        }

        debug!(
            address = %address,
            fills = report.fills.len(),
            positions = report.positions.len(),
            "Trader report ready"
        );

        report
    }

    async fn fills(
        &self,
        address: &Address,
        settings: &DashboardSettings,
        window: Window,
    ) -> Result<Vec<Fill>> {
        let key = FillsKey {
            address: address.clone(),
            window_hours: window.hours,
            aggregate_by_time: settings.aggregate_by_time,
        };

        if let Some(fills) = self.fills_cache.get(&key).await {
            debug!(address = %address, "Fills served from cache");
            return Ok(fills);
        }

        let fills = self
            .source
            .user_fills_by_time(
                address.as_str(),
                window.start_ms(),
                window.end_ms(),
                settings.aggregate_by_time,
            )
            .await?;

        self.fills_cache.insert(key, fills.clone()).await;
        Ok(fills)
    }

    async fn state(&self, address: &Address) -> Result<TraderState> {
        if let Some(state) = self.state_cache.get(address).await {
            debug!(address = %address, "Positions served from cache");
            return Ok(state);
        }

        let state = self.source.clearinghouse_state(address.as_str()).await?;
        self.state_cache.insert(address.clone(), state.clone()).await;
        Ok(state)
    }
}
