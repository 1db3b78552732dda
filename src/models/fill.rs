//! Fill model representing a single executed trade on Hyperliquid.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Direction of a fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FillSide {
    Buy,
    Sell,
}

impl FillSide {
    /// Parse the exchange's side code (`B` = bid, `A` = ask).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_uppercase().as_str() {
            "B" | "BUY" => Some(FillSide::Buy),
            "A" | "SELL" => Some(FillSide::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FillSide::Buy => "BUY",
            FillSide::Sell => "SELL",
        }
    }
}

/// Executed trade record for a tracked trader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    /// Trader's wallet address
    pub trader_address: String,

    /// Asset symbol (e.g. "BTC", "ETH")
    pub coin: String,

    /// Trade direction, `None` when the exchange sent an unknown code
    pub side: Option<FillSide>,

    /// Position effect as reported by the exchange (e.g. "Open Long")
    #[serde(default)]
    pub direction: String,

    /// Execution price
    pub price: Option<Decimal>,

    /// Executed size in coin units
    pub size: Option<Decimal>,

    /// Realized P&L closed by this fill
    pub closed_pnl: Option<Decimal>,

    /// Fee paid
    pub fee: Option<Decimal>,

    /// Token the fee is denominated in (e.g. "USDC")
    #[serde(default)]
    pub fee_token: String,

    /// When the fill happened
    pub timestamp: DateTime<Utc>,

    /// Whether this fill was part of a liquidation
    #[serde(default)]
    pub liquidation: bool,
}

impl Fill {
    /// Price times size, when both are known.
    pub fn notional(&self) -> Option<Decimal> {
        Some(self.price? * self.size?)
    }

    /// Whether the fill happened inside the inclusive `[start, end]` window.
    pub fn within(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.timestamp >= start && self.timestamp <= end
    }
}

/// Keep only fills inside `[start, end]`, preserving order.
pub fn filter_window(fills: Vec<Fill>, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Fill> {
    fills.into_iter().filter(|f| f.within(start, end)).collect()
}
