//! Data models for tracked traders, fills, and positions.

mod fill;
mod position;
mod trader;

pub use fill::{filter_window, Fill, FillSide};
pub use position::{AccountSummary, Position, PositionSide};
pub use trader::{parse_trader_lines, parse_wallet_list, Address, TrackedTrader};
