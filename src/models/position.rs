//! Position model representing a trader's open perpetual exposure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Side of an open position, derived from the sign of the position size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            PositionSide::Long => "LONG",
            PositionSide::Short => "SHORT",
        }
    }
}

/// Current open position on a market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Trader's wallet address
    pub trader_address: String,

    /// Asset symbol
    pub coin: String,

    /// Signed size: positive for long, negative for short, `None` when unparsable
    pub size: Option<Decimal>,

    /// Average entry price
    pub entry_price: Option<Decimal>,

    /// Current notional value
    pub position_value: Option<Decimal>,

    /// Unrealized P&L
    pub unrealized_pnl: Option<Decimal>,

    /// Unrealized P&L relative to margin
    pub return_on_equity: Option<Decimal>,

    /// Estimated liquidation price, absent when the position cannot be liquidated
    pub liquidation_price: Option<Decimal>,

    /// Margin allocated to the position
    pub margin_used: Option<Decimal>,

    /// "cross" or "isolated"
    #[serde(default)]
    pub leverage_type: String,

    /// Leverage multiple
    pub leverage: Option<Decimal>,
}

impl Position {
    /// Long or short, unknown when the size could not be read.
    pub fn side(&self) -> Option<PositionSide> {
        self.size.map(|size| {
            if size.is_sign_negative() {
                PositionSide::Short
            } else {
                PositionSide::Long
            }
        })
    }

    /// Only an explicit zero size closes a position; an unreadable size keeps it.
    pub fn is_open(&self) -> bool {
        self.size.map_or(true, |size| !size.is_zero())
    }
}

/// Margin account overview for a trader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub account_value: Option<Decimal>,
    pub total_notional: Option<Decimal>,
    pub total_margin_used: Option<Decimal>,
    pub withdrawable: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn position(size: Option<Decimal>) -> Position {
        Position {
            trader_address: "0x123".to_string(),
            coin: "BTC".to_string(),
            size,
            entry_price: Some(dec!(64000)),
            position_value: None,
            unrealized_pnl: None,
            return_on_equity: None,
            liquidation_price: None,
            margin_used: None,
            leverage_type: "cross".to_string(),
            leverage: Some(dec!(10)),
        }
    }

    #[test]
    fn test_side_from_sign() {
        assert_eq!(position(Some(dec!(1.5))).side(), Some(PositionSide::Long));
        assert_eq!(position(Some(dec!(-0.25))).side(), Some(PositionSide::Short));
        assert_eq!(position(None).side(), None);
    }

    #[test]
    fn test_zero_size_is_not_open() {
        assert!(!position(Some(Decimal::ZERO)).is_open());
        assert!(position(Some(dec!(-2))).is_open());
    }

    #[test]
    fn test_unknown_size_stays_open() {
        assert!(position(None).is_open());
    }
}
