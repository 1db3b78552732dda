//! Request and response types for the Hyperliquid info API.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of a `POST /info` request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InfoRequest {
    #[serde(rename_all = "camelCase")]
    UserFillsByTime {
        user: String,
        start_time: i64,
        end_time: i64,
        aggregate_by_time: bool,
    },
    ClearinghouseState { user: String },
}

/// Fill entry from the `userFillsByTime` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillResponse {
    #[serde(default)]
    pub coin: String,
    #[serde(default)]
    pub side: String,
    #[serde(default)]
    pub dir: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub px: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub sz: Option<Decimal>,
    /// Milliseconds since the epoch
    #[serde(default, alias = "timestamp")]
    pub time: Option<i64>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub closed_pnl: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub fee: Option<Decimal>,
    #[serde(default)]
    pub fee_token: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub liquidation: Option<serde_json::Value>,
}

/// Response of the `clearinghouseState` request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearinghouseStateResponse {
    #[serde(default)]
    pub asset_positions: Vec<AssetPositionResponse>,
    #[serde(default)]
    pub margin_summary: Option<MarginSummaryResponse>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub withdrawable: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetPositionResponse {
    #[serde(default)]
    pub position: PositionResponse,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionResponse {
    #[serde(default)]
    pub coin: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub szi: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub entry_px: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub position_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub unrealized_pnl: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub return_on_equity: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub liquidation_px: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub margin_used: Option<Decimal>,
    #[serde(default)]
    pub leverage: Option<LeverageResponse>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeverageResponse {
    #[serde(rename = "type", default)]
    pub leverage_type: String,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub value: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginSummaryResponse {
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub account_value: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_ntl_pos: Option<Decimal>,
    #[serde(default, deserialize_with = "lenient_decimal")]
    pub total_margin_used: Option<Decimal>,
}

/// Numbers arrive as strings, plain JSON numbers, or null.
/// Anything that does not parse becomes `None` instead of failing the response.
fn lenient_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Decimal::from_str(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .ok(),
        Some(serde_json::Value::Number(n)) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fills_request_body() {
        let body = serde_json::to_value(InfoRequest::UserFillsByTime {
            user: "0xabc".to_string(),
            start_time: 1,
            end_time: 2,
            aggregate_by_time: true,
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "type": "userFillsByTime",
                "user": "0xabc",
                "startTime": 1,
                "endTime": 2,
                "aggregateByTime": true,
            })
        );
    }

    #[test]
    fn test_clearinghouse_request_body() {
        let body = serde_json::to_value(InfoRequest::ClearinghouseState {
            user: "0xabc".to_string(),
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({"type": "clearinghouseState", "user": "0xabc"})
        );
    }

    #[test]
    fn test_fill_response_lenient_numbers() {
        let fill: FillResponse = serde_json::from_value(serde_json::json!({
            "coin": "SOL",
            "side": "A",
            "dir": "Close Long",
            "px": "142.35",
            "sz": 12,
            "time": 1_700_000_000_000i64,
            "closedPnl": "not-a-number",
            "fee": null,
            "feeToken": "USDC",
        }))
        .unwrap();

        assert_eq!(fill.px, Some(dec!(142.35)));
        assert_eq!(fill.sz, Some(dec!(12)));
        assert_eq!(fill.closed_pnl, None);
        assert_eq!(fill.fee, None);
        assert!(fill.liquidation.is_none());
    }

    #[test]
    fn test_clearinghouse_response() {
        let state: ClearinghouseStateResponse = serde_json::from_value(serde_json::json!({
            "assetPositions": [{
                "type": "oneWay",
                "position": {
                    "coin": "ETH",
                    "entryPx": "2986.3",
                    "leverage": {"rawUsd": "-95.05", "type": "isolated", "value": 20},
                    "liquidationPx": null,
                    "marginUsed": "4.967826",
                    "positionValue": "100.02765",
                    "returnOnEquity": "-0.0026789",
                    "szi": "-0.0335",
                    "unrealizedPnl": "-0.0134"
                }
            }],
            "marginSummary": {
                "accountValue": "13104.514502",
                "totalMarginUsed": "0.0",
                "totalNtlPos": "0.0",
                "totalRawUsd": "13104.514502"
            },
            "withdrawable": "13104.514502",
            "time": 1708622398623i64
        }))
        .unwrap();

        let pos = &state.asset_positions[0].position;
        assert_eq!(pos.szi, Some(dec!(-0.0335)));
        assert_eq!(pos.liquidation_px, None);
        let leverage = pos.leverage.as_ref().unwrap();
        assert_eq!(leverage.leverage_type, "isolated");
        assert_eq!(leverage.value, Some(dec!(20)));
        assert_eq!(
            state.margin_summary.unwrap().account_value,
            Some(dec!(13104.514502))
        );
    }
}
