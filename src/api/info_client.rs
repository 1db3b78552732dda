//! Hyperliquid info API client for fetching trader fills and positions.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::{AccountSummary, Fill, FillSide, Position};

use super::types::*;

const INFO_API_BASE: &str = "https://api.hyperliquid.xyz";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Open positions plus the margin overview of one account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraderState {
    pub positions: Vec<Position>,
    pub summary: AccountSummary,
}

/// Read-only source of trader data.
#[async_trait]
pub trait InfoSource: Send + Sync {
    /// Fills for `address` between `start_ms` and `end_ms` (epoch milliseconds).
    async fn user_fills_by_time(
        &self,
        address: &str,
        start_ms: i64,
        end_ms: i64,
        aggregate_by_time: bool,
    ) -> Result<Vec<Fill>>;

    /// Open positions and account summary for `address`.
    async fn clearinghouse_state(&self, address: &str) -> Result<TraderState>;
}

/// Client for the public Hyperliquid info endpoint (read-only operations).
pub struct InfoClient {
    client: Client,
    base_url: String,
}

impl InfoClient {
    /// Create a new info client with default settings.
    pub fn new() -> Result<Self> {
        Self::with_base_url(INFO_API_BASE.to_string())
    }

    /// Create with custom base URL (for testnet or tests).
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_info<T: serde::de::DeserializeOwned>(
        &self,
        request: &InfoRequest,
        what: &str,
    ) -> Result<T> {
        let url = format!("{}/info", self.base_url);

        debug!(url = %url, request = ?request, "Posting info request");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", what))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} request failed: {} - {}", what, status, body);
        }

        response
            .json()
            .await
            .with_context(|| format!("Failed to parse {} response", what))
    }
}

#[async_trait]
impl InfoSource for InfoClient {
    async fn user_fills_by_time(
        &self,
        address: &str,
        start_ms: i64,
        end_ms: i64,
        aggregate_by_time: bool,
    ) -> Result<Vec<Fill>> {
        let request = InfoRequest::UserFillsByTime {
            user: address.to_string(),
            start_time: start_ms,
            end_time: end_ms,
            aggregate_by_time,
        };

        let items: Option<Vec<FillResponse>> = self.post_info(&request, "fills").await?;

        let fills = items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|f| {
                let Some(timestamp) = f.time.and_then(|ms| Utc.timestamp_millis_opt(ms).single())
                else {
                    warn!(address = %address, hash = %f.hash, "Fill without a valid timestamp");
                    return None;
                };

                let side = FillSide::from_code(&f.side);
                if side.is_none() {
                    debug!(side = %f.side, "Unknown fill side");
                }

                Some(Fill {
                    trader_address: address.to_string(),
                    coin: f.coin,
                    side,
                    direction: f.dir,
                    price: f.px,
                    size: f.sz,
                    closed_pnl: f.closed_pnl,
                    fee: f.fee,
                    fee_token: f.fee_token,
                    timestamp,
                    liquidation: f.liquidation.is_some_and(|v| !v.is_null()),
                })
            })
            .collect();

        Ok(fills)
    }

    async fn clearinghouse_state(&self, address: &str) -> Result<TraderState> {
        let request = InfoRequest::ClearinghouseState {
            user: address.to_string(),
        };

        let state: Option<ClearinghouseStateResponse> =
            self.post_info(&request, "positions").await?;
        let state = state.unwrap_or_default();

        let positions = state
            .asset_positions
            .into_iter()
            .filter_map(|ap| {
                let p = ap.position;
                if p.szi.is_none() {
                    warn!(address = %address, coin = %p.coin, "Position with unreadable size");
                }
                let (leverage_type, leverage) = p
                    .leverage
                    .map(|l| (l.leverage_type, l.value))
                    .unwrap_or_default();

                let position = Position {
                    trader_address: address.to_string(),
                    coin: p.coin,
                    size: p.szi,
                    entry_price: p.entry_px,
                    position_value: p.position_value,
                    unrealized_pnl: p.unrealized_pnl,
                    return_on_equity: p.return_on_equity,
                    liquidation_price: p.liquidation_px,
                    margin_used: p.margin_used,
                    leverage_type,
                    leverage,
                };
                position.is_open().then_some(position)
            })
            .collect();

        let margin = state.margin_summary;
        let summary = AccountSummary {
            account_value: margin.as_ref().and_then(|m| m.account_value),
            total_notional: margin.as_ref().and_then(|m| m.total_ntl_pos),
            total_margin_used: margin.as_ref().and_then(|m| m.total_margin_used),
            withdrawable: state.withdrawable,
        };

        Ok(TraderState { positions, summary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};

    async fn stub_info(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        let user = body["user"].as_str().unwrap_or_default().to_string();
        if user == "0xdead" {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!("bad user")));
        }

        match body["type"].as_str() {
            Some("userFillsByTime") => {
                assert!(body["startTime"].is_i64());
                assert!(body["endTime"].is_i64());
                if user == "0xempty" {
                    return (StatusCode::OK, Json(Value::Null));
                }
                (
                    StatusCode::OK,
                    Json(json!([
                        {
                            "coin": "BTC", "side": "B", "dir": "Open Long",
                            "px": "65000.5", "sz": "0.2", "time": 1_700_000_000_000i64,
                            "closedPnl": "0.0", "fee": "3.25", "feeToken": "USDC", "hash": "0x01"
                        },
                        {
                            "coin": "ETH", "side": "A", "dir": "Close Long",
                            "px": "2400", "sz": "3", "time": 1_700_000_100_000i64,
                            "closedPnl": "120.5", "fee": "1.1", "hash": "0x02",
                            "liquidation": {"liquidatedUser": "0xabc", "markPx": "2399", "method": "market"}
                        },
                        {"coin": "SOL", "side": "B", "px": "1", "sz": "1", "hash": "0x03"}
                    ])),
                )
            }
            Some("clearinghouseState") if user == "0xgarbage" => (
                StatusCode::OK,
                Json(json!({
                    "assetPositions": [
                        {"type": "oneWay", "position": {"coin": "BTC", "szi": "0.5"}},
                        {"type": "oneWay", "position": {"coin": "ETH", "szi": "garbage"}},
                        {"type": "oneWay", "position": {"coin": "SOL"}}
                    ]
                })),
            ),
            Some("clearinghouseState") => (
                StatusCode::OK,
                Json(json!({
                    "assetPositions": [
                        {"type": "oneWay", "position": {
                            "coin": "BTC", "szi": "0.5", "entryPx": "64000",
                            "leverage": {"type": "cross", "value": 10},
                            "unrealizedPnl": "500", "positionValue": "32500"
                        }},
                        {"type": "oneWay", "position": {"coin": "DOGE", "szi": "0.0"}}
                    ],
                    "marginSummary": {"accountValue": "100000", "totalNtlPos": "32500", "totalMarginUsed": "3250"},
                    "withdrawable": "96750"
                })),
            ),
            _ => (StatusCode::BAD_REQUEST, Json(json!("unknown type"))),
        }
    }

    async fn spawn_stub() -> InfoClient {
        let app = Router::new().route("/info", post(stub_info));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        InfoClient::with_base_url(format!("http://{}/", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_fills() {
        let client = spawn_stub().await;
        let fills = client
            .user_fills_by_time("0xabc", 0, 1_800_000_000_000, false)
            .await
            .unwrap();

        // The entry without a timestamp is dropped
        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].coin, "BTC");
        assert_eq!(fills[0].side, Some(FillSide::Buy));
        assert_eq!(fills[0].notional(), Some(dec!(13000.1)));
        assert!(!fills[0].liquidation);
        assert_eq!(fills[0].fee_token, "USDC");
        assert_eq!(fills[1].side, Some(FillSide::Sell));
        assert!(fills[1].liquidation);
        assert_eq!(fills[1].trader_address, "0xabc");
    }

    #[tokio::test]
    async fn test_null_fills_is_empty() {
        let client = spawn_stub().await;
        let fills = client
            .user_fills_by_time("0xempty", 0, 1, true)
            .await
            .unwrap();
        assert!(fills.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_positions_skips_zero_size() {
        let client = spawn_stub().await;
        let state = client.clearinghouse_state("0xabc").await.unwrap();

        assert_eq!(state.positions.len(), 1);
        let pos = &state.positions[0];
        assert_eq!(pos.coin, "BTC");
        assert_eq!(pos.size, Some(dec!(0.5)));
        assert_eq!(pos.leverage_type, "cross");
        assert_eq!(pos.leverage, Some(dec!(10)));
        assert_eq!(state.summary.account_value, Some(dec!(100000)));
        assert_eq!(state.summary.withdrawable, Some(dec!(96750)));
    }

    #[tokio::test]
    async fn test_unreadable_size_keeps_position() {
        let client = spawn_stub().await;
        let state = client.clearinghouse_state("0xgarbage").await.unwrap();

        let coins: Vec<_> = state.positions.iter().map(|p| p.coin.as_str()).collect();
        assert_eq!(coins, vec!["BTC", "ETH", "SOL"]);
        assert_eq!(state.positions[1].size, None);
        assert_eq!(state.positions[1].side(), None);
        assert_eq!(state.positions[2].size, None);
        assert_eq!(state.summary, AccountSummary::default());
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let client = spawn_stub().await;
        let err = client.clearinghouse_state("0xdead").await.unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("positions request failed"), "{}", message);
        assert!(message.contains("422"), "{}", message);
    }
}
