//! Private account endpoints
//!
//! These endpoints require authentication.

use crate::client::KrakenRestClient;
use crate::error::{RestError, RestResult};
use crate::params::{join_list, RequestParams};
use crate::types::{BalanceInfo, OrderInfo, TradeBalance, WebSocketsToken};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Private account endpoints
pub struct AccountEndpoints<'a> {
    client: &'a KrakenRestClient,
}

impl<'a> AccountEndpoints<'a> {
    pub fn new(client: &'a KrakenRestClient) -> Self {
        Self { client }
    }

    /// Get account balance
    #[instrument(skip(self))]
    pub async fn balance(&self) -> RestResult<BalanceInfo> {
        self.client.call_private("Balance", RequestParams::new()).await
    }

    /// Get trade balance (margin info)
    ///
    /// # Arguments
    /// * `asset` - Base asset for calculations (default: "ZUSD")
    #[instrument(skip(self))]
    pub async fn trade_balance(&self, asset: Option<&str>) -> RestResult<TradeBalance> {
        let params = RequestParams::new().with_opt("asset", asset);
        self.client.call_private("TradeBalance", params).await
    }

    /// Query specific orders
    ///
    /// # Arguments
    /// * `txids` - Transaction IDs (max 50)
    /// * `trades` - Include trade info
    #[instrument(skip(self))]
    pub async fn query_orders(&self, txids: &[&str], trades: bool) -> RestResult<HashMap<String, OrderInfo>> {
        if txids.is_empty() {
            return Err(RestError::InvalidParameter("at least one txid is required".to_string()));
        }
        if txids.len() > 50 {
            return Err(RestError::InvalidParameter(format!(
                "at most 50 txids per query, got {}",
                txids.len()
            )));
        }

        let params = RequestParams::new()
            .with("txid", join_list(txids))
            .with("trades", trades);

        self.client.call_private("QueryOrders", params).await
    }

    /// Get a token for Kraken's private WebSocket channels
    ///
    /// The token must be used within 15 minutes of creation.
    #[instrument(skip(self))]
    pub async fn websockets_token(&self) -> RestResult<WebSocketsToken> {
        let token: WebSocketsToken = self
            .client
            .call_private("GetWebSocketsToken", RequestParams::new())
            .await?;
        debug!("Got WebSocket token, expires in {} seconds", token.expires);
        Ok(token)
    }
}
