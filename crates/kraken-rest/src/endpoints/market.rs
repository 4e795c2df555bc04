//! Public market data endpoints
//!
//! These endpoints don't require authentication.

use crate::client::KrakenRestClient;
use crate::error::RestResult;
use crate::params::{join_list, RequestParams};
use crate::types::{AssetInfo, ServerTime, SystemStatus, TickerInfo};
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Public market data endpoints
pub struct MarketEndpoints<'a> {
    client: &'a KrakenRestClient,
}

impl<'a> MarketEndpoints<'a> {
    pub fn new(client: &'a KrakenRestClient) -> Self {
        Self { client }
    }

    /// Get server time
    #[instrument(skip(self))]
    pub async fn server_time(&self) -> RestResult<ServerTime> {
        self.client.call_public("Time", RequestParams::new()).await
    }

    /// Get system status
    #[instrument(skip(self))]
    pub async fn system_status(&self) -> RestResult<SystemStatus> {
        self.client.call_public("SystemStatus", RequestParams::new()).await
    }

    /// Get asset info
    ///
    /// # Arguments
    /// * `assets` - Assets to get info for (e.g., ["XBT", "ETH"]), all if empty
    #[instrument(skip(self))]
    pub async fn assets(&self, assets: &[&str]) -> RestResult<HashMap<String, AssetInfo>> {
        let params = if assets.is_empty() {
            RequestParams::new()
        } else {
            RequestParams::new().with("asset", join_list(assets))
        };

        self.client.call_public("Assets", params).await
    }

    /// Get ticker information
    ///
    /// # Arguments
    /// * `pairs` - Trading pairs (e.g., ["XBTUSD", "ETHUSD"])
    #[instrument(skip(self))]
    pub async fn ticker(&self, pairs: &[&str]) -> RestResult<HashMap<String, TickerInfo>> {
        debug!("Fetching tickers for {} pairs", pairs.len());
        let params = RequestParams::new().with("pair", join_list(pairs));
        self.client.call_public("Ticker", params).await
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::transport::MockTransport;
    use crate::KrakenRestClient;
    use std::sync::Arc;

    fn client() -> (KrakenRestClient, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new());
        let client = KrakenRestClient::with_transport(ClientConfig::new(), mock.clone()).unwrap();
        (client, mock)
    }

    #[tokio::test]
    async fn test_server_time() {
        let (client, mock) = client();
        mock.push_json(
            r#"{"error":[],"result":{"unixtime":1688669448,"rfc1123":"Thu, 06 Jul 23 18:50:48 +0000"}}"#,
        );

        let time = client.market().server_time().await.unwrap();
        assert_eq!(time.unixtime, 1688669448);
        assert_eq!(mock.requests()[0].url(), "https://api.kraken.com/0/public/Time");
    }

    #[tokio::test]
    async fn test_ticker_flattens_pairs() {
        let (client, mock) = client();
        mock.push_json(
            r#"{"error":[],"result":{"XXBTZUSD":{
                "a":["30300.10000","1","1.000"],
                "b":["30300.00000","1","1.000"],
                "c":["30303.20000","0.00067643"],
                "v":["4083.67001100","4412.73601799"],
                "p":["30706.77771","30689.13205"],
                "t":[34619,38907],
                "l":["29868.30000","29868.30000"],
                "h":["31631.00000","31631.00000"],
                "o":"30502.80000"}}}"#,
        );

        let tickers = client.get_ticker(&["XBTUSD", "ETHUSD"]).await.unwrap();
        let ticker = &tickers["XXBTZUSD"];
        assert_eq!(ticker.last_price(), Some(rust_decimal_macros::dec!(30303.2)));
        assert_eq!(ticker.mid_price(), Some(rust_decimal_macros::dec!(30300.05)));

        let request = &mock.requests()[0];
        assert_eq!(request.body().as_str(), "pair=XBTUSD%2CETHUSD");
    }

    #[tokio::test]
    async fn test_assets_without_filter_sends_empty_body() {
        let (client, mock) = client();
        mock.push_json(
            r#"{"error":[],"result":{"XXBT":{"aclass":"currency","altname":"XBT","decimals":10,"display_decimals":5,"status":"enabled"}}}"#,
        );

        let assets = client.market().assets(&[]).await.unwrap();
        assert_eq!(assets["XXBT"].altname, "XBT");
        assert!(mock.requests()[0].body().is_empty());
    }
}
