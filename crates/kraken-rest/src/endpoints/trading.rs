//! Trading endpoints for order management
//!
//! These endpoints require authentication.

use crate::client::KrakenRestClient;
use crate::error::{RestError, RestResult};
use crate::params::RequestParams;
use crate::types::{CancelOrderResult, OrderRequest, OrderResponse};
use tracing::{debug, instrument};

/// Trading endpoints for order management
pub struct TradingEndpoints<'a> {
    client: &'a KrakenRestClient,
}

impl<'a> TradingEndpoints<'a> {
    pub fn new(client: &'a KrakenRestClient) -> Self {
        Self { client }
    }

    /// Add a new order
    ///
    /// # Returns
    /// Order response with transaction ID(s)
    #[instrument(skip(self, order), fields(pair = %order.pair, side = %order.side, order_type = %order.order_type))]
    pub async fn add_order(&self, order: &OrderRequest) -> RestResult<OrderResponse> {
        let params = order.to_params()?;

        debug!(
            "Placing {} {} order for {} {}",
            order.side, order.order_type, order.volume, order.pair
        );

        self.client.call_private("AddOrder", params).await
    }

    /// Cancel an order by transaction ID or user reference
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, txid: &str) -> RestResult<CancelOrderResult> {
        if txid.trim().is_empty() {
            return Err(RestError::InvalidParameter("txid is empty".to_string()));
        }

        let params = RequestParams::new().with("txid", txid);
        self.client.call_private("CancelOrder", params).await
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ClientConfig;
    use crate::transport::MockTransport;
    use crate::types::{OrderRequest, OrderSide, TimeInForce};
    use crate::KrakenRestClient;
    use kraken_auth::Credentials;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    fn client() -> (KrakenRestClient, Arc<MockTransport>) {
        let mock = Arc::new(MockTransport::new());
        let creds = Credentials::new("test_key", "dGVzdF9wcml2YXRlX2tleQ==").unwrap();
        let config = ClientConfig::new().with_credentials(creds);
        let client = KrakenRestClient::with_transport(config, mock.clone()).unwrap();
        (client, mock)
    }

    #[tokio::test]
    async fn test_add_order_body() {
        let (client, mock) = client();
        mock.push_json(
            r#"{"error":[],"result":{"descr":{"order":"buy 1.25000000 XBTUSD @ limit 37500.0"},"txid":["OUF4EM-FRGI2-MQMWZD"]}}"#,
        );

        let order = OrderRequest::limit("XBTUSD", OrderSide::Buy, dec!(1.25), dec!(37500))
            .with_time_in_force(TimeInForce::ImmediateOrCancel)
            .validate_only();
        let response = client.add_order(&order).await.unwrap();
        assert_eq!(response.txid, Some(vec!["OUF4EM-FRGI2-MQMWZD".to_string()]));

        let body = mock.requests()[0].body().as_str().to_string();
        let (nonce, rest) = body.split_once('&').unwrap();
        assert!(nonce.starts_with("nonce="));
        assert_eq!(
            rest,
            "pair=XBTUSD&type=buy&ordertype=limit&volume=1.25&price=37500&timeinforce=IOC&validate=true"
        );
    }

    #[tokio::test]
    async fn test_cancel_order() {
        let (client, mock) = client();
        mock.push_json(r#"{"error":[],"result":{"count":1}}"#);

        let result = client.trading().unwrap().cancel_order("OYVGEW-VYV5B-UUEXSK").await.unwrap();
        assert_eq!(result.count, 1);
        assert!(mock.requests()[0].body().as_str().ends_with("&txid=OYVGEW-VYV5B-UUEXSK"));

        assert!(client.trading().unwrap().cancel_order(" ").await.is_err());
    }
}
