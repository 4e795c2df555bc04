//! REST API client for Kraken cryptocurrency exchange
//!
//! This crate provides a generic request dispatcher for Kraken's spot REST
//! API plus typed helpers for common market, account and trading methods.
//!
//! # Features
//!
//! - **Dispatch**: Call any public or private method by name with ordered parameters
//! - **Market Data**: Server time, system status, assets, ticker
//! - **Account**: Balances, trade balance, order queries, WebSocket token
//! - **Trading**: Place and cancel orders
//!
//! # Authentication
//!
//! Private endpoints require API credentials. Each private request gets a
//! strictly increasing nonce and an `API-Sign` header computed with
//! HMAC-SHA512 as specified by Kraken's API documentation.
//!
//! # Example
//!
//! ```no_run
//! use kraken_rest::{KrakenRestClient, RequestParams};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Public endpoints (no auth required)
//!     let client = KrakenRestClient::new()?;
//!     let ticker = client.get_ticker(&["XBTUSD"]).await?;
//!     println!("BTC/USD: {:?}", ticker);
//!
//!     // Private endpoints (auth required)
//!     let auth_client = KrakenRestClient::from_env()?;
//!     let balance = auth_client.get_balance().await?;
//!     println!("Balances: {:?}", balance);
//!
//!     // Any method by name
//!     let params = RequestParams::new().with("trades", true);
//!     let orders: serde_json::Value = auth_client.call_private("OpenOrders", params).await?;
//!     println!("Open orders: {}", orders);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every call ends in exactly one [`RestError`]: configuration, missing
//! credentials, bad parameters, transport failure, undecodable response or
//! an application error reported in the envelope's `error` array.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod error_codes;
pub mod params;
pub mod response;
pub mod transport;
pub mod types;

// Re-export main types
pub use client::KrakenRestClient;
pub use config::ClientConfig;
pub use error::{RestError, RestResult};
pub use error_codes::{ApiError, ErrorCategory, ErrorCode};
pub use params::{join_list, EncodedBody, ParamValue, RequestParams};
pub use response::ApiResponse;
pub use transport::{HttpResponse, HttpTransport, SignedRequest, Transport, TransportConfig, TransportError};

#[cfg(any(test, feature = "test-utils"))]
pub use transport::MockTransport;

pub use kraken_auth::{AuthError, Credentials, Nonce, NonceGenerator};

// Re-export endpoint-specific types
pub use types::{
    // Market data
    AssetInfo, ServerTime, SystemStatus, TickerInfo,
    // Account
    BalanceInfo, OrderDescription, OrderInfo, TradeBalance, WebSocketsToken,
    // Trading
    CancelOrderResult, OrderFlag, OrderRequest, OrderResponse, OrderResponseDescription, OrderSide, OrderType,
    TimeInForce,
};
