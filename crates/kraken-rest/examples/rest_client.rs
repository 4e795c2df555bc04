//! Example: REST API dispatch
//!
//! This example demonstrates how to:
//! - Call public methods through the typed helpers and by name
//! - Sign private calls when credentials are available
//! - Inspect classified errors
//!
//! Run with: RUST_LOG=kraken_rest=debug cargo run -p kraken-rest --example rest_client
//!
//! NOTE: Private calls run only when KRAKEN_API_KEY and KRAKEN_PRIVATE_KEY are set.

use kraken_rest::{KrakenRestClient, OrderRequest, OrderSide, RequestParams, RestError};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Kraken REST Dispatch Example ===\n");

    // Reads KRAKEN_API_URL, KRAKEN_TIMEOUT_SECS and credentials if present
    let client = KrakenRestClient::from_env()?;

    // ========================================================================
    // PUBLIC ENDPOINTS - No authentication required
    // ========================================================================

    println!("--- Public Market Data ---\n");

    let status = client.market().system_status().await?;
    println!("System status: {} ({})", status.status, status.timestamp);

    match client.get_ticker(&["XBTUSD"]).await {
        Ok(tickers) => {
            for (pair, ticker) in &tickers {
                println!(
                    "  {}: last={:?} bid={:?} ask={:?}",
                    pair,
                    ticker.last_price(),
                    ticker.bid_price(),
                    ticker.ask_price()
                );
            }
        }
        Err(e) => println!("  Error: {}", e),
    }

    // Any public method by name, decoded as untyped JSON
    let spread: serde_json::Value = client
        .call_public("Spread", RequestParams::new().with("pair", "XBTUSD"))
        .await?;
    println!("  Spread entries: {}", spread.as_object().map(|o| o.len()).unwrap_or(0));

    // Unknown pairs come back as application errors
    match client.get_ticker(&["NOTAPAIR"]).await {
        Err(RestError::Api { errors, .. }) => {
            for error in errors {
                println!("  Expected error: {} (category {:?})", error, error.category);
            }
        }
        other => println!("  Unexpected: {:?}", other.map(|t| t.len())),
    }
    println!();

    // ========================================================================
    // PRIVATE ENDPOINTS - Authentication required
    // ========================================================================

    if !client.has_credentials() {
        println!("Set KRAKEN_API_KEY and KRAKEN_PRIVATE_KEY to run the private calls.");
        return Ok(());
    }

    println!("--- Private Account Data ---\n");

    let balance = client.get_balance().await?;
    for (asset, amount) in balance.non_zero() {
        println!("  {}: {}", asset, amount);
    }

    // Validate-only order: checked by Kraken but never placed
    let order = OrderRequest::limit("XBTUSD", OrderSide::Buy, dec!(0.0001), dec!(1000)).validate_only();
    match client.add_order(&order).await {
        Ok(response) => println!("  Validated: {}", response.descr.order),
        Err(e) if e.is_nonce_error() => println!("  Nonce rejected, check for other clients sharing this key"),
        Err(e) => println!("  Order error: {}", e),
    }

    Ok(())
}
