//! Result and request types for the bundled endpoint helpers

use crate::error::{RestError, RestResult};
use crate::params::{join_list, RequestParams};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Market Data Types
// ============================================================================

/// Server time
#[derive(Debug, Clone, Deserialize)]
pub struct ServerTime {
    /// Unix timestamp
    pub unixtime: i64,
    /// RFC 1123 formatted time
    pub rfc1123: String,
}

/// Exchange status
#[derive(Debug, Clone, Deserialize)]
pub struct SystemStatus {
    /// "online", "maintenance", "cancel_only" or "post_only"
    pub status: String,
    /// Time of the status
    pub timestamp: String,
}

impl SystemStatus {
    /// Orders can be placed
    pub fn is_online(&self) -> bool {
        self.status == "online"
    }
}

/// Asset information
#[derive(Debug, Clone, Deserialize)]
pub struct AssetInfo {
    /// Asset class
    pub aclass: String,
    /// Alternate name
    pub altname: String,
    /// Scaling decimal places for record keeping
    pub decimals: u32,
    /// Scaling decimal places for output display
    pub display_decimals: u32,
    /// Funding/trading status
    #[serde(default)]
    pub status: Option<String>,
}

/// Ticker information for a trading pair
#[derive(Debug, Clone, Deserialize)]
pub struct TickerInfo {
    /// Ask [price, whole lot volume, lot volume]
    pub a: Vec<String>,
    /// Bid [price, whole lot volume, lot volume]
    pub b: Vec<String>,
    /// Last trade closed [price, lot volume]
    pub c: Vec<String>,
    /// Volume [today, last 24 hours]
    pub v: Vec<String>,
    /// Volume weighted average price [today, last 24 hours]
    pub p: Vec<String>,
    /// Number of trades [today, last 24 hours]
    pub t: Vec<u64>,
    /// Low [today, last 24 hours]
    pub l: Vec<String>,
    /// High [today, last 24 hours]
    pub h: Vec<String>,
    /// Today's opening price
    pub o: String,
}

impl TickerInfo {
    /// Get the current ask price
    pub fn ask_price(&self) -> Option<Decimal> {
        self.a.first().and_then(|s| s.parse().ok())
    }

    /// Get the current bid price
    pub fn bid_price(&self) -> Option<Decimal> {
        self.b.first().and_then(|s| s.parse().ok())
    }

    /// Get the last trade price
    pub fn last_price(&self) -> Option<Decimal> {
        self.c.first().and_then(|s| s.parse().ok())
    }

    /// Get the mid price (average of bid and ask)
    pub fn mid_price(&self) -> Option<Decimal> {
        Some((self.ask_price()? + self.bid_price()?) / Decimal::TWO)
    }
}

// ============================================================================
// Account Types
// ============================================================================

/// Account balances by asset, as decimal strings
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceInfo(pub HashMap<String, String>);

impl BalanceInfo {
    /// Balance of one asset
    pub fn get(&self, asset: &str) -> Option<Decimal> {
        self.0.get(asset).and_then(|s| s.parse().ok())
    }

    /// All assets with a non-zero balance
    pub fn non_zero(&self) -> HashMap<String, Decimal> {
        self.0
            .iter()
            .filter_map(|(asset, amount)| {
                let amount: Decimal = amount.parse().ok()?;
                (!amount.is_zero()).then(|| (asset.clone(), amount))
            })
            .collect()
    }
}

/// Trade balance (margin summary)
#[derive(Debug, Clone, Deserialize)]
pub struct TradeBalance {
    /// Equivalent balance (combined balance of all currencies)
    #[serde(rename = "eb")]
    pub equivalent_balance: Decimal,
    /// Trade balance (combined balance of all equity currencies)
    #[serde(rename = "tb")]
    pub trade_balance: Decimal,
    /// Margin amount of open positions
    #[serde(rename = "m")]
    pub margin: Decimal,
    /// Unrealized net profit/loss of open positions
    #[serde(rename = "n")]
    pub unrealized_pnl: Decimal,
    /// Cost basis of open positions
    #[serde(rename = "c")]
    pub cost_basis: Decimal,
    /// Current floating valuation of open positions
    #[serde(rename = "v")]
    pub valuation: Decimal,
    /// Equity
    #[serde(rename = "e")]
    pub equity: Decimal,
    /// Free margin
    #[serde(rename = "mf")]
    pub free_margin: Decimal,
    /// Margin level
    #[serde(rename = "ml", default)]
    pub margin_level: Option<Decimal>,
}

/// Order description
#[derive(Debug, Clone, Deserialize)]
pub struct OrderDescription {
    /// Asset pair
    pub pair: String,
    /// Type (buy/sell)
    #[serde(rename = "type")]
    pub side: String,
    /// Order type
    pub ordertype: String,
    /// Primary price
    pub price: String,
    /// Secondary price
    pub price2: String,
    /// Leverage
    pub leverage: String,
    /// Order description
    pub order: String,
    /// Close order description
    #[serde(default)]
    pub close: String,
}

/// Order as returned by QueryOrders
#[derive(Debug, Clone, Deserialize)]
pub struct OrderInfo {
    /// Status: pending, open, closed, canceled, expired
    pub status: String,
    /// User reference ID
    #[serde(default)]
    pub userref: Option<i64>,
    /// Open time (unix seconds)
    pub opentm: f64,
    /// Order description
    pub descr: OrderDescription,
    /// Volume
    pub vol: String,
    /// Executed volume
    pub vol_exec: String,
    /// Total cost
    pub cost: String,
    /// Total fee
    pub fee: String,
    /// Average price
    pub price: String,
    /// Comma separated order flags
    #[serde(default)]
    pub oflags: String,
    /// Related trade IDs (when requested)
    #[serde(default)]
    pub trades: Option<Vec<String>>,
}

/// Token for private WebSocket subscriptions
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketsToken {
    /// The authentication token
    pub token: String,
    /// Token expiration in seconds (typically 900 = 15 minutes)
    pub expires: u64,
}

// ============================================================================
// Trading Types
// ============================================================================

/// Order side (buy or sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// Buy order
    Buy,
    /// Sell order
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    /// Market order
    Market,
    /// Limit order
    Limit,
    /// Stop loss
    StopLoss,
    /// Take profit
    TakeProfit,
    /// Stop loss limit
    StopLossLimit,
    /// Take profit limit
    TakeProfitLimit,
}

impl OrderType {
    fn needs_price(&self) -> bool {
        !matches!(self, Self::Market)
    }

    fn needs_price2(&self) -> bool {
        matches!(self, Self::StopLossLimit | Self::TakeProfitLimit)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Market => "market",
            Self::Limit => "limit",
            Self::StopLoss => "stop-loss",
            Self::TakeProfit => "take-profit",
            Self::StopLossLimit => "stop-loss-limit",
            Self::TakeProfitLimit => "take-profit-limit",
        };
        write!(f, "{}", s)
    }
}

/// Time in force for orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Good till cancelled
    #[serde(rename = "GTC")]
    GoodTillCancelled,
    /// Immediate or cancel
    #[serde(rename = "IOC")]
    ImmediateOrCancel,
    /// Good till date
    #[serde(rename = "GTD")]
    GoodTillDate,
}

impl std::fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GoodTillCancelled => write!(f, "GTC"),
            Self::ImmediateOrCancel => write!(f, "IOC"),
            Self::GoodTillDate => write!(f, "GTD"),
        }
    }
}

/// Order flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFlag {
    /// Post-only order (maker only)
    PostOnly,
    /// Fee in base currency
    FeeInBase,
    /// Fee in quote currency
    FeeInQuote,
    /// Disable market price protection
    NoMarketPriceProtection,
}

impl OrderFlag {
    /// Get the API string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PostOnly => "post",
            Self::FeeInBase => "fcib",
            Self::FeeInQuote => "fciq",
            Self::NoMarketPriceProtection => "nompp",
        }
    }
}

/// Request to place an order
#[derive(Debug, Clone)]
pub struct OrderRequest {
    /// Trading pair
    pub pair: String,
    /// Order side
    pub side: OrderSide,
    /// Order type
    pub order_type: OrderType,
    /// Order volume
    pub volume: Decimal,
    /// Price (limit price, or trigger price for stop/take-profit)
    pub price: Option<Decimal>,
    /// Secondary price (limit price of stop-loss-limit, take-profit-limit)
    pub price2: Option<Decimal>,
    /// Time in force
    pub time_in_force: Option<TimeInForce>,
    /// Leverage (for margin)
    pub leverage: Option<String>,
    /// Order flags
    pub flags: Vec<OrderFlag>,
    /// User reference ID
    pub userref: Option<i32>,
    /// Validate only (don't submit)
    pub validate: bool,
}

impl OrderRequest {
    fn new(pair: impl Into<String>, side: OrderSide, order_type: OrderType, volume: Decimal) -> Self {
        Self {
            pair: pair.into(),
            side,
            order_type,
            volume,
            price: None,
            price2: None,
            time_in_force: None,
            leverage: None,
            flags: Vec::new(),
            userref: None,
            validate: false,
        }
    }

    /// Create a market order
    pub fn market(pair: impl Into<String>, side: OrderSide, volume: Decimal) -> Self {
        Self::new(pair, side, OrderType::Market, volume)
    }

    /// Create a limit order
    pub fn limit(pair: impl Into<String>, side: OrderSide, volume: Decimal, price: Decimal) -> Self {
        let mut order = Self::new(pair, side, OrderType::Limit, volume);
        order.price = Some(price);
        order
    }

    /// Create a stop loss order
    pub fn stop_loss(pair: impl Into<String>, side: OrderSide, volume: Decimal, stop_price: Decimal) -> Self {
        let mut order = Self::new(pair, side, OrderType::StopLoss, volume);
        order.price = Some(stop_price);
        order
    }

    /// Set time in force
    pub fn with_time_in_force(mut self, tif: TimeInForce) -> Self {
        self.time_in_force = Some(tif);
        self
    }

    /// Add an order flag
    pub fn with_flag(mut self, flag: OrderFlag) -> Self {
        self.flags.push(flag);
        self
    }

    /// Set as post-only (maker only)
    pub fn post_only(self) -> Self {
        self.with_flag(OrderFlag::PostOnly)
    }

    /// Set leverage for margin trading
    pub fn with_leverage(mut self, leverage: impl Into<String>) -> Self {
        self.leverage = Some(leverage.into());
        self
    }

    /// Set user reference ID
    pub fn with_userref(mut self, userref: i32) -> Self {
        self.userref = Some(userref);
        self
    }

    /// Set as validate-only (don't actually submit)
    pub fn validate_only(mut self) -> Self {
        self.validate = true;
        self
    }

    /// Check the order and flatten it into AddOrder parameters
    pub fn to_params(&self) -> RestResult<RequestParams> {
        if self.pair.trim().is_empty() {
            return Err(RestError::InvalidParameter("pair is empty".to_string()));
        }
        if self.volume <= Decimal::ZERO {
            return Err(RestError::InvalidParameter(format!(
                "volume must be positive, got {}",
                self.volume
            )));
        }
        if self.order_type.needs_price() && self.price.is_none() {
            return Err(RestError::InvalidParameter(format!(
                "{} orders require a price",
                self.order_type
            )));
        }
        if self.order_type.needs_price2() && self.price2.is_none() {
            return Err(RestError::InvalidParameter(format!(
                "{} orders require price2",
                self.order_type
            )));
        }

        let flags: Vec<&str> = self.flags.iter().map(OrderFlag::as_str).collect();

        let mut params = RequestParams::new()
            .with("pair", self.pair.as_str())
            .with("type", self.side.to_string())
            .with("ordertype", self.order_type.to_string())
            .with("volume", self.volume)
            .with_opt("price", self.price)
            .with_opt("price2", self.price2)
            .with_opt("timeinforce", self.time_in_force.map(|t| t.to_string()))
            .with_opt("leverage", self.leverage.as_deref())
            .with_opt("userref", self.userref);

        if !flags.is_empty() {
            params.insert("oflags", join_list(&flags));
        }
        if self.validate {
            params.insert("validate", true);
        }

        Ok(params)
    }
}

/// Response from placing an order
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponse {
    /// Order description
    pub descr: OrderResponseDescription,
    /// Transaction IDs (absent for validate-only orders)
    pub txid: Option<Vec<String>>,
}

/// Order response description
#[derive(Debug, Clone, Deserialize)]
pub struct OrderResponseDescription {
    /// Order description
    pub order: String,
    /// Close order description (if applicable)
    pub close: Option<String>,
}

/// Cancel order result
#[derive(Debug, Clone, Deserialize)]
pub struct CancelOrderResult {
    /// Number of orders cancelled
    pub count: u32,
    /// Whether cancel is pending
    pub pending: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_order_params() {
        let params = OrderRequest::market("XBTUSD", OrderSide::Sell, dec!(0.5))
            .post_only()
            .with_flag(OrderFlag::FeeInQuote)
            .with_userref(42)
            .to_params()
            .unwrap();

        assert_eq!(
            params.encode().unwrap().as_str(),
            "pair=XBTUSD&type=sell&ordertype=market&volume=0.5&userref=42&oflags=post%2Cfciq"
        );
    }

    #[test]
    fn test_order_validation() {
        assert!(OrderRequest::market("XBTUSD", OrderSide::Buy, dec!(0)).to_params().is_err());
        assert!(OrderRequest::market("", OrderSide::Buy, dec!(1)).to_params().is_err());

        let mut limit = OrderRequest::limit("XBTUSD", OrderSide::Buy, dec!(1), dec!(100));
        limit.price = None;
        assert!(matches!(limit.to_params(), Err(RestError::InvalidParameter(_))));

        let mut stop_limit = OrderRequest::stop_loss("XBTUSD", OrderSide::Sell, dec!(1), dec!(90));
        stop_limit.order_type = OrderType::StopLossLimit;
        assert!(stop_limit.to_params().is_err());
        stop_limit.price2 = Some(dec!(89));
        assert!(stop_limit.to_params().is_ok());
    }

    #[test]
    fn test_balance_helpers() {
        let balance: BalanceInfo =
            serde_json::from_str(r#"{"ZUSD":"100.5","XXBT":"0.0000000000","XETH":"junk"}"#).unwrap();
        assert_eq!(balance.get("ZUSD"), Some(dec!(100.5)));
        assert_eq!(balance.get("XETH"), None);
        assert_eq!(balance.non_zero().len(), 1);
    }

    #[test]
    fn test_system_status() {
        let status: SystemStatus =
            serde_json::from_str(r#"{"status":"online","timestamp":"2023-07-06T18:52:00Z"}"#).unwrap();
        assert!(status.is_online());
    }

    #[test]
    fn test_order_enums_display() {
        assert_eq!(OrderType::TakeProfitLimit.to_string(), "take-profit-limit");
        assert_eq!(TimeInForce::GoodTillDate.to_string(), "GTD");
        assert_eq!(OrderSide::Buy.to_string(), "buy");
    }
}
