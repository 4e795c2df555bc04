//! Typed helpers for individual API methods
//!
//! Each helper turns its arguments into [`RequestParams`](crate::RequestParams)
//! and hands them to the client's dispatch methods.

pub mod account;
pub mod market;
pub mod trading;

pub use account::AccountEndpoints;
pub use market::MarketEndpoints;
pub use trading::TradingEndpoints;
