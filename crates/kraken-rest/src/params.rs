//! Request parameters and their form encoding
//!
//! Every REST call sends an `application/x-www-form-urlencoded` body built
//! from an ordered list of scalar parameters. The encoded body is produced
//! once per call and the same bytes are both signed and sent.

use crate::error::{RestError, RestResult};
use serde_json::Value;
use std::borrow::Cow;
use std::fmt;

/// Name of the nonce parameter on private requests
pub const NONCE_PARAM: &str = "nonce";

/// A single scalar parameter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Text value
    Str(String),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Boolean, sent as `true`/`false`
    Bool(bool),
}

impl ParamValue {
    /// Wire representation of the value
    pub fn as_wire(&self) -> Cow<'_, str> {
        match self {
            Self::Str(s) => Cow::Borrowed(s),
            Self::Int(i) => Cow::Owned(i.to_string()),
            Self::UInt(u) => Cow::Owned(u.to_string()),
            Self::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_wire())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self::Str(value.clone())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<u16> for ParamValue {
    fn from(value: u16) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<rust_decimal::Decimal> for ParamValue {
    fn from(value: rust_decimal::Decimal) -> Self {
        Self::Str(value.to_string())
    }
}

/// Ordered key/value parameters for one request
///
/// Keys keep their insertion order; inserting an existing key replaces its
/// value without moving it.
///
/// # Example
///
/// ```
/// use kraken_rest::RequestParams;
///
/// let params = RequestParams::new()
///     .with("pair", "XBTUSD")
///     .with("count", 10u32)
///     .with("trades", true);
///
/// assert_eq!(params.encode().unwrap().as_str(), "pair=XBTUSD&count=10&trades=true");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    entries: Vec<(String, ParamValue)>,
}

impl RequestParams {
    /// Empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style insert that skips `None`
    pub fn with_opt<V: Into<ParamValue>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Insert or replace a parameter, returning the previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Option<ParamValue> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Insert a parameter ahead of all others
    ///
    /// Replaces (and moves to the front) any existing value for `key`.
    pub fn insert_first(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        self.entries.retain(|(k, _)| *k != key);
        self.entries.insert(0, (key, value.into()));
    }

    /// Look up a parameter
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Check whether a parameter is present
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no parameters
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in wire order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Build parameters from a JSON object produced by a caller
    ///
    /// Scalars are accepted; `null` members are skipped. Arrays must be
    /// flattened with [`join_list`] first, nested values are rejected.
    pub fn from_json(value: Value) -> RestResult<Self> {
        let object = match value {
            Value::Object(object) => object,
            Value::Null => return Ok(Self::new()),
            other => {
                return Err(RestError::InvalidParameter(format!(
                    "expected an object of parameters, got {}",
                    json_kind(&other)
                )))
            }
        };

        let mut params = Self::new();
        for (key, value) in object {
            let value = match value {
                Value::Null => continue,
                Value::Bool(b) => ParamValue::Bool(b),
                Value::String(s) => ParamValue::Str(s),
                Value::Number(n) => {
                    if let Some(i) = n.as_i64() {
                        ParamValue::Int(i)
                    } else if let Some(u) = n.as_u64() {
                        ParamValue::UInt(u)
                    } else {
                        ParamValue::Str(n.to_string())
                    }
                }
                nested @ (Value::Array(_) | Value::Object(_)) => {
                    return Err(RestError::InvalidParameter(format!(
                        "parameter '{}' is {}, only scalar values can be encoded",
                        key,
                        json_kind(&nested)
                    )))
                }
            };
            params.insert(key, value);
        }
        Ok(params)
    }

    /// Encode as a form body
    ///
    /// Encoding is deterministic: the same parameters in the same order
    /// always produce the same bytes.
    pub fn encode(&self) -> RestResult<EncodedBody> {
        let pairs: Vec<(&str, Cow<'_, str>)> =
            self.entries.iter().map(|(k, v)| (k.as_str(), v.as_wire())).collect();

        serde_urlencoded::to_string(&pairs)
            .map(EncodedBody)
            .map_err(|e| RestError::InvalidParameter(e.to_string()))
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// A form-encoded request body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedBody(String);

impl EncodedBody {
    /// Body text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Body length in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the body is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Take the body text
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for EncodedBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Flatten a list argument into Kraken's comma-separated form
pub fn join_list<S: AsRef<str>>(items: &[S]) -> String {
    items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
