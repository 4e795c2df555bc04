//! Strictly increasing nonces for private requests
//!
//! Kraken rejects any private request whose nonce is not greater than the
//! last one it accepted for the same API key. Nonces are issued as decimal
//! strings (whole seconds followed by the zero-padded microsecond part), so
//! they never depend on the width of a numeric type on the consumer side.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

const MICROS_PER_SEC: u64 = 1_000_000;

/// Clock regressions smaller than this are indistinguishable from bursts of
/// requests within the same microsecond and are not reported.
const CLOCK_REGRESSION_WARN_MICROS: u64 = MICROS_PER_SEC;

/// A single nonce value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Nonce(u64);

impl Nonce {
    /// Wrap a raw microsecond value
    pub fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Microseconds since the Unix epoch
    pub fn as_micros(&self) -> u64 {
        self.0
    }

    /// Parse a caller-supplied nonce string
    ///
    /// Only plain unsigned decimal strings that fit in a `u64` are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        value.parse().ok().map(Self)
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0 / MICROS_PER_SEC;
        let micros = self.0 % MICROS_PER_SEC;
        if secs == 0 {
            write!(f, "{}", micros)
        } else {
            write!(f, "{}{:06}", secs, micros)
        }
    }
}

/// Issues nonces that are strictly increasing for the lifetime of the
/// generator, including under concurrent use and when the wall clock steps
/// backwards.
///
/// # Example
///
/// ```
/// use kraken_auth::NonceGenerator;
///
/// let nonces = NonceGenerator::new();
/// let first = nonces.next();
/// let second = nonces.next();
/// assert!(second > first);
/// ```
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last: AtomicU64,
}

impl NonceGenerator {
    /// Create a generator that has not issued anything yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next nonce
    pub fn next(&self) -> Nonce {
        self.next_at(now_micros())
    }

    /// Advance the generator past a nonce issued elsewhere
    ///
    /// Returns `true` if `nonce` is greater than everything this generator
    /// had issued or observed before.
    pub fn observe(&self, nonce: Nonce) -> bool {
        let prev = self.last.fetch_max(nonce.as_micros(), Ordering::SeqCst);
        nonce.as_micros() > prev
    }

    /// The most recent value issued or observed, if any
    pub fn last(&self) -> Option<Nonce> {
        match self.last.load(Ordering::SeqCst) {
            0 => None,
            v => Some(Nonce(v)),
        }
    }

    fn next_at(&self, now: u64) -> Nonce {
        let (Ok(prev) | Err(prev)) =
            self.last
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                    Some(now.max(last.saturating_add(1)))
                });

        if prev > now && prev - now > CLOCK_REGRESSION_WARN_MICROS {
            warn!(
                behind_micros = prev - now,
                "System clock is behind the last issued nonce, clamping upward"
            );
        }

        Nonce(now.max(prev.saturating_add(1)))
    }
}

fn now_micros() -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() * MICROS_PER_SEC + u64::from(elapsed.subsec_micros()),
        // Clock before the epoch, clamping takes over
        Err(_) => 0,
    }
}
