//! # models::ticker
//!
//! The closed set of currency pairs the service samples and accepts in queries.
//! Every ticker has the shape `<CURRENCY>_USD`; the currency half is what the
//! price source is asked for.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

const QUOTE_SUFFIX: &str = "_USD";

#[derive(Debug, Error, PartialEq)]
pub enum TickerSetError {
    #[error("ticker list is empty")]
    Empty,

    #[error("malformed ticker '{0}': expected <CURRENCY>_USD")]
    Malformed(String),
}

/// Supported tickers, in configuration order, without duplicates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TickerSet(Vec<String>);

impl TickerSet {
    pub fn new<I, S>(tickers: I) -> Result<Self, TickerSetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set: Vec<String> = Vec::new();
        for raw in tickers {
            let ticker = raw.as_ref().trim().to_uppercase();
            if ticker.is_empty() {
                continue;
            }
            if currency_of(&ticker).is_none() {
                return Err(TickerSetError::Malformed(ticker));
            }
            if !set.contains(&ticker) {
                set.push(ticker);
            }
        }

        if set.is_empty() {
            return Err(TickerSetError::Empty);
        }
        Ok(Self(set))
    }

    /// Parses a comma separated list such as `"BTC_USD,ETH_USD"`.
    pub fn parse(list: &str) -> Result<Self, TickerSetError> {
        Self::new(list.split(','))
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, ticker: &str) -> bool {
        self.0.iter().any(|t| t == ticker)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for TickerSet {
    fn default() -> Self {
        Self(vec!["BTC_USD".to_string(), "ETH_USD".to_string()])
    }
}

impl fmt::Display for TickerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// `"BTC_USD"` → `Some("BTC")`.
pub fn currency_of(ticker: &str) -> Option<&str> {
    ticker
        .strip_suffix(QUOTE_SUFFIX)
        .filter(|c| !c.is_empty() && c.chars().all(|ch| ch.is_ascii_alphanumeric()))
}

/// `"BTC"` → `"BTC_USD"`.
pub fn ticker_for(currency: &str) -> String {
    format!("{currency}{QUOTE_SUFFIX}")
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalises_and_dedups() {
        let set = TickerSet::parse(" btc_usd, ETH_USD ,BTC_USD,").unwrap();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["BTC_USD", "ETH_USD"]);
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        assert_eq!(
            TickerSet::parse("BTC_EUR"),
            Err(TickerSetError::Malformed("BTC_EUR".into()))
        );
        assert_eq!(
            TickerSet::parse("_USD"),
            Err(TickerSetError::Malformed("_USD".into()))
        );
        assert_eq!(TickerSet::parse(" , "), Err(TickerSetError::Empty));
    }

    #[test]
    fn test_contains_is_exact() {
        let set = TickerSet::default();
        assert!(set.contains("BTC_USD"));
        assert!(!set.contains("btc_usd"));
        assert!(!set.contains("SOL_USD"));
    }

    #[test]
    fn test_currency_round_trip() {
        assert_eq!(currency_of("ETH_USD"), Some("ETH"));
        assert_eq!(ticker_for("ETH"), "ETH_USD");
        assert_eq!(currency_of("ETHUSD"), None);
    }
}
