//! # store::memory
//!
//! In-process [`TickStore`]. Each ticker owns a `BTreeMap` keyed by
//! `(timestamp, id)`, which is the same compound key the Postgres index uses,
//! so range scans never touch another ticker's rows.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{StoreError, TickStore};
use crate::models::{NewPriceTick, PriceTick};

type Series = BTreeMap<(i64, i64), PriceTick>;

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    series:  HashMap<String, Series>,
}

#[derive(Debug, Default)]
pub struct MemoryTickStore {
    inner: RwLock<Inner>,
}

impl MemoryTickStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total rows across every ticker.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        let inner = self.inner.read().await;
        inner.series.values().map(BTreeMap::len).sum()
    }
}

#[async_trait]
impl TickStore for MemoryTickStore {
    async fn append(&self, tick: NewPriceTick) -> Result<PriceTick, StoreError> {
        // id assignment and insert happen under one write guard
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let stored = tick.into_stored(inner.next_id);

        inner
            .series
            .entry(stored.ticker.clone())
            .or_default()
            .insert((stored.timestamp, stored.id), stored.clone());

        Ok(stored)
    }

    async fn all_by_ticker(&self, ticker: &str) -> Result<Vec<PriceTick>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .series
            .get(ticker)
            .map(|s| s.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn latest_by_ticker(&self, ticker: &str) -> Result<Option<PriceTick>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .series
            .get(ticker)
            .and_then(|s| s.values().next_back().cloned()))
    }

    async fn range_by_ticker(
        &self,
        ticker: &str,
        from: Option<i64>,
        to: Option<i64>,
    ) -> Result<Vec<PriceTick>, StoreError> {
        let lo = (from.unwrap_or(i64::MIN), i64::MIN);
        let hi = (to.unwrap_or(i64::MAX), i64::MAX);
        if lo > hi {
            return Ok(Vec::new());
        }

        let inner = self.inner.read().await;
        Ok(inner
            .series
            .get(ticker)
            .map(|s| s.range(lo..=hi).map(|(_, t)| t.clone()).collect())
            .unwrap_or_default())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;
    use std::sync::Arc;

    fn tick(ticker: &str, price: &str, ts: i64) -> NewPriceTick {
        NewPriceTick::new(ticker, BigDecimal::from_str(price).unwrap(), ts).unwrap()
    }

    async fn seeded() -> MemoryTickStore {
        let store = MemoryTickStore::new();
        store.append(tick("BTC_USD", "50000.5", 1_000_000)).await.unwrap();
        store.append(tick("BTC_USD", "51000.0", 1_000_060)).await.unwrap();
        store.append(tick("ETH_USD", "3000.25", 1_000_000)).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_all_by_ticker_ascending() {
        let store = seeded().await;
        let ticks = store.all_by_ticker("BTC_USD").await.unwrap();

        assert_eq!(ticks.len(), 2);
        assert_eq!(ticks[0].ticker, "BTC_USD");
        assert_eq!(ticks[0].price, BigDecimal::from_str("50000.5").unwrap());
        assert!(ticks[0].timestamp < ticks[1].timestamp);
    }

    #[tokio::test]
    async fn test_latest_by_ticker() {
        let store = seeded().await;
        let latest = store.latest_by_ticker("BTC_USD").await.unwrap().unwrap();

        assert_eq!(latest.price, BigDecimal::from_str("51000.0").unwrap());
        assert_eq!(latest.timestamp, 1_000_060);
    }

    #[tokio::test]
    async fn test_latest_absent_without_data() {
        let store = seeded().await;
        assert!(store.latest_by_ticker("SOL_USD").await.unwrap().is_none());
        assert!(store.all_by_ticker("SOL_USD").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_range_inclusive_bounds() {
        let store = seeded().await;

        let ticks = store
            .range_by_ticker("BTC_USD", Some(1_000_000), Some(1_000_030))
            .await
            .unwrap();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].timestamp, 1_000_000);

        let ticks = store
            .range_by_ticker("BTC_USD", Some(1_000_060), Some(1_000_060))
            .await
            .unwrap();
        assert_eq!(ticks.len(), 1);
        assert_eq!(ticks[0].timestamp, 1_000_060);
    }

    #[tokio::test]
    async fn test_range_open_bounds_and_empty() {
        let store = seeded().await;

        assert_eq!(store.range_by_ticker("BTC_USD", None, None).await.unwrap().len(), 2);
        assert_eq!(
            store.range_by_ticker("BTC_USD", None, Some(1_000_059)).await.unwrap().len(),
            1
        );
        assert!(store
            .range_by_ticker("BTC_USD", Some(2_000_000), None)
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .range_by_ticker("BTC_USD", Some(1_000_060), Some(1_000_000))
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_range_is_filter_of_all() {
        let store = MemoryTickStore::new();
        for (i, ts) in [40, 10, 30, 10, 20, 50, 30].into_iter().enumerate() {
            store
                .append(tick("BTC_USD", &format!("{}.5", 100 + i), ts))
                .await
                .unwrap();
        }

        let all = store.all_by_ticker("BTC_USD").await.unwrap();
        for (from, to) in [(None, None), (Some(10), Some(30)), (Some(25), None), (None, Some(10))] {
            let expected: Vec<_> = all
                .iter()
                .filter(|t| from.map_or(true, |f| t.timestamp >= f))
                .filter(|t| to.map_or(true, |u| t.timestamp <= u))
                .cloned()
                .collect();
            assert_eq!(store.range_by_ticker("BTC_USD", from, to).await.unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_insertion_order() {
        let store = MemoryTickStore::new();
        let first = store.append(tick("BTC_USD", "1", 500)).await.unwrap();
        let second = store.append(tick("BTC_USD", "2", 500)).await.unwrap();

        let all = store.all_by_ticker("BTC_USD").await.unwrap();
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![first.id, second.id]);

        let latest = store.latest_by_ticker("BTC_USD").await.unwrap().unwrap();
        assert_eq!(latest.id, second.id);
    }

    #[tokio::test]
    async fn test_concurrent_appends_get_unique_ids() {
        let store = Arc::new(MemoryTickStore::new());
        let mut handles = Vec::new();
        for i in 0..64 {
            let store = Arc::clone(&store);
            let ticker = if i % 2 == 0 { "BTC_USD" } else { "ETH_USD" };
            handles.push(tokio::spawn(async move {
                store.append(tick(ticker, "1.0", 1_000 + i)).await.unwrap().id
            }));
        }

        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 64);
        assert_eq!(store.len().await, 64);
    }
}
