use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tickwise_models::InstrumentInfo;
use tracing::debug;

use crate::capability::ReferenceData;
use crate::error::DataError;

/// Read-through memo over a [`ReferenceData`] provider, backed by moka.
///
/// Only successful lookups are kept; failures always reach the provider again.
pub struct CachedReferenceData {
    inner: Arc<dyn ReferenceData>,
    cache: Cache<String, InstrumentInfo>,
}

impl CachedReferenceData {
    pub fn new(inner: Arc<dyn ReferenceData>, max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner,
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[async_trait]
impl ReferenceData for CachedReferenceData {
    async fn lookup(&self, symbol: &str) -> Result<InstrumentInfo, DataError> {
        if let Some(info) = self.cache.get(symbol).await {
            debug!(symbol, "Reference lookup served from memory");
            return Ok(info);
        }

        let info = self.inner.lookup(symbol).await?;
        self.cache.insert(symbol.to_string(), info.clone()).await;
        debug!(symbol, entries = self.entry_count(), "Reference lookup memoised");
        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingReference {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ReferenceData for CountingReference {
        async fn lookup(&self, symbol: &str) -> Result<InstrumentInfo, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DataError::NotFound(symbol.to_string()));
            }
            Ok(InstrumentInfo {
                symbol: symbol.to_string(),
                display_name: Some("Test Company".to_string()),
            })
        }
    }

    fn counting(fail: bool) -> Arc<CountingReference> {
        Arc::new(CountingReference {
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    #[tokio::test]
    async fn second_lookup_is_served_from_memory() {
        let inner = counting(false);
        let cached = CachedReferenceData::new(inner.clone(), 100, Duration::from_secs(60));

        let first = cached.lookup("AAPL").await.unwrap();
        let second = cached.lookup("AAPL").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
        cached.cache.run_pending_tasks().await;
        assert_eq!(cached.entry_count(), 1);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = counting(true);
        let cached = CachedReferenceData::new(inner.clone(), 100, Duration::from_secs(60));

        assert!(cached.lookup("NOPE").await.is_err());
        assert!(cached.lookup("NOPE").await.is_err());
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        cached.cache.run_pending_tasks().await;
        assert_eq!(cached.entry_count(), 0);
    }

    #[tokio::test]
    async fn entries_expire_after_ttl() {
        let inner = counting(false);
        let cached = CachedReferenceData::new(inner.clone(), 100, Duration::from_millis(50));

        cached.lookup("AAPL").await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        cached.lookup("AAPL").await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }
}
