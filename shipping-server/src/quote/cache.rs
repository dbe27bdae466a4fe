//! Caching layer for checkout quotes.
//!
//! The checkout page re-quotes whenever the buyer edits the basket or the
//! address. Identical requests inside a short window are served from
//! memory. Rate ids age while cached, which is fine: shipment creation
//! recovers from a stale id by re-quoting through the uncached client.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::domain::{DaneCode, RateQuote};
use crate::envioclick::CarrierApi;
use crate::error::ShippingError;

use super::{QuoteRequest, Quoter, content_value, package_weight};

/// Cache key: (destination, weight in grams, declared value in whole pesos).
type QuoteKey = (DaneCode, u64, u64);

/// Cached quote list.
type QuoteEntry = Arc<Vec<RateQuote>>;

/// Configuration for the quote cache.
#[derive(Debug, Clone)]
pub struct QuoteCacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for QuoteCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(120),
            max_capacity: 1000,
        }
    }
}

/// Quoter with a short-lived response cache.
pub struct CachedQuoter<A> {
    quoter: Quoter<A>,
    cache: MokaCache<QuoteKey, QuoteEntry>,
}

impl<A: CarrierApi> CachedQuoter<A> {
    pub fn new(quoter: Quoter<A>, config: &QuoteCacheConfig) -> Self {
        let cache = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { quoter, cache }
    }

    /// Quote, serving identical recent requests from cache.
    ///
    /// Failures are not cached.
    pub async fn quote(&self, request: &QuoteRequest) -> Result<QuoteEntry, ShippingError> {
        let destination = self.quoter.resolve(&request.city, &request.department)?;
        let weight = package_weight(&request.items);
        let value = content_value(request.order_total, self.quoter.config().content_value_floor);
        let key = (
            destination.city_code,
            (weight * 1000.0).round() as u64,
            value.round() as u64,
        );

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let quotes = self
            .quoter
            .quote_to(destination.city_code, weight, value)
            .await?;
        let entry = Arc::new(quotes);

        self.cache.insert(key, entry.clone()).await;

        Ok(entry)
    }

    /// Access the underlying quoter for calls that must bypass the cache.
    pub fn quoter(&self) -> &Quoter<A> {
        &self.quoter
    }

    #[cfg(test)]
    pub(crate) fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LineItem;
    use crate::envioclick::mock::{MockCarrier, rate};
    use crate::geo::GeoResolver;
    use crate::quote::QuoteConfig;

    fn cached(api: &Arc<MockCarrier>) -> CachedQuoter<MockCarrier> {
        let quoter = Quoter::new(Arc::clone(api), GeoResolver::bundled(), QuoteConfig::default());
        CachedQuoter::new(quoter, &QuoteCacheConfig::default())
    }

    #[test]
    fn default_config() {
        let config = QuoteCacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(120));
        assert_eq!(config.max_capacity, 1000);
    }

    #[tokio::test]
    async fn repeated_request_served_from_cache() {
        let api = Arc::new(MockCarrier::new());
        api.push_quote(Ok(vec![rate("1", "TCC", 9_000.0)]));
        let quoter = cached(&api);

        let req = QuoteRequest::new(
            "Pereira",
            "Risaralda",
            vec![LineItem::new("Kit", Some(1.2), 1)],
            90_000.0,
        );
        let first = quoter.quote(&req).await.unwrap();
        let second = quoter.quote(&req).await.unwrap();

        assert_eq!(api.quotation_calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn different_basket_misses_cache() {
        let api = Arc::new(MockCarrier::new());
        api.push_quote(Ok(vec![rate("1", "TCC", 9_000.0)]));
        api.push_quote(Ok(vec![rate("2", "TCC", 14_000.0)]));
        let quoter = cached(&api);

        let light = QuoteRequest::new("Neiva", "Huila", vec![LineItem::new("a", Some(1.0), 1)], 1.0);
        let heavy = QuoteRequest::new("Neiva", "Huila", vec![LineItem::new("a", Some(1.0), 3)], 1.0);
        quoter.quote(&light).await.unwrap();
        let quotes = quoter.quote(&heavy).await.unwrap();

        assert_eq!(api.quotation_calls(), 2);
        assert_eq!(quotes[0].rate_id.as_str(), "2");
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let api = Arc::new(MockCarrier::new());
        api.push_quote(Err("boom"));
        api.push_quote(Ok(vec![rate("3", "TCC", 9_000.0)]));
        let quoter = cached(&api);

        let req = QuoteRequest::new("Tunja", "Boyacá", vec![], 20_000.0);
        assert!(quoter.quote(&req).await.is_err());
        assert!(quoter.quote(&req).await.is_ok());
        assert_eq!(api.quotation_calls(), 2);
    }

    #[tokio::test]
    async fn coverage_error_skips_cache_and_network() {
        let api = Arc::new(MockCarrier::new());
        let quoter = cached(&api);

        let req = QuoteRequest::new("Gotham", "Nowhere", vec![], 20_000.0);
        let err = quoter.quote(&req).await.unwrap_err();

        assert!(matches!(err, ShippingError::Coverage { .. }));
        assert_eq!(api.quotation_calls(), 0);
        assert_eq!(quoter.entry_count(), 0);
    }
}
