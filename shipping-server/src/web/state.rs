//! Application state for the web layer.

use std::sync::Arc;

use crate::config::ShippingConfig;
use crate::envioclick::CarrierApi;
use crate::geo::GeoResolver;
use crate::quote::{CachedQuoter, Quoter};
use crate::shipment::ShipmentCreator;
use crate::store::OrderStore;
use crate::tracking::{TrackingClient, TrackingSync};

/// Shared application state.
pub struct AppState<A, S> {
    /// Checkout quotes, cached
    pub quotes: Arc<CachedQuoter<A>>,

    /// Label generation with re-quote fallback
    pub shipments: Arc<ShipmentCreator<A>>,

    pub tracker: TrackingClient<A>,

    /// Tracking sync job, also driven by the background interval
    pub sync: Arc<TrackingSync<A, S>>,

    pub store: Arc<S>,
}

impl<A, S> Clone for AppState<A, S> {
    fn clone(&self) -> Self {
        Self {
            quotes: Arc::clone(&self.quotes),
            shipments: Arc::clone(&self.shipments),
            tracker: self.tracker.clone(),
            sync: Arc::clone(&self.sync),
            store: Arc::clone(&self.store),
        }
    }
}

impl<A: CarrierApi, S: OrderStore> AppState<A, S> {
    /// Wire every service around one carrier transport and one store.
    pub fn new(api: Arc<A>, geo: GeoResolver, store: Arc<S>, config: &ShippingConfig) -> Self {
        let quoter = Quoter::new(Arc::clone(&api), geo, config.quote.clone());
        let quotes = CachedQuoter::new(quoter.clone(), &config.quote_cache);
        let shipments = ShipmentCreator::new(Arc::clone(&api), quoter, config.shipment.clone());
        let tracker = TrackingClient::new(api);
        let sync = TrackingSync::new(tracker.clone(), Arc::clone(&store), config.sync.clone());

        Self {
            quotes: Arc::new(quotes),
            shipments: Arc::new(shipments),
            tracker,
            sync: Arc::new(sync),
            store,
        }
    }
}
