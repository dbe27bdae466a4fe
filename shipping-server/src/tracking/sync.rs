//! Periodic tracking sync.
//!
//! Scans every in-flight order, polls the carrier, and writes back the
//! carrier status and any lifecycle transition. One failing order never
//! stops the scan.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{Order, OrderStatus, TrackingUpdate};
use crate::envioclick::CarrierApi;
use crate::error::ShippingError;
use crate::store::OrderStore;

use super::TrackingClient;
use super::status::map_carrier_status;

/// Configuration for the sync job.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// How often the scheduler runs a scan.
    pub interval: Duration,

    /// Maximum tracking calls in flight at once.
    pub concurrency: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60 * 60),
            concurrency: 4,
        }
    }
}

/// Outcome counts of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Orders polled.
    pub scanned: usize,
    /// Orders whose lifecycle status changed.
    pub updated: usize,
    /// Orders polled successfully with no status change.
    pub unchanged: usize,
    /// Orders whose poll or write failed.
    pub failed: usize,
}

enum Outcome {
    Updated,
    Unchanged,
}

/// Tracking sync job.
///
/// At most one scan runs at a time across the interval task and manual
/// triggers; a second caller gets [`ShippingError::SyncInProgress`].
pub struct TrackingSync<A, S> {
    tracker: TrackingClient<A>,
    store: Arc<S>,
    config: SyncConfig,
    running: Mutex<()>,
}

impl<A: CarrierApi, S: OrderStore> TrackingSync<A, S> {
    pub fn new(tracker: TrackingClient<A>, store: Arc<S>, config: SyncConfig) -> Self {
        Self {
            tracker,
            store,
            config,
            running: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Run one scan over processing and shipped orders with a tracking number.
    ///
    /// Orders are polled in batches of `concurrency`. Each order appears once
    /// per scan, so no two updates to the same order run concurrently.
    pub async fn run_once(&self) -> Result<SyncReport, ShippingError> {
        let Ok(_running) = self.running.try_lock() else {
            return Err(ShippingError::SyncInProgress);
        };

        let orders: Vec<Order> = self
            .store
            .orders_with_status(&OrderStatus::IN_FLIGHT)
            .await?
            .into_iter()
            .filter(|o| o.tracking_number().is_some())
            .collect();

        let mut report = SyncReport {
            scanned: orders.len(),
            ..SyncReport::default()
        };

        for batch in orders.chunks(self.config.concurrency.max(1)) {
            let results = join_all(batch.iter().map(|order| self.sync_order(order))).await;

            for (order, result) in batch.iter().zip(results) {
                match result {
                    Ok(Outcome::Updated) => report.updated += 1,
                    Ok(Outcome::Unchanged) => report.unchanged += 1,
                    Err(e) => {
                        warn!(order_id = %order.id, error = %e, "tracking sync failed for order");
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            scanned = report.scanned,
            updated = report.updated,
            unchanged = report.unchanged,
            failed = report.failed,
            "tracking sync complete"
        );

        Ok(report)
    }

    async fn sync_order(&self, order: &Order) -> Result<Outcome, ShippingError> {
        let Some(code) = order.tracking_number() else {
            return Ok(Outcome::Unchanged);
        };

        let info = self.tracker.track(code).await?;
        let mapped = map_carrier_status(&info.status);
        let status = mapped.filter(|s| *s != order.status);

        debug!(
            order_id = %order.id,
            carrier_status = %info.status,
            current = %order.status,
            mapped = ?mapped,
            "tracked"
        );

        let update = TrackingUpdate {
            tracking_status: info.status,
            status,
        };
        self.store.record_tracking(&order.id, &update).await?;

        Ok(match status {
            Some(new_status) => {
                info!(order_id = %order.id, from = %order.status, to = %new_status, "order status changed");
                Outcome::Updated
            }
            None => Outcome::Unchanged,
        })
    }
}
