//! Order persistence seam.
//!
//! The storefront owns orders. The shipping core reads in-flight orders and
//! writes back shipment and tracking fields through [`OrderStore`]; nothing
//! here ever deletes an order or touches payment data.

use std::future::Future;
use std::path::PathBuf;

use crate::domain::{Order, OrderStatus, TrackingUpdate};
use crate::shipment::CreatedShipment;

mod json_file;
mod memory;

pub use json_file::JsonFileOrderStore;
pub use memory::InMemoryOrderStore;

/// Errors from an order store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("order not found: {0}")]
    NotFound(String),

    #[error("order {order_id} already has shipment {tracking_number}")]
    ShipmentExists {
        order_id: String,
        tracking_number: String,
    },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("order file {path} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read/write access to orders.
///
/// Each write must be atomic per order: implementations apply one update
/// completely before another update to the same order is observed.
pub trait OrderStore: Send + Sync {
    /// Orders whose status is one of `statuses`.
    fn orders_with_status(
        &self,
        statuses: &[OrderStatus],
    ) -> impl Future<Output = Result<Vec<Order>, StoreError>> + Send;

    fn get(&self, order_id: &str) -> impl Future<Output = Result<Option<Order>, StoreError>> + Send;

    /// Record a freshly generated shipment on the order.
    ///
    /// Fails with [`StoreError::ShipmentExists`] if the order already carries
    /// a tracking number; an existing record is never replaced.
    fn attach_shipment(
        &self,
        order_id: &str,
        shipment: &CreatedShipment,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Record the result of a tracking poll.
    fn record_tracking(
        &self,
        order_id: &str,
        update: &TrackingUpdate,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Apply a shipment to an order in place, refusing to replace one.
pub(crate) fn apply_shipment(order: &mut Order, shipment: &CreatedShipment) -> Result<(), StoreError> {
    if let Some(existing) = order.tracking_number() {
        return Err(StoreError::ShipmentExists {
            order_id: order.id.clone(),
            tracking_number: existing.to_string(),
        });
    }
    order.shipment = Some(crate::domain::ShipmentRecord {
        tracking_number: shipment.tracking_number.clone(),
        label_url: shipment.label_url.clone(),
        carrier: shipment.carrier.clone(),
        tracking_status: None,
    });
    Ok(())
}

/// Apply a tracking update to an order in place.
///
/// Returns `false` if the order has no shipment to update.
pub(crate) fn apply_tracking(order: &mut Order, update: &TrackingUpdate) -> bool {
    let Some(shipment) = order.shipment.as_mut() else {
        return false;
    };
    shipment.tracking_status = Some(update.tracking_status.clone());
    if let Some(status) = update.status {
        order.status = status;
    }
    true
}
