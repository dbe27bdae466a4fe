//! Errors surfaced by the shipping operations.
//!
//! Remote failures never escape as panics; every public operation returns
//! one of these so the storefront can show a message or flag the order for
//! manual handling.

use crate::envioclick::EnvioclickError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ShippingError {
    /// Destination could not be geocoded. Not transient; do not retry.
    #[error("area not serviceable: {city}, {department}")]
    Coverage { city: String, department: String },

    /// Aggregator gave no usable rates.
    #[error("quotation failed: {0}")]
    Quote(String),

    /// Shipment creation failed, including the single re-quote retry.
    #[error("shipment creation failed: {first}; retry: {retry}")]
    Shipment { first: String, retry: String },

    /// Caller passed something unusable (e.g. an empty tracking code).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A tracking sync scan is already running.
    #[error("tracking sync already running")]
    SyncInProgress,

    #[error(transparent)]
    Carrier(#[from] EnvioclickError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
