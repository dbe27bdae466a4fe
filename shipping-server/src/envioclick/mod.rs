//! EnvioClick carrier-aggregator client.
//!
//! EnvioClick fronts several Colombian carriers (Coordinadora, Servientrega,
//! Interrapidísimo, TCC...) behind one REST API:
//! - `quotation` returns priced offers, each with an `idRate`
//! - `shipment/request` turns an `idRate` into a label and tracking number
//! - `track` reports the carrier's current status for a tracking code
//!
//! Rate ids expire after a window EnvioClick does not document, so callers
//! must expect `shipment/request` to reject an id that quoted fine earlier.

use std::future::Future;

mod client;
mod error;
#[cfg(test)]
pub(crate) mod mock;
mod types;

pub use client::{EnvioclickClient, EnvioclickConfig};
pub use error::EnvioclickError;
pub use types::{
    ContactDto, DaneLocation, PackageDto, QuotationRequest, RateDto, ShipmentData,
    ShipmentRequestDto, TrackData,
};

/// Transport seam for the aggregator.
///
/// Implemented by [`EnvioclickClient`] for production and by in-memory
/// fakes in tests, so quoting, shipment retry and tracking sync can be
/// exercised without the network.
pub trait CarrierApi: Send + Sync {
    /// Request rate offers for one package.
    fn quotation(
        &self,
        request: &QuotationRequest,
    ) -> impl Future<Output = Result<Vec<RateDto>, EnvioclickError>> + Send;

    /// Generate a shipment and label from a rate id.
    fn create_shipment(
        &self,
        request: &ShipmentRequestDto,
    ) -> impl Future<Output = Result<ShipmentData, EnvioclickError>> + Send;

    /// Fetch the current status of a shipment.
    fn track(
        &self,
        tracking_code: &str,
    ) -> impl Future<Output = Result<TrackData, EnvioclickError>> + Send;
}
