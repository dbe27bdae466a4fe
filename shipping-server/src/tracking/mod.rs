//! Shipment tracking.
//!
//! [`TrackingClient`] asks the aggregator for one shipment's status,
//! [`map_carrier_status`] translates carrier wording into order statuses,
//! and [`TrackingSync`] applies both to every in-flight order.

mod status;
mod sync;

use std::sync::Arc;

use serde::Serialize;

use crate::envioclick::CarrierApi;
use crate::error::ShippingError;

pub use status::{STATUS_KEYWORDS, map_carrier_status};
pub use sync::{SyncConfig, SyncReport, TrackingSync};

/// Carrier status for one shipment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingInfo {
    pub status: String,
    pub detail: Option<String>,
}

/// Single-shot tracking lookups.
pub struct TrackingClient<A> {
    api: Arc<A>,
}

impl<A> Clone for TrackingClient<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<A: CarrierApi> TrackingClient<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Fetch the current status of a tracking code. No retries.
    pub async fn track(&self, tracking_code: &str) -> Result<TrackingInfo, ShippingError> {
        let code = tracking_code.trim();
        if code.is_empty() {
            return Err(ShippingError::InvalidRequest(
                "tracking code is empty".to_string(),
            ));
        }

        let data = self.api.track(code).await?;

        Ok(TrackingInfo {
            status: data.status.trim().to_string(),
            detail: data
                .status_detail
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envioclick::TrackData;
    use crate::envioclick::mock::{MockCarrier, tracked};

    #[tokio::test]
    async fn track_trims_fields() {
        let api = Arc::new(MockCarrier::new());
        api.set_tracking(
            "T1",
            Ok(TrackData {
                status: " EN TRANSITO ".into(),
                status_detail: Some("  ".into()),
            }),
        );

        let info = TrackingClient::new(api).track(" T1 ").await.unwrap();
        assert_eq!(info.status, "EN TRANSITO");
        assert_eq!(info.detail, None);
    }

    #[tokio::test]
    async fn failure_is_structured() {
        let api = Arc::new(MockCarrier::new());
        api.set_tracking("T1", Err("upstream down"));

        let err = TrackingClient::new(Arc::clone(&api)).track("T1").await.unwrap_err();
        assert!(matches!(err, ShippingError::Carrier(_)));
        assert_eq!(api.track_calls(), 1);
    }

    #[tokio::test]
    async fn empty_code_rejected_without_call() {
        let api = Arc::new(MockCarrier::new());
        api.set_tracking("T1", Ok(tracked("ENTREGADO")));

        let err = TrackingClient::new(Arc::clone(&api)).track("  ").await.unwrap_err();
        assert!(matches!(err, ShippingError::InvalidRequest(_)));
        assert_eq!(api.track_calls(), 0);
    }
}
