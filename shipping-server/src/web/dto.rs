//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Customer, LineItem, OrderStatus, RateChoice, RateQuote};
use crate::geo::GeoMatch;
use crate::shipment::CreatedShipment;
use crate::tracking::{SyncReport, TrackingInfo};

/// Request to quote a basket.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBody {
    pub city: String,
    pub department: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Order total in COP
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub success: bool,
    pub quotes: Vec<RateQuote>,
}

/// Query for resolving a destination.
#[derive(Debug, Deserialize)]
pub struct ResolveQuery {
    pub city: String,
    pub department: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub success: bool,
    #[serde(flatten)]
    pub destination: GeoMatch,
}

/// Request to generate a shipment.
///
/// With an `orderId`, missing customer, items and total are taken from the
/// stored order and the resulting shipment is written back to it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    pub order_id: Option<String>,
    pub customer: Option<Customer>,
    pub items: Option<Vec<LineItem>>,
    pub total: Option<f64>,
    pub rate: Option<RateChoice>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub success: bool,
    #[serde(flatten)]
    pub shipment: CreatedShipment,
    /// Whether the shipment was recorded on the order.
    pub order_updated: bool,
}

/// Request to look up one tracking code.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackBody {
    pub tracking_number: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub success: bool,
    #[serde(flatten)]
    pub tracking: TrackingInfo,
    /// Order status the carrier wording maps to, if any.
    pub mapped_status: Option<OrderStatus>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: SyncReport,
}

/// Error envelope.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RateId;

    #[test]
    fn create_body_accepts_storefront_shape() {
        let body: CreateBody = serde_json::from_str(
            r#"{
                "customer": {"name": "Ana Gómez", "city": "Medellín", "department": "Antioquia"},
                "items": [{"name": "Sérum", "weight": 0.2, "quantity": 2}],
                "total": 180000,
                "rate": {"rateId": 98765, "carrier": "SERVIENTREGA"}
            }"#,
        )
        .unwrap();

        assert!(body.order_id.is_none());
        assert_eq!(body.customer.unwrap().city, "Medellín");
        assert_eq!(body.items.unwrap()[0].quantity, 2);
        assert_eq!(body.rate.unwrap().rate_id, Some(RateId::new("98765")));
    }

    #[test]
    fn envelopes_flatten() {
        let json = serde_json::to_value(CreateResponse {
            success: true,
            shipment: CreatedShipment {
                tracking_number: "T1".into(),
                label_url: "https://labels.example/T1.pdf".into(),
                carrier: "COORDINADORA".into(),
            },
            order_updated: false,
        })
        .unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["trackingNumber"], "T1");
        assert_eq!(json["orderUpdated"], false);

        let json = serde_json::to_value(ErrorResponse::new("boom")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "error": "boom"}));
    }
}
