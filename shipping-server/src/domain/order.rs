//! Order records as the storefront stores them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an order.
///
/// The storefront owns the full lifecycle; the shipping core only moves an
/// order between `Processing`, `Shipped`, `Delivered` and `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Rejected,
    Declined,
    Error,
}

impl OrderStatus {
    /// Statuses the tracking sync polls.
    pub const IN_FLIGHT: [OrderStatus; 2] = [OrderStatus::Processing, OrderStatus::Shipped];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Declined => "declined",
            OrderStatus::Error => "error",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Delivery contact for an order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub neighborhood: String,
    pub city: String,
    pub department: String,
    /// Free-text delivery notes shown to the courier.
    pub notes: String,
}

/// One ordered product line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub name: String,
    /// Unit weight in kilograms. Missing weights count as 1 kg.
    #[serde(default)]
    pub weight: Option<f64>,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(name: impl Into<String>, weight: Option<f64>, quantity: u32) -> Self {
        Self {
            name: name.into(),
            weight,
            quantity,
        }
    }
}

/// Shipment fields written onto an order once a label exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRecord {
    pub tracking_number: String,
    pub label_url: String,
    pub carrier: String,
    /// Verbatim carrier status from the last successful poll.
    #[serde(default)]
    pub tracking_status: Option<String>,
}

/// An order as read from the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub customer: Customer,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub shipment: Option<ShipmentRecord>,
}

impl Order {
    /// Tracking number, if a shipment has been generated.
    pub fn tracking_number(&self) -> Option<&str> {
        self.shipment
            .as_ref()
            .map(|s| s.tracking_number.as_str())
            .filter(|t| !t.is_empty())
    }
}

/// Result of one tracking poll, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingUpdate {
    /// Carrier status string, stored for display.
    pub tracking_status: String,
    /// New lifecycle status, only set when it changes.
    pub status: Option<OrderStatus>,
}
