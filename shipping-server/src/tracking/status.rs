//! Carrier status wording to order status.

use crate::domain::OrderStatus;
use crate::geo::fold_diacritics;

/// Keyword table, checked in order against the lowercased, accent-folded
/// carrier status. First hit wins, so "no entregado, devuelto" style
/// phrases must be listed before the plain delivered keywords.
pub const STATUS_KEYWORDS: &[(&str, OrderStatus)] = &[
    ("no entregado", OrderStatus::Error),
    ("not delivered", OrderStatus::Error),
    ("entregado", OrderStatus::Delivered),
    ("delivered", OrderStatus::Delivered),
    ("cancelado", OrderStatus::Error),
    ("cancelled", OrderStatus::Error),
    ("canceled", OrderStatus::Error),
    ("devuelto", OrderStatus::Error),
    ("devolucion", OrderStatus::Error),
    ("returned", OrderStatus::Error),
    ("error", OrderStatus::Error),
    ("transito", OrderStatus::Shipped),
    ("in transit", OrderStatus::Shipped),
    ("recolectado", OrderStatus::Shipped),
    ("recogido", OrderStatus::Shipped),
    ("pickup", OrderStatus::Shipped),
    ("picked up", OrderStatus::Shipped),
    ("en camino", OrderStatus::Shipped),
    ("on the way", OrderStatus::Shipped),
    ("en reparto", OrderStatus::Shipped),
    ("out for delivery", OrderStatus::Shipped),
];

/// Map a carrier status to an order status.
///
/// Returns `None` for wording not in [`STATUS_KEYWORDS`]; callers leave the
/// order status untouched in that case.
pub fn map_carrier_status(carrier_status: &str) -> Option<OrderStatus> {
    let text = fold_diacritics(carrier_status).to_lowercase();
    STATUS_KEYWORDS
        .iter()
        .find(|(keyword, _)| text.contains(keyword))
        .map(|(_, status)| *status)
}
