//! Domain types for the shipping integration.
//!
//! Orders and customers are owned by the storefront; this crate reads them
//! and writes back shipment and tracking fields. Codes and rate identifiers
//! are validated newtypes so downstream code can trust them.

mod dane;
mod order;
mod rate;

pub use dane::{DaneCode, InvalidDaneCode};
pub use order::{Customer, LineItem, Order, OrderStatus, ShipmentRecord, TrackingUpdate};
pub use rate::{RateChoice, RateId, RateQuote};
