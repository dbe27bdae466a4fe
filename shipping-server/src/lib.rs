//! Shipping integration server for the clinic storefront.
//!
//! Answers three questions for the surrounding shop: "what does it cost to
//! ship this order?", "ship it", and "where is it now?". Destinations are
//! resolved to DANE codes, rates and labels come from the EnvioClick
//! aggregator, and a periodic job folds carrier tracking back into orders.

pub mod config;
pub mod domain;
pub mod envioclick;
pub mod error;
pub mod geo;
pub mod quote;
pub mod shipment;
pub mod store;
pub mod tracking;
pub mod web;

pub use error::ShippingError;
