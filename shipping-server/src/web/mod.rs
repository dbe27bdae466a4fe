//! HTTP surface for the storefront.
//!
//! Thin JSON endpoints over quoting, shipment creation, tracking and the
//! sync job. Every response carries a `success` flag.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
