//! DANE geocoding for free-text Colombian destinations.
//!
//! Storefront addresses carry whatever the buyer typed: "Bogotá D.C.",
//! "bogota", "Cúcuta" for "San José de Cúcuta". This module loads the DANE
//! municipality table once and fuzzily matches those strings to the codes
//! the carrier aggregator expects.

mod normalize;
mod resolver;
mod table;

pub use normalize::{fold_diacritics, normalize_key};
pub use resolver::{GeoMatch, GeoResolver};
pub use table::{GeoEntry, GeoTable, GeoTableError};
