//! Rate quoting.
//!
//! Turns a destination and a basket into a list of normalized carrier
//! offers. One aggregator call per quote and no retries here: the shipment
//! flow re-quotes explicitly when it needs fresh rate ids.

mod cache;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{DaneCode, LineItem, RateQuote};
use crate::envioclick::{CarrierApi, DaneLocation, PackageDto, QuotationRequest, RateDto};
use crate::error::ShippingError;
use crate::geo::{GeoMatch, GeoResolver};

pub use cache::{CachedQuoter, QuoteCacheConfig};

/// Default origin: Bogotá, D.C.
const DEFAULT_ORIGIN: &str = "11001000";

/// Weight assumed for items without one, in kilograms.
const DEFAULT_ITEM_WEIGHT_KG: f64 = 1.0;

/// Package geometry in centimetres.
///
/// Products carry no reliable dimensions, so every shipment is declared as
/// one box of this size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackageConfig {
    pub length_cm: f64,
    pub width_cm: f64,
    pub height_cm: f64,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            length_cm: 20.0,
            width_cm: 20.0,
            height_cm: 15.0,
        }
    }
}

/// Configuration shared by quoting and shipment creation.
#[derive(Debug, Clone)]
pub struct QuoteConfig {
    /// DANE code of the clinic's dispatch location.
    pub origin: DaneCode,

    pub package: PackageConfig,

    /// Declared content value used when the order total is not positive (COP).
    pub content_value_floor: f64,

    /// Package description sent to the carrier.
    pub description: String,
}

impl QuoteConfig {
    pub fn new(origin: DaneCode) -> Self {
        Self {
            origin,
            ..Self::default()
        }
    }

    pub fn with_package(mut self, package: PackageConfig) -> Self {
        self.package = package;
        self
    }

    pub fn with_content_value_floor(mut self, floor: f64) -> Self {
        self.content_value_floor = floor;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Build the package block for a weight and declared value.
    pub(crate) fn package(&self, weight: f64, content_value: f64) -> PackageDto {
        PackageDto {
            weight,
            length: self.package.length_cm,
            height: self.package.height_cm,
            width: self.package.width_cm,
            description: self.description.clone(),
            content_value,
        }
    }
}

impl Default for QuoteConfig {
    fn default() -> Self {
        Self {
            // SAFETY: constant is a valid 8-digit code
            origin: DaneCode::parse(DEFAULT_ORIGIN).unwrap(),
            package: PackageConfig::default(),
            content_value_floor: 10_000.0,
            description: "Productos de cuidado de la piel".to_string(),
        }
    }
}

/// Input for one quotation.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteRequest {
    pub city: String,
    pub department: String,
    pub items: Vec<LineItem>,
    /// Order total in COP.
    pub order_total: f64,
}

impl QuoteRequest {
    pub fn new(
        city: impl Into<String>,
        department: impl Into<String>,
        items: Vec<LineItem>,
        order_total: f64,
    ) -> Self {
        Self {
            city: city.into(),
            department: department.into(),
            items,
            order_total,
        }
    }
}

/// Total package weight: each item's weight (or 1 kg) times its quantity.
pub fn package_weight(items: &[LineItem]) -> f64 {
    items
        .iter()
        .map(|item| {
            let weight = item
                .weight
                .filter(|w| w.is_finite() && *w > 0.0)
                .unwrap_or(DEFAULT_ITEM_WEIGHT_KG);
            weight * f64::from(item.quantity)
        })
        .sum()
}

/// Declared value: the order total, or the floor when the total is not positive.
pub fn content_value(order_total: f64, floor: f64) -> f64 {
    if order_total.is_finite() && order_total > 0.0 {
        order_total
    } else {
        floor
    }
}

/// Rate quoting client.
pub struct Quoter<A> {
    api: Arc<A>,
    geo: GeoResolver,
    config: Arc<QuoteConfig>,
}

impl<A> Clone for Quoter<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            geo: self.geo.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<A: CarrierApi> Quoter<A> {
    pub fn new(api: Arc<A>, geo: GeoResolver, config: QuoteConfig) -> Self {
        Self {
            api,
            geo,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &QuoteConfig {
        &self.config
    }

    /// Resolve a destination or fail with a coverage error.
    pub fn resolve(&self, city: &str, department: &str) -> Result<GeoMatch, ShippingError> {
        self.geo
            .resolve(city, department)
            .ok_or_else(|| ShippingError::Coverage {
                city: city.to_string(),
                department: department.to_string(),
            })
    }

    /// Quote a basket to a free-text destination.
    ///
    /// An unresolvable destination fails before any network call.
    pub async fn quote(&self, request: &QuoteRequest) -> Result<Vec<RateQuote>, ShippingError> {
        let destination = self.resolve(&request.city, &request.department)?;
        let weight = package_weight(&request.items);
        let value = content_value(request.order_total, self.config.content_value_floor);
        self.quote_to(destination.city_code, weight, value).await
    }

    /// Quote a package to an already resolved destination.
    pub async fn quote_to(
        &self,
        destination: DaneCode,
        weight: f64,
        content_value: f64,
    ) -> Result<Vec<RateQuote>, ShippingError> {
        let request = QuotationRequest {
            package: self.config.package(weight, content_value),
            origin: DaneLocation {
                dane_code: self.config.origin,
            },
            destination: DaneLocation {
                dane_code: destination,
            },
        };

        let rates = self.api.quotation(&request).await.map_err(|e| {
            warn!(%destination, error = %e, "quotation request failed");
            ShippingError::Quote(e.to_string())
        })?;

        if rates.is_empty() {
            info!(%destination, weight, "no rates offered");
            return Err(ShippingError::Quote(format!(
                "no carrier offers a rate to {destination}"
            )));
        }

        debug!(%destination, weight, rates = rates.len(), "quotation ok");
        Ok(rates.into_iter().map(normalize_rate).collect())
    }
}

fn normalize_rate(rate: RateDto) -> RateQuote {
    RateQuote {
        carrier: rate.carrier.trim().to_string(),
        product: rate.product.trim().to_string(),
        flete: rate.flete,
        delivery_days: rate.delivery_days,
        rate_id: rate.id_rate,
        product_id: rate.id_product,
    }
}
