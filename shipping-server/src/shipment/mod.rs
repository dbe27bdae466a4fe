//! Shipment and label generation.
//!
//! A shipment is created from the rate the buyer picked at checkout. That
//! rate id may have expired in the meantime, so a failed creation triggers
//! exactly one re-quote and one retry with a fresh id. There is no third
//! attempt; a second failure is reported for manual handling.

mod contact;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tracing::{info, warn};

use crate::domain::{Customer, DaneCode, LineItem, RateChoice, RateId, RateQuote};
use crate::envioclick::{CarrierApi, ContactDto, ShipmentRequestDto};
use crate::error::ShippingError;
use crate::quote::{Quoter, content_value, package_weight};

pub use contact::{OriginContact, sanitize_phone, split_name, truncate_chars};

/// Per-process sequence appended to shipment references.
static REFERENCE_SEQ: AtomicU64 = AtomicU64::new(0);

/// Configuration for shipment creation.
#[derive(Debug, Clone)]
pub struct ShipmentConfig {
    /// Sender block printed on every label.
    pub origin: OriginContact,

    /// Carrier field limit for the destination address.
    pub max_address_len: usize,

    /// Prefix of the per-attempt shipment reference.
    pub reference_prefix: String,

    /// Whether to buy carrier insurance for the declared value.
    pub insurance: bool,

    /// Whether the carrier should schedule a pickup.
    pub request_pickup: bool,
}

impl Default for ShipmentConfig {
    fn default() -> Self {
        Self {
            origin: OriginContact::default(),
            max_address_len: 50,
            reference_prefix: "ORD".to_string(),
            insurance: true,
            request_pickup: false,
        }
    }
}

/// Input for shipment creation.
#[derive(Debug, Clone)]
pub struct ShipmentRequest {
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub order_total: f64,
    /// Rate chosen at checkout, if any.
    pub rate: Option<RateChoice>,
}

/// A generated shipment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedShipment {
    pub tracking_number: String,
    pub label_url: String,
    pub carrier: String,
}

/// Generate a unique shipment reference: `<prefix>-<unix millis>-<seq>`.
pub fn shipment_reference(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = REFERENCE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{millis}-{seq}")
}

/// Pick the replacement rate after a re-quote.
///
/// Prefers the cheapest quote from the originally chosen carrier
/// (case-insensitive); otherwise the first quote offered.
pub fn pick_replacement<'a>(quotes: &'a [RateQuote], carrier: &str) -> Option<&'a RateQuote> {
    let carrier = carrier.trim();
    let same_carrier = quotes
        .iter()
        .filter(|q| !carrier.is_empty() && q.carrier.trim().eq_ignore_ascii_case(carrier))
        .min_by(|a, b| a.flete.total_cmp(&b.flete));

    same_carrier.or_else(|| quotes.first())
}

/// Creates shipments with a single re-quote fallback.
pub struct ShipmentCreator<A> {
    api: Arc<A>,
    quoter: Quoter<A>,
    config: Arc<ShipmentConfig>,
}

impl<A: CarrierApi> ShipmentCreator<A> {
    pub fn new(api: Arc<A>, quoter: Quoter<A>, config: ShipmentConfig) -> Self {
        Self {
            api,
            quoter,
            config: Arc::new(config),
        }
    }

    /// Create a shipment for an order.
    ///
    /// Attempt sequence:
    /// 1. resolve the destination (coverage error otherwise)
    /// 2. submit with the chosen rate id, if there is one
    /// 3. on failure, re-quote once and pick a replacement rate
    /// 4. submit once more; a failure here is terminal
    pub async fn create(
        &self,
        request: &ShipmentRequest,
    ) -> Result<CreatedShipment, ShippingError> {
        let customer = &request.customer;
        let destination = self.quoter.resolve(&customer.city, &customer.department)?;
        let weight = package_weight(&request.items);
        let value = content_value(request.order_total, self.quoter.config().content_value_floor);

        let chosen_carrier = request
            .rate
            .as_ref()
            .map(|r| r.carrier.clone())
            .unwrap_or_default();

        let first_error = match request.rate.as_ref().and_then(|r| r.rate_id.as_ref()) {
            Some(rate_id) => {
                match self
                    .submit(rate_id, &chosen_carrier, customer, destination.city_code, weight, value)
                    .await
                {
                    Ok(shipment) => return Ok(shipment),
                    Err(e) => {
                        warn!(
                            %rate_id,
                            carrier = %chosen_carrier,
                            error = %e,
                            "shipment rejected, re-quoting"
                        );
                        e.to_string()
                    }
                }
            }
            None => "no rate id supplied".to_string(),
        };

        let quotes = match self
            .quoter
            .quote_to(destination.city_code, weight, value)
            .await
        {
            Ok(quotes) => quotes,
            Err(e) => {
                return Err(ShippingError::Shipment {
                    first: first_error,
                    retry: e.to_string(),
                });
            }
        };

        let Some(replacement) = pick_replacement(&quotes, &chosen_carrier) else {
            return Err(ShippingError::Shipment {
                first: first_error,
                retry: "re-quote returned no rates".to_string(),
            });
        };

        info!(
            rate_id = %replacement.rate_id,
            carrier = %replacement.carrier,
            flete = replacement.flete,
            "retrying shipment with fresh rate"
        );

        self.submit(
            &replacement.rate_id,
            &replacement.carrier,
            customer,
            destination.city_code,
            weight,
            value,
        )
        .await
        .map_err(|e| {
            warn!(error = %e, "shipment retry failed");
            ShippingError::Shipment {
                first: first_error,
                retry: e.to_string(),
            }
        })
    }

    async fn submit(
        &self,
        rate_id: &RateId,
        carrier: &str,
        customer: &Customer,
        destination: DaneCode,
        weight: f64,
        value: f64,
    ) -> Result<CreatedShipment, ShippingError> {
        let payload = self.payload(rate_id, customer, destination, weight, value);
        let data = self.api.create_shipment(&payload).await?;

        info!(
            reference = %payload.my_shipment_reference,
            tracking_number = %data.tracker,
            carrier,
            "shipment created"
        );

        Ok(CreatedShipment {
            tracking_number: data.tracker,
            label_url: data.url,
            carrier: carrier.to_string(),
        })
    }

    fn payload(
        &self,
        rate_id: &RateId,
        customer: &Customer,
        destination: DaneCode,
        weight: f64,
        value: f64,
    ) -> ShipmentRequestDto {
        let quote_config = self.quoter.config();
        let package = quote_config.package(weight, value);
        let (first_name, last_name) = split_name(&customer.name);

        ShipmentRequestDto {
            id_rate: rate_id.clone(),
            my_shipment_reference: shipment_reference(&self.config.reference_prefix),
            request_pickup: self.config.request_pickup,
            insurance: self.config.insurance,
            description: quote_config.description.clone(),
            content_value: value,
            packages: vec![package],
            origin: self.config.origin.to_contact(quote_config.origin),
            destination: ContactDto {
                company: String::new(),
                first_name,
                last_name,
                email: customer.email.trim().to_string(),
                phone: sanitize_phone(&customer.phone),
                address: truncate_chars(customer.address.trim(), self.config.max_address_len),
                suburb: customer.neighborhood.trim().to_string(),
                cross_street: String::new(),
                reference: customer.notes.trim().to_string(),
                dane_code: destination,
            },
        }
    }
}
