//! EnvioClick request and response DTOs.
//!
//! These map directly to the JSON the API exchanges. Numeric fields are
//! accepted as numbers or numeric strings since the API is not consistent
//! about which it sends.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{DaneCode, RateId};

/// Response envelope shared by every endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct Envelope<T> {
    /// `"OK"` on success.
    pub status: String,

    /// Human-readable errors; shape varies by endpoint.
    #[serde(default, alias = "statusMessages")]
    pub status_messages: Option<serde_json::Value>,

    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("OK")
    }

    /// Flatten `status_messages` into one line for error reporting.
    pub fn message(&self) -> String {
        match &self.status_messages {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Array(items)) if !items.is_empty() => items
                .iter()
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("; "),
            Some(serde_json::Value::Null) | None => format!("status {}", self.status),
            Some(other) => other.to_string(),
        }
    }
}

/// A location identified only by DANE code.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaneLocation {
    pub dane_code: DaneCode,
}

/// Package geometry and declared value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDto {
    /// Kilograms.
    pub weight: f64,
    /// Centimetres.
    pub length: f64,
    pub height: f64,
    pub width: f64,
    pub description: String,
    pub content_value: f64,
}

/// Body of `POST /api/v1/quotation`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationRequest {
    pub package: PackageDto,
    pub origin: DaneLocation,
    pub destination: DaneLocation,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct QuotationData {
    #[serde(default)]
    pub rates: Vec<RateDto>,
}

/// One rate offer as returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateDto {
    pub id_rate: RateId,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id_product: Option<String>,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub carrier: String,
    #[serde(default, deserialize_with = "number_or_string")]
    pub flete: f64,
    #[serde(default, deserialize_with = "opt_days")]
    pub delivery_days: Option<u32>,
}

/// Sender or recipient contact block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDto {
    pub company: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub suburb: String,
    pub cross_street: String,
    pub reference: String,
    pub dane_code: DaneCode,
}

/// Body of `POST /api/v2/shipment/request`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRequestDto {
    pub id_rate: RateId,
    pub my_shipment_reference: String,
    pub request_pickup: bool,
    pub insurance: bool,
    pub description: String,
    pub content_value: f64,
    pub packages: Vec<PackageDto>,
    pub origin: ContactDto,
    pub destination: ContactDto,
}

/// Successful shipment generation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShipmentData {
    #[serde(alias = "trackingNumber", deserialize_with = "string_or_number")]
    pub tracker: String,
    /// Label PDF URL.
    #[serde(alias = "label", alias = "labelUrl")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TrackRequest<'a> {
    pub tracking_code: &'a str,
}

/// Tracking status as the carrier reports it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackData {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub status_detail: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Num(f64),
    Str(String),
}

fn number_or_string<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    match Loose::deserialize(d)? {
        Loose::Num(n) => Ok(n),
        Loose::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Loose::deserialize(d)? {
        Loose::Num(n) if n.fract() == 0.0 => format!("{n:.0}"),
        Loose::Num(n) => n.to_string(),
        Loose::Str(s) => s,
    })
}

fn opt_string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Option::<Loose>::deserialize(d).map(|v| {
        v.map(|loose| match loose {
            Loose::Num(n) if n.fract() == 0.0 => format!("{n:.0}"),
            Loose::Num(n) => n.to_string(),
            Loose::Str(s) => s,
        })
    })
}

/// Delivery days come as `2`, `"2"` or occasionally `"2-3"`; the lower
/// bound is kept.
fn opt_days<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
    Ok(match Option::<Loose>::deserialize(d)? {
        Some(Loose::Num(n)) if n >= 0.0 => Some(n as u32),
        Some(Loose::Str(s)) => s
            .split(|c: char| !c.is_ascii_digit())
            .find(|part| !part.is_empty())
            .and_then(|part| part.parse().ok()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_quotation_envelope() {
        let json = r#"{
            "status": "OK",
            "status_messages": [],
            "data": {
                "rates": [
                    {"idRate": 1234, "idProduct": 3, "product": "Mensajería", "carrier": "COORDINADORA", "flete": 11200, "deliveryDays": 2},
                    {"idRate": "5678", "idProduct": "9", "product": "Estándar", "carrier": "SERVIENTREGA", "flete": "9800.5", "deliveryDays": "3-4"}
                ]
            }
        }"#;
        let env: Envelope<QuotationData> = serde_json::from_str(json).unwrap();
        assert!(env.is_ok());
        let rates = env.data.unwrap().rates;
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].id_rate, RateId::new("1234"));
        assert_eq!(rates[0].id_product.as_deref(), Some("3"));
        assert_eq!(rates[0].delivery_days, Some(2));
        assert_eq!(rates[1].flete, 9800.5);
        assert_eq!(rates[1].delivery_days, Some(3));
    }

    #[test]
    fn envelope_error_message() {
        let json = r#"{"status":"ERROR","status_messages":["idRate no válido","expirado"],"data":null}"#;
        let env: Envelope<ShipmentData> = serde_json::from_str(json).unwrap();
        assert!(!env.is_ok());
        assert_eq!(env.message(), "idRate no válido; expirado");

        let json = r#"{"status":"ERROR"}"#;
        let env: Envelope<ShipmentData> = serde_json::from_str(json).unwrap();
        assert_eq!(env.message(), "status ERROR");
    }

    #[test]
    fn shipment_data_aliases() {
        let a: ShipmentData =
            serde_json::from_str(r#"{"tracker":"CO123","url":"https://x/label.pdf"}"#).unwrap();
        let b: ShipmentData =
            serde_json::from_str(r#"{"trackingNumber":123,"label":"https://x/label.pdf"}"#)
                .unwrap();
        assert_eq!(a.tracker, "CO123");
        assert_eq!(b.tracker, "123");
        assert_eq!(a.url, b.url);
    }

    #[test]
    fn serialize_shipment_request_in_camel_case() {
        let dane = DaneCode::parse("11001000").unwrap();
        let contact = ContactDto {
            company: "Clínica".into(),
            first_name: "Ana".into(),
            last_name: "Pérez".into(),
            email: "ana@example.com".into(),
            phone: "3001234567".into(),
            address: "Calle 1 # 2-3".into(),
            suburb: "Chapinero".into(),
            cross_street: String::new(),
            reference: String::new(),
            dane_code: dane,
        };
        let package = PackageDto {
            weight: 2.0,
            length: 20.0,
            height: 15.0,
            width: 20.0,
            description: "Productos".into(),
            content_value: 100_000.0,
        };
        let req = ShipmentRequestDto {
            id_rate: RateId::new("77"),
            my_shipment_reference: "REF-1".into(),
            request_pickup: false,
            insurance: true,
            description: "Productos".into(),
            content_value: 100_000.0,
            packages: vec![package],
            origin: contact.clone(),
            destination: contact,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["idRate"], 77);
        assert_eq!(json["myShipmentReference"], "REF-1");
        assert_eq!(json["packages"][0]["contentValue"], 100_000.0);
        assert_eq!(json["destination"]["daneCode"], "11001000");
        assert_eq!(json["origin"]["firstName"], "Ana");
    }

    #[test]
    fn track_data_optional_detail() {
        let t: TrackData = serde_json::from_str(r#"{"status":"ENTREGADO"}"#).unwrap();
        assert_eq!(t.status, "ENTREGADO");
        assert_eq!(t.status_detail, None);
    }
}
