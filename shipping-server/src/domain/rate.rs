//! Carrier rate offers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Aggregator-issued rate identifier.
///
/// Identifiers are opaque and expire after a window the aggregator does not
/// publish. They are numeric in practice; numeric ids are sent back as JSON
/// numbers, anything else as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RateId(String);

impl RateId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for RateId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.parse::<u64>() {
            Ok(n) => serializer.serialize_u64(n),
            Err(_) => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for RateId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(u64),
            Str(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(RateId(n.to_string())),
            Raw::Str(s) if !s.trim().is_empty() => Ok(RateId(s.trim().to_string())),
            Raw::Str(_) => Err(serde::de::Error::custom("empty rate id")),
        }
    }
}

/// One normalized carrier offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateQuote {
    pub carrier: String,
    /// Service or product name, e.g. "Mensajería".
    pub product: String,
    /// Base freight cost in COP.
    pub flete: f64,
    pub delivery_days: Option<u32>,
    pub rate_id: RateId,
    pub product_id: Option<String>,
}

/// The rate option the buyer picked at checkout.
///
/// The id may be missing or stale by the time the shipment is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateChoice {
    #[serde(default)]
    pub rate_id: Option<RateId>,
    #[serde(default)]
    pub carrier: String,
}

impl From<&RateQuote> for RateChoice {
    fn from(quote: &RateQuote) -> Self {
        Self {
            rate_id: Some(quote.rate_id.clone()),
            carrier: quote.carrier.clone(),
        }
    }
}
