//! Process configuration read from the environment.
//!
//! Every setting has a default except the EnvioClick API key. Values that
//! are present but unparsable are an error rather than silently defaulted.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::{DaneCode, InvalidDaneCode};
use crate::envioclick::EnvioclickConfig;
use crate::quote::{PackageConfig, QuoteCacheConfig, QuoteConfig};
use crate::shipment::ShipmentConfig;
use crate::tracking::SyncConfig;

const DEFAULT_ORDERS_PATH: &str = "data/orders.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}: cannot parse {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{key}: invalid DANE code: {source}")]
    Dane {
        key: &'static str,
        #[source]
        source: InvalidDaneCode,
    },

    #[error("{key} must be greater than zero")]
    Zero { key: &'static str },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct ShippingConfig {
    pub envioclick: EnvioclickConfig,
    pub quote: QuoteConfig,
    pub quote_cache: QuoteCacheConfig,
    pub shipment: ShipmentConfig,
    pub sync: SyncConfig,

    /// Operator-supplied DANE table; the bundled one is used when unset.
    pub geo_table_path: Option<PathBuf>,

    /// JSON document holding the orders.
    pub orders_path: PathBuf,

    pub bind_addr: SocketAddr,
}

impl ShippingConfig {
    /// Defaults around the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            envioclick: EnvioclickConfig::new(api_key),
            quote: QuoteConfig::default(),
            quote_cache: QuoteCacheConfig::default(),
            shipment: ShipmentConfig::default(),
            sync: SyncConfig::default(),
            geo_table_path: None,
            orders_path: PathBuf::from(DEFAULT_ORDERS_PATH),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
        }
    }

    pub fn with_orders_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.orders_path = path.into();
        self
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let vars = Vars(&lookup);

        let api_key = vars.string("ENVIOCLICK_API_KEY").unwrap_or_else(|| {
            tracing::warn!("ENVIOCLICK_API_KEY not set; carrier calls will be rejected");
            String::new()
        });
        let mut config = Self::new(api_key);

        if let Some(url) = vars.string("ENVIOCLICK_BASE_URL") {
            config.envioclick = config.envioclick.with_base_url(url.trim_end_matches('/'));
        }
        if let Some(secs) = vars.positive::<u64>("SHIPPING_TIMEOUT_SECS")? {
            config.envioclick = config.envioclick.with_timeout(secs);
        }

        if let Some(raw) = vars.string("SHIPPING_ORIGIN_DANE") {
            let origin = DaneCode::parse(&raw)
                .or_else(|_| DaneCode::from_municipality(&raw))
                .map_err(|source| ConfigError::Dane {
                    key: "SHIPPING_ORIGIN_DANE",
                    source,
                })?;
            config.quote.origin = origin;
        }

        let defaults = PackageConfig::default();
        config.quote.package = PackageConfig {
            length_cm: vars
                .positive("SHIPPING_PACKAGE_LENGTH_CM")?
                .unwrap_or(defaults.length_cm),
            width_cm: vars
                .positive("SHIPPING_PACKAGE_WIDTH_CM")?
                .unwrap_or(defaults.width_cm),
            height_cm: vars
                .positive("SHIPPING_PACKAGE_HEIGHT_CM")?
                .unwrap_or(defaults.height_cm),
        };
        if let Some(floor) = vars.positive("SHIPPING_CONTENT_VALUE_FLOOR")? {
            config.quote.content_value_floor = floor;
        }
        if let Some(description) = vars.string("SHIPPING_PACKAGE_DESCRIPTION") {
            config.quote.description = description;
        }

        let origin = &mut config.shipment.origin;
        for (key, field) in [
            ("SHIPPING_ORIGIN_COMPANY", &mut origin.company),
            ("SHIPPING_ORIGIN_FIRST_NAME", &mut origin.first_name),
            ("SHIPPING_ORIGIN_LAST_NAME", &mut origin.last_name),
            ("SHIPPING_ORIGIN_EMAIL", &mut origin.email),
            ("SHIPPING_ORIGIN_PHONE", &mut origin.phone),
            ("SHIPPING_ORIGIN_ADDRESS", &mut origin.address),
            ("SHIPPING_ORIGIN_SUBURB", &mut origin.suburb),
        ] {
            if let Some(value) = vars.string(key) {
                *field = value;
            }
        }
        if let Some(len) = vars.positive("SHIPPING_MAX_ADDRESS_LEN")? {
            config.shipment.max_address_len = len;
        }

        if let Some(secs) = vars.positive("QUOTE_CACHE_TTL_SECS")? {
            config.quote_cache.ttl = Duration::from_secs(secs);
        }

        if let Some(secs) = vars.positive("TRACKING_SYNC_INTERVAL_SECS")? {
            config.sync.interval = Duration::from_secs(secs);
        }
        if let Some(n) = vars.positive("TRACKING_SYNC_CONCURRENCY")? {
            config.sync.concurrency = n;
        }

        config.geo_table_path = vars.string("GEO_TABLE_PATH").map(PathBuf::from);
        if let Some(path) = vars.string("ORDERS_PATH") {
            config.orders_path = PathBuf::from(path);
        }
        if let Some(addr) = vars.parse("BIND_ADDR")? {
            config.bind_addr = addr;
        }

        Ok(config)
    }
}

/// Typed access to a key lookup. Blank values count as unset.
struct Vars<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Vars<'_, F> {
    fn string(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let Some(value) = self.string(key) else {
            return Ok(None);
        };
        match value.parse() {
            Ok(v) => Ok(Some(v)),
            Err(e) => Err(ConfigError::Invalid {
                key,
                reason: e.to_string(),
                value,
            }),
        }
    }

    fn positive<T>(&self, key: &'static str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr + PartialOrd + Default,
        T::Err: std::fmt::Display,
    {
        match self.parse::<T>(key)? {
            Some(v) if v <= T::default() => Err(ConfigError::Zero { key }),
            other => Ok(other),
        }
    }
}
