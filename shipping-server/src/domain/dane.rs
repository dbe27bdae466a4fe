//! DANE municipality codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when parsing an invalid DANE code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid DANE code: {reason}")]
pub struct InvalidDaneCode {
    reason: &'static str,
}

/// An 8-digit municipality code as EnvioClick expects it.
///
/// DANE publishes 5-digit municipality codes (2 digits of department, 3 of
/// municipality). The aggregator wants them suffixed with `000`, so a valid
/// `DaneCode` is always exactly 8 ASCII digits.
///
/// # Examples
///
/// ```
/// use shipping_server::domain::DaneCode;
///
/// let medellin = DaneCode::from_municipality("5001").unwrap();
/// assert_eq!(medellin.as_str(), "05001000");
///
/// assert!(DaneCode::parse("05001").is_err());
/// assert!(DaneCode::parse("0500100A").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DaneCode([u8; 8]);

impl DaneCode {
    /// Parse an already padded 8-digit code.
    pub fn parse(s: &str) -> Result<Self, InvalidDaneCode> {
        let bytes = s.as_bytes();

        if bytes.len() != 8 {
            return Err(InvalidDaneCode {
                reason: "must be exactly 8 digits",
            });
        }

        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(InvalidDaneCode {
                reason: "must be ASCII digits 0-9",
            });
        }

        let mut code = [0u8; 8];
        code.copy_from_slice(bytes);
        Ok(DaneCode(code))
    }

    /// Build a code from a raw municipality code as published in the
    /// reference table (leading zeros may be missing, e.g. `5001`).
    pub fn from_municipality(raw: &str) -> Result<Self, InvalidDaneCode> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > 5 {
            return Err(InvalidDaneCode {
                reason: "municipality code must be 1 to 5 digits",
            });
        }
        Self::parse(&format!("{raw:0>5}000"))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // SAFETY: only ASCII digits are ever stored
        std::str::from_utf8(&self.0).unwrap()
    }

    /// The 2-digit department prefix.
    pub fn department(&self) -> &str {
        &self.as_str()[..2]
    }
}

impl fmt::Debug for DaneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DaneCode({})", self.as_str())
    }
}

impl fmt::Display for DaneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for DaneCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DaneCode {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        DaneCode::parse(&s).map_err(serde::de::Error::custom)
    }
}
