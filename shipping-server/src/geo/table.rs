//! DANE municipality reference table.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use crate::domain::{DaneCode, InvalidDaneCode};

use super::normalize::normalize_key;

/// The table shipped with the binary.
const BUNDLED_TABLE: &str = include_str!("../../data/dane_codes.tsv");

/// Expected columns: department code, department name, municipality code,
/// municipality name, region, longitude, latitude.
const COLUMNS: usize = 7;

static BUNDLED: OnceLock<Arc<GeoTable>> = OnceLock::new();

/// Errors loading a reference table.
#[derive(Debug, thiserror::Error)]
pub enum GeoTableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("line {line}: {source}")]
    Code {
        line: usize,
        #[source]
        source: InvalidDaneCode,
    },

    #[error("reference table has no rows")]
    Empty,
}

/// One municipality row.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoEntry {
    /// Department name as published, e.g. "BOGOTÁ, D.C.".
    pub department: String,
    /// Municipality name as published.
    pub city: String,
    /// Municipality code in aggregator form (8 digits).
    pub city_code: DaneCode,
    /// Department code, zero-padded to 2 digits.
    pub state_code: String,
    pub region: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub(crate) department_key: String,
    pub(crate) city_key: String,
}

/// Immutable set of municipalities in file order.
#[derive(Debug, Clone)]
pub struct GeoTable {
    entries: Vec<GeoEntry>,
}

impl GeoTable {
    /// Parse tab-separated rows. Blank lines and `#` comments are skipped.
    pub fn parse(text: &str) -> Result<Self, GeoTableError> {
        let mut entries = Vec::new();

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim_end_matches('\r');
            if trimmed.trim().is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = trimmed.split('\t').map(str::trim).collect();
            if fields.len() < COLUMNS {
                return Err(GeoTableError::Malformed {
                    line,
                    reason: format!("expected {COLUMNS} tab-separated fields, got {}", fields.len()),
                });
            }

            let department_code = fields[0];
            if department_code.is_empty()
                || department_code.len() > 2
                || !department_code.bytes().all(|b| b.is_ascii_digit())
            {
                return Err(GeoTableError::Malformed {
                    line,
                    reason: format!("invalid department code {department_code:?}"),
                });
            }

            let city_code = DaneCode::from_municipality(fields[2])
                .map_err(|source| GeoTableError::Code { line, source })?;

            let department = fields[1].to_string();
            let city = fields[3].to_string();

            entries.push(GeoEntry {
                department_key: normalize_key(&department),
                city_key: normalize_key(&city),
                department,
                city,
                city_code,
                state_code: format!("{department_code:0>2}"),
                region: fields[4].to_string(),
                longitude: parse_coordinate(fields[5]),
                latitude: parse_coordinate(fields[6]),
            });
        }

        if entries.is_empty() {
            return Err(GeoTableError::Empty);
        }

        Ok(Self { entries })
    }

    /// Load a table from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GeoTableError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GeoTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// The table compiled into the binary, parsed on first use.
    pub fn bundled() -> Arc<GeoTable> {
        BUNDLED
            .get_or_init(|| {
                // The bundled file is covered by tests; a parse failure is a build defect.
                Arc::new(GeoTable::parse(BUNDLED_TABLE).expect("bundled DANE table is valid"))
            })
            .clone()
    }

    pub fn entries(&self) -> &[GeoEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Coordinates use either decimal point or decimal comma depending on export.
fn parse_coordinate(s: &str) -> Option<f64> {
    s.replace(',', ".").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bundled_table_parses() {
        let table = GeoTable::bundled();
        assert!(
            table
                .entries()
                .iter()
                .all(|e| e.city_code.department() == e.state_code)
        );
    }

    #[test]
    fn bundled_table_covers_every_municipality() {
        let table = GeoTable::bundled();
        assert_eq!(table.len(), 1121);

        let departments: HashSet<&str> =
            table.entries().iter().map(|e| e.state_code.as_str()).collect();
        assert_eq!(departments.len(), 33);

        let codes: HashSet<&str> = table.entries().iter().map(|e| e.city_code.as_str()).collect();
        assert_eq!(codes.len(), table.len());

        let antioquia = table.entries().iter().filter(|e| e.state_code == "05").count();
        assert_eq!(antioquia, 125);
    }

    #[test]
    fn bundled_is_shared() {
        let a = GeoTable::bundled();
        let b = GeoTable::bundled();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn parse_pads_codes() {
        let table = GeoTable::parse("5\tANTIOQUIA\t5001\tMEDELLÍN\tEje\t-75,58\t6,24\n").unwrap();
        let entry = &table.entries()[0];
        assert_eq!(entry.state_code, "05");
        assert_eq!(entry.city_code.as_str(), "05001000");
        assert_eq!(entry.city_key, "MEDELLIN");
        assert_eq!(entry.longitude, Some(-75.58));
        assert_eq!(entry.latitude, Some(6.24));
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let text = "# header\n\n11\tBOGOTÁ, D.C.\t11001\tBOGOTÁ, D.C.\tCentro\t\t\n";
        let table = GeoTable::parse(text).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.entries()[0].longitude, None);
    }

    #[test]
    fn short_row_is_malformed() {
        let err = GeoTable::parse("5\tANTIOQUIA\t5001\n").unwrap_err();
        assert!(matches!(err, GeoTableError::Malformed { line: 1, .. }));
    }

    #[test]
    fn bad_city_code_reports_line() {
        let text = "# h\n5\tANTIOQUIA\tX1\tMEDELLÍN\tEje\t0\t0\n";
        let err = GeoTable::parse(text).unwrap_err();
        assert!(matches!(err, GeoTableError::Code { line: 2, .. }));
    }

    #[test]
    fn empty_table_rejected() {
        assert!(matches!(GeoTable::parse("# only\n"), Err(GeoTableError::Empty)));
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dane.tsv");
        std::fs::write(&path, "76\tVALLE DEL CAUCA\t76001\tCALI\tPacífico\t0\t0\n").unwrap();
        let table = GeoTable::from_path(&path).unwrap();
        assert_eq!(table.entries()[0].city, "CALI");
    }

    #[test]
    fn from_path_missing_file() {
        let err = GeoTable::from_path("/nonexistent/dane.tsv").unwrap_err();
        assert!(matches!(err, GeoTableError::Io { .. }));
    }
}
