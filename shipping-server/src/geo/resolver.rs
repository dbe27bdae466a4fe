//! Fuzzy city/department resolution.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::domain::DaneCode;

use super::normalize::normalize_key;
use super::table::{GeoEntry, GeoTable};

/// Department key used for the capital district.
const CAPITAL_DEPARTMENT: &str = "BOGOTA";

/// Department buyers commonly give for the capital.
const CAPITAL_ALIAS_DEPARTMENT: &str = "CUNDINAMARCA";

/// Resolved destination codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoMatch {
    pub city_code: DaneCode,
    /// 2-digit department code.
    pub state_code: String,
}

impl GeoMatch {
    fn from_entry(entry: &GeoEntry) -> Self {
        Self {
            city_code: entry.city_code,
            state_code: entry.state_code.clone(),
        }
    }
}

/// Resolves free-text destinations against a reference table.
///
/// Cheap to clone; the table is shared and never mutated.
#[derive(Debug, Clone)]
pub struct GeoResolver {
    table: Arc<GeoTable>,
}

impl GeoResolver {
    pub fn new(table: Arc<GeoTable>) -> Self {
        Self { table }
    }

    /// Resolver over the table compiled into the binary.
    pub fn bundled() -> Self {
        Self::new(GeoTable::bundled())
    }

    pub fn table(&self) -> &GeoTable {
        &self.table
    }

    /// Resolve a city and department to DANE codes.
    ///
    /// Returns `None` when no entry matches, meaning the destination is
    /// outside the serviceable area.
    pub fn resolve(&self, city: &str, department: &str) -> Option<GeoMatch> {
        self.lookup(city, department).map(GeoMatch::from_entry)
    }

    /// Like [`resolve`](Self::resolve) but returns the full table row.
    ///
    /// A department whose key equals the input is searched first. Only if
    /// that finds nothing are departments matched by substring in either
    /// direction, since sources disagree on how much of the official name
    /// they carry. Within each set an exact city match wins over a substring
    /// one, and ties go to the first row in table order.
    pub fn lookup(&self, city: &str, department: &str) -> Option<&GeoEntry> {
        let city_key = normalize_key(city);
        let mut department_key = normalize_key(department);

        if city_key.is_empty() || department_key.is_empty() {
            debug!(city, department, "empty destination after normalization");
            return None;
        }

        // DANE lists the capital district apart from Cundinamarca.
        if department_key == CAPITAL_ALIAS_DEPARTMENT && city_key.contains(CAPITAL_DEPARTMENT) {
            department_key = CAPITAL_DEPARTMENT.to_string();
        }

        let entries = self.table.entries();
        let exact: Vec<&GeoEntry> = entries
            .iter()
            .filter(|e| e.department_key == department_key)
            .collect();

        let found = find_city(&exact, &city_key).or_else(|| {
            let partial: Vec<&GeoEntry> = entries
                .iter()
                .filter(|e| {
                    e.department_key != department_key
                        && (e.department_key.contains(&department_key)
                            || department_key.contains(&e.department_key))
                })
                .collect();
            find_city(&partial, &city_key)
        });

        if found.is_none() {
            debug!(
                city,
                department,
                same_department = exact.len(),
                "destination not in reference table"
            );
        }

        found
    }
}

/// Exact city key first, then substring either way.
fn find_city<'a>(candidates: &[&'a GeoEntry], city_key: &str) -> Option<&'a GeoEntry> {
    candidates
        .iter()
        .find(|e| e.city_key == city_key)
        .or_else(|| {
            candidates
                .iter()
                .find(|e| e.city_key.contains(city_key) || city_key.contains(&e.city_key))
        })
        .copied()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Randomly re-case a string and optionally strip its accents.
    fn variant(s: &str, mask: &[bool], strip: bool) -> String {
        let base = if strip {
            super::super::normalize::fold_diacritics(s)
        } else {
            s.to_string()
        };
        base.chars()
            .zip(mask.iter().cycle())
            .map(|(c, upper)| {
                if *upper {
                    c.to_uppercase().collect::<String>()
                } else {
                    c.to_lowercase().collect::<String>()
                }
            })
            .collect()
    }

    proptest! {
        /// Any case/diacritic variant of a table row resolves like the row itself
        #[test]
        fn variants_resolve_like_canonical(
            idx in 0usize..2000,
            mask in proptest::collection::vec(any::<bool>(), 1..8),
            strip in any::<bool>(),
        ) {
            let resolver = GeoResolver::bundled();
            let entries = resolver.table().entries();
            let entry = &entries[idx % entries.len()];

            let canonical = resolver.resolve(&entry.city, &entry.department);
            let varied = resolver.resolve(
                &variant(&entry.city, &mask, strip),
                &variant(&entry.department, &mask, strip),
            );
            prop_assert_eq!(canonical, varied);
        }
    }
}
