//! Contact block helpers for carrier payloads.

use crate::domain::DaneCode;
use crate::envioclick::ContactDto;

/// Number of digits in a Colombian phone number without country code.
const PHONE_DIGITS: usize = 10;

/// Fixed sender block for labels.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginContact {
    pub company: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub suburb: String,
    pub cross_street: String,
    pub reference: String,
}

impl OriginContact {
    pub(crate) fn to_contact(&self, dane_code: DaneCode) -> ContactDto {
        ContactDto {
            company: self.company.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: sanitize_phone(&self.phone),
            address: self.address.clone(),
            suburb: self.suburb.clone(),
            cross_street: self.cross_street.clone(),
            reference: self.reference.clone(),
            dane_code,
        }
    }
}

impl Default for OriginContact {
    fn default() -> Self {
        Self {
            company: "Clínica".to_string(),
            first_name: "Despachos".to_string(),
            last_name: "Clínica".to_string(),
            email: "despachos@example.com".to_string(),
            phone: "6010000000".to_string(),
            address: "Calle 100 # 10-10".to_string(),
            suburb: "Chicó".to_string(),
            cross_street: String::new(),
            reference: String::new(),
        }
    }
}

/// Keep only digits and, if longer, the last 10 of them.
///
/// Drops country codes and formatting: `"+57 (300) 123-4567"` becomes
/// `"3001234567"`.
pub fn sanitize_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(char::is_ascii_digit).collect();
    let start = digits.len().saturating_sub(PHONE_DIGITS);
    digits[start..].iter().collect()
}

/// Truncate to at most `max` characters, never splitting a character.
pub fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Split a full name into first name and the rest.
pub fn split_name(full: &str) -> (String, String) {
    let full = full.trim();
    match full.split_once(char::is_whitespace) {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (full.to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_keeps_last_ten_digits() {
        assert_eq!(sanitize_phone("+57 300 123 4567"), "3001234567");
        assert_eq!(sanitize_phone("300-123-4567"), "3001234567");
        assert_eq!(sanitize_phone("123"), "123");
        assert_eq!(sanitize_phone("no digits"), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("Cañaveral", 3), "Cañ");
        assert_eq!(truncate_chars("corto", 50), "corto");
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn name_split() {
        assert_eq!(split_name("Ana"), ("Ana".into(), String::new()));
        assert_eq!(
            split_name("  Juan  Carlos Pérez "),
            ("Juan".into(), "Carlos Pérez".into())
        );
        assert_eq!(split_name(""), (String::new(), String::new()));
    }

    #[test]
    fn origin_contact_phone_sanitized() {
        let origin = OriginContact {
            phone: "+57 601 000 0000".into(),
            ..OriginContact::default()
        };
        let contact = origin.to_contact(DaneCode::parse("11001000").unwrap());
        assert_eq!(contact.phone, "6010000000");
        assert_eq!(contact.dane_code.as_str(), "11001000");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Sanitized phones are digits only and at most 10 long
        #[test]
        fn phone_shape(s in "\\PC{0,30}") {
            let phone = sanitize_phone(&s);
            prop_assert!(phone.len() <= PHONE_DIGITS);
            prop_assert!(phone.chars().all(|c| c.is_ascii_digit()));
        }

        /// Truncation never exceeds the limit and keeps a prefix
        #[test]
        fn truncate_prefix(s in "\\PC{0,80}", max in 0usize..60) {
            let t = truncate_chars(&s, max);
            prop_assert!(t.chars().count() <= max);
            prop_assert!(s.starts_with(&t));
        }
    }
}
