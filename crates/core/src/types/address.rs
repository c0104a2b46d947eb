//! Shipping address type with checkout validation rules.

use serde::{Deserialize, Serialize};

/// Errors that can occur when validating an [`Address`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// A required field is empty.
    #[error("{0} is required")]
    MissingField(&'static str),
    /// The zip code is not a 5-digit numeric string.
    #[error("zip code must be a 5-digit number")]
    InvalidZipCode,
}

/// A shipping address.
///
/// All fields are required for checkout. Field names follow the commerce
/// API wire format (camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl Address {
    /// Validate the address for use at checkout.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError::MissingField`] for the first empty field,
    /// or [`AddressError::InvalidZipCode`] if the zip code is not a
    /// 5-digit numeric string.
    pub fn validate(&self) -> Result<(), AddressError> {
        let required: [(&'static str, &str); 5] = [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zipCode", &self.zip_code),
            ("country", &self.country),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(AddressError::MissingField(name));
            }
        }

        if self.zip_code.len() != 5 || !self.zip_code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AddressError::InvalidZipCode);
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn valid_address() -> Address {
        Address {
            street: "12 Harbor Lane".to_owned(),
            city: "Portland".to_owned(),
            state: "OR".to_owned(),
            zip_code: "97201".to_owned(),
            country: "US".to_owned(),
        }
    }

    #[test]
    fn test_valid_address() {
        assert!(valid_address().validate().is_ok());
    }

    #[test]
    fn test_missing_street() {
        let mut addr = valid_address();
        addr.street = "  ".to_owned();
        assert_eq!(
            addr.validate().unwrap_err(),
            AddressError::MissingField("street")
        );
    }

    #[test]
    fn test_missing_country() {
        let mut addr = valid_address();
        addr.country = String::new();
        assert_eq!(
            addr.validate().unwrap_err(),
            AddressError::MissingField("country")
        );
    }

    #[test]
    fn test_zip_code_wrong_length() {
        let mut addr = valid_address();
        addr.zip_code = "972".to_owned();
        assert_eq!(addr.validate().unwrap_err(), AddressError::InvalidZipCode);
    }

    #[test]
    fn test_zip_code_non_numeric() {
        let mut addr = valid_address();
        addr.zip_code = "97A01".to_owned();
        assert_eq!(addr.validate().unwrap_err(), AddressError::InvalidZipCode);
    }

    #[test]
    fn test_serde_camel_case_wire_format() {
        let json = serde_json::to_value(valid_address()).unwrap();
        assert_eq!(json["zipCode"], "97201");
        assert!(json.get("zip_code").is_none());
    }
}
