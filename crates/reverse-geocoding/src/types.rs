use serde::{Deserialize, Serialize};

use crate::error::GeocodingError;

/// Street, city and postal code derived from one geocoding result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
}

impl NormalizedAddress {
    pub fn is_empty(&self) -> bool {
        self.street.is_none() && self.city.is_none() && self.postal_code.is_none()
    }
}

/// Result of one reverse geocoding attempt
#[derive(Debug)]
pub enum GeocodeOutcome {
    /// The provider's highest-ranked result, normalized
    Found(NormalizedAddress),
    /// No address exists for these coordinates (`ZERO_RESULTS`, or the
    /// unknown-location sentinel)
    ConfirmedEmpty,
    /// The provider could not answer; the record should be retried later
    Unavailable(GeocodingError),
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    pub(crate) status: String,
    #[serde(default)]
    pub(crate) results: Vec<GeocodeResult>,
    pub(crate) error_message: Option<String>,
}

/// One entry in the provider's ranked result list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    pub formatted_address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub(crate) fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }
}
