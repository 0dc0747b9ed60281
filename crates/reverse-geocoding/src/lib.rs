//! Reverse Geocoding Client
//!
//! Turns coordinates into a street / city / postal code triple using the
//! Google Geocoding API. Every attempt resolves to a [`GeocodeOutcome`]:
//! found, confirmed empty, or unavailable. Errors never escape the client.

mod client;
mod error;
mod extract;
mod transport;
mod types;

pub use client::{
    is_unknown_location, ClientSettings, ReverseGeocodeClient, ReverseGeocoder, DEFAULT_BASE_URL,
    DEFAULT_TIMEOUT,
};
pub use error::{GeocodingError, Result};
pub use extract::extract_address;
pub use transport::{HttpTransport, Transport};
pub use types::{AddressComponent, GeocodeOutcome, GeocodeResult, NormalizedAddress};
