use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::{GeocodingError, Result};
use crate::extract::extract_address;
use crate::transport::{HttpTransport, Transport};
use crate::types::{GeocodeOutcome, GeocodeResponse};

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = "geocode-reconciler/0.1";
const RESULT_TYPES: &str = "street_address|route|locality|administrative_area_level_1|country";

/// `(0, 0)` marks a location the source data explicitly left unknown
pub fn is_unknown_location(latitude: f64, longitude: f64) -> bool {
    latitude == 0.0 && longitude == 0.0
}

/// Anything that can turn coordinates into a [`GeocodeOutcome`]
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn geocode(&self, latitude: f64, longitude: f64) -> GeocodeOutcome;
}

/// Settings for the HTTP-backed client
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl ClientSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Reverse geocoding client for the Google Geocoding API
pub struct ReverseGeocodeClient<T = HttpTransport> {
    transport: T,
    api_key: String,
}

impl ReverseGeocodeClient<HttpTransport> {
    /// Create a client that talks to the provider over HTTP
    pub fn from_settings(settings: &ClientSettings) -> Result<Self> {
        let transport = HttpTransport::new(&settings.base_url, settings.timeout, USER_AGENT)?;
        Ok(Self::with_transport(transport, &settings.api_key))
    }
}

impl<T: Transport> ReverseGeocodeClient<T> {
    pub fn with_transport(transport: T, api_key: &str) -> Self {
        Self {
            transport,
            api_key: api_key.to_string(),
        }
    }

    async fn request(&self, latitude: f64, longitude: f64) -> Result<GeocodeOutcome> {
        let query = [
            ("latlng", format!("{latitude},{longitude}")),
            ("key", self.api_key.clone()),
            ("result_type", RESULT_TYPES.to_string()),
        ];

        let body = self.transport.get(&query).await?;
        let GeocodeResponse {
            status,
            results,
            error_message,
        } = serde_json::from_str(&body)?;

        // Only the highest-ranked result is consumed
        match status.as_str() {
            "OK" => match results.into_iter().next() {
                Some(first) => Ok(GeocodeOutcome::Found(extract_address(&first))),
                None => Err(GeocodingError::Status {
                    status: status.clone(),
                    message: Some("no results in an OK response".to_string()),
                }),
            },
            "ZERO_RESULTS" => Ok(GeocodeOutcome::ConfirmedEmpty),
            _ => Err(GeocodingError::Status {
                status: status.clone(),
                message: error_message,
            }),
        }
    }
}

#[async_trait]
impl<T: Transport> ReverseGeocoder for ReverseGeocodeClient<T> {
    async fn geocode(&self, latitude: f64, longitude: f64) -> GeocodeOutcome {
        if is_unknown_location(latitude, longitude) {
            debug!("Coordinates are 0,0; not geocoding");
            return GeocodeOutcome::ConfirmedEmpty;
        }

        match self.request(latitude, longitude).await {
            Ok(outcome) => {
                debug!(
                    lat = latitude,
                    lon = longitude,
                    found = matches!(outcome, GeocodeOutcome::Found(_)),
                    "Geocoded coordinates"
                );
                outcome
            }
            Err(e) => {
                warn!(lat = latitude, lon = longitude, error = %e, "Geocoding unavailable");
                GeocodeOutcome::Unavailable(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// Replays one canned response and records every request
    struct ScriptedTransport {
        response: Mutex<Option<Result<String>>>,
        calls: AtomicUsize,
        last_query: Mutex<Vec<(&'static str, String)>>,
    }

    impl ScriptedTransport {
        fn replying(body: &str) -> Self {
            Self::with_result(Ok(body.to_string()))
        }

        fn with_result(result: Result<String>) -> Self {
            Self {
                response: Mutex::new(Some(result)),
                calls: AtomicUsize::new(0),
                last_query: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, query: &[(&'static str, String)]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_query.lock().unwrap() = query.to_vec();
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("transport called more than once")
        }
    }

    const RIVOLI: &str = r#"{
        "status": "OK",
        "results": [
            {
                "formatted_address": "10 Rue de Rivoli, 75001 Paris, France",
                "address_components": [
                    {"long_name": "10", "short_name": "10", "types": ["street_number"]},
                    {"long_name": "Rue de Rivoli", "short_name": "Rue de Rivoli", "types": ["route"]},
                    {"long_name": "Paris", "short_name": "Paris", "types": ["locality", "political"]},
                    {"long_name": "75001", "short_name": "75001", "types": ["postal_code"]}
                ]
            },
            {
                "formatted_address": "Paris, France",
                "address_components": [
                    {"long_name": "Lyon", "short_name": "Lyon", "types": ["locality", "political"]}
                ]
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_sentinel_makes_no_call() {
        let client = ReverseGeocodeClient::with_transport(ScriptedTransport::replying(RIVOLI), "k");
        let outcome = client.geocode(0.0, 0.0).await;
        assert!(matches!(outcome, GeocodeOutcome::ConfirmedEmpty));
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_found_uses_first_result_only() {
        let client = ReverseGeocodeClient::with_transport(ScriptedTransport::replying(RIVOLI), "k");
        match client.geocode(48.85, 2.35).await {
            GeocodeOutcome::Found(address) => {
                assert_eq!(address.street.as_deref(), Some("10 Rue de Rivoli"));
                assert_eq!(address.city.as_deref(), Some("Paris"));
                assert_eq!(address.postal_code.as_deref(), Some("75001"));
            }
            other => panic!("expected Found, got {other:?}"),
        }
        assert_eq!(client.transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_parameters() {
        let client =
            ReverseGeocodeClient::with_transport(ScriptedTransport::replying(RIVOLI), "secret");
        client.geocode(48.85, 2.35).await;

        let query = client.transport.last_query.lock().unwrap().clone();
        assert!(query.contains(&("latlng", "48.85,2.35".to_string())));
        assert!(query.contains(&("key", "secret".to_string())));
        assert!(query.contains(&(
            "result_type",
            "street_address|route|locality|administrative_area_level_1|country".to_string()
        )));
    }

    #[tokio::test]
    async fn test_zero_results_is_confirmed_empty() {
        let client = ReverseGeocodeClient::with_transport(
            ScriptedTransport::replying(r#"{"status": "ZERO_RESULTS", "results": []}"#),
            "k",
        );
        assert!(matches!(
            client.geocode(-45.0, 170.0).await,
            GeocodeOutcome::ConfirmedEmpty
        ));
    }

    #[tokio::test]
    async fn test_other_status_is_unavailable() {
        let client = ReverseGeocodeClient::with_transport(
            ScriptedTransport::replying(
                r#"{"status": "OVER_QUERY_LIMIT", "results": [], "error_message": "slow down"}"#,
            ),
            "k",
        );
        match client.geocode(48.85, 2.35).await {
            GeocodeOutcome::Unavailable(GeocodingError::Status { status, message }) => {
                assert_eq!(status, "OVER_QUERY_LIMIT");
                assert_eq!(message.as_deref(), Some("slow down"));
            }
            other => panic!("expected Unavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ok_without_results_is_unavailable() {
        let client = ReverseGeocodeClient::with_transport(
            ScriptedTransport::replying(r#"{"status": "OK", "results": []}"#),
            "k",
        );
        assert!(matches!(
            client.geocode(48.85, 2.35).await,
            GeocodeOutcome::Unavailable(GeocodingError::Status { .. })
        ));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_unavailable() {
        let client = ReverseGeocodeClient::with_transport(
            ScriptedTransport::replying(r#"{"results": "nope"}"#),
            "k",
        );
        assert!(matches!(
            client.geocode(48.85, 2.35).await,
            GeocodeOutcome::Unavailable(GeocodingError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable() {
        let client = ReverseGeocodeClient::with_transport(
            ScriptedTransport::with_result(Err(GeocodingError::Timeout)),
            "k",
        );
        assert!(matches!(
            client.geocode(48.85, 2.35).await,
            GeocodeOutcome::Unavailable(GeocodingError::Timeout)
        ));
    }

    #[test]
    fn test_unknown_location() {
        assert!(is_unknown_location(0.0, 0.0));
        assert!(is_unknown_location(-0.0, 0.0));
        assert!(!is_unknown_location(0.0, 2.35));
        assert!(!is_unknown_location(48.85, 0.0));
    }
}
