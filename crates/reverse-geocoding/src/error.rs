use std::fmt;

/// Reasons a reverse geocoding attempt could not produce an answer
#[derive(Debug)]
pub enum GeocodingError {
    Http(reqwest::Error),
    Timeout,
    /// The provider answered with a status other than `OK`/`ZERO_RESULTS`
    Status {
        status: String,
        message: Option<String>,
    },
    Decode(String),
}

impl fmt::Display for GeocodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "HTTP error: {e}"),
            Self::Timeout => write!(f, "Request timed out"),
            Self::Status {
                status,
                message: Some(msg),
            } => write!(f, "Provider returned {status}: {msg}"),
            Self::Status {
                status,
                message: None,
            } => write!(f, "Provider returned {status}"),
            Self::Decode(msg) => write!(f, "Malformed response: {msg}"),
        }
    }
}

impl std::error::Error for GeocodingError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GeocodingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

impl From<serde_json::Error> for GeocodingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GeocodingError>;
