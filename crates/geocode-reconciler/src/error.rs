//! Error types for the geocode reconciler

use std::fmt;

use reverse_geocoding::GeocodingError;

#[derive(Debug)]
pub enum ReconcilerError {
    Config(String),
    Database(Box<sqlx::Error>),
    Geocoding(GeocodingError),
}

impl fmt::Display for ReconcilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcilerError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ReconcilerError::Database(err) => write!(f, "Database error: {}", err),
            ReconcilerError::Geocoding(err) => write!(f, "Geocoding error: {}", err),
        }
    }
}

impl std::error::Error for ReconcilerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcilerError::Database(err) => Some(err.as_ref()),
            ReconcilerError::Geocoding(err) => Some(err),
            ReconcilerError::Config(_) => None,
        }
    }
}

impl From<sqlx::Error> for ReconcilerError {
    fn from(err: sqlx::Error) -> Self {
        ReconcilerError::Database(Box::new(err))
    }
}

impl From<GeocodingError> for ReconcilerError {
    fn from(err: GeocodingError) -> Self {
        ReconcilerError::Geocoding(err)
    }
}

impl From<tracing_subscriber::filter::ParseError> for ReconcilerError {
    fn from(err: tracing_subscriber::filter::ParseError) -> Self {
        ReconcilerError::Config(err.to_string())
    }
}

impl From<url::ParseError> for ReconcilerError {
    fn from(err: url::ParseError) -> Self {
        ReconcilerError::Config(format!("invalid URL: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, ReconcilerError>;
