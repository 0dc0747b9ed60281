use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Label used for rows whose `sector` column is NULL
pub const UNKNOWN_SECTOR: &str = "unknown";

/// Raw `project_map` row returned from SELECT queries
#[derive(Debug, Clone, FromRow)]
pub struct ProjectMapRow {
    pub id: i64,
    pub sector: String,
    pub data: Value,
}

/// State of one address key inside the record document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AddressField {
    /// Key absent: never resolved
    #[default]
    Missing,
    /// Key present with JSON null: resolved, no value exists
    Null,
    Value(String),
}

impl AddressField {
    fn from_document(value: Option<&Value>) -> Self {
        match value {
            None => Self::Missing,
            Some(Value::Null) => Self::Null,
            Some(Value::String(s)) => Self::Value(s.clone()),
            Some(other) => Self::Value(other.to_string()),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Value(s) => Some(s),
            _ => None,
        }
    }

    /// Fill this field from a freshly resolved value, keeping any existing string
    pub fn merge(&mut self, resolved: Option<&str>) {
        if !matches!(self, Self::Value(_)) {
            *self = match resolved {
                Some(v) => Self::Value(v.to_string()),
                None => Self::Null,
            };
        }
    }
}

/// The three address keys of a record document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAddress {
    pub street: AddressField,
    pub city: AddressField,
    pub zip: AddressField,
}

impl StoredAddress {
    pub fn has_missing_field(&self) -> bool {
        self.street.is_missing() || self.city.is_missing() || self.zip.is_missing()
    }
}

/// Coordinates as written in the document: numbers or numeric strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCoordinates {
    pub latitude: String,
    pub longitude: String,
}

/// Validated decimal-degree coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl RawCoordinates {
    /// Parse both values; `None` if either is non-numeric or out of range
    pub fn parse(&self) -> Option<Coordinates> {
        let latitude = self.latitude.trim().parse::<f64>().ok()?;
        let longitude = self.longitude.trim().parse::<f64>().ok()?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return None;
        }
        Some(Coordinates {
            latitude,
            longitude,
        })
    }
}

fn coordinate_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// A geographic record awaiting (or past) address enrichment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    pub id: i64,
    pub sector: String,
    /// `None` unless both latitude and longitude are present
    pub coordinates: Option<RawCoordinates>,
    pub address: StoredAddress,
}

impl GeoRecord {
    /// Coordinates fully present and at least one address key missing
    pub fn is_candidate(&self) -> bool {
        self.coordinates.is_some() && self.address.has_missing_field()
    }
}

impl From<ProjectMapRow> for GeoRecord {
    fn from(row: ProjectMapRow) -> Self {
        let data = &row.data;
        let coordinates = data.get("coordinates").and_then(|c| {
            Some(RawCoordinates {
                latitude: coordinate_text(c.get("latitude"))?,
                longitude: coordinate_text(c.get("longitude"))?,
            })
        });

        let address = StoredAddress {
            street: AddressField::from_document(data.get("street")),
            city: AddressField::from_document(data.get("city")),
            zip: AddressField::from_document(data.get("zip")),
        };

        Self {
            id: row.id,
            sector: row.sector,
            coordinates,
            address,
        }
    }
}

/// Scope of a candidate query
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    /// Empty means every sector
    pub sectors: Vec<String>,
    pub limit: Option<i64>,
}

impl CandidateFilter {
    pub fn includes_sector(&self, sector: &str) -> bool {
        self.sectors.is_empty() || self.sectors.iter().any(|s| s == sector)
    }
}
