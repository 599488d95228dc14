use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

/// Which kind of catalog a target name is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetClass {
    #[serde(rename = "solar_system_body")]
    SolarSystemBody,
    #[serde(rename = "stellar_or_dso")]
    StellarOrDso,
}

impl TargetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetClass::SolarSystemBody => "solar_system_body",
            TargetClass::StellarOrDso => "stellar_or_dso",
        }
    }
}

impl std::fmt::Display for TargetClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Right ascension / declination pair, both in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquatorialPosition {
    /// Right ascension, normalized to [0, 360)
    pub ra_deg: f64,
    /// Declination, [-90, 90]
    pub dec_deg: f64,
}

impl EquatorialPosition {
    pub fn new(ra_deg: f64, dec_deg: f64) -> Self {
        Self {
            ra_deg: ra_deg.rem_euclid(360.0),
            dec_deg,
        }
    }
}

/// Geographic position of the observer. Height is always sea level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObserverLocation {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub height_m: f64,
}

impl ObserverLocation {
    /// Validate and build a sea-level observer location.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, String> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("Latitude out of range [-90, 90]: {}", latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("Longitude out of range [-180, 180]: {}", longitude));
        }
        Ok(Self {
            latitude,
            longitude,
            height_m: 0.0,
        })
    }
}

/// Peak altitude of a target over the sampled window
#[derive(Debug, Clone, PartialEq)]
pub struct ObservabilityReport {
    pub max_altitude_deg: f64,
    /// Azimuth at the peak, degrees east of north
    pub transit_azimuth_deg: f64,
    pub transit_time_utc: DateTime<Utc>,
    pub transit_time_local: DateTime<FixedOffset>,
    /// IANA identifier, or "UTC" when none could be resolved
    pub timezone: String,
    pub sample_count: usize,
}

/// Body of a successful `GET /target/{name}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetResponse {
    pub name: String,
    pub ra: String,
    pub ra_deg: f64,
    pub dec: String,
    pub dec_deg: f64,
    pub max_altitude_deg: f64,
    pub transit_time_utc: String,
    pub transit_time_local: String,
    pub timezone: String,
}

/// Machine-readable error category carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    #[serde(rename = "object_not_found")]
    ObjectNotFound,
    #[serde(rename = "no_ephemeris_data")]
    NoEphemerisData,
    #[serde(rename = "catalog_unavailable")]
    CatalogUnavailable,
    #[serde(rename = "collaborator_failure")]
    CollaboratorFailure,
    #[serde(rename = "invalid_request")]
    InvalidRequest,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ObjectNotFound => "object_not_found",
            ErrorKind::NoEphemerisData => "no_ephemeris_data",
            ErrorKind::CatalogUnavailable => "catalog_unavailable",
            ErrorKind::CollaboratorFailure => "collaborator_failure",
            ErrorKind::InvalidRequest => "invalid_request",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// JSON error payload: `{"error": "...", "kind": "..."}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: ErrorKind,
}

impl ErrorBody {
    pub fn new(kind: ErrorKind, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind,
        }
    }
}
