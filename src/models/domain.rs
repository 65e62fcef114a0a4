use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::BloodType;

/// Coordinate pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_finite"))]
pub struct GeoPoint {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether the point can take part in a distance computation
    pub fn is_usable(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Range checks alone let NaN through
fn validate_finite(point: &GeoPoint) -> Result<(), ValidationError> {
    if point.latitude.is_finite() && point.longitude.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::new("non_finite_coordinate"))
    }
}

/// One slot of a donor's weekly availability
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Day name as stored by the platform ("monday", "Mon", ...)
    #[serde(rename = "dayOfWeek")]
    pub day_of_week: String,
    pub available: bool,
}

impl ScheduleEntry {
    pub fn new(day_of_week: impl Into<String>, available: bool) -> Self {
        Self {
            day_of_week: day_of_week.into(),
            available,
        }
    }
}

/// Donor record as supplied by the donor store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorCandidate {
    pub id: String,
    #[serde(rename = "bloodType")]
    pub blood_type: BloodType,
    #[serde(rename = "lastDonationDate", default)]
    pub last_donation_at: Option<DateTime<Utc>>,
    #[serde(rename = "availabilitySchedule", default)]
    pub availability_schedule: Vec<ScheduleEntry>,
    #[serde(rename = "preferredLocations", default)]
    pub preferred_locations: Vec<GeoPoint>,
    #[serde(rename = "isEligible", default)]
    pub eligible: bool,
    /// Contact details, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<serde_json::Value>,
}

/// Scored donor for a single request
///
/// All sub-scores are in [0, 1]. `distance_km` is infinite when the donor
/// has no usable coordinates; it serialises as `null` in that case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorMatch {
    pub donor: DonorCandidate,
    #[serde(rename = "compatibilityScore")]
    pub compatibility_score: f64,
    #[serde(rename = "distanceKm", with = "finite_or_null")]
    pub distance_km: f64,
    #[serde(rename = "availabilityScore")]
    pub availability_score: f64,
    #[serde(rename = "overallScore")]
    pub overall_score: f64,
}

/// JSON has no representation for infinity, so unreachable distances travel as null
mod finite_or_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
