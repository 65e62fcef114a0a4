use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{BloodType, GeoPoint};

/// Search radius used when a request does not carry one
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// Stored donation request, as returned by the request store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRequest {
    pub id: String,
    #[serde(rename = "bloodType")]
    pub blood_type: BloodType,
    pub location: GeoPoint,
    #[serde(rename = "searchRadiusKm", default)]
    pub search_radius_km: Option<f64>,
    #[serde(rename = "urgencyLevel")]
    pub urgency_level: u8,
    #[serde(rename = "requiredBy")]
    pub required_by: DateTime<Utc>,
}

/// Inputs to one matching run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct MatchingCriteria {
    #[serde(rename = "bloodType")]
    pub blood_type: BloodType,
    #[validate(nested)]
    pub location: GeoPoint,
    #[validate(range(exclusive_min = 0.0))]
    #[serde(rename = "radiusKm", default)]
    pub radius_km: Option<f64>,
    #[validate(range(min = 1, max = 5))]
    #[serde(rename = "urgencyLevel")]
    pub urgency_level: u8,
    #[serde(rename = "requiredBy")]
    pub required_by: DateTime<Utc>,
}

impl MatchingCriteria {
    pub fn radius_or_default(&self) -> f64 {
        self.radius_km.unwrap_or(DEFAULT_RADIUS_KM)
    }
}

impl From<&DonationRequest> for MatchingCriteria {
    fn from(request: &DonationRequest) -> Self {
        Self {
            blood_type: request.blood_type,
            location: request.location,
            radius_km: request.search_radius_km,
            urgency_level: request.urgency_level,
            required_by: request.required_by,
        }
    }
}
