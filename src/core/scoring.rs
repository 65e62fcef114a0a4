use chrono::{DateTime, Utc};

use crate::core::{
    compatibility::is_admissible,
    distance::nearest_distance_km,
    eligibility::EligibilityEvaluator,
};
use crate::models::{BloodType, DonorCandidate, DonorMatch, MatchingCriteria};
use crate::services::stores::DonationHistory;

const COMPATIBILITY_WEIGHT: f64 = 0.4;
const DISTANCE_WEIGHT: f64 = 0.3;
const AVAILABILITY_WEIGHT: f64 = 0.3;

const MAX_URGENCY: u8 = 5;

/// Compatibility score (0-1)
/// Exact type > universal donor > Rh-positive O > any other admissible type
#[inline]
pub fn compatibility_score(donor: BloodType, required: BloodType) -> f64 {
    if donor == required {
        1.0
    } else if !is_admissible(donor, required) {
        0.0
    } else {
        match donor {
            BloodType::ONegative => 0.9,
            BloodType::OPositive => 0.8,
            _ => 0.7,
        }
    }
}

/// Distance score (0-1) in fixed bands
///
/// The bands are checked in order, so a radius under 30 km only narrows
/// the outermost 0.4 band.
#[inline]
pub fn distance_score(distance_km: f64, radius_km: f64) -> f64 {
    if !distance_km.is_finite() {
        return 0.0;
    }

    if distance_km <= 5.0 {
        1.0
    } else if distance_km <= 15.0 {
        0.8
    } else if distance_km <= 30.0 {
        0.6
    } else if distance_km <= radius_km {
        0.4
    } else {
        0.0
    }
}

/// Urgency 1..=5 mapped onto 0.2..=1.0
#[inline]
pub fn urgency_multiplier(urgency_level: u8) -> f64 {
    urgency_level.clamp(1, MAX_URGENCY) as f64 / MAX_URGENCY as f64
}

/// Weighted combination of the three sub-scores, scaled by urgency
///
/// Incompatible donors always score zero.
pub fn overall_score(
    compatibility: f64,
    distance: f64,
    availability: f64,
    urgency_level: u8,
) -> f64 {
    if compatibility <= 0.0 {
        return 0.0;
    }

    let weighted = compatibility * COMPATIBILITY_WEIGHT
        + distance * DISTANCE_WEIGHT
        + availability * AVAILABILITY_WEIGHT;

    (weighted * urgency_multiplier(urgency_level)).clamp(0.0, 1.0)
}

/// Score a donor once its availability is known
///
/// Donors flagged ineligible score zero overall whatever the other factors.
pub fn score_donor(
    donor: DonorCandidate,
    criteria: &MatchingCriteria,
    availability_score: f64,
) -> DonorMatch {
    let compatibility = compatibility_score(donor.blood_type, criteria.blood_type);
    let distance_km = nearest_distance_km(&criteria.location, &donor.preferred_locations);
    let distance = distance_score(distance_km, criteria.radius_or_default());

    let (availability, overall) = if donor.eligible {
        let availability = availability_score.clamp(0.0, 1.0);
        (
            availability,
            overall_score(compatibility, distance, availability, criteria.urgency_level),
        )
    } else {
        (0.0, 0.0)
    };

    DonorMatch {
        overall_score: overall,
        compatibility_score: compatibility,
        distance_km,
        availability_score: availability,
        donor,
    }
}

/// Scores donors against a request, looking up availability as needed
pub struct DonorScorer<H> {
    eligibility: EligibilityEvaluator<H>,
}

impl<H> Clone for DonorScorer<H> {
    fn clone(&self) -> Self {
        Self {
            eligibility: self.eligibility.clone(),
        }
    }
}

impl<H: DonationHistory> DonorScorer<H> {
    pub fn new(eligibility: EligibilityEvaluator<H>) -> Self {
        Self { eligibility }
    }

    pub async fn score(
        &self,
        donor: DonorCandidate,
        criteria: &MatchingCriteria,
        now: DateTime<Utc>,
    ) -> DonorMatch {
        // No point asking the history store about a donor that cannot give
        if !donor.eligible || !is_admissible(donor.blood_type, criteria.blood_type) {
            return score_donor(donor, criteria, 0.0);
        }

        let availability = self
            .eligibility
            .availability_score(&donor, criteria.required_by, now)
            .await;

        score_donor(donor, criteria, availability)
    }
}
