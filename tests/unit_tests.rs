// Unit tests for HemoLink Matcher

use chrono::{Duration, TimeZone, Utc};
use hemolink_matcher::core::{
    compatibility::{admissible_donor_types, compatibility_level, is_admissible, CompatibilityLevel},
    distance::{distance_km, haversine_distance},
    eligibility::{pre_history_gate, AvailabilityGate},
    scoring::{distance_score, overall_score, score_donor},
};
use hemolink_matcher::models::{BloodType, DonorCandidate, GeoPoint, MatchingCriteria, ScheduleEntry};

fn create_donor(blood_type: BloodType, lat: f64, lon: f64) -> DonorCandidate {
    DonorCandidate {
        id: format!("donor-{}", blood_type),
        blood_type,
        last_donation_at: None,
        availability_schedule: vec![],
        preferred_locations: vec![GeoPoint::new(lat, lon)],
        eligible: true,
        contact: None,
    }
}

fn create_criteria(blood_type: BloodType) -> MatchingCriteria {
    MatchingCriteria {
        blood_type,
        location: GeoPoint::new(19.07, 72.87),
        radius_km: Some(50.0),
        urgency_level: 3,
        required_by: Utc::now(),
    }
}

#[test]
fn test_haversine_distance_zero() {
    let distance = haversine_distance(19.07, 72.87, 19.07, 72.87);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_mumbai_to_pune() {
    // Mumbai to Pune is roughly 120 km as the crow flies
    let distance = haversine_distance(19.0760, 72.8777, 18.5204, 73.8567);
    assert!(distance > 110.0 && distance < 130.0, "got {}", distance);
}

#[test]
fn test_distance_symmetry() {
    let points = [
        GeoPoint::new(19.07, 72.87),
        GeoPoint::new(-33.87, 151.21),
        GeoPoint::new(51.51, -0.13),
        GeoPoint::new(0.0, 179.9),
    ];

    for a in &points {
        assert_eq!(distance_km(a, a), 0.0);
        for b in &points {
            assert!((distance_km(a, b) - distance_km(b, a)).abs() < 1e-9);
        }
    }
}

#[test]
fn test_admissible_sets_contain_self_and_universal_donor() {
    for required in BloodType::ALL {
        let admissible = admissible_donor_types(required);
        assert!(admissible.contains(&required));
        assert!(admissible.contains(&BloodType::ONegative));
    }
    assert_eq!(admissible_donor_types(BloodType::AbPositive).len(), 8);
}

#[test]
fn test_incompatible_donor_always_scores_zero() {
    for required in BloodType::ALL {
        let criteria = create_criteria(required);
        for donor_type in BloodType::ALL.into_iter().filter(|t| !is_admissible(*t, required)) {
            // Right next to the request and perfectly available
            let donor = create_donor(donor_type, 19.07, 72.87);
            let scored = score_donor(donor, &criteria, 1.0);
            assert_eq!(scored.overall_score, 0.0, "{} for {}", donor_type, required);
        }
    }
}

#[test]
fn test_compatible_donor_outranks_incompatible_at_worst_inputs() {
    let worst_compatible = overall_score(0.7, 0.0, 0.0, 1);
    let best_incompatible = overall_score(0.0, 1.0, 1.0, 5);
    assert!(worst_compatible > best_incompatible);
}

#[test]
fn test_overall_score_bounded() {
    for urgency in 1..=5 {
        for &compat in &[0.7, 0.8, 0.9, 1.0] {
            for &dist in &[0.0, 0.4, 0.6, 0.8, 1.0] {
                for &avail in &[0.0, 0.3, 0.5, 0.7, 1.0] {
                    let score = overall_score(compat, dist, avail, urgency);
                    assert!((0.0..=1.0).contains(&score));
                }
            }
        }
    }
}

#[test]
fn test_distance_score_respects_custom_radius() {
    assert_eq!(distance_score(45.0, 100.0), 0.4);
    assert_eq!(distance_score(45.0, 40.0), 0.0);
}

#[test]
fn test_recent_donor_is_blocked_regardless_of_schedule() {
    let now = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();
    let mut donor = create_donor(BloodType::APositive, 19.07, 72.87);
    donor.last_donation_at = Some(now - Duration::days(30));
    donor.availability_schedule = vec![ScheduleEntry::new("friday", true)];

    assert_eq!(pre_history_gate(&donor, now, now), AvailabilityGate::Settled(0.0));
}

#[test]
fn test_compatibility_levels_follow_table() {
    for recipient in BloodType::ALL {
        for donor in BloodType::ALL {
            let level = compatibility_level(donor, recipient);
            match level {
                CompatibilityLevel::Perfect => assert_eq!(donor, recipient),
                CompatibilityLevel::Compatible => assert!(is_admissible(donor, recipient)),
                CompatibilityLevel::Incompatible => assert!(!is_admissible(donor, recipient)),
            }
        }
    }
}
