//! HemoLink Matcher - donor matching and scoring engine
//!
//! Given a blood donation request, this library finds eligible donors,
//! filters them by blood-type compatibility, scores each on compatibility,
//! proximity and availability, and returns a ranked, cacheable match list.

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use core::{MatchingEngine, EngineOptions, MatchError, admissible_donor_types, distance::haversine_distance};
pub use models::{BloodType, DonationRequest, DonorCandidate, DonorMatch, GeoPoint, MatchResult, MatchingCriteria};
