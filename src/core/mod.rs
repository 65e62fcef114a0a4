// Core algorithm exports
pub mod compatibility;
pub mod distance;
pub mod eligibility;
pub mod matcher;
pub mod scoring;

pub use compatibility::{admissible_donor_types, compatibility_level, compatible_recipients, CompatibilityLevel};
pub use distance::{distance_km, haversine_distance, nearest_distance_km};
pub use eligibility::EligibilityEvaluator;
pub use matcher::{CandidateOutcome, EngineOptions, MatchError, MatchingEngine, rank_matches};
pub use scoring::{DonorScorer, score_donor};
