// Model exports
pub mod blood_type;
pub mod domain;
pub mod requests;
pub mod responses;

pub use blood_type::{BloodType, ParseBloodTypeError};
pub use domain::{DonorCandidate, DonorMatch, GeoPoint, ScheduleEntry};
pub use requests::{DonationRequest, MatchingCriteria, DEFAULT_RADIUS_KM};
pub use responses::{CachedMatches, MatchResult};
