use serde::{Deserialize, Serialize};
use crate::models::domain::DonorMatch;

/// Outcome of a matching run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub matches: Vec<DonorMatch>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    /// Candidates whose scoring faulted and were dropped
    pub faulted: usize,
    #[serde(rename = "fromCache")]
    pub from_cache: bool,
}

/// Snapshot written to the match cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedMatches {
    #[serde(rename = "requestId")]
    pub request_id: String,
    /// Limit the snapshot was computed with
    pub limit: usize,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(default)]
    pub faulted: usize,
    pub matches: Vec<DonorMatch>,
    #[serde(rename = "cachedAt")]
    pub cached_at: chrono::DateTime<chrono::Utc>,
}
