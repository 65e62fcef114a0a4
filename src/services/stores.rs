//! Interfaces the matching engine consumes.
//!
//! Each collaborator is a narrow trait so the engine can be wired to
//! PostgreSQL/Redis in production and to in-memory fakes in tests.

use chrono::{DateTime, Utc};
use std::future::Future;
use thiserror::Error;

use crate::models::{BloodType, DonationRequest, DonorCandidate};

/// Errors surfaced by store collaborators
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),
}

/// Filter passed to the donor store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DonorQuery {
    pub blood_types: Vec<BloodType>,
    pub eligible: bool,
    pub user_active: bool,
    pub user_verified: bool,
}

impl DonorQuery {
    /// Eligible donors of active, verified users with one of `blood_types`
    pub fn eligible_of(blood_types: &[BloodType]) -> Self {
        Self {
            blood_types: blood_types.to_vec(),
            eligible: true,
            user_active: true,
            user_verified: true,
        }
    }
}

pub trait RequestStore: Send + Sync {
    /// Fetch a donation request, failing with `StoreError::NotFound` if absent
    fn get_request_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<DonationRequest, StoreError>> + Send;
}

pub trait DonorStore: Send + Sync {
    fn find_donors(
        &self,
        query: &DonorQuery,
    ) -> impl Future<Output = Result<Vec<DonorCandidate>, StoreError>> + Send;
}

pub trait DonationHistory: Send + Sync {
    /// Completed donations by `donor_id` at or after `since`
    fn count_completed_donations(
        &self,
        donor_id: &str,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<u32, StoreError>> + Send;
}

/// Key-value cache holding serialised match lists
pub trait MatchCache: Send + Sync {
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, crate::services::CacheError>> + Send;

    fn set(
        &self,
        key: &str,
        value: String,
        ttl_secs: u64,
    ) -> impl Future<Output = Result<(), crate::services::CacheError>> + Send;
}
