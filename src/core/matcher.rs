use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::Instrument;
use validator::Validate;

use crate::core::{
    compatibility::admissible_donor_types,
    eligibility::EligibilityEvaluator,
    scoring::DonorScorer,
};
use crate::models::{CachedMatches, DonorCandidate, DonorMatch, MatchResult, MatchingCriteria};
use crate::services::cache::{CacheError, CacheKey};
use crate::services::stores::{
    DonationHistory, DonorQuery, DonorStore, MatchCache, RequestStore, StoreError,
};

/// Errors surfaced to callers of the engine
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Donation request not found: {0}")]
    NotFound(String),

    #[error("Invalid matching criteria: {0}")]
    InvalidCriteria(#[from] validator::ValidationErrors),

    #[error("Request store failure: {0}")]
    RequestStore(StoreError),

    #[error("Donor store failure: {0}")]
    DonorStore(StoreError),
}

/// Tunables for the engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub default_limit: usize,
    pub max_limit: usize,
    pub cache_ttl_secs: u64,
    pub history_timeout: Duration,
    /// Upper bound on candidates scored at the same time
    pub max_concurrency: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 100,
            cache_ttl_secs: 300,
            history_timeout: Duration::from_millis(2000),
            max_concurrency: 32,
        }
    }
}

/// Per-candidate result of the scoring stage
#[derive(Debug, Clone)]
pub enum CandidateOutcome {
    Scored(DonorMatch),
    Fault { donor_id: String, reason: String },
}

/// Ranking order: score descending, then distance ascending, then donor id
pub fn compare_matches(a: &DonorMatch, b: &DonorMatch) -> Ordering {
    b.overall_score
        .total_cmp(&a.overall_score)
        .then_with(|| a.distance_km.total_cmp(&b.distance_km))
        .then_with(|| a.donor.id.cmp(&b.donor.id))
}

/// Drop faults and zero scores, sort, and keep the best `limit`
///
/// Returns the ranked matches and the number of faulted candidates.
pub fn rank_matches(outcomes: Vec<CandidateOutcome>, limit: usize) -> (Vec<DonorMatch>, usize) {
    let mut faulted = 0;
    let mut matches: Vec<DonorMatch> = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            CandidateOutcome::Scored(m) => Some(m),
            CandidateOutcome::Fault { .. } => {
                faulted += 1;
                None
            }
        })
        .filter(|m| m.overall_score > 0.0)
        .collect();

    matches.sort_by(compare_matches);
    matches.truncate(limit);

    (matches, faulted)
}

/// Records that cannot be scored at all
fn check_candidate(donor: &DonorCandidate) -> Result<(), String> {
    if donor.id.trim().is_empty() {
        return Err("donor record has no id".to_string());
    }
    Ok(())
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Resolve criteria from the stored request
/// 2. Fetch candidates pre-filtered by the donor store
/// 3. Score every candidate concurrently, isolating faults
/// 4. Rank, truncate, and optionally cache
pub struct MatchingEngine<R, D, H, C> {
    requests: Arc<R>,
    donors: Arc<D>,
    scorer: DonorScorer<H>,
    cache: Arc<C>,
    options: EngineOptions,
}

impl<R, D, H, C> MatchingEngine<R, D, H, C>
where
    R: RequestStore,
    D: DonorStore,
    H: DonationHistory + 'static,
    C: MatchCache,
{
    pub fn new(
        requests: Arc<R>,
        donors: Arc<D>,
        history: Arc<H>,
        cache: Arc<C>,
        options: EngineOptions,
    ) -> Self {
        let eligibility = EligibilityEvaluator::new(history, options.history_timeout);

        Self {
            requests,
            donors,
            scorer: DonorScorer::new(eligibility),
            cache,
            options,
        }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    fn resolve_limit(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or(self.options.default_limit).min(self.options.max_limit)
    }

    /// Rank donors for a stored donation request
    pub async fn find_matches(
        &self,
        request_id: &str,
        limit: Option<usize>,
    ) -> Result<MatchResult, MatchError> {
        let span = tracing::info_span!(
            "match_run",
            request_id = %request_id,
            run_id = %uuid::Uuid::new_v4()
        );

        async {
            let request = match self.requests.get_request_by_id(request_id).await {
                Ok(request) => request,
                Err(StoreError::NotFound(_)) => {
                    tracing::info!("Donation request {} not found", request_id);
                    return Err(MatchError::NotFound(request_id.to_string()));
                }
                Err(e) => {
                    tracing::error!("Failed to load donation request {}: {}", request_id, e);
                    return Err(MatchError::RequestStore(e));
                }
            };

            let criteria = MatchingCriteria::from(&request);
            self.run(&criteria, self.resolve_limit(limit), Utc::now()).await
        }
        .instrument(span)
        .await
    }

    /// Rank donors for ad-hoc criteria
    pub async fn match_donors(
        &self,
        criteria: &MatchingCriteria,
        limit: Option<usize>,
    ) -> Result<MatchResult, MatchError> {
        let span = tracing::info_span!(
            "match_run",
            blood_type = %criteria.blood_type,
            run_id = %uuid::Uuid::new_v4()
        );

        self.run(criteria, self.resolve_limit(limit), Utc::now())
            .instrument(span)
            .await
    }

    /// Same as `match_donors` with an explicit clock
    pub async fn match_donors_at(
        &self,
        criteria: &MatchingCriteria,
        limit: Option<usize>,
        now: DateTime<Utc>,
    ) -> Result<MatchResult, MatchError> {
        self.run(criteria, self.resolve_limit(limit), now).await
    }

    async fn run(
        &self,
        criteria: &MatchingCriteria,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<MatchResult, MatchError> {
        criteria.validate()?;

        let query = DonorQuery::eligible_of(admissible_donor_types(criteria.blood_type));
        let candidates = self.donors.find_donors(&query).await.map_err(|e| {
            tracing::error!("Failed to fetch donor candidates: {}", e);
            MatchError::DonorStore(e)
        })?;

        let total_candidates = candidates.len();
        tracing::debug!("Scoring {} candidates for {} request", total_candidates, criteria.blood_type);

        let outcomes = self.score_candidates(candidates, criteria, now).await;
        let (matches, faulted) = rank_matches(outcomes, limit);

        tracing::info!(
            "Ranked {} matches from {} candidates ({} faulted)",
            matches.len(),
            total_candidates,
            faulted
        );

        Ok(MatchResult {
            matches,
            total_candidates,
            faulted,
            from_cache: false,
        })
    }

    /// Score each candidate on its own task; a panic only costs that candidate
    async fn score_candidates(
        &self,
        candidates: Vec<DonorCandidate>,
        criteria: &MatchingCriteria,
        now: DateTime<Utc>,
    ) -> Vec<CandidateOutcome> {
        let mut outcomes = Vec::with_capacity(candidates.len());
        let mut tasks = Vec::with_capacity(candidates.len());
        let permits = Arc::new(Semaphore::new(self.options.max_concurrency.max(1)));
        let criteria = Arc::new(criteria.clone());

        for donor in candidates {
            if let Err(reason) = check_candidate(&donor) {
                tracing::warn!("Skipping donor candidate: {}", reason);
                outcomes.push(CandidateOutcome::Fault { donor_id: donor.id, reason });
                continue;
            }

            let donor_id = donor.id.clone();
            let scorer = self.scorer.clone();
            let criteria = Arc::clone(&criteria);
            let permits = Arc::clone(&permits);

            let handle = tokio::spawn(
                async move {
                    let _permit = permits.acquire_owned().await.ok();
                    scorer.score(donor, &criteria, now).await
                }
                .in_current_span(),
            );
            tasks.push((donor_id, handle));
        }

        for (donor_id, handle) in tasks {
            match handle.await {
                Ok(scored) => outcomes.push(CandidateOutcome::Scored(scored)),
                Err(e) => {
                    tracing::warn!("Scoring failed for donor {}: {}", donor_id, e);
                    outcomes.push(CandidateOutcome::Fault {
                        donor_id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcomes
    }

    /// Store a ranked list under the request id
    pub async fn cache_matches(
        &self,
        request_id: &str,
        result: &MatchResult,
        limit: usize,
        ttl_secs: u64,
    ) -> Result<(), CacheError> {
        let snapshot = CachedMatches {
            request_id: request_id.to_string(),
            limit,
            total_candidates: result.total_candidates,
            faulted: result.faulted,
            matches: result.matches.clone(),
            cached_at: Utc::now(),
        };
        let json = serde_json::to_string(&snapshot)?;

        self.cache.set(&CacheKey::matches(request_id), json, ttl_secs).await
    }

    /// Cached snapshot for a request, if any
    ///
    /// Backend errors and unreadable entries are logged and reported as a miss.
    pub async fn get_cached_matches(&self, request_id: &str) -> Option<CachedMatches> {
        let key = CacheKey::matches(request_id);

        let json = match self.cache.get(&key).await {
            Ok(Some(json)) => json,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_str::<CachedMatches>(&json) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("Discarding unreadable cache entry {}: {}", key, e);
                None
            }
        }
    }

    /// `find_matches` behind the match cache
    ///
    /// A snapshot computed with a smaller limit than requested counts as a miss.
    pub async fn find_matches_cached(
        &self,
        request_id: &str,
        limit: Option<usize>,
    ) -> Result<MatchResult, MatchError> {
        let limit = self.resolve_limit(limit);

        if let Some(snapshot) = self.get_cached_matches(request_id).await {
            if snapshot.limit >= limit {
                tracing::debug!("Serving matches for {} from cache", request_id);
                let mut matches = snapshot.matches;
                matches.truncate(limit);
                return Ok(MatchResult {
                    matches,
                    total_candidates: snapshot.total_candidates,
                    faulted: snapshot.faulted,
                    from_cache: true,
                });
            }
        }

        let result = self.find_matches(request_id, Some(limit)).await?;

        if let Err(e) = self
            .cache_matches(request_id, &result, limit, self.options.cache_ttl_secs)
            .await
        {
            tracing::warn!("Failed to cache matches for {}: {}", request_id, e);
        }

        Ok(result)
    }
}
