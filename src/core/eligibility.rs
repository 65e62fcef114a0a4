use chrono::{DateTime, Datelike, Duration as ChronoDuration, Utc, Weekday};
use std::sync::Arc;
use std::time::Duration;

use crate::models::{DonorCandidate, ScheduleEntry};
use crate::services::stores::DonationHistory;

/// Medically mandated minimum gap between two whole-blood donations
pub const MIN_DONATION_INTERVAL_DAYS: i64 = 56;

/// Window used to measure how often a donor gives
pub const HISTORY_WINDOW_DAYS: i64 = 365;

/// Donations per window at which the frequency bonus saturates
const FREQUENCY_SATURATION: f64 = 4.0;

/// Eligible, but not on the requested day
pub const SCHEDULE_CONFLICT_SCORE: f64 = 0.3;

/// Eligible with no schedule conflict, before the frequency bonus
pub const BASELINE_ELIGIBLE_SCORE: f64 = 0.7;

/// Share of the score that recent donation frequency can add
const FREQUENCY_WEIGHT: f64 = 0.3;

/// Returned when history or schedule data cannot be used
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Result of comparing a schedule with the required-by day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleCheck {
    NoSchedule,
    Available,
    Conflict,
    Malformed,
}

/// What can be decided about a donor before touching donation history
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AvailabilityGate {
    Settled(f64),
    NeedsHistory,
}

/// True while the donor is still inside the mandatory inter-donation interval
pub fn within_donation_interval(donor: &DonorCandidate, now: DateTime<Utc>) -> bool {
    match donor.last_donation_at {
        Some(last) => now - last < ChronoDuration::days(MIN_DONATION_INTERVAL_DAYS),
        None => false,
    }
}

fn parse_weekday(day: &str) -> Option<Weekday> {
    day.trim().parse::<Weekday>().ok()
}

pub fn check_schedule(schedule: &[ScheduleEntry], required_by: DateTime<Utc>) -> ScheduleCheck {
    if schedule.is_empty() {
        return ScheduleCheck::NoSchedule;
    }

    let mut parsed = Vec::with_capacity(schedule.len());
    for entry in schedule {
        match parse_weekday(&entry.day_of_week) {
            Some(day) => parsed.push((day, entry.available)),
            None => return ScheduleCheck::Malformed,
        }
    }

    let wanted = required_by.weekday();
    if parsed.iter().any(|(day, available)| *day == wanted && *available) {
        ScheduleCheck::Available
    } else {
        ScheduleCheck::Conflict
    }
}

/// Interval and schedule rules, in that order
pub fn pre_history_gate(
    donor: &DonorCandidate,
    required_by: DateTime<Utc>,
    now: DateTime<Utc>,
) -> AvailabilityGate {
    if within_donation_interval(donor, now) {
        return AvailabilityGate::Settled(0.0);
    }

    match check_schedule(&donor.availability_schedule, required_by) {
        ScheduleCheck::Conflict => AvailabilityGate::Settled(SCHEDULE_CONFLICT_SCORE),
        ScheduleCheck::Malformed => AvailabilityGate::Settled(NEUTRAL_SCORE),
        ScheduleCheck::NoSchedule | ScheduleCheck::Available => AvailabilityGate::NeedsHistory,
    }
}

/// 0.0 for no recent donations, 1.0 for four or more in the window
#[inline]
pub fn frequency_bonus(completed_donations: u32) -> f64 {
    (completed_donations as f64 / FREQUENCY_SATURATION).clamp(0.0, 1.0)
}

#[inline]
pub fn score_from_history(completed_donations: u32) -> f64 {
    BASELINE_ELIGIBLE_SCORE + FREQUENCY_WEIGHT * frequency_bonus(completed_donations)
}

/// Scores how available a donor is for a given date
///
/// Never fails: history lookups that error or exceed `lookup_timeout`
/// yield `NEUTRAL_SCORE`.
pub struct EligibilityEvaluator<H> {
    history: Arc<H>,
    lookup_timeout: Duration,
}

impl<H> Clone for EligibilityEvaluator<H> {
    fn clone(&self) -> Self {
        Self {
            history: Arc::clone(&self.history),
            lookup_timeout: self.lookup_timeout,
        }
    }
}

impl<H: DonationHistory> EligibilityEvaluator<H> {
    pub fn new(history: Arc<H>, lookup_timeout: Duration) -> Self {
        Self { history, lookup_timeout }
    }

    pub async fn availability_score(
        &self,
        donor: &DonorCandidate,
        required_by: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> f64 {
        if let AvailabilityGate::Settled(score) = pre_history_gate(donor, required_by, now) {
            return score;
        }

        let since = now - ChronoDuration::days(HISTORY_WINDOW_DAYS);
        let lookup = self.history.count_completed_donations(&donor.id, since);

        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(Ok(count)) => score_from_history(count),
            Ok(Err(e)) => {
                tracing::warn!("Donation history lookup failed for donor {}: {}", donor.id, e);
                NEUTRAL_SCORE
            }
            Err(_) => {
                tracing::warn!(
                    "Donation history lookup for donor {} timed out after {:?}",
                    donor.id,
                    self.lookup_timeout
                );
                NEUTRAL_SCORE
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BloodType;
    use chrono::TimeZone;

    fn donor(last_donation_at: Option<DateTime<Utc>>, schedule: Vec<ScheduleEntry>) -> DonorCandidate {
        DonorCandidate {
            id: "donor".to_string(),
            blood_type: BloodType::APositive,
            last_donation_at,
            availability_schedule: schedule,
            preferred_locations: vec![],
            eligible: true,
            contact: None,
        }
    }

    // 2026-10-14 is a Wednesday
    fn wednesday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 9, 0, 0).unwrap()
    }

    #[test]
    fn test_recent_donation_blocks() {
        let now = wednesday();
        let d = donor(Some(now - ChronoDuration::days(55)), vec![]);
        assert_eq!(pre_history_gate(&d, now, now), AvailabilityGate::Settled(0.0));

        let d = donor(Some(now - ChronoDuration::days(56)), vec![]);
        assert_eq!(pre_history_gate(&d, now, now), AvailabilityGate::NeedsHistory);
    }

    #[test]
    fn test_schedule_conflict_is_soft() {
        let now = wednesday();
        let d = donor(None, vec![ScheduleEntry::new("monday", true), ScheduleEntry::new("Wed", false)]);
        assert_eq!(
            pre_history_gate(&d, now, now),
            AvailabilityGate::Settled(SCHEDULE_CONFLICT_SCORE)
        );
    }

    #[test]
    fn test_schedule_match_needs_history() {
        let now = wednesday();
        let d = donor(None, vec![ScheduleEntry::new("Wednesday", true)]);
        assert_eq!(check_schedule(&d.availability_schedule, now), ScheduleCheck::Available);
        assert_eq!(pre_history_gate(&d, now, now), AvailabilityGate::NeedsHistory);
    }

    #[test]
    fn test_malformed_schedule_is_neutral() {
        let now = wednesday();
        let d = donor(None, vec![ScheduleEntry::new("someday", true)]);
        assert_eq!(pre_history_gate(&d, now, now), AvailabilityGate::Settled(NEUTRAL_SCORE));
    }

    #[test]
    fn test_frequency_scaling() {
        assert_eq!(score_from_history(0), 0.7);
        assert!((score_from_history(2) - 0.85).abs() < 1e-12);
        assert!((score_from_history(4) - 1.0).abs() < 1e-12);
        assert_eq!(score_from_history(9), score_from_history(4));
    }
}
