use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::models::{BloodType, DonationRequest, DonorCandidate, GeoPoint, ScheduleEntry};
use crate::services::stores::{DonationHistory, DonorQuery, DonorStore, RequestStore, StoreError};

/// PostgreSQL-backed request, donor and donation-history store
///
/// Reads the platform's `donation_requests`, `donors`, `users` and
/// `donations` tables. The schema itself is owned by the platform; this
/// client only issues read queries.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

impl RequestStore for PostgresClient {
    async fn get_request_by_id(&self, id: &str) -> Result<DonationRequest, StoreError> {
        let query = r#"
            SELECT id::text AS id, blood_type, latitude, longitude,
                   search_radius_km, urgency_level, required_by
            FROM donation_requests
            WHERE id::text = $1
        "#;

        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        decode_request(&row)
    }
}

impl DonorStore for PostgresClient {
    async fn find_donors(&self, query: &DonorQuery) -> Result<Vec<DonorCandidate>, StoreError> {
        let sql = r#"
            SELECT d.id::text AS id, d.blood_type, d.last_donation_date,
                   d.availability_schedule, d.preferred_locations, d.is_eligible, d.contact
            FROM donors d
            JOIN users u ON u.id = d.user_id
            WHERE d.blood_type = ANY($1)
              AND d.is_eligible = $2
              AND u.is_active = $3
              AND u.is_verified = $4
        "#;

        let blood_types: Vec<String> = query
            .blood_types
            .iter()
            .map(|t| t.as_storage_str().to_string())
            .collect();

        let rows = sqlx::query(sql)
            .bind(blood_types)
            .bind(query.eligible)
            .bind(query.user_active)
            .bind(query.user_verified)
            .fetch_all(&self.pool)
            .await?;

        // One unreadable row must not sink the whole pool
        let donors: Vec<DonorCandidate> = rows
            .iter()
            .filter_map(|row| match decode_donor(row) {
                Ok(donor) => Some(donor),
                Err(e) => {
                    tracing::warn!("Skipping unreadable donor row: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!("Donor store returned {} of {} rows", donors.len(), rows.len());

        Ok(donors)
    }
}

impl DonationHistory for PostgresClient {
    async fn count_completed_donations(
        &self,
        donor_id: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, StoreError> {
        let query = r#"
            SELECT COUNT(*) AS completed
            FROM donations
            WHERE donor_id::text = $1
              AND status = 'COMPLETED'
              AND donation_date >= $2
        "#;

        let row = sqlx::query(query)
            .bind(donor_id)
            .bind(since)
            .fetch_one(&self.pool)
            .await?;

        let completed: i64 = row.try_get("completed")?;
        Ok(u32::try_from(completed.max(0)).unwrap_or(u32::MAX))
    }
}

fn parse_blood_type(raw: &str) -> Result<BloodType, StoreError> {
    raw.parse().map_err(|e| StoreError::Malformed(format!("{}", e)))
}

fn decode_request(row: &PgRow) -> Result<DonationRequest, StoreError> {
    let blood_type: String = row.try_get("blood_type")?;
    let urgency_level: i32 = row.try_get("urgency_level")?;

    Ok(DonationRequest {
        id: row.try_get("id")?,
        blood_type: parse_blood_type(&blood_type)?,
        location: GeoPoint::new(row.try_get("latitude")?, row.try_get("longitude")?),
        search_radius_km: row.try_get("search_radius_km")?,
        urgency_level: u8::try_from(urgency_level)
            .map_err(|_| StoreError::Malformed(format!("urgency level {}", urgency_level)))?,
        required_by: row.try_get("required_by")?,
    })
}

fn decode_donor(row: &PgRow) -> Result<DonorCandidate, StoreError> {
    let blood_type: String = row.try_get("blood_type")?;
    let schedule: Option<Value> = row.try_get("availability_schedule")?;
    let locations: Option<Value> = row.try_get("preferred_locations")?;

    Ok(DonorCandidate {
        id: row.try_get("id")?,
        blood_type: parse_blood_type(&blood_type)?,
        last_donation_at: row.try_get("last_donation_date")?,
        availability_schedule: decode_schedule(schedule),
        preferred_locations: decode_locations(locations),
        eligible: row.try_get("is_eligible")?,
        contact: row.try_get("contact")?,
    })
}

/// Lenient schedule decoding
///
/// Entries without a readable day keep an empty day name so the eligibility
/// evaluator sees the schedule as malformed instead of silently empty.
pub fn decode_schedule(value: Option<Value>) -> Vec<ScheduleEntry> {
    match value {
        None | Some(Value::Null) => vec![],
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| ScheduleEntry {
                day_of_week: item
                    .get("dayOfWeek")
                    .or_else(|| item.get("day"))
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                available: item.get("available").and_then(Value::as_bool).unwrap_or(false),
            })
            .collect(),
        Some(_) => vec![ScheduleEntry::new("", false)],
    }
}

/// Locations missing either coordinate are dropped
pub fn decode_locations(value: Option<Value>) -> Vec<GeoPoint> {
    let Some(Value::Array(items)) = value else {
        return vec![];
    };

    items
        .iter()
        .filter_map(|item| {
            let lat = item.get("latitude").or_else(|| item.get("lat"))?.as_f64()?;
            let lon = item
                .get("longitude")
                .or_else(|| item.get("lng"))
                .or_else(|| item.get("lon"))?
                .as_f64()?;
            Some(GeoPoint::new(lat, lon))
        })
        .collect()
}
