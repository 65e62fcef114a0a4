// Service exports
pub mod cache;
pub mod postgres;
pub mod stores;

pub use cache::{CacheManager, CacheKey, CacheError};
pub use postgres::PostgresClient;
pub use stores::{DonationHistory, DonorQuery, DonorStore, MatchCache, RequestStore, StoreError};

/// Engine wired to PostgreSQL for all three stores and the two-tier cache
pub type PgMatchingEngine =
    crate::core::MatchingEngine<PostgresClient, PostgresClient, PostgresClient, CacheManager>;
