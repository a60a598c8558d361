//! Seams between the sync/query logic and the outside world.
//!
//! [`CountryStore`] is implemented by the PostgreSQL repository in
//! `geosync-db` and by [`crate::InMemoryCountryStore`]; [`CountrySource`] is
//! implemented by the REST Countries client in `geosync-client`.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{CandidateCountry, Country, CountryQuery, NewCountry};
use crate::sync::SyncStats;

/// Persistence for country records keyed by their normalized code.
#[async_trait]
pub trait CountryStore: Send + Sync {
    /// Looks up a country by code. The code is normalized before matching.
    async fn get_by_code(&self, code: &str) -> Result<Option<Country>, AppError>;

    /// Lists countries matching the query, ordered by name.
    async fn get_all(&self, query: &CountryQuery) -> Result<Vec<Country>, AppError>;

    /// Returns the distinct non-null regions, sorted.
    async fn list_regions(&self) -> Result<Vec<String>, AppError>;

    /// Inserts unseen codes and overwrites known ones, in input order.
    ///
    /// The batch is one unit of work: on error nothing is committed.
    async fn upsert_many(&self, countries: &[NewCountry]) -> Result<SyncStats, AppError>;
}

/// Upstream provider of candidate country records.
#[async_trait]
pub trait CountrySource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<CandidateCountry>, AppError>;
}
