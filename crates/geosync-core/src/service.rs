//! Sync orchestration and read-side queries over a [`CountryStore`].

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::AppError;
use crate::models::{normalize_code, Country, CountryQuery, NewCountry};
use crate::store::{CountrySource, CountryStore};
use crate::sync::SyncSummary;

/// Orchestrates fetch → validate → upsert and serves country queries.
///
/// Cheap to build; the HTTP layer constructs one per request.
#[derive(Clone)]
pub struct CountryService {
    store: Arc<dyn CountryStore>,
    source: Arc<dyn CountrySource>,
}

impl CountryService {
    pub fn new(store: Arc<dyn CountryStore>, source: Arc<dyn CountrySource>) -> Self {
        Self { store, source }
    }

    /// Pulls every country from the upstream source and upserts the batch.
    ///
    /// The first candidate that fails validation aborts the whole sync before
    /// anything is written.
    pub async fn sync(&self) -> Result<SyncSummary, AppError> {
        info!("Fetching countries from upstream...");
        let candidates = self.source.fetch_all().await?;
        debug!("Fetched {} candidate countries", candidates.len());

        let countries = candidates
            .into_iter()
            .map(NewCountry::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let stats = self.store.upsert_many(&countries).await?;
        let summary = SyncSummary::from(stats);
        info!("{}", summary.message);

        Ok(summary)
    }

    pub async fn list(&self, query: &CountryQuery) -> Result<Vec<Country>, AppError> {
        self.store.get_all(query).await
    }

    pub async fn regions(&self) -> Result<Vec<String>, AppError> {
        self.store.list_regions().await
    }

    /// Returns the country stored under `code`, or [`AppError::NotFound`].
    pub async fn get_by_code(&self, code: &str) -> Result<Country, AppError> {
        self.store
            .get_by_code(code)
            .await?
            .ok_or_else(|| AppError::NotFound(normalize_code(code)))
    }
}
