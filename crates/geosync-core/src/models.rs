use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;

use crate::error::AppError;

/// Default page size for country listings.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 250;

/// Required length of a country code after normalization.
pub const CODE_LEN: usize = 3;

/// A row of the `countries` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Country {
    pub id: i64,
    /// ISO 3166-1 alpha-3 code, always uppercase.
    pub code: String,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub population: Option<i64>,
    pub area: Option<f64>,
    pub flag_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Null until the first sync that re-observes the code.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Country {
    /// Overwrites every mutable field with the values of `data`.
    pub fn apply(&mut self, data: &NewCountry, now: DateTime<Utc>) {
        self.name = data.name.clone();
        self.capital = data.capital.clone();
        self.region = data.region.clone();
        self.subregion = data.subregion.clone();
        self.population = data.population;
        self.area = data.area;
        self.flag_url = data.flag_url.clone();
        self.updated_at = Some(now);
    }
}

/// A country entry as fetched from the upstream API, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateCountry {
    pub name: String,
    pub code: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub population: Option<i64>,
    pub area: Option<f64>,
    pub flag_url: Option<String>,
}

/// A validated country ready to be upserted.
///
/// The only way to build one is [`NewCountry::try_from`], so the store never
/// sees a malformed code or a blank name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewCountry {
    pub code: String,
    pub name: String,
    pub capital: Option<String>,
    pub region: Option<String>,
    pub subregion: Option<String>,
    pub population: Option<i64>,
    pub area: Option<f64>,
    pub flag_url: Option<String>,
}

impl TryFrom<CandidateCountry> for NewCountry {
    type Error = AppError;

    fn try_from(candidate: CandidateCountry) -> Result<Self, Self::Error> {
        let code = normalize_code(&candidate.code);
        if code.chars().count() != CODE_LEN {
            return Err(AppError::validation(format!(
                "country code '{}' must have exactly {} characters",
                candidate.code.trim(),
                CODE_LEN
            )));
        }

        let name = candidate.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::validation(format!(
                "country name for '{}' must not be empty",
                code
            )));
        }

        if let Some(population) = candidate.population {
            if population < 0 {
                return Err(AppError::validation(format!(
                    "population for '{}' must not be negative",
                    code
                )));
            }
        }

        if let Some(area) = candidate.area {
            if !area.is_finite() || area < 0.0 {
                return Err(AppError::validation(format!(
                    "area for '{}' must be a non-negative number",
                    code
                )));
            }
        }

        Ok(Self {
            code,
            name,
            capital: non_empty(candidate.capital),
            region: non_empty(candidate.region),
            subregion: non_empty(candidate.subregion),
            population: candidate.population,
            area: candidate.area,
            flag_url: non_empty(candidate.flag_url),
        })
    }
}

/// Normalizes a country code for storage and lookup.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Filters and pagination for country listings.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryQuery {
    region: Option<String>,
    search: Option<String>,
    offset: i64,
    limit: i64,
}

impl CountryQuery {
    /// Builds a query, rejecting a negative offset or a limit outside `1..=250`.
    ///
    /// Blank `region` and `search` values are treated as absent.
    pub fn new(
        region: Option<String>,
        search: Option<String>,
        offset: i64,
        limit: i64,
    ) -> Result<Self, AppError> {
        if offset < 0 {
            return Err(AppError::validation("skip must be greater than or equal to 0"));
        }
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::validation(format!(
                "limit must be between 1 and {}",
                MAX_LIMIT
            )));
        }

        Ok(Self {
            region: non_empty(region),
            search: non_empty(search),
            offset,
            limit,
        })
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

impl Default for CountryQuery {
    fn default() -> Self {
        Self {
            region: None,
            search: None,
            offset: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}
