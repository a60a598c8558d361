//! Country repository for PostgreSQL.
//!
//! Integration tests against a live database live in `tests/repository.rs`
//! and are ignored unless run with `--ignored` and a `DATABASE_URL`.

use async_trait::async_trait;
use geosync_core::error::AppError;
use geosync_core::models::{normalize_code, Country, CountryQuery, NewCountry};
use geosync_core::store::CountryStore;
use geosync_core::sync::{SyncStats, UpsertOutcome};
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use tracing::{debug, info};

/// Column list for SELECT queries. Must remain a const literal to ensure SQL safety
/// since format!() bypasses sqlx compile-time validation.
const COUNTRY_COLUMNS: &str =
    "id, code, name, capital, region, subregion, population, area, flag_url, created_at, updated_at";

/// Inserts a country or overwrites the stored row with the same code.
///
/// `xmax = 0` only holds for a row version created by this statement, which
/// tells an insert apart from an update.
const UPSERT_COUNTRY: &str = r#"
    INSERT INTO countries (
        code,
        name,
        capital,
        region,
        subregion,
        population,
        area,
        flag_url
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
    ON CONFLICT (code)
    DO UPDATE SET
        name = EXCLUDED.name,
        capital = EXCLUDED.capital,
        region = EXCLUDED.region,
        subregion = EXCLUDED.subregion,
        population = EXCLUDED.population,
        area = EXCLUDED.area,
        flag_url = EXCLUDED.flag_url,
        updated_at = NOW()
    RETURNING (xmax = 0) AS inserted
"#;

/// Distinct non-null regions in byte order.
///
/// Grouping instead of `SELECT DISTINCT` lets `ORDER BY` use a collated
/// expression that is not in the select list.
const LIST_REGIONS: &str = r#"
    SELECT region
    FROM countries
    WHERE region IS NOT NULL
    GROUP BY region
    ORDER BY region COLLATE "C"
"#;

/// Repository for country persistence in PostgreSQL.
///
/// # Examples
///
/// ```no_run
/// use sqlx::postgres::PgPoolOptions;
/// use geosync_db::CountryRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = PgPoolOptions::new()
///     .max_connections(5)
///     .connect("postgresql://localhost/geosync")
///     .await?;
///
/// let repo = CountryRepository::new(pool);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CountryRepository {
    pool: Pool<Postgres>,
}

impl CountryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CountryStore for CountryRepository {
    async fn get_by_code(&self, code: &str) -> Result<Option<Country>, AppError> {
        let query = format!("SELECT {} FROM countries WHERE code = $1", COUNTRY_COLUMNS);
        let result = sqlx::query_as::<_, Country>(&query)
            .bind(normalize_code(code))
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(result)
    }

    async fn get_all(&self, query: &CountryQuery) -> Result<Vec<Country>, AppError> {
        let countries = list_query(query)
            .build_query_as::<Country>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(countries)
    }

    async fn list_regions(&self) -> Result<Vec<String>, AppError> {
        let regions: Vec<String> = sqlx::query_scalar(LIST_REGIONS)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;

        Ok(regions)
    }

    /// Upserts the batch inside one transaction.
    ///
    /// Any failure returns before `commit`, and dropping the transaction rolls
    /// back every row already written for this batch.
    async fn upsert_many(&self, countries: &[NewCountry]) -> Result<SyncStats, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::DatabaseError)?;
        let mut stats = SyncStats::new();

        for country in countries {
            let inserted: bool = sqlx::query_scalar(UPSERT_COUNTRY)
                .bind(&country.code)
                .bind(&country.name)
                .bind(&country.capital)
                .bind(&country.region)
                .bind(&country.subregion)
                .bind(country.population)
                .bind(country.area)
                .bind(&country.flag_url)
                .fetch_one(&mut *tx)
                .await
                .map_err(AppError::DatabaseError)?;

            let outcome = UpsertOutcome::from_existing(!inserted);
            debug!("{:?} {}", outcome, country.code);
            stats.record(outcome);
        }

        tx.commit().await.map_err(AppError::DatabaseError)?;
        info!(
            "Committed {} countries ({} created, {} updated)",
            stats.total(),
            stats.created,
            stats.updated
        );

        Ok(stats)
    }
}

/// Builds the filtered, ordered, paginated listing query.
fn list_query(query: &CountryQuery) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {} FROM countries WHERE TRUE",
        COUNTRY_COLUMNS
    ));

    if let Some(region) = query.region() {
        builder.push(" AND region ILIKE ").push_bind(like_pattern(region));
    }

    if let Some(search) = query.search() {
        let pattern = like_pattern(search);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR capital ILIKE ")
            .push_bind(pattern)
            .push(")");
    }

    builder
        .push(r#" ORDER BY name COLLATE "C", code LIMIT "#)
        .push_bind(query.limit())
        .push(" OFFSET ")
        .push_bind(query.offset());

    builder
}

/// Wraps `term` for a substring `ILIKE`, escaping LIKE wildcards so they match literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
