use geosync_core::error::AppError;
use sqlx::PgPool;
use tracing::info;

const CREATE_COUNTRIES: &str = r#"
    CREATE TABLE IF NOT EXISTS countries (
        id BIGSERIAL PRIMARY KEY,
        code VARCHAR(3) NOT NULL UNIQUE,
        name TEXT NOT NULL,
        capital TEXT,
        region TEXT,
        subregion TEXT,
        population BIGINT CHECK (population >= 0),
        area DOUBLE PRECISION CHECK (area >= 0),
        flag_url TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ
    )
"#;

const CREATE_REGION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS countries_region_idx ON countries (region)";

/// Creates the `countries` table and its indexes when they do not exist yet.
///
/// Safe to run on every start; an existing table is left untouched.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query(CREATE_COUNTRIES)
        .execute(pool)
        .await
        .map_err(AppError::DatabaseError)?;

    sqlx::query(CREATE_REGION_INDEX)
        .execute(pool)
        .await
        .map_err(AppError::DatabaseError)?;

    info!("Database schema ready");
    Ok(())
}
