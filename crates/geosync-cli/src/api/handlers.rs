use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::Json;
use geosync_core::{Country, CountryQuery, SyncSummary, DEFAULT_LIMIT};
use serde::{Deserialize, Serialize};

use super::error::ApiResult;
use super::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Query string of `GET /api/countries`.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub region: Option<String>,
    pub search: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn sync_countries(State(state): State<AppState>) -> ApiResult<Json<SyncSummary>> {
    let summary = state.service().sync().await?;
    Ok(Json(summary))
}

pub async fn list_countries(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Country>>> {
    let Query(params) = params?;
    let query = CountryQuery::new(
        params.region,
        params.search,
        params.skip.unwrap_or(0),
        params.limit.unwrap_or(DEFAULT_LIMIT),
    )?;
    let countries = state.service().list(&query).await?;
    Ok(Json(countries))
}

pub async fn list_regions(State(state): State<AppState>) -> ApiResult<Json<Vec<String>>> {
    let regions = state.service().regions().await?;
    Ok(Json(regions))
}

pub async fn get_country(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<Json<Country>> {
    let country = state.service().get_by_code(&code).await?;
    Ok(Json(country))
}
