use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
};
use serde::Deserialize;
use serde_json::Value;
use skywatch_common::TargetResponse;
use tracing::Instrument;
use uuid::Uuid;

use super::error::ApiError;
use super::state::AppState;
use crate::error::LookupError;

pub type HandlerResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct TargetParams {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub time: Option<String>,
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

/// GET /catalog
pub async fn get_catalog(State(state): State<AppState>) -> HandlerResult<Vec<Value>> {
    let records = state.catalog.load().await?;
    Ok(Json(records))
}

/// GET /target/{name}?lat=..&lon=..[&time=..]
pub async fn get_target(
    State(state): State<AppState>,
    Path(name): Path<String>,
    params: Result<Query<TargetParams>, QueryRejection>,
) -> HandlerResult<TargetResponse> {
    let Query(params) = params.map_err(|e| LookupError::InvalidRequest(e.body_text()))?;

    let span = tracing::info_span!("target", request_id = %Uuid::now_v7(), name = %name);
    let response = state
        .targets
        .lookup(&name, params.lat, params.lon, params.time.as_deref())
        .instrument(span)
        .await?;

    Ok(Json(response))
}
