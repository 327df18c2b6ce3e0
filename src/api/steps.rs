use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::error::ENDPOINT_NOT_FOUND;
use crate::api::{ApiError, ApiResult, AppState, DetailedQuery};
use crate::db::{self, step};
use crate::error::KitchenError;
use crate::model::{DetailedStep, SimpleStep};
use crate::validator;

const NOT_FOUND: &str = "Step not found";

/// `GET /steps[?detailed=bool]`
pub async fn handle_list(
    State(state): State<AppState>,
    query: Result<Query<DetailedQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    if query.is_detailed()? {
        Ok(Json(step::get_all_detailed(&state.db).await?).into_response())
    } else {
        Ok(Json(step::get_all(&state.db).await?).into_response())
    }
}

/// `POST /steps`: validate, store, and return the expanded step.
pub async fn handle_create(
    State(state): State<AppState>,
    body: Result<Json<SimpleStep>, JsonRejection>,
) -> ApiResult<Json<DetailedStep>> {
    let Json(candidate) = body?;

    validator::create_step(&state.db, candidate).await?;
    log::info!(
        "Created step {}-{}-{}",
        candidate.input,
        candidate.utensil,
        candidate.output
    );

    let created = step::get_detailed(&state.db, candidate).await?.ok_or_else(|| {
        KitchenError::Integrity(format!("Step {:?} vanished right after creation", candidate))
    })?;
    Ok(Json(created))
}

/// `GET /steps/:input-:utensil-:output[?detailed=bool]`
pub async fn handle_get(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: Result<Query<DetailedQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Path(triple) = path?;
    let key = SimpleStep::parse_triple(&triple).ok_or_else(|| ApiError::not_found(ENDPOINT_NOT_FOUND))?;
    let Query(query) = query?;

    let found = if query.is_detailed()? {
        step::get_detailed(&state.db, key).await?.map(|s| Json(s).into_response())
    } else {
        step::get(&state.db, key).await?.map(|s| Json(s).into_response())
    };
    found.ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// `DELETE /steps` with the triple as body.
pub async fn handle_delete(
    State(state): State<AppState>,
    body: Result<Json<SimpleStep>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(key) = body?;
    let deleted = step::destroy(&state.db, key).await?;
    db::expect_single(deleted, "Step")?;
    Ok(StatusCode::NO_CONTENT)
}
