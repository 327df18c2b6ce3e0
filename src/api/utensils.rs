use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::{ApiError, ApiResult, AppState};
use crate::db::{self, step, utensil};
use crate::model::{DetailedStep, Utensil, UtensilData};

const NOT_FOUND: &str = "Utensil not found";

async fn require(state: &AppState, id: i64) -> ApiResult<Utensil> {
    utensil::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// `GET /utensils`
pub async fn handle_list(State(state): State<AppState>) -> ApiResult<Json<Vec<Utensil>>> {
    Ok(Json(utensil::get_all(&state.db).await?))
}

/// `POST /utensils`
pub async fn handle_create(
    State(state): State<AppState>,
    body: Result<Json<UtensilData>, JsonRejection>,
) -> ApiResult<Json<Utensil>> {
    let Json(data) = body?;
    data.validate()?;

    let id = utensil::create(&state.db, data.clone()).await?;
    log::info!("Created utensil {}", id);
    Ok(Json(data.with_id(id)))
}

/// `GET /utensils/:id`
pub async fn handle_get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Utensil>> {
    let Path(id) = path?;
    Ok(Json(require(&state, id).await?))
}

/// `PUT /utensils/:id`
pub async fn handle_update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UtensilData>, JsonRejection>,
) -> ApiResult<Json<Utensil>> {
    let Path(id) = path?;
    let Json(data) = body?;
    data.validate()?;
    if data.id.is_some_and(|body_id| body_id != id) {
        return Err(ApiError::bad_request("\"id\" must match the path"));
    }

    require(&state, id).await?;
    let updated = data.with_id(id);
    utensil::update(&state.db, updated.clone()).await?;
    Ok(Json(updated))
}

/// `DELETE /utensils/:id`
pub async fn handle_delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    let deleted = utensil::destroy(&state.db, id).await?;
    db::expect_single(deleted, "Utensil")?;
    log::info!("Deleted utensil {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /utensils/:id/uses`
pub async fn handle_uses(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<DetailedStep>>> {
    let Path(id) = path?;
    require(&state, id).await?;
    Ok(Json(step::query_detailed_from_utensil(&state.db, id).await?))
}
