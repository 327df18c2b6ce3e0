use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::{ApiError, ApiResult, AppState};
use crate::db::{self, ingredient, step};
use crate::model::{DetailedStep, Ingredient, IngredientData, IngredientType};

const NOT_FOUND: &str = "Ingredient not found";

async fn require(state: &AppState, id: i64) -> ApiResult<Ingredient> {
    ingredient::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))
}

/// `GET /ingredients`
pub async fn handle_list(State(state): State<AppState>) -> ApiResult<Json<Vec<Ingredient>>> {
    Ok(Json(ingredient::get_all(&state.db).await?))
}

/// `POST /ingredients`
pub async fn handle_create(
    State(state): State<AppState>,
    body: Result<Json<IngredientData>, JsonRejection>,
) -> ApiResult<Json<Ingredient>> {
    let Json(data) = body?;
    data.validate()?;

    let id = ingredient::create(&state.db, data.clone()).await?;
    log::info!("Created ingredient {}", id);
    Ok(Json(data.with_id(id)))
}

/// `GET /ingredients/:id`
pub async fn handle_get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Ingredient>> {
    let Path(id) = path?;
    Ok(Json(require(&state, id).await?))
}

/// `PUT /ingredients/:id`
pub async fn handle_update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<IngredientData>, JsonRejection>,
) -> ApiResult<Json<Ingredient>> {
    let Path(id) = path?;
    let Json(data) = body?;
    data.validate()?;
    if data.id.is_some_and(|body_id| body_id != id) {
        return Err(ApiError::bad_request("\"id\" must match the path"));
    }

    require(&state, id).await?;
    let updated = data.with_id(id);
    ingredient::update(&state.db, updated.clone()).await?;
    Ok(Json(updated))
}

/// `DELETE /ingredients/:id`
pub async fn handle_delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    let deleted = ingredient::destroy(&state.db, id).await?;
    db::expect_single(deleted, "Ingredient")?;
    log::info!("Deleted ingredient {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /ingredients/:id/outcomes`: steps consuming the ingredient.
pub async fn handle_outcomes(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<DetailedStep>>> {
    let Path(id) = path?;
    if require(&state, id).await?.ingredient_type == IngredientType::End {
        return Err(ApiError::bad_request("End ingredients have no outcomes"));
    }
    Ok(Json(step::query_detailed_from_input(&state.db, id).await?))
}

/// `GET /ingredients/:id/sources`: steps producing the ingredient.
pub async fn handle_sources(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<Vec<DetailedStep>>> {
    let Path(id) = path?;
    if require(&state, id).await?.ingredient_type == IngredientType::Start {
        return Err(ApiError::bad_request("Start ingredients have no sources"));
    }
    Ok(Json(step::query_detailed_from_output(&state.db, id).await?))
}
