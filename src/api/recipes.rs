use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::api::{ApiResult, AppState, DetailedQuery};
use crate::db::recipe;

/// `GET /recipes[?detailed=bool]`
pub async fn handle_list(
    State(state): State<AppState>,
    query: Result<Query<DetailedQuery>, QueryRejection>,
) -> ApiResult<Response> {
    let Query(query) = query?;
    if query.is_detailed()? {
        Ok(Json(recipe::get_all_detailed(&state.db).await?).into_response())
    } else {
        Ok(Json(recipe::get_all(&state.db).await?).into_response())
    }
}
