use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::{ApiResult, AppState};
use crate::config::Environment;
use crate::db::{ingredient, recipe, step, utensil};

#[derive(Debug, Serialize)]
pub struct GraphStats {
    pub ingredients: i64,
    pub utensils: i64,
    pub steps: i64,
    pub recipes: i64,
}

#[derive(Debug, Serialize)]
pub struct ApiInfo {
    pub environment: Environment,
    pub version: &'static str,
    pub stats: GraphStats,
}

/// `GET /`
pub async fn handle_index(State(state): State<AppState>) -> ApiResult<Json<ApiInfo>> {
    let db = &state.db;
    let (ingredients, utensils, steps, recipes) = tokio::try_join!(
        ingredient::count(db),
        utensil::count(db),
        step::count(db),
        recipe::count(db),
    )?;

    Ok(Json(ApiInfo {
        environment: state.environment,
        version: env!("CARGO_PKG_VERSION"),
        stats: GraphStats {
            ingredients,
            utensils,
            steps,
            recipes,
        },
    }))
}
