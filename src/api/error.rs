//! Translation of store errors and extractor rejections into JSON responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::KitchenError;
use crate::model::SimpleStep;

pub const ENDPOINT_NOT_FOUND: &str = "Endpoint not found";
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflicts: Option<Vec<SimpleStep>>,
}

/// Handler error: a [`KitchenError`] that knows its HTTP status.
#[derive(Debug)]
pub struct ApiError(pub KitchenError);

pub type ApiResult<T> = std::result::Result<T, ApiError>;

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError(KitchenError::NotFound(message.into()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError(KitchenError::InvalidInput(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            KitchenError::NotFound(_) => StatusCode::NOT_FOUND,
            KitchenError::Validation { .. }
            | KitchenError::Conflict(_)
            | KitchenError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<KitchenError> for ApiError {
    fn from(err: KitchenError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

/// Path segments that do not parse (`/ingredients/abc`) match no endpoint.
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        log::debug!("Path rejected: {}", rejection.body_text());
        ApiError::not_found(ENDPOINT_NOT_FOUND)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            KitchenError::NotFound(message)
            | KitchenError::InvalidInput(message)
            | KitchenError::Conflict(message) => ErrorBody {
                message,
                conflicts: None,
            },
            KitchenError::Validation { message, conflicts } => ErrorBody { message, conflicts },
            err => {
                log::error!("500 {}: {}", INTERNAL_SERVER_ERROR, err);
                ErrorBody {
                    message: INTERNAL_SERVER_ERROR.to_string(),
                    conflicts: None,
                }
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Fallback for unknown routes.
pub async fn handle_not_found(uri: Uri) -> ApiError {
    log::error!("404 not found: {}", uri);
    ApiError::not_found(ENDPOINT_NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError(KitchenError::validation("This step already exists")).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(KitchenError::Conflict("Utensil with id 1 already exists".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError(KitchenError::Integrity("2 rows".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_omits_missing_conflicts() {
        let body = ErrorBody { message: "Step not found".to_string(), conflicts: None };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"message": "Step not found"})
        );
    }
}
