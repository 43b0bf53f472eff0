use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use juris_core::error::AppError;
use juris_core::models::SearchResponse;

use crate::dto::{ErrorResponse, SearchResponseBody};

/// Wrapper so we can implement `IntoResponse` for `AppError`.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Rejected searches keep the search body shape so clients parse one format.
        if let AppError::Validation(message) = &self.0 {
            let body = SearchResponseBody::from(SearchResponse::rejected(message.clone()));
            return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
        }

        let body = ErrorResponse {
            error: "internal_error".to_string(),
            message: self.0.to_string(),
        };

        (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(body)).into_response()
    }
}
