/**
 * Error Conversion
 *
 * Converts `ApiError` into an HTTP response. Every handler returns
 * `Result<_, ApiError>`, so this is the single place where failures become
 * wire-visible.
 *
 * # Response Format
 *
 * ```json
 * {
 *   "success": false,
 *   "error": "contact request already pending"
 * }
 * ```
 *
 * Internal errors log their cause here and send only a generic message.
 */

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::error::types::ApiError;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { cause } = &self {
            tracing::error!("internal error: {}", cause);
        }

        let status = self.status_code();
        let body = serde_json::json!({
            "success": false,
            "error": self.client_message(),
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status() {
        let response = ApiError::not_found("no such user").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_response_status() {
        let response = ApiError::internal("pool exhausted").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
