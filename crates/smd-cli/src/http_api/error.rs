//! JSON error responses: `{"error": "..."}` with the status each core error maps to.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use smd_core::{InfoError, TrackerError, ValidationError};

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.message);
        } else {
            tracing::debug!(status = %self.status, "{}", self.message);
        }
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<TrackerError> for ApiError {
    fn from(e: TrackerError) -> Self {
        let status = match e {
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::IllegalTransition { .. } => StatusCode::CONFLICT,
        };
        Self::new(status, e.to_string())
    }
}

impl From<InfoError> for ApiError {
    fn from(e: InfoError) -> Self {
        let status = match e {
            InfoError::Validation(_) => StatusCode::BAD_REQUEST,
            InfoError::Fetch(_) => StatusCode::BAD_GATEWAY,
            InfoError::TimedOut(_) => StatusCode::GATEWAY_TIMEOUT,
        };
        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        Self::bad_request(format!("invalid request body: {}", e.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        Self::new(e.status(), format!("invalid query: {}", e.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(e: PathRejection) -> Self {
        Self::new(e.status(), format!("invalid path: {}", e.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use smd_core::fetcher::FetchError;
    use smd_core::{JobId, JobStatus};

    use super::*;

    #[test]
    fn info_errors_map_to_gateway_statuses() {
        let timed_out = ApiError::from(InfoError::TimedOut(Duration::from_secs(60)));
        assert_eq!(timed_out.status, StatusCode::GATEWAY_TIMEOUT);
        let fetch = ApiError::from(InfoError::Fetch(FetchError::Network("reset".into())));
        assert_eq!(fetch.status, StatusCode::BAD_GATEWAY);
        let invalid = ApiError::from(InfoError::Validation(ValidationError::EmptyUrl));
        assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn tracker_errors_map_to_404_and_409() {
        let id = JobId::new_v4();
        assert_eq!(ApiError::from(TrackerError::NotFound(id)).status, StatusCode::NOT_FOUND);
        let conflict = ApiError::from(TrackerError::IllegalTransition {
            id,
            from: JobStatus::Completed,
            to: JobStatus::Error,
        });
        assert_eq!(conflict.status, StatusCode::CONFLICT);
    }
}
