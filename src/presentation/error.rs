// Maps domain errors onto HTTP responses
use crate::domain::error::DashboardError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    #[cfg(test)]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<DashboardError> for ApiError {
    fn from(err: DashboardError) -> Self {
        let status = match &err {
            DashboardError::NotFound(_) => StatusCode::NOT_FOUND,
            DashboardError::Resolution(_) => StatusCode::UNPROCESSABLE_ENTITY,
            DashboardError::Validation(_) => StatusCode::BAD_REQUEST,
            DashboardError::Conflict(_) => StatusCode::CONFLICT,
            DashboardError::Transport(_) => StatusCode::BAD_GATEWAY,
            DashboardError::StateCorruption { .. }
            | DashboardError::Database(_)
            | DashboardError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "Request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DashboardError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (DashboardError::Resolution("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (DashboardError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (DashboardError::Conflict("x".into()), StatusCode::CONFLICT),
            (DashboardError::Transport("x".into()), StatusCode::BAD_GATEWAY),
            (DashboardError::corrupt("log", "x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status(), expected);
        }
    }
}
