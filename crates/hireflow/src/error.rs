use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::candidates::router::error_response;
use crate::workflows::candidates::WorkflowServiceError;
use crate::workflows::roster::RosterImportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("roster import error: {0}")]
    Roster(#[from] RosterImportError),
    #[error("workflow error: {0}")]
    Workflow(#[from] WorkflowServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match self {
            AppError::Workflow(err) | AppError::Roster(RosterImportError::Registration(err)) => {
                return error_response(err)
            }
            AppError::Roster(_) => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_roster"),
            AppError::Config(_) | AppError::Telemetry(_) | AppError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal")
            }
        };

        let body = Json(json!({ "error": kind, "message": self.to_string() }));
        (status, body).into_response()
    }
}
