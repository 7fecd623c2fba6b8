use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::mapping::MappingError;
use crate::workflows::pipeline::PipelineError;
use crate::workflows::submission::PayrollError;
use crate::workflows::waiting_events::ImportError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Import(ImportError),
    Mapping(MappingError),
    Payroll(PayrollError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Mapping(MappingError::Unmapped { .. } | MappingError::Invalid(_)) => {
                StatusCode::BAD_REQUEST
            }
            AppError::Mapping(
                MappingError::NotFound(_)
                | MappingError::UnknownLegalEntity(_)
                | MappingError::UnknownPrefix(_),
            ) => StatusCode::NOT_FOUND,
            AppError::Mapping(MappingError::Conflict { .. }) => StatusCode::CONFLICT,
            AppError::Payroll(PayrollError::Unauthorized(_) | PayrollError::Transport(_)) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Payroll(PayrollError::Rejected(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Mapping(MappingError::Store(_))
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Mapping(err) => write!(f, "{}", err),
            AppError::Payroll(err) => write!(f, "payroll error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Mapping(err) => Some(err),
            AppError::Payroll(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            AppError::Mapping(MappingError::Unmapped {
                legal_entity_id,
                pay_element_ids,
            }) => Json(json!({
                "error": self.to_string(),
                "legal_entity_id": legal_entity_id,
                "unmapped_pay_elements": pay_element_ids,
            })),
            _ => Json(json!({ "error": self.to_string() })),
        };
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ImportError> for AppError {
    fn from(value: ImportError) -> Self {
        Self::Import(value)
    }
}

impl From<MappingError> for AppError {
    fn from(value: MappingError) -> Self {
        Self::Mapping(value)
    }
}

impl From<PayrollError> for AppError {
    fn from(value: PayrollError) -> Self {
        Self::Payroll(value)
    }
}

impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        match value {
            PipelineError::Import(err) => Self::Import(err),
            PipelineError::Mapping(err) => Self::Mapping(err),
        }
    }
}
