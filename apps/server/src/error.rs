//! Server error type and its HTTP rendering

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use pacientes_models::ValidationFailure;
use serde::Serialize;

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) const CPF_TAKEN: &str = "CPF já cadastrado.";
pub(crate) const CPF_TAKEN_BY_OTHER: &str = "CPF já cadastrado para outro paciente.";
const VALIDATION_MESSAGE: &str = "Erro de validação. Verifique os campos.";
const INTERNAL_MESSAGE: &str = "Ocorreu um erro interno inesperado no servidor.";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Erro de validação. Verifique os campos.")]
    Validation(#[from] ValidationFailure),

    #[error("{0}")]
    BadRequest(String),

    /// Body rejected before parsing: 413 or 415.
    #[error("{1}")]
    Rejected(StatusCode, String),

    #[error("Acesso negado. Você precisa estar autenticado para realizar esta operação.")]
    Unauthenticated,

    #[error("Acesso negado. Você não tem permissão para realizar esta operação.")]
    Forbidden,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("Método não suportado para este recurso.")]
    MethodNotAllowed,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn patient_not_found(id: i64) -> Self {
        Error::NotFound(format!("Paciente não encontrado com id: {id}"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::Rejected(status, _) => *status,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::AlreadyExists(_) => StatusCode::CONFLICT,
            Error::Database(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Server-side failures never leak their detail.
    fn client_message(&self) -> String {
        match self {
            Error::Validation(_) => VALIDATION_MESSAGE.to_string(),
            Error::Database(_) | Error::Internal(_) => INTERNAL_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

/// JSON body of every 4xx/5xx response.
///
/// `path` is filled in by [`crate::api::middleware::error_path_middleware`],
/// which is the only layer that still sees the request URI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    pub timestamp: DateTime<Utc>,
    pub status: u16,
    pub error: String,
    pub message: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<BTreeMap<String, String>>,
}

impl ApiErrorResponse {
    pub fn into_response_with_path(mut self, path: &str) -> Response {
        self.path = path.to_string();
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Error::Database(e) => tracing::error!(error = %e, "Database error"),
            Error::Internal(msg) => tracing::error!(error = %msg, "Internal server error"),
            _ => tracing::debug!(status = status.as_u16(), error = %self, "Request failed"),
        }

        let message = self.client_message();
        let validation_errors = match self {
            Error::Validation(failure) => Some(failure.into_field_errors()),
            _ => None,
        };

        let body = ApiErrorResponse {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            path: String::new(),
            validation_errors,
        };

        let mut response = (status, Json(body.clone())).into_response();
        response.extensions_mut().insert(body);
        response
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        // Unparseable and mistyped bodies are both plain 400s.
        match rejection.status() {
            status @ (StatusCode::PAYLOAD_TOO_LARGE | StatusCode::UNSUPPORTED_MEDIA_TYPE) => {
                Error::Rejected(status, rejection.body_text())
            }
            _ => Error::BadRequest(rejection.body_text()),
        }
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            Error::Validation(ValidationFailure::new()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(Error::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(Error::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(Error::patient_not_found(3).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            Error::AlreadyExists(CPF_TAKEN.to_string()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            Error::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = Error::Internal("connection reset by peer".to_string());
        assert_eq!(err.client_message(), INTERNAL_MESSAGE);
    }

    #[test]
    fn not_found_message_names_the_id() {
        assert_eq!(
            Error::patient_not_found(42).client_message(),
            "Paciente não encontrado com id: 42"
        );
    }

    #[test]
    fn error_response_carries_body_extension() {
        let mut failure = ValidationFailure::new();
        failure.add("fullName", "Nome não pode ser nulo ou vazio");

        let response = Error::Validation(failure).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = response
            .extensions()
            .get::<ApiErrorResponse>()
            .expect("error body extension");
        assert_eq!(body.message, VALIDATION_MESSAGE);
        assert_eq!(body.error, "Bad Request");
        assert_eq!(
            body.validation_errors
                .as_ref()
                .and_then(|m| m.get("fullName"))
                .map(String::as_str),
            Some("Nome não pode ser nulo ou vazio")
        );
    }

    #[test]
    fn rejection_keeps_its_status() {
        let err = Error::Rejected(StatusCode::PAYLOAD_TOO_LARGE, "too big".to_string());
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.client_message(), "too big");

        let body = err.into_response();
        let body = body.extensions().get::<ApiErrorResponse>().unwrap();
        assert_eq!(body.status, 413);
        assert_eq!(body.error, "Payload Too Large");
    }

    #[test]
    fn method_not_allowed_is_405() {
        assert_eq!(
            Error::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[test]
    fn validation_errors_omitted_for_other_kinds() {
        let response = Error::patient_not_found(1).into_response();
        let body = response.extensions().get::<ApiErrorResponse>().unwrap();
        let json = serde_json::to_value(body).unwrap();
        assert!(json.get("validationErrors").is_none());
        assert_eq!(json["status"], 404);
    }
}
