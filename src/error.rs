use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    PolicyDenied(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("database error")]
    Database(#[from] sqlx::Error),
    #[error("environment variable error")]
    Env(#[from] env::VarError),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_policy_denied(&self) -> bool {
        matches!(self, Self::PolicyDenied(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

pub fn not_found(entity: &'static str) -> Error {
    Error::NotFound(entity)
}

pub fn policy_denied(message: impl Into<String>) -> Error {
    Error::PolicyDenied(message.into())
}

pub fn conflict(message: impl Into<String>) -> Error {
    Error::Conflict(message.into())
}

pub fn validation(message: impl Into<String>) -> Error {
    Error::Validation(message.into())
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::PolicyDenied(_) => StatusCode::FORBIDDEN,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::Database(_) | Error::Env(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self {
            Error::Database(_) | Error::Env(_) => "internal server error".into(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
