use std::{fmt, io};

use actix_web::{body, http::StatusCode, HttpResponse};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// One rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Every field that failed validation, collected in a single pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub fields: Vec<FieldError>,
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::default();
        err.push(field, message);
        err
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for FieldError { field, message } in &self.fields {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Also used when the row exists but belongs to someone else
    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("report storage error: {0}")]
    Storage(#[from] io::Error),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("blocking task error")]
    Blocking(#[from] actix_web::error::BlockingError),
}

impl ApiError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(ValidationError::single(field, message))
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "no_fields")]
    fields: &'a [FieldError],
}

fn no_fields(fields: &&[FieldError]) -> bool {
    fields.is_empty()
}

impl actix_web::error::ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse<body::BoxBody> {
        let status = self.status_code();

        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        let (error, fields) = match self {
            ApiError::Validation(err) => ("validation failed".to_string(), err.fields.as_slice()),
            // Internals stay in the log
            _ if status.is_server_error() => ("internal server error".to_string(), &[][..]),
            _ => (self.to_string(), &[][..]),
        };

        HttpResponse::build(status).json(ErrorBody { error, fields })
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Storage(_) | ApiError::Database(_) | ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
