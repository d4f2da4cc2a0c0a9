use std::collections::BTreeMap;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use validator::ValidationErrors;

/// Field name -> messages, the shape reported for every validation failure.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("validation failed")]
    Validation { status: StatusCode, errors: FieldErrors },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(DbErr),
}

impl AppError {
    pub fn invalid(status: StatusCode, errors: &ValidationErrors) -> Self {
        AppError::Validation { status, errors: field_errors(errors) }
    }
}

pub fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages = errs
                .iter()
                .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
                .collect();
            (field.to_string(), messages)
        })
        .collect()
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        // the row went away between lookup and write
        if matches!(err, DbErr::RecordNotUpdated) {
            return AppError::NotFound("record");
        }

        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(msg)) => return AppError::Conflict(msg),
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => return AppError::Conflict(msg),
            _ => {},
        }

        // sqlite does not always surface the extended result code
        let text = err.to_string();
        for marker in ["UNIQUE constraint failed", "FOREIGN KEY constraint failed"] {
            if text.contains(marker) {
                return AppError::Conflict(marker.to_string());
            }
        }

        AppError::Database(err)
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        AppError::invalid(StatusCode::BAD_REQUEST, &errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
struct ValidationProblem<'a> {
    title: &'static str,
    status: u16,
    errors: &'a FieldErrors,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND.into_response(),
            AppError::Validation { status, errors } => {
                let body = ValidationProblem {
                    title: "One or more validation errors occurred.",
                    status: status.as_u16(),
                    errors: &errors,
                };
                (status, Json(body)).into_response()
            },
            AppError::BadRequest(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response()
            },
            AppError::Conflict(error) => {
                tracing::warn!(%error, "store constraint violation");
                (StatusCode::CONFLICT, Json(ErrorBody { error })).into_response()
            },
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                let error = "a database error occurred".to_string();
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error })).into_response()
            },
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_messages_become_conflicts() {
        let err = DbErr::Custom("error returned from database: (code: 787) FOREIGN KEY constraint failed".into());
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));

        let err = DbErr::Custom("UNIQUE constraint failed: sessions.movie_id, sessions.theater_id".into());
        assert!(matches!(AppError::from(err), AppError::Conflict(_)));
    }

    #[test]
    fn lost_update_target_is_not_found() {
        assert!(matches!(AppError::from(DbErr::RecordNotUpdated), AppError::NotFound(_)));
    }

    #[test]
    fn other_database_errors_stay_internal() {
        let err = DbErr::Custom("disk I/O error".into());
        assert!(matches!(AppError::from(err), AppError::Database(_)));
    }

    #[test]
    fn status_codes() {
        assert_eq!(AppError::NotFound("movie").into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Conflict("dup".into()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database(DbErr::Custom("boom".into())).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let invalid = AppError::Validation {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            errors: FieldErrors::new(),
        };
        assert_eq!(invalid.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
