use axum::http::StatusCode;
use axum::response::IntoResponse;

/// ApiError is the fundamental error type returned by the API. Every
/// variant maps onto one status code, and every response body is the
/// same `{"message": ...}` shape.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed required input. Local and user-fixable.
    #[error("{0}")]
    Validation(String),
    /// Missing, expired, or unusable credentials.
    #[error("{0}")]
    Unauthenticated(String),
    /// Authenticated but not permitted: role or ownership denial, or a
    /// token that fails signature checks.
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    /// Duplicate value for a unique key.
    #[error("{0}")]
    Conflict(String),
    /// The store failed in a way the caller cannot act on. Logged in
    /// full, surfaced generically.
    #[error("Internal server error.")]
    Dependency(#[from] sqlx::Error),
    /// Any other unrecoverable failure. Logged in full, surfaced
    /// generically.
    #[error("Internal server error.")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Dependency(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            ApiError::Dependency(error) => {
                tracing::error!(?error, "API responding with database error");
            }
            ApiError::Internal(error) => {
                tracing::error!(?error, "API responding with internal error");
            }
            _ => (),
        }
        let body = axum::Json(serde_json::json!({ "message": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}

impl From<crate::authz::UpdateDenied> for ApiError {
    fn from(denied: crate::authz::UpdateDenied) -> Self {
        use crate::authz::UpdateDenied;
        match denied {
            UpdateDenied::NothingToUpdate => ApiError::Validation(denied.to_string()),
            UpdateDenied::FieldNotAllowed | UpdateDenied::StatusNotAllowed => {
                ApiError::Forbidden(denied.to_string())
            }
        }
    }
}

/// Maps a write error onto a conflict with the given message when the
/// store reports a unique violation, and passes everything else
/// through.
pub fn on_unique_violation(message: &str) -> impl Fn(sqlx::Error) -> ApiError + '_ {
    move |err| {
        if verdant_sql::is_unique_violation(&err) {
            ApiError::Conflict(message.to_string())
        } else {
            err.into()
        }
    }
}

/// Maps a write error onto a not-found with the given message when the
/// store reports a foreign-key violation, and passes everything else
/// through.
pub fn on_missing_reference(message: &str) -> impl Fn(sqlx::Error) -> ApiError + '_ {
    move |err| {
        if verdant_sql::is_foreign_key_violation(&err) {
            ApiError::NotFound(message.to_string())
        } else {
            err.into()
        }
    }
}
