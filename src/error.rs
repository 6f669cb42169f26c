use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};

/// Failure kinds surfaced by the gig and bid operations.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// Malformed input (field length or range).
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    /// No verified identity was supplied.
    #[error("{0}")]
    Unauthorized(String),
    /// The actor lacks permission for the target entity.
    #[error("{0}")]
    Forbidden(String),
    /// The entity's lifecycle state does not allow the operation.
    #[error("{0}")]
    InvalidState(String),
    /// Uniqueness violation, e.g. a second bid from the same freelancer.
    #[error("{0}")]
    Conflict(String),
    /// Storage failure. The driver message stays in the logs and never
    /// reaches the response body.
    #[error("Internal server error")]
    Database(#[from] DbErr),
}

impl MarketError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Unauthorized(_) | Self::Forbidden(_) => "authorization",
            Self::InvalidState(_) => "invalid_state",
            Self::Conflict(_) => "conflict",
            Self::Database(_) => "internal",
        }
    }

    /// Maps a unique-index violation to `Conflict`, keeping every other
    /// database error as is.
    pub fn from_insert(err: DbErr, conflict_message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Self::Conflict(conflict_message.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

impl ResponseError for MarketError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InvalidState(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let Self::Database(e) = self {
            tracing::error!(error = %e, "storage failure");
        }

        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        }))
    }
}

pub type MarketResult<T> = Result<T, MarketError>;
