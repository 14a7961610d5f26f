use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{sqlx, DbErr, RuntimeErr, SqlErr};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Token expired")]
    ExpiredToken,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Class {0} does not belong to this instructor")]
    NotOwner(uuid::Uuid),

    #[error("Customer is not subscribed to this instructor")]
    NotSubscribed,

    #[error("An active booking already exists for this class")]
    DuplicateBooking,

    #[error("A pending invitation already exists for this customer and class")]
    DuplicatePending,

    #[error("Class is full: {capacity} of {capacity} seats taken")]
    ClassFull { capacity: i32 },

    #[error("Insufficient credits: need {required}, have {available}")]
    InsufficientFunds { required: i32, available: i32 },

    #[error("Invitation has already been {0}")]
    AlreadyResponded(String),

    #[error("Invitation expired at {0}")]
    Expired(time::OffsetDateTime),

    #[error("Unknown credit package: {0}")]
    UnknownPackage(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// Stable machine-readable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Unauthenticated(_) => "UNAUTHENTICATED",
            ApiError::InvalidToken(_) => "INVALID_TOKEN",
            ApiError::ExpiredToken => "TOKEN_EXPIRED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotOwner(_) => "NOT_OWNER",
            ApiError::NotSubscribed => "NOT_SUBSCRIBED",
            ApiError::DuplicateBooking => "DUPLICATE_BOOKING",
            ApiError::DuplicatePending => "DUPLICATE_PENDING",
            ApiError::ClassFull { .. } => "CLASS_FULL",
            ApiError::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            ApiError::AlreadyResponded(_) => "ALREADY_RESPONDED",
            ApiError::Expired(_) => "INVITATION_EXPIRED",
            ApiError::UnknownPackage(_) => "UNKNOWN_PACKAGE",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::RateLimitExceeded => "RATE_LIMIT_EXCEEDED",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) | ApiError::UnknownPackage(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated(_) | ApiError::InvalidToken(_) | ApiError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden(_) | ApiError::NotOwner(_) | ApiError::NotSubscribed => {
                StatusCode::FORBIDDEN
            }
            ApiError::DuplicateBooking
            | ApiError::DuplicatePending
            | ApiError::ClassFull { .. }
            | ApiError::AlreadyResponded(_)
            | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::InsufficientFunds { .. } => StatusCode::PAYMENT_REQUIRED,
            ApiError::Expired(_) => StatusCode::GONE,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                "An internal database error occurred".to_string()
            }
            ApiError::Internal(ref e) => {
                tracing::error!("Internal error: {:?}", e);
                "An internal error occurred".to_string()
            }
            ApiError::RateLimitExceeded => "Too many requests, please try again later".to_string(),
            ref other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "error": {
                "code": self.code(),
                "message": message,
            }
        });

        (self.status(), Json(body)).into_response()
    }
}

/// JSON body extractor whose rejections use the API error envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Detects unique-index violations (Postgres 23505, SQLite 2067/1555) raised
/// by a concurrent writer that slipped past an in-transaction check.
pub fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }

    // sql_err() only inspects Exec and Query; commits surface as Conn
    match err {
        DbErr::Conn(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Exec(RuntimeErr::SqlxError(sqlx::Error::Database(e)))
        | DbErr::Query(RuntimeErr::SqlxError(sqlx::Error::Database(e))) => matches!(
            e.code().as_deref(),
            Some("23505") | Some("2067") | Some("1555")
        ),
        _ => false,
    }
}

// Helper type for results
pub type Result<T> = std::result::Result<T, ApiError>;
