use crate::{
    app_state::AppState,
    error::{ApiError, Result},
    services::jwt_service::JWTService,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use entity::sea_orm_active_enums::UserRole;
use uuid::Uuid;

/// Request extension storing the caller resolved from the bearer token
#[derive(Debug, Clone, Copy)]
pub struct UserIdentity {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl UserIdentity {
    /// Fail with `Forbidden` unless the caller has the given role
    pub fn require_role(&self, role: UserRole) -> Result<()> {
        if self.role == role {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!(
                "This action requires the {:?} role",
                role
            )))
        }
    }
}

/// JWT authentication middleware
///
/// Validates `Authorization: Bearer <token>` and stores the caller's
/// identity in request extensions. Missing or bad tokens are rejected
/// with 401.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let headers = request.headers();

    let auth_header = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthenticated("Missing Authorization header".to_string()))?;

    // Parse "Bearer <token>" format
    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::InvalidToken(
            "Invalid Authorization format, expected 'Bearer <token>'".to_string(),
        )
    })?;

    let claims = state.jwt_service.validate_token(token)?;

    let identity = UserIdentity {
        user_id: JWTService::user_id_from_claims(&claims)?,
        role: JWTService::role_from_claims(&claims)?,
    };

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Axum extractor for user identity
///
/// Only works on routes protected by jwt_auth_middleware.
impl<S> FromRequestParts<S> for UserIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserIdentity>()
            .copied()
            .ok_or_else(|| {
                ApiError::Unauthenticated(
                    "User identity not found - route must be protected by jwt_auth_middleware"
                        .to_string(),
                )
            })
    }
}
