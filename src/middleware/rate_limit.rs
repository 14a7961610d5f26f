//! Rate limiting middleware using Redis
//!
//! Sliding-window counter per user, with limits chosen by role. Applied to
//! the endpoints that write (bookings, invitations, purchases).

use crate::{
    config::RateLimitSettings,
    error::{ApiError, Result},
    middleware::jwt_auth::UserIdentity,
};
use axum::{extract::Request, middleware::Next, response::Response};
use entity::sea_orm_active_enums::UserRole;
use redis::{AsyncCommands, Client};
use std::sync::Arc;
use tracing::{debug, warn};

/// Requests allowed per window for a role
pub fn limit_for_role(settings: &RateLimitSettings, role: UserRole) -> u32 {
    match role {
        UserRole::Customer => settings.customer_rpm,
        UserRole::Instructor | UserRole::Admin => settings.instructor_rpm,
    }
}

/// Rate limiting middleware
///
/// Returns 429 Too Many Requests when the caller's window is full.
pub fn rate_limit_middleware(
    redis_client: Arc<Client>,
    settings: RateLimitSettings,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response>> + Send>>
       + Clone {
    move |request: Request, next: Next| {
        let redis_client = redis_client.clone();
        let settings = settings.clone();

        Box::pin(async move {
            // Set by jwt_auth_middleware, which must run first
            let identity = request
                .extensions()
                .get::<UserIdentity>()
                .copied()
                .ok_or_else(|| {
                    ApiError::Internal(anyhow::anyhow!(
                        "Rate limit middleware requires jwt_auth_middleware"
                    ))
                })?;

            let limit = limit_for_role(&settings, identity.role);

            let allowed = check_rate_limit(
                &redis_client,
                &identity.user_id.to_string(),
                limit,
                settings.window_seconds,
            )
            .await?;

            if !allowed {
                warn!(
                    "Rate limit exceeded for user: {} (role: {:?})",
                    identity.user_id, identity.role
                );
                return Err(ApiError::RateLimitExceeded);
            }

            debug!(
                "Rate limit check passed for user: {} (role: {:?})",
                identity.user_id, identity.role
            );

            Ok(next.run(request).await)
        })
    }
}

/// Check rate limit using Redis sliding window counter
///
/// Returns true if request is allowed, false if rate limit exceeded.
async fn check_rate_limit(
    redis_client: &Client,
    user_id: &str,
    limit: u32,
    window_seconds: u32,
) -> Result<bool> {
    let mut conn = redis_client
        .get_multiplexed_async_connection()
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis connection failed: {}", e)))?;

    let now = time::OffsetDateTime::now_utc().unix_timestamp();

    let key = format!("rate_limit:user:{}", user_id);
    let window_start = now - i64::from(window_seconds);

    // Sorted set scored by timestamp; drop entries outside the window
    let _: () = conn
        .zrembyscore(&key, 0, window_start as f64)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis ZREMRANGEBYSCORE failed: {}", e)))?;

    let count: u32 = conn
        .zcard(&key)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis ZCARD failed: {}", e)))?;

    if count >= limit {
        return Ok(false);
    }

    let member = format!("{}:{}", now, uuid::Uuid::new_v4());
    let _: () = conn
        .zadd(&key, member, now as f64)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis ZADD failed: {}", e)))?;

    // Expire the key a little after the window closes
    let _: () = conn
        .expire(&key, i64::from(window_seconds) + 10)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Redis EXPIRE failed: {}", e)))?;

    Ok(true)
}

/// Create the rate limit middleware from configured settings
pub fn create_rate_limiter(
    redis_client: Arc<Client>,
    settings: RateLimitSettings,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response>> + Send>>
       + Clone {
    rate_limit_middleware(redis_client, settings)
}
