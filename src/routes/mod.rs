// Route modules
pub mod bookings;
pub mod credits;
pub mod invitations;
pub mod subscriptions;

use crate::{
    app_state::AppState,
    error::Result,
    middleware::{create_rate_limiter, jwt_auth_middleware, logging_middleware},
    models::common::{MessageResponse, SuccessResponse},
};
use axum::{
    extract::State,
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .nest("/api/v1", api_v1_routes(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(timeout))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// API v1 routes
fn api_v1_routes(state: AppState) -> Router<AppState> {
    // Writes: authentication plus per-role rate limiting
    let mut protected_routes = Router::new()
        .route("/classes/{class_id}/bookings", post(bookings::book_class))
        .route(
            "/classes/{class_id}/invitations",
            post(invitations::create_invitation),
        )
        .route(
            "/invitations/{invitation_id}",
            put(invitations::respond_to_invitation),
        )
        .route("/credits/purchase", post(credits::purchase_credits));

    if state.config.rate_limit.enabled {
        let rate_limiter =
            create_rate_limiter(state.redis.clone(), state.config.rate_limit.clone());
        protected_routes = protected_routes.route_layer(middleware::from_fn(rate_limiter));
    }

    // Auth is layered last so it runs before the limiter
    let protected_routes = protected_routes.layer(middleware::from_fn_with_state(
        state.clone(),
        jwt_auth_middleware,
    ));

    // Reads and subscription toggles (no rate limiting, require JWT)
    let auth_only_routes = Router::new()
        .route("/credits/balance", get(credits::get_balance))
        .route("/credits/transactions", get(credits::list_transactions))
        .route("/credits/audit", get(credits::audit_balance))
        .route("/bookings", get(bookings::list_my_bookings))
        .route(
            "/classes/{class_id}/attendees",
            get(bookings::list_attendees),
        )
        .route(
            "/classes/{class_id}/invitations",
            get(invitations::list_class_invitations),
        )
        .route("/invitations", get(invitations::list_my_invitations))
        .route(
            "/instructors/{instructor_id}/subscription",
            get(subscriptions::get_subscription)
                .post(subscriptions::subscribe)
                .delete(subscriptions::unsubscribe),
        )
        .route("/subscribers", get(subscriptions::list_subscribers))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/credits/packages", get(credits::list_packages));

    // Combine all routes with request/response body logging
    Router::new()
        .merge(protected_routes)
        .merge(auth_only_routes)
        .merge(public_routes)
        .layer(middleware::from_fn(logging_middleware))
}

/// GET /api/v1/health
async fn health(State(state): State<AppState>) -> Result<Json<SuccessResponse<MessageResponse>>> {
    state.db.ping().await?;
    Ok(Json(SuccessResponse::new(MessageResponse::new("ok"))))
}
