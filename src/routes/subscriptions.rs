use axum::{
    extract::{Path, State},
    Json,
};
use entity::sea_orm_active_enums::UserRole;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    error::Result,
    middleware::UserIdentity,
    models::{
        common::SuccessResponse,
        subscriptions::{Subscriber, SubscriptionData, SubscriptionStatusData},
    },
};

/// GET /api/v1/instructors/{instructor_id}/subscription
#[instrument(skip(state))]
pub async fn get_subscription(
    State(state): State<AppState>,
    identity: UserIdentity,
    Path(instructor_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<SubscriptionStatusData>>> {
    let subscribed = state
        .subscription_service
        .is_subscribed(instructor_id, identity.user_id)
        .await?;

    Ok(Json(SuccessResponse::new(SubscriptionStatusData {
        instructor_id,
        subscribed,
    })))
}

/// POST /api/v1/instructors/{instructor_id}/subscription
#[instrument(skip(state))]
pub async fn subscribe(
    State(state): State<AppState>,
    identity: UserIdentity,
    Path(instructor_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<SubscriptionData>>> {
    identity.require_role(UserRole::Customer)?;

    let subscription = state
        .subscription_service
        .subscribe(instructor_id, identity.user_id)
        .await?;

    Ok(Json(SuccessResponse::new(subscription.into())))
}

/// DELETE /api/v1/instructors/{instructor_id}/subscription
#[instrument(skip(state))]
pub async fn unsubscribe(
    State(state): State<AppState>,
    identity: UserIdentity,
    Path(instructor_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<SubscriptionData>>> {
    let subscription = state
        .subscription_service
        .unsubscribe(instructor_id, identity.user_id)
        .await?;

    Ok(Json(SuccessResponse::new(subscription.into())))
}

/// GET /api/v1/subscribers
#[instrument(skip(state))]
pub async fn list_subscribers(
    State(state): State<AppState>,
    identity: UserIdentity,
) -> Result<Json<SuccessResponse<Vec<Subscriber>>>> {
    identity.require_role(UserRole::Instructor)?;

    let subscribers = state
        .subscription_service
        .list_subscribers(identity.user_id)
        .await?;

    Ok(Json(SuccessResponse::new(subscribers)))
}
