use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_state::AppState,
    error::Result,
    middleware::UserIdentity,
    models::{
        attendees::Attendee,
        bookings::{BookData, BookingSummary},
        common::SuccessResponse,
    },
};

/// POST /api/v1/classes/{class_id}/bookings
///
/// Books one seat for the caller and debits the class price.
#[instrument(skip(state))]
pub async fn book_class(
    State(state): State<AppState>,
    identity: UserIdentity,
    Path(class_id): Path<Uuid>,
) -> Result<(StatusCode, Json<SuccessResponse<BookData>>)> {
    let receipt = state
        .booking_service
        .book(identity.user_id, class_id)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(BookData {
            booking: receipt.booking.into(),
            balance: receipt.balance,
        })),
    ))
}

/// GET /api/v1/bookings
#[instrument(skip(state))]
pub async fn list_my_bookings(
    State(state): State<AppState>,
    identity: UserIdentity,
) -> Result<Json<SuccessResponse<Vec<BookingSummary>>>> {
    let bookings = state
        .booking_service
        .list_bookings(identity.user_id)
        .await?;

    Ok(Json(SuccessResponse::new(bookings)))
}

/// GET /api/v1/classes/{class_id}/attendees
#[instrument(skip(state))]
pub async fn list_attendees(
    State(state): State<AppState>,
    identity: UserIdentity,
    Path(class_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<Vec<Attendee>>>> {
    let attendees = state
        .attendee_service
        .list_attendees(identity.user_id, identity.role, class_id)
        .await?;

    Ok(Json(SuccessResponse::new(attendees)))
}
