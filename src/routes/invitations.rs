use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use entity::sea_orm_active_enums::UserRole;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::{
    app_state::AppState,
    error::{ApiError, AppJson, Result},
    middleware::UserIdentity,
    models::{
        common::SuccessResponse,
        invitations::{
            CreateInvitationRequest, InvitationData, RespondData, RespondInvitationRequest,
        },
    },
};

/// POST /api/v1/classes/{class_id}/invitations
///
/// Request body:
/// ```json
/// { "customerId": "7c1f...", "message": "Saved you a mat by the window" }
/// ```
#[instrument(skip(state, request))]
pub async fn create_invitation(
    State(state): State<AppState>,
    identity: UserIdentity,
    Path(class_id): Path<Uuid>,
    AppJson(request): AppJson<CreateInvitationRequest>,
) -> Result<(StatusCode, Json<SuccessResponse<InvitationData>>)> {
    identity.require_role(UserRole::Instructor)?;
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let invitation = state
        .invitation_service
        .create_invitation(
            identity.user_id,
            request.customer_id,
            class_id,
            request.message,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new(invitation.into())),
    ))
}

/// GET /api/v1/classes/{class_id}/invitations
#[instrument(skip(state))]
pub async fn list_class_invitations(
    State(state): State<AppState>,
    identity: UserIdentity,
    Path(class_id): Path<Uuid>,
) -> Result<Json<SuccessResponse<Vec<InvitationData>>>> {
    identity.require_role(UserRole::Instructor)?;

    let invitations = state
        .invitation_service
        .list_for_class(identity.user_id, class_id)
        .await?;

    Ok(Json(SuccessResponse::new(
        invitations.into_iter().map(Into::into).collect(),
    )))
}

/// GET /api/v1/invitations
#[instrument(skip(state))]
pub async fn list_my_invitations(
    State(state): State<AppState>,
    identity: UserIdentity,
) -> Result<Json<SuccessResponse<Vec<InvitationData>>>> {
    let invitations = state
        .invitation_service
        .list_for_customer(identity.user_id)
        .await?;

    Ok(Json(SuccessResponse::new(
        invitations.into_iter().map(Into::into).collect(),
    )))
}

/// PUT /api/v1/invitations/{invitation_id}
///
/// Request body: `{ "decision": "accepted" }` or `{ "decision": "declined" }`.
/// Accepting books the seat in the same step.
#[instrument(skip(state, request))]
pub async fn respond_to_invitation(
    State(state): State<AppState>,
    identity: UserIdentity,
    Path(invitation_id): Path<Uuid>,
    AppJson(request): AppJson<RespondInvitationRequest>,
) -> Result<Json<SuccessResponse<RespondData>>> {
    let outcome = state
        .invitation_service
        .respond(identity.user_id, invitation_id, request.decision)
        .await?;

    let (booking, balance) = match outcome.booking {
        Some(receipt) => (Some(receipt.booking.into()), Some(receipt.balance)),
        None => (None, None),
    };

    Ok(Json(SuccessResponse::new(RespondData {
        invitation: outcome.invitation.into(),
        booking,
        balance,
    })))
}
