use entity::{class_invitations, sea_orm_active_enums::InvitationStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::bookings::BookingData;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInvitationRequest {
    pub customer_id: Uuid,

    #[validate(length(max = 500))]
    pub message: Option<String>,
}

/// The two answers a customer can give; expiry is never requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationDecision {
    #[serde(alias = "accept")]
    Accepted,
    #[serde(alias = "decline")]
    Declined,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondInvitationRequest {
    pub decision: InvitationDecision,
}

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct InvitationData {
    pub id: Uuid,
    pub instructor_id: Uuid,
    pub customer_id: Uuid,
    pub class_id: Uuid,
    pub status: InvitationStatus,
    pub message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub responded_at: Option<time::OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: time::OffsetDateTime,
}

impl From<class_invitations::Model> for InvitationData {
    fn from(invitation: class_invitations::Model) -> Self {
        Self {
            id: invitation.id,
            instructor_id: invitation.instructor_id,
            customer_id: invitation.customer_id,
            class_id: invitation.class_instance_id,
            status: invitation.status,
            message: invitation.message,
            expires_at: invitation.expires_at,
            responded_at: invitation.responded_at,
            created_at: invitation.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondData {
    pub invitation: InvitationData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<i32>,
}
